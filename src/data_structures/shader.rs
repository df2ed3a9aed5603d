//! Compiled shader programs and the catalog of shader variants.

use std::{collections::HashMap, rc::Rc};

use cgmath::{Matrix2, Matrix3, Matrix4, Vector2, Vector3, Vector4};

use crate::{
    errors::{RenderError, Result},
    gpu::{Gpu, GpuHandle, ProgramId, ShaderSource, UniformKind, UniformLayout, UniformValue},
};

/// The shader variants blocks can be drawn with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ShaderType {
    /// Textured block with ambient lighting only.
    #[default]
    Block,
    /// Unlit, emissive block standing in for a light source.
    LightBlock,
    /// Textured block lit by the scene's light uniform buffer.
    LightReceiver,
}

/// Uniforms shared by the bundled shaders, in the order of the WGSL
/// `EntityUniforms` struct.
pub fn entity_uniform_layout() -> UniformLayout {
    UniformLayout::new(&[
        ("model", UniformKind::Mat4),
        ("view", UniformKind::Mat4),
        ("projection", UniformKind::Mat4),
        ("viewPos", UniformKind::Vec3),
        ("material.shininess", UniformKind::Float),
        ("material.ambient", UniformKind::Vec3),
        ("material.diffuse", UniformKind::Int),
        ("material.specular", UniformKind::Int),
        ("material.emissive", UniformKind::Int),
        ("material.hasSpecular", UniformKind::Bool),
        ("material.hasEmissive", UniformKind::Bool),
        ("lightColor", UniformKind::Vec3),
    ])
}

const BLOCK_VERTEX: &str = include_str!("../pipelines/block.vert.wgsl");
const BLOCK_FRAGMENT: &str = include_str!("../pipelines/block.frag.wgsl");
const LIGHT_SOURCE_FRAGMENT: &str = include_str!("../pipelines/light_source.frag.wgsl");
const LIGHT_RECEIVER_FRAGMENT: &str = include_str!("../pipelines/light_receiver.frag.wgsl");

/// Source of the bundled shader for `shader_type`.
pub fn builtin_source(shader_type: ShaderType) -> ShaderSource {
    let (label, fragment) = match shader_type {
        ShaderType::Block => ("Block Shader", BLOCK_FRAGMENT),
        ShaderType::LightBlock => ("Light Source Shader", LIGHT_SOURCE_FRAGMENT),
        ShaderType::LightReceiver => ("Light Receiver Shader", LIGHT_RECEIVER_FRAGMENT),
    };
    ShaderSource {
        label: label.to_string(),
        vertex: BLOCK_VERTEX.into(),
        fragment: fragment.into(),
        uniforms: entity_uniform_layout(),
    }
}

#[derive(Debug)]
pub struct Shader {
    label: String,
    program: GpuHandle<ProgramId>,
    uniforms: UniformLayout,
}

impl Shader {
    pub fn new(gpu: &mut Gpu, source: ShaderSource) -> Result<Self> {
        match gpu.api_mut().create_program(&source) {
            Ok(program) => Ok(Self {
                label: source.label,
                program: gpu.track(program),
                uniforms: source.uniforms,
            }),
            Err(diagnostics) => Err(RenderError::ShaderCompilation {
                label: source.label,
                diagnostics,
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn program(&self) -> ProgramId {
        self.program.id()
    }

    pub fn uniforms(&self) -> &UniformLayout {
        &self.uniforms
    }

    pub fn use_program(&self, gpu: &mut Gpu) {
        gpu.use_program(self.program());
    }

    pub fn set_uniform(&self, gpu: &mut Gpu, name: &str, value: impl Into<UniformValue>) {
        self.use_program(gpu);
        gpu.api_mut().set_uniform(self.program(), name, value.into());
    }

    pub fn set_bool(&self, gpu: &mut Gpu, name: &str, value: bool) {
        self.set_uniform(gpu, name, value);
    }

    pub fn set_int(&self, gpu: &mut Gpu, name: &str, value: i32) {
        self.set_uniform(gpu, name, value);
    }

    pub fn set_float(&self, gpu: &mut Gpu, name: &str, value: f32) {
        self.set_uniform(gpu, name, value);
    }

    pub fn set_vec2(&self, gpu: &mut Gpu, name: &str, value: Vector2<f32>) {
        self.set_uniform(gpu, name, value);
    }

    pub fn set_vec3(&self, gpu: &mut Gpu, name: &str, value: Vector3<f32>) {
        self.set_uniform(gpu, name, value);
    }

    pub fn set_vec4(&self, gpu: &mut Gpu, name: &str, value: Vector4<f32>) {
        self.set_uniform(gpu, name, value);
    }

    pub fn set_mat2(&self, gpu: &mut Gpu, name: &str, value: Matrix2<f32>) {
        self.set_uniform(gpu, name, value);
    }

    pub fn set_mat3(&self, gpu: &mut Gpu, name: &str, value: Matrix3<f32>) {
        self.set_uniform(gpu, name, value);
    }

    pub fn set_mat4(&self, gpu: &mut Gpu, name: &str, value: Matrix4<f32>) {
        self.set_uniform(gpu, name, value);
    }
}

/// Maps each [`ShaderType`] to one compiled, shared [`Shader`].
#[derive(Debug, Default)]
pub struct ShaderProvider {
    shaders: HashMap<ShaderType, Rc<Shader>>,
}

impl ShaderProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider with every bundled variant compiled.
    pub fn with_builtin_shaders(gpu: &mut Gpu) -> Result<Self> {
        let mut provider = Self::new();
        for shader_type in [
            ShaderType::Block,
            ShaderType::LightBlock,
            ShaderType::LightReceiver,
        ] {
            provider.add_shader(gpu, shader_type, builtin_source(shader_type))?;
        }
        Ok(provider)
    }

    /// Compiles and registers `source` for `shader_type`. A type that is
    /// already registered keeps its shader.
    pub fn add_shader(&mut self, gpu: &mut Gpu, shader_type: ShaderType, source: ShaderSource) -> Result<()> {
        if self.shaders.contains_key(&shader_type) {
            log::warn!("Shader for {shader_type:?} already registered, skipping");
            return Ok(());
        }
        let shader = Shader::new(gpu, source).inspect_err(|e| log::error!("{e}"))?;
        self.shaders.insert(shader_type, Rc::new(shader));
        Ok(())
    }

    pub fn insert(&mut self, shader_type: ShaderType, shader: Rc<Shader>) {
        self.shaders.insert(shader_type, shader);
    }

    pub fn get_shader(&self, shader_type: ShaderType) -> Result<Rc<Shader>> {
        self.shaders
            .get(&shader_type)
            .cloned()
            .ok_or(RenderError::ShaderNotFound(shader_type))
    }

    pub fn has_shader(&self, shader_type: ShaderType) -> bool {
        self.shaders.contains_key(&shader_type)
    }
}
