//! Surface appearance of a render entity.

use std::rc::Rc;

use cgmath::Vector3;

use crate::{
    data_structures::{color::Color, shader::Shader, texture::Texture},
    gpu::Gpu,
};

pub const DIFFUSE_UNIT: u32 = 0;
pub const SPECULAR_UNIT: u32 = 1;
pub const EMISSIVE_UNIT: u32 = 2;

pub const DEFAULT_SHININESS: f32 = 32.0;

/// A shader plus the textures and constants it is drawn with.
///
/// The diffuse texture is required. Specular and emissive maps are optional
/// and exclusively owned; replacing one drops the previous texture.
#[derive(Debug)]
pub struct Material {
    shader: Rc<Shader>,
    diffuse: Texture,
    specular: Option<Texture>,
    emissive: Option<Texture>,
    shininess: f32,
    ambient: Option<Color>,
}

impl Material {
    pub fn new(shader: Rc<Shader>, diffuse: Texture) -> Self {
        Self {
            shader,
            diffuse,
            specular: None,
            emissive: None,
            shininess: DEFAULT_SHININESS,
            ambient: None,
        }
    }

    pub fn with_specular(mut self, specular: Texture) -> Self {
        self.specular = Some(specular);
        self
    }

    pub fn with_emissive(mut self, emissive: Texture) -> Self {
        self.emissive = Some(emissive);
        self
    }

    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = Some(ambient);
        self
    }

    pub fn shader(&self) -> &Rc<Shader> {
        &self.shader
    }

    pub fn diffuse_texture(&self) -> &Texture {
        &self.diffuse
    }

    pub fn specular_texture(&self) -> Option<&Texture> {
        self.specular.as_ref()
    }

    pub fn emissive_texture(&self) -> Option<&Texture> {
        self.emissive.as_ref()
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    pub fn ambient(&self) -> Option<Color> {
        self.ambient
    }

    pub fn set_shader(&mut self, shader: Rc<Shader>) {
        self.shader = shader;
    }

    pub fn set_diffuse_texture(&mut self, diffuse: Texture) {
        self.diffuse = diffuse;
    }

    pub fn set_specular_texture(&mut self, specular: Option<Texture>) {
        self.specular = specular;
    }

    pub fn set_emissive_texture(&mut self, emissive: Option<Texture>) {
        self.emissive = emissive;
    }

    pub fn set_shininess(&mut self, shininess: f32) {
        self.shininess = shininess;
    }

    pub fn set_ambient(&mut self, ambient: Option<Color>) {
        self.ambient = ambient;
    }

    /// Activates the shader and binds diffuse, specular and emissive maps to
    /// units 0, 1 and 2.
    pub fn bind(&self, gpu: &mut Gpu) {
        let shader = &self.shader;
        shader.use_program(gpu);

        self.diffuse.bind(gpu, DIFFUSE_UNIT);
        shader.set_int(gpu, "material.diffuse", DIFFUSE_UNIT as i32);

        if let Some(specular) = &self.specular {
            specular.bind(gpu, SPECULAR_UNIT);
            shader.set_int(gpu, "material.specular", SPECULAR_UNIT as i32);
        }
        if let Some(emissive) = &self.emissive {
            emissive.bind(gpu, EMISSIVE_UNIT);
            shader.set_int(gpu, "material.emissive", EMISSIVE_UNIT as i32);
        }
        shader.set_bool(gpu, "material.hasSpecular", self.specular.is_some());
        shader.set_bool(gpu, "material.hasEmissive", self.emissive.is_some());

        shader.set_float(gpu, "material.shininess", self.shininess);
        // zero means unset; staged uniforms outlive the draw
        let ambient = self.ambient.map_or(Vector3::new(0.0, 0.0, 0.0), |a| a.to_vec3());
        shader.set_vec3(gpu, "material.ambient", ambient);
    }

    /// Clears the units bound by [`Material::bind`], last bound first.
    pub fn unbind(&self, gpu: &mut Gpu) {
        if let Some(emissive) = &self.emissive {
            emissive.unbind(gpu, EMISSIVE_UNIT);
        }
        if let Some(specular) = &self.specular {
            specular.unbind(gpu, SPECULAR_UNIT);
        }
        self.diffuse.unbind(gpu, DIFFUSE_UNIT);
    }
}
