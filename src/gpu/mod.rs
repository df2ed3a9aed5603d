//! The graphics API seam.
//!
//! Everything above this module talks to the GPU through [`GraphicsApi`], an
//! immediate-mode interface: bind a program, a vertex array and textures,
//! set uniforms, then draw. [`crate::context::Context`] implements it on
//! wgpu and [`headless::HeadlessApi`] records the calls for inspection.
//!
//! GPU objects created through the API are owned by [`GpuHandle`]s. Dropping
//! a handle queues its id on the shared [`ReleaseQueue`], and [`Gpu`] hands
//! the queued ids to [`GraphicsApi::release`] at the start of the next
//! frame, so every object is released exactly once.

use std::{borrow::Cow, cell::RefCell, fmt, rc::Rc};

use crate::data_structures::color::Color;

pub mod headless;
pub mod uniform;

pub use uniform::{UniformKind, UniformLayout, UniformValue};

macro_rules! gpu_id {
    ($name:ident, $variant:ident) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl From<$name> for GpuResource {
            fn from(id: $name) -> Self {
                GpuResource::$variant(id)
            }
        }
    };
}

gpu_id!(ProgramId, Program);
gpu_id!(BufferId, Buffer);
gpu_id!(VertexArrayId, VertexArray);
gpu_id!(TextureId, Texture);

/// Any GPU object that can be released.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GpuResource {
    Program(ProgramId),
    Buffer(BufferId),
    VertexArray(VertexArrayId),
    Texture(TextureId),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    Vertex,
    Index,
    Uniform,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Float,
    Int,
    UnsignedInt,
    UnsignedByte,
}

/// How one vertex attribute is read from the vertex buffer. `stride` and
/// `offset` are in bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    pub kind: AttributeKind,
    pub normalized: bool,
    pub stride: u32,
    pub offset: u64,
}

impl VertexAttribute {
    pub fn float(location: u32, components: u32, stride: u32, offset: u64) -> Self {
        Self {
            location,
            components,
            kind: AttributeKind::Float,
            normalized: false,
            stride,
            offset,
        }
    }

    /// Whether a vertex format exists for this kind and component count:
    /// 1 to 4 components, bytes only in pairs or quads.
    pub fn is_supported(&self) -> bool {
        match self.kind {
            AttributeKind::UnsignedByte => matches!(self.components, 2 | 4),
            _ => (1..=4).contains(&self.components),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VertexArrayDescriptor<'a> {
    pub vertex_buffer: BufferId,
    pub index_buffer: Option<BufferId>,
    pub attributes: &'a [VertexAttribute],
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WrapMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SamplerState {
    pub wrap: WrapMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub mipmap_filter: FilterMode,
}

impl SamplerState {
    /// Repeating texture sampled with nearest filtering at every level.
    pub const PIXELATED: SamplerState = SamplerState {
        wrap: WrapMode::Repeat,
        min_filter: FilterMode::Nearest,
        mag_filter: FilterMode::Nearest,
        mipmap_filter: FilterMode::Nearest,
    };

    pub const CLAMPED_NEAREST: SamplerState = SamplerState {
        wrap: WrapMode::ClampToEdge,
        min_filter: FilterMode::Nearest,
        mag_filter: FilterMode::Nearest,
        mipmap_filter: FilterMode::Nearest,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub mip_level_count: u32,
    pub sampler: SamplerState,
}

/// A rectangle of one mip level, in texels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureRegion {
    pub mip_level: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

/// Vertex and fragment source of one program plus the uniforms it declares.
///
/// Both stages are WGSL; the vertex stage must define `vs_main` and the
/// fragment stage `fs_main`.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub label: String,
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
    pub uniforms: UniformLayout,
}

pub trait GraphicsApi {
    fn max_texture_units(&self) -> u32;
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Compiles and links a program. On failure the error carries the
    /// compiler diagnostics.
    fn create_program(&mut self, source: &ShaderSource) -> Result<ProgramId, String>;
    fn use_program(&mut self, program: ProgramId);
    fn set_uniform(&mut self, program: ProgramId, name: &str, value: UniformValue);

    fn create_buffer(&mut self, label: &str, usage: BufferUsage, contents: &[u8]) -> BufferId;
    fn write_buffer(&mut self, buffer: BufferId, offset: u64, contents: &[u8]);
    fn bind_uniform_block(&mut self, slot: u32, buffer: BufferId);

    fn create_vertex_array(&mut self, descriptor: &VertexArrayDescriptor<'_>) -> VertexArrayId;
    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>);

    fn create_texture(&mut self, descriptor: &TextureDescriptor<'_>) -> TextureId;
    /// Uploads tightly packed RGBA8 texels into `region`.
    fn write_texture(&mut self, texture: TextureId, region: TextureRegion, rgba: &[u8]);
    fn set_texture_sampler(&mut self, texture: TextureId, sampler: SamplerState);
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);

    fn set_blending(&mut self, enabled: bool);
    fn set_depth_test(&mut self, enabled: bool);
    fn set_polygon_mode(&mut self, mode: PolygonMode);

    fn clear(&mut self, color: Color);
    fn draw_arrays(&mut self, first: u32, count: u32);
    fn draw_elements(&mut self, count: u32);
    fn present(&mut self) -> anyhow::Result<()>;

    fn release(&mut self, resource: GpuResource);
}

/// Ids of dropped handles waiting to be released.
#[derive(Clone, Default)]
pub struct ReleaseQueue(Rc<RefCell<Vec<GpuResource>>>);

impl ReleaseQueue {
    fn push(&self, resource: GpuResource) {
        self.0.borrow_mut().push(resource);
    }

    fn drain(&self) -> Vec<GpuResource> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

impl fmt::Debug for ReleaseQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReleaseQueue").field(&self.len()).finish()
    }
}

/// Exclusive owner of one GPU object. Not `Clone`: moving the handle moves
/// the ownership, dropping it queues the release.
pub struct GpuHandle<T: Copy + Into<GpuResource>> {
    id: T,
    releases: ReleaseQueue,
}

impl<T: Copy + Into<GpuResource>> GpuHandle<T> {
    pub fn id(&self) -> T {
        self.id
    }
}

impl<T: Copy + Into<GpuResource> + fmt::Debug> fmt::Debug for GpuHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GpuHandle").field(&self.id).finish()
    }
}

impl<T: Copy + Into<GpuResource>> Drop for GpuHandle<T> {
    fn drop(&mut self) {
        self.releases.push(self.id.into());
    }
}

/// The GPU state the renderer threads through every call: the API, the
/// active-program cache, the polygon mode and the release queue.
pub struct Gpu {
    api: Box<dyn GraphicsApi>,
    active_program: Option<ProgramId>,
    polygon_mode: PolygonMode,
    releases: ReleaseQueue,
}

impl Gpu {
    pub fn new(api: impl GraphicsApi + 'static) -> Self {
        Self {
            api: Box::new(api),
            active_program: None,
            polygon_mode: PolygonMode::Fill,
            releases: ReleaseQueue::default(),
        }
    }

    pub fn api(&self) -> &dyn GraphicsApi {
        self.api.as_ref()
    }

    pub fn api_mut(&mut self) -> &mut dyn GraphicsApi {
        self.api.as_mut()
    }

    pub fn max_texture_units(&self) -> u32 {
        self.api.max_texture_units()
    }

    /// Takes ownership of a freshly created GPU object.
    pub fn track<T: Copy + Into<GpuResource>>(&self, id: T) -> GpuHandle<T> {
        GpuHandle {
            id,
            releases: self.releases.clone(),
        }
    }

    /// Activates `program` unless it is already the active one.
    pub fn use_program(&mut self, program: ProgramId) {
        if self.active_program == Some(program) {
            return;
        }
        self.api.use_program(program);
        self.active_program = Some(program);
    }

    pub fn active_program(&self) -> Option<ProgramId> {
        self.active_program
    }

    pub fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.api.set_polygon_mode(mode);
        self.polygon_mode = mode;
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    pub fn pending_releases(&self) -> usize {
        self.releases.len()
    }

    /// Releases every GPU object whose handle was dropped since the last call.
    pub fn collect_garbage(&mut self) {
        for resource in self.releases.drain() {
            if let GpuResource::Program(program) = resource {
                if self.active_program == Some(program) {
                    self.active_program = None;
                }
            }
            self.api.release(resource);
        }
    }
}

impl Drop for Gpu {
    fn drop(&mut self) {
        self.collect_garbage();
    }
}

impl fmt::Debug for Gpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gpu")
            .field("active_program", &self.active_program)
            .field("releases", &self.releases)
            .finish_non_exhaustive()
    }
}
