//! [`GraphicsApi`] on wgpu.
//!
//! wgpu records whole render passes while the engine speaks an immediate
//! mode API, so every draw call snapshots the state it was issued with (the
//! bound program, vertex array, textures and light block, the program's
//! uniform values and the fixed function toggles). [`Context::present`]
//! resolves the snapshots into pipelines and bind groups, packs all uniform
//! snapshots into one buffer addressed by dynamic offsets and replays them
//! in a single pass.

use std::{collections::HashMap, sync::Arc};

use anyhow::Context as _;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    data_structures::{color::Color, light::LIGHT_DATA_SIZE},
    gpu::{
        BufferId, BufferUsage, FilterMode, GpuResource, GraphicsApi, PolygonMode, ProgramId,
        SamplerState, ShaderSource, TextureDescriptor, TextureId, TextureRegion, UniformLayout,
        UniformValue, VertexArrayDescriptor, VertexArrayId, WrapMode,
    },
    pipelines::{
        basic::{self, PipelineState, VertexLayoutKey},
        light::{self, BindGroupLayouts, TEXTURE_SLOTS},
    },
};

const INITIAL_UNIFORM_CAPACITY: u64 = 64 * 1024;

struct Program {
    label: String,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    uniforms: UniformLayout,
    /// Current uniform values, padded to the binding size.
    staging: Vec<u8>,
}

struct VertexArray {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    layout: VertexLayoutKey,
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

#[derive(Debug, Copy, Clone)]
enum DrawKind {
    Arrays { first: u32, count: u32 },
    Elements { count: u32 },
}

struct DrawCall {
    program: ProgramId,
    vertex_array: VertexArrayId,
    textures: [Option<TextureId>; TEXTURE_SLOTS],
    light_block: Option<BufferId>,
    state: PipelineState,
    uniforms: Vec<u8>,
    kind: DrawKind,
}

type PipelineKey = (ProgramId, VertexLayoutKey, PipelineState);

pub struct Context {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    layouts: BindGroupLayouts,
    pipeline_layout: wgpu::PipelineLayout,
    line_mode_supported: bool,
    uniform_alignment: u64,

    next_id: u32,
    programs: HashMap<ProgramId, Program>,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    vertex_arrays: HashMap<VertexArrayId, VertexArray>,
    textures: HashMap<TextureId, GpuTexture>,

    active_program: Option<ProgramId>,
    bound_vertex_array: Option<VertexArrayId>,
    bound_textures: [Option<TextureId>; TEXTURE_SLOTS],
    light_block: Option<BufferId>,
    state: PipelineState,
    clear_color: Option<Color>,
    draws: Vec<DrawCall>,

    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    uniform_buffer: wgpu::Buffer,
    uniform_capacity: u64,
    entity_groups: HashMap<ProgramId, wgpu::BindGroup>,
    texture_groups: HashMap<[Option<TextureId>; TEXTURE_SLOTS], wgpu::BindGroup>,
    light_groups: HashMap<Option<BufferId>, wgpu::BindGroup>,
    fallback_texture: GpuTexture,
    fallback_light: wgpu::Buffer,
}

impl Context {
    pub async fn new(window: Arc<Window>, vsync: bool) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("creating the window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable graphics adapter")?;

        let line_mode_supported = adapter.features().contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if line_mode_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            log::warn!("Adapter lacks POLYGON_MODE_LINE, wireframe rendering draws filled");
            wgpu::Features::empty()
        };

        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                ..Default::default()
            })
            .await
            .context("requesting the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders write linear colors and rely on an sRGB target.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;
        let mut config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .context("surface not supported by the adapter")?;
        config.format = surface_format;
        config.present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);

        let depth_view = basic::create_depth_texture(&device, config.width, config.height);
        let layouts = BindGroupLayouts::new(&device);
        let pipeline_layout = basic::mk_pipeline_layout(&device, &layouts.all());
        let uniform_alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment.max(1));
        let uniform_buffer = mk_uniform_buffer(&device, INITIAL_UNIFORM_CAPACITY);
        let fallback_texture = mk_fallback_texture(&device, &queue);
        let fallback_light = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Empty Light Buffer"),
            contents: &vec![0u8; LIGHT_DATA_SIZE],
            usage: wgpu::BufferUsages::UNIFORM,
        });

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_view,
            layouts,
            pipeline_layout,
            line_mode_supported,
            uniform_alignment,
            next_id: 0,
            programs: HashMap::new(),
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            textures: HashMap::new(),
            active_program: None,
            bound_vertex_array: None,
            bound_textures: [None; TEXTURE_SLOTS],
            light_block: None,
            state: PipelineState {
                polygon_mode: PolygonMode::Fill,
                blending: false,
                depth_test: false,
            },
            clear_color: None,
            draws: Vec::new(),
            pipelines: HashMap::new(),
            uniform_buffer,
            uniform_capacity: INITIAL_UNIFORM_CAPACITY,
            entity_groups: HashMap::new(),
            texture_groups: HashMap::new(),
            light_groups: HashMap::new(),
            fallback_texture,
            fallback_light,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn next_raw_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn binding_size(uniforms: &UniformLayout) -> u64 {
        (uniforms.size() as u64).max(16).next_multiple_of(16)
    }

    fn record_draw(&mut self, kind: DrawKind) {
        let Some(program) = self.active_program else {
            log::error!("Draw call without an active program, skipped");
            return;
        };
        let Some(vertex_array) = self.bound_vertex_array else {
            log::error!("Draw call without a bound vertex array, skipped");
            return;
        };
        let Some(uniforms) = self.programs.get(&program).map(|p| p.staging.clone()) else {
            log::error!("Draw call with released program {program:?}, skipped");
            return;
        };
        self.draws.push(DrawCall {
            program,
            vertex_array,
            textures: self.bound_textures,
            light_block: self.light_block,
            state: self.state,
            uniforms,
            kind,
        });
    }

    /// Creates the pipelines and bind groups the recorded draws need. Returns
    /// whether `draw` can be replayed.
    fn prepare_draw(&mut self, draw: &DrawCall) -> bool {
        let (Some(program), Some(vertex_array)) = (
            self.programs.get(&draw.program),
            self.vertex_arrays.get(&draw.vertex_array),
        ) else {
            log::warn!("Draw call references released objects, skipped");
            return false;
        };

        let key = (draw.program, vertex_array.layout.clone(), draw.state);
        if !self.pipelines.contains_key(&key) {
            log::debug!("Creating pipeline for program `{}`", program.label);
            let pipeline = basic::mk_render_pipeline(
                &self.device,
                &self.pipeline_layout,
                self.config.format,
                &vertex_array.layout,
                &program.vertex,
                &program.fragment,
                draw.state,
                self.line_mode_supported,
            );
            self.pipelines.insert(key, pipeline);
        }

        if !self.entity_groups.contains_key(&draw.program) {
            let group = light::mk_entity_bind_group(
                &self.device,
                &self.layouts.entity,
                &self.uniform_buffer,
                Self::binding_size(&program.uniforms),
            );
            self.entity_groups.insert(draw.program, group);
        }

        if !self.texture_groups.contains_key(&draw.textures) {
            let fallback = (&self.fallback_texture.view, &self.fallback_texture.sampler);
            let slots = draw.textures.map(|id| {
                id.and_then(|id| self.textures.get(&id))
                    .map_or(fallback, |t| (&t.view, &t.sampler))
            });
            let group = light::mk_texture_bind_group(&self.device, &self.layouts.textures, slots);
            self.texture_groups.insert(draw.textures, group);
        }

        if !self.light_groups.contains_key(&draw.light_block) {
            let buffer = draw
                .light_block
                .and_then(|id| self.buffers.get(&id))
                .unwrap_or(&self.fallback_light);
            let group = light::mk_light_bind_group(&self.device, &self.layouts.light, buffer);
            self.light_groups.insert(draw.light_block, group);
        }
        true
    }

    /// Packs every draw's uniform snapshot at an aligned offset and uploads
    /// them, growing the uniform buffer when needed. Returns the offsets.
    fn upload_uniforms(&mut self, draws: &[DrawCall]) -> Vec<u32> {
        let mut offsets = Vec::with_capacity(draws.len());
        let mut cursor = 0u64;
        for draw in draws {
            offsets.push(cursor as u32);
            let size = self
                .programs
                .get(&draw.program)
                .map_or(16, |p| Self::binding_size(&p.uniforms));
            cursor += size.next_multiple_of(self.uniform_alignment);
        }

        if cursor > self.uniform_capacity {
            let capacity = cursor.next_power_of_two();
            log::debug!("Growing uniform buffer to {capacity} bytes");
            self.uniform_buffer = mk_uniform_buffer(&self.device, capacity);
            self.uniform_capacity = capacity;
            self.entity_groups.clear();
        }

        let mut bytes = vec![0u8; cursor as usize];
        for (draw, offset) in draws.iter().zip(&offsets) {
            let start = *offset as usize;
            bytes[start..start + draw.uniforms.len()].copy_from_slice(&draw.uniforms);
        }
        if !bytes.is_empty() {
            self.queue.write_buffer(&self.uniform_buffer, 0, &bytes);
        }
        offsets
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_view = basic::create_depth_texture(&self.device, self.config.width, self.config.height);
    }

    fn forget_texture_groups(&mut self, texture: TextureId) {
        self.texture_groups
            .retain(|key, _| !key.contains(&Some(texture)));
    }
}

impl GraphicsApi for Context {
    fn max_texture_units(&self) -> u32 {
        TEXTURE_SLOTS as u32
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
    }

    fn create_program(&mut self, source: &ShaderSource) -> Result<ProgramId, String> {
        let vertex = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} vertex", source.label)),
            source: wgpu::ShaderSource::Wgsl(source.vertex.clone()),
        });
        let fragment = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} fragment", source.label)),
            source: wgpu::ShaderSource::Wgsl(source.fragment.clone()),
        });

        let mut diagnostics = Vec::new();
        for (stage, module) in [("vertex", &vertex), ("fragment", &fragment)] {
            let info = futures::executor::block_on(module.get_compilation_info());
            for message in info.messages {
                if message.message_type == wgpu::CompilationMessageType::Error {
                    diagnostics.push(format!("{stage}: {}", message.message));
                }
            }
        }
        if !diagnostics.is_empty() {
            return Err(diagnostics.join("\n"));
        }

        let id = ProgramId(self.next_raw_id());
        let staging = vec![0u8; Self::binding_size(&source.uniforms) as usize];
        self.programs.insert(
            id,
            Program {
                label: source.label.clone(),
                vertex,
                fragment,
                uniforms: source.uniforms.clone(),
                staging,
            },
        );
        Ok(id)
    }

    fn use_program(&mut self, program: ProgramId) {
        self.active_program = Some(program);
    }

    fn set_uniform(&mut self, program: ProgramId, name: &str, value: UniformValue) {
        let Some(program) = self.programs.get_mut(&program) else {
            log::error!("set_uniform `{name}` on unknown program {program:?}");
            return;
        };
        if let Err(e) = program.uniforms.write(&mut program.staging, name, &value) {
            log::debug!("Program `{}`: {e}", program.label);
        }
    }

    fn create_buffer(&mut self, label: &str, usage: BufferUsage, contents: &[u8]) -> BufferId {
        let usage = match usage {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUsage::Index => wgpu::BufferUsages::INDEX,
            BufferUsage::Uniform => wgpu::BufferUsages::UNIFORM,
        } | wgpu::BufferUsages::COPY_DST;
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        });
        let id = BufferId(self.next_raw_id());
        self.buffers.insert(id, buffer);
        id
    }

    fn write_buffer(&mut self, buffer: BufferId, offset: u64, contents: &[u8]) {
        match self.buffers.get(&buffer) {
            Some(target) => self.queue.write_buffer(target, offset, contents),
            None => log::error!("write_buffer on unknown buffer {buffer:?}"),
        }
    }

    fn bind_uniform_block(&mut self, slot: u32, buffer: BufferId) {
        if slot != 0 {
            log::warn!("Only uniform block slot 0 exists, ignoring slot {slot}");
            return;
        }
        self.light_block = Some(buffer);
    }

    fn create_vertex_array(&mut self, descriptor: &VertexArrayDescriptor<'_>) -> VertexArrayId {
        let id = VertexArrayId(self.next_raw_id());
        let Some(vertex_buffer) = self.buffers.get(&descriptor.vertex_buffer).cloned() else {
            log::error!("Vertex array over unknown buffer {:?}", descriptor.vertex_buffer);
            return id;
        };
        let index_buffer = descriptor
            .index_buffer
            .and_then(|id| self.buffers.get(&id).cloned());
        self.vertex_arrays.insert(
            id,
            VertexArray {
                vertex_buffer,
                index_buffer,
                layout: VertexLayoutKey::from_attributes(descriptor.attributes),
            },
        );
        id
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) {
        self.bound_vertex_array = vertex_array;
    }

    fn create_texture(&mut self, descriptor: &TextureDescriptor<'_>) -> TextureId {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(descriptor.label),
            size: wgpu::Extent3d {
                width: descriptor.width.max(1),
                height: descriptor.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: descriptor.mip_level_count.max(1),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = mk_sampler(&self.device, descriptor.sampler);
        let id = TextureId(self.next_raw_id());
        self.textures.insert(id, GpuTexture { texture, view, sampler });
        id
    }

    fn write_texture(&mut self, texture: TextureId, region: TextureRegion, rgba: &[u8]) {
        let Some(target) = self.textures.get(&texture) else {
            log::error!("write_texture on unknown texture {texture:?}");
            return;
        };
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &target.texture,
                mip_level: region.mip_level,
                origin: wgpu::Origin3d {
                    x: region.x,
                    y: region.y,
                    z: 0,
                },
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * region.width),
                rows_per_image: Some(region.height),
            },
            wgpu::Extent3d {
                width: region.width,
                height: region.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn set_texture_sampler(&mut self, texture: TextureId, sampler: SamplerState) {
        let new_sampler = mk_sampler(&self.device, sampler);
        match self.textures.get_mut(&texture) {
            Some(target) => target.sampler = new_sampler,
            None => {
                log::error!("set_texture_sampler on unknown texture {texture:?}");
                return;
            }
        }
        self.forget_texture_groups(texture);
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        match self.bound_textures.get_mut(unit as usize) {
            Some(slot) => *slot = texture,
            None => log::error!("Texture unit {unit} exceeds the {TEXTURE_SLOTS} available"),
        }
    }

    fn set_blending(&mut self, enabled: bool) {
        self.state.blending = enabled;
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.state.depth_test = enabled;
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.state.polygon_mode = mode;
    }

    fn clear(&mut self, color: Color) {
        // Anything drawn before the clear would be overwritten by it.
        self.draws.clear();
        self.clear_color = Some(color);
    }

    fn draw_arrays(&mut self, first: u32, count: u32) {
        self.record_draw(DrawKind::Arrays { first, count });
    }

    fn draw_elements(&mut self, count: u32) {
        self.record_draw(DrawKind::Elements { count });
    }

    fn present(&mut self) -> anyhow::Result<()> {
        let draws = std::mem::take(&mut self.draws);
        let clear_color = self.clear_color.take();

        // Uploading first: growing the uniform buffer drops the entity bind groups.
        let offsets = self.upload_uniforms(&draws);
        let ready: Vec<bool> = draws.iter().map(|d| self.prepare_draw(d)).collect();

        let output = match self.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                log::warn!("Surface lost, reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            wgpu::CurrentSurfaceTexture::Timeout => {
                log::warn!("Timed out acquiring the next frame");
                return Ok(());
            }
            e @ (wgpu::CurrentSurfaceTexture::Occluded
            | wgpu::CurrentSurfaceTexture::Validation) => {
                return Err(anyhow::anyhow!("{e:?}")).context("acquiring the next frame");
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: match clear_color {
                            Some(color) => wgpu::LoadOp::Clear(color.into()),
                            None => wgpu::LoadOp::Load,
                        },
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for ((draw, offset), ready) in draws.iter().zip(&offsets).zip(&ready) {
                if !*ready {
                    continue;
                }
                let Some(vertex_array) = self.vertex_arrays.get(&draw.vertex_array) else {
                    continue;
                };
                let key = (draw.program, vertex_array.layout.clone(), draw.state);
                let (Some(pipeline), Some(entity), Some(textures), Some(lights)) = (
                    self.pipelines.get(&key),
                    self.entity_groups.get(&draw.program),
                    self.texture_groups.get(&draw.textures),
                    self.light_groups.get(&draw.light_block),
                ) else {
                    continue;
                };

                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, entity, &[*offset]);
                pass.set_bind_group(1, textures, &[]);
                pass.set_bind_group(2, lights, &[]);
                pass.set_vertex_buffer(0, vertex_array.vertex_buffer.slice(..));
                match (draw.kind, &vertex_array.index_buffer) {
                    (DrawKind::Arrays { first, count }, _) => pass.draw(first..first + count, 0..1),
                    (DrawKind::Elements { count }, Some(indices)) => {
                        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..count, 0, 0..1);
                    }
                    (DrawKind::Elements { .. }, None) => {
                        log::error!("Indexed draw on a vertex array without indices, skipped");
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }

    fn release(&mut self, resource: GpuResource) {
        let known = match resource {
            GpuResource::Program(id) => {
                self.pipelines.retain(|(program, _, _), _| *program != id);
                self.entity_groups.remove(&id);
                if self.active_program == Some(id) {
                    self.active_program = None;
                }
                self.programs.remove(&id).is_some()
            }
            GpuResource::Buffer(id) => {
                self.light_groups.remove(&Some(id));
                if self.light_block == Some(id) {
                    self.light_block = None;
                }
                self.buffers.remove(&id).is_some()
            }
            GpuResource::VertexArray(id) => {
                if self.bound_vertex_array == Some(id) {
                    self.bound_vertex_array = None;
                }
                self.vertex_arrays.remove(&id).is_some()
            }
            GpuResource::Texture(id) => {
                self.forget_texture_groups(id);
                for slot in &mut self.bound_textures {
                    if *slot == Some(id) {
                        *slot = None;
                    }
                }
                self.textures.remove(&id).is_some()
            }
        };
        if !known {
            log::error!("Released unknown or already released {resource:?}");
        }
    }
}

fn mk_uniform_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Entity Uniform Buffer"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn mk_sampler(device: &wgpu::Device, state: SamplerState) -> wgpu::Sampler {
    let address_mode = match state.wrap {
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    };
    let filter = |mode: FilterMode| match mode {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    };
    let mipmap_filter = match state.mipmap_filter {
        FilterMode::Nearest => wgpu::MipmapFilterMode::Nearest,
        FilterMode::Linear => wgpu::MipmapFilterMode::Linear,
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: filter(state.mag_filter),
        min_filter: filter(state.min_filter),
        mipmap_filter,
        ..Default::default()
    })
}

/// 1x1 white texture bound to texture units nothing was bound to.
fn mk_fallback_texture(device: &wgpu::Device, queue: &wgpu::Queue) -> GpuTexture {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("fallback_texture"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &[255, 255, 255, 255],
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = mk_sampler(device, SamplerState::CLAMPED_NEAREST);
    GpuTexture { texture, view, sampler }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("format", &self.config.format)
            .field("size", &(self.config.width, self.config.height))
            .field("programs", &self.programs.len())
            .field("buffers", &self.buffers.len())
            .field("textures", &self.textures.len())
            .field("pipelines", &self.pipelines.len())
            .finish_non_exhaustive()
    }
}
