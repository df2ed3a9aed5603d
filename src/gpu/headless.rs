//! A [`GraphicsApi`] that draws nothing and remembers everything.
//!
//! Every call is appended to a command log. Buffer contents, texture sizes
//! and the last value of every uniform are kept as well. A [`HeadlessProbe`]
//! shares the state, so it can still be inspected after the api has been
//! moved into a [`super::Gpu`].

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use crate::data_structures::color::Color;

use super::{
    BufferId, BufferUsage, GpuResource, GraphicsApi, PolygonMode, ProgramId, SamplerState,
    ShaderSource, TextureDescriptor, TextureId, TextureRegion, UniformValue, VertexArrayDescriptor,
    VertexArrayId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    SetViewport { width: u32, height: u32 },
    CreateProgram { program: ProgramId, label: String },
    UseProgram(ProgramId),
    SetUniform { program: ProgramId, name: String, value: UniformValue },
    CreateBuffer { buffer: BufferId, usage: BufferUsage, len: usize },
    WriteBuffer { buffer: BufferId, offset: u64, len: usize },
    BindUniformBlock { slot: u32, buffer: BufferId },
    CreateVertexArray { vertex_array: VertexArrayId, vertex_buffer: BufferId, index_buffer: Option<BufferId> },
    BindVertexArray(Option<VertexArrayId>),
    CreateTexture { texture: TextureId, width: u32, height: u32, mip_level_count: u32 },
    WriteTexture { texture: TextureId, region: TextureRegion },
    SetTextureSampler { texture: TextureId, sampler: SamplerState },
    BindTexture { unit: u32, texture: Option<TextureId> },
    SetBlending(bool),
    SetDepthTest(bool),
    SetPolygonMode(PolygonMode),
    Clear(Color),
    DrawArrays { first: u32, count: u32 },
    DrawElements { count: u32 },
    Present,
    Release(GpuResource),
}

#[derive(Debug, Default)]
struct HeadlessState {
    commands: Vec<GpuCommand>,
    next_id: u32,
    live: HashSet<GpuResource>,
    released: Vec<GpuResource>,
    buffers: HashMap<BufferId, Vec<u8>>,
    uniforms: HashMap<(ProgramId, String), UniformValue>,
    textures: HashMap<TextureId, (u32, u32)>,
}

impl HeadlessState {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug)]
pub struct HeadlessApi {
    state: Rc<RefCell<HeadlessState>>,
    max_texture_units: u32,
}

impl HeadlessApi {
    pub fn new() -> Self {
        Self::with_texture_units(16)
    }

    pub fn with_texture_units(max_texture_units: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState::default())),
            max_texture_units,
        }
    }

    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: self.state.clone(),
        }
    }

    fn record(&self, command: GpuCommand) {
        self.state.borrow_mut().commands.push(command);
    }
}

impl Default for HeadlessApi {
    fn default() -> Self {
        Self::new()
    }
}

fn stage_error(stage: &str, source: &str, entry_point: &str) -> Option<String> {
    if source.trim().is_empty() {
        Some(format!("{stage} stage is empty"))
    } else if !source.contains(entry_point) {
        Some(format!("{stage} stage has no entry point `{entry_point}`"))
    } else {
        None
    }
}

impl GraphicsApi for HeadlessApi {
    fn max_texture_units(&self) -> u32 {
        self.max_texture_units
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.record(GpuCommand::SetViewport { width, height });
    }

    fn create_program(&mut self, source: &ShaderSource) -> Result<ProgramId, String> {
        let diagnostics: Vec<String> = [
            stage_error("vertex", &source.vertex, "vs_main"),
            stage_error("fragment", &source.fragment, "fs_main"),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !diagnostics.is_empty() {
            return Err(diagnostics.join("; "));
        }
        let mut state = self.state.borrow_mut();
        let program = ProgramId(state.next());
        state.live.insert(program.into());
        state.commands.push(GpuCommand::CreateProgram {
            program,
            label: source.label.clone(),
        });
        Ok(program)
    }

    fn use_program(&mut self, program: ProgramId) {
        self.record(GpuCommand::UseProgram(program));
    }

    fn set_uniform(&mut self, program: ProgramId, name: &str, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        state.uniforms.insert((program, name.to_string()), value);
        state.commands.push(GpuCommand::SetUniform {
            program,
            name: name.to_string(),
            value,
        });
    }

    fn create_buffer(&mut self, _label: &str, usage: BufferUsage, contents: &[u8]) -> BufferId {
        let mut state = self.state.borrow_mut();
        let buffer = BufferId(state.next());
        state.live.insert(buffer.into());
        state.buffers.insert(buffer, contents.to_vec());
        state.commands.push(GpuCommand::CreateBuffer {
            buffer,
            usage,
            len: contents.len(),
        });
        buffer
    }

    fn write_buffer(&mut self, buffer: BufferId, offset: u64, contents: &[u8]) {
        let mut state = self.state.borrow_mut();
        if let Some(data) = state.buffers.get_mut(&buffer) {
            let start = offset as usize;
            let end = start + contents.len();
            if data.len() < end {
                data.resize(end, 0);
            }
            data[start..end].copy_from_slice(contents);
        }
        state.commands.push(GpuCommand::WriteBuffer {
            buffer,
            offset,
            len: contents.len(),
        });
    }

    fn bind_uniform_block(&mut self, slot: u32, buffer: BufferId) {
        self.record(GpuCommand::BindUniformBlock { slot, buffer });
    }

    fn create_vertex_array(&mut self, descriptor: &VertexArrayDescriptor<'_>) -> VertexArrayId {
        let mut state = self.state.borrow_mut();
        let vertex_array = VertexArrayId(state.next());
        state.live.insert(vertex_array.into());
        state.commands.push(GpuCommand::CreateVertexArray {
            vertex_array,
            vertex_buffer: descriptor.vertex_buffer,
            index_buffer: descriptor.index_buffer,
        });
        vertex_array
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) {
        self.record(GpuCommand::BindVertexArray(vertex_array));
    }

    fn create_texture(&mut self, descriptor: &TextureDescriptor<'_>) -> TextureId {
        let mut state = self.state.borrow_mut();
        let texture = TextureId(state.next());
        state.live.insert(texture.into());
        state
            .textures
            .insert(texture, (descriptor.width, descriptor.height));
        state.commands.push(GpuCommand::CreateTexture {
            texture,
            width: descriptor.width,
            height: descriptor.height,
            mip_level_count: descriptor.mip_level_count,
        });
        texture
    }

    fn write_texture(&mut self, texture: TextureId, region: TextureRegion, _rgba: &[u8]) {
        self.record(GpuCommand::WriteTexture { texture, region });
    }

    fn set_texture_sampler(&mut self, texture: TextureId, sampler: SamplerState) {
        self.record(GpuCommand::SetTextureSampler { texture, sampler });
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        self.record(GpuCommand::BindTexture { unit, texture });
    }

    fn set_blending(&mut self, enabled: bool) {
        self.record(GpuCommand::SetBlending(enabled));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.record(GpuCommand::SetDepthTest(enabled));
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.record(GpuCommand::SetPolygonMode(mode));
    }

    fn clear(&mut self, color: Color) {
        self.record(GpuCommand::Clear(color));
    }

    fn draw_arrays(&mut self, first: u32, count: u32) {
        self.record(GpuCommand::DrawArrays { first, count });
    }

    fn draw_elements(&mut self, count: u32) {
        self.record(GpuCommand::DrawElements { count });
    }

    fn present(&mut self) -> anyhow::Result<()> {
        self.record(GpuCommand::Present);
        Ok(())
    }

    fn release(&mut self, resource: GpuResource) {
        let mut state = self.state.borrow_mut();
        if !state.live.remove(&resource) {
            log::error!("{resource:?} released but not live");
        }
        if let GpuResource::Buffer(buffer) = resource {
            state.buffers.remove(&buffer);
        }
        state.released.push(resource);
        state.commands.push(GpuCommand::Release(resource));
    }
}

/// Read access to a [`HeadlessApi`]'s recorded state.
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessProbe {
    pub fn commands(&self) -> Vec<GpuCommand> {
        self.state.borrow().commands.clone()
    }

    /// Returns the recorded commands and starts a fresh log.
    pub fn take_commands(&self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.state.borrow_mut().commands)
    }

    pub fn count(&self, predicate: impl Fn(&GpuCommand) -> bool) -> usize {
        self.state.borrow().commands.iter().filter(|c| predicate(c)).count()
    }

    pub fn is_live(&self, resource: impl Into<GpuResource>) -> bool {
        self.state.borrow().live.contains(&resource.into())
    }

    pub fn live_count(&self) -> usize {
        self.state.borrow().live.len()
    }

    /// Every release in call order, duplicates included.
    pub fn released(&self) -> Vec<GpuResource> {
        self.state.borrow().released.clone()
    }

    pub fn buffer(&self, buffer: BufferId) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .uniforms
            .get(&(program, name.to_string()))
            .copied()
    }

    pub fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.state.borrow().textures.get(&texture).copied()
    }
}
