//! Vertex data and its GPU upload.
//!
//! [`MeshData`] is plain CPU data and can be built and inspected without a
//! GPU. [`Mesh`] uploads it once and owns the resulting buffers and vertex
//! array.

use crate::gpu::{
    BufferId, BufferUsage, Gpu, GpuHandle, PolygonMode, VertexArrayDescriptor, VertexArrayId,
    VertexAttribute,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Option<Vec<u32>>,
    pub attributes: Vec<VertexAttribute>,
}

impl MeshData {
    pub fn new(vertices: Vec<f32>, attributes: Vec<VertexAttribute>, indices: Option<Vec<u32>>) -> Self {
        Self {
            vertices,
            indices,
            attributes,
        }
    }

    /// Floats per vertex, from the first attribute's stride.
    pub fn floats_per_vertex(&self) -> usize {
        self.attributes
            .first()
            .map(|a| a.stride as usize / std::mem::size_of::<f32>())
            .unwrap_or(0)
    }

    /// Number of elements a draw call covers: the index count if indexed,
    /// otherwise the vertex count.
    pub fn vertex_count(&self) -> u32 {
        if let Some(indices) = &self.indices {
            return indices.len() as u32;
        }
        match self.floats_per_vertex() {
            0 => 0,
            floats => (self.vertices.len() / floats) as u32,
        }
    }

    /// The floats of vertex `index`, if the mesh has that many vertices.
    pub fn vertex(&self, index: usize) -> Option<&[f32]> {
        let floats = self.floats_per_vertex();
        if floats == 0 {
            return None;
        }
        self.vertices.get(index * floats..(index + 1) * floats)
    }
}

struct MeshBuffers {
    vertex_array: GpuHandle<VertexArrayId>,
    // kept alive for the vertex array
    _vertex_buffer: GpuHandle<BufferId>,
    _index_buffer: Option<GpuHandle<BufferId>>,
}

pub struct Mesh {
    data: MeshData,
    buffers: Option<MeshBuffers>,
}

impl Mesh {
    pub fn new(gpu: &mut Gpu, data: MeshData) -> Self {
        let buffers = Self::setup_mesh(gpu, &data);
        Self { data, buffers }
    }

    pub fn from_slice(
        gpu: &mut Gpu,
        vertices: &[f32],
        attributes: &[VertexAttribute],
        indices: Option<&[u32]>,
    ) -> Self {
        Self::new(
            gpu,
            MeshData::new(vertices.to_vec(), attributes.to_vec(), indices.map(<[u32]>::to_vec)),
        )
    }

    fn setup_mesh(gpu: &mut Gpu, data: &MeshData) -> Option<MeshBuffers> {
        if data.attributes.is_empty() {
            log::error!("Mesh has no vertex attributes, skipping upload");
            return None;
        }
        if let Some(attribute) = data.attributes.iter().find(|a| !a.is_supported()) {
            log::error!(
                "Vertex attribute at location {} has an unsupported layout ({} x {:?}), skipping upload",
                attribute.location,
                attribute.components,
                attribute.kind
            );
            return None;
        }
        let vertex_buffer = gpu.api_mut().create_buffer(
            "Mesh Vertex Buffer",
            BufferUsage::Vertex,
            bytemuck::cast_slice(&data.vertices),
        );
        let vertex_buffer = gpu.track(vertex_buffer);
        let index_buffer = data.indices.as_ref().map(|indices| {
            let id = gpu.api_mut().create_buffer(
                "Mesh Index Buffer",
                BufferUsage::Index,
                bytemuck::cast_slice(indices),
            );
            gpu.track(id)
        });
        let vertex_array = gpu.api_mut().create_vertex_array(&VertexArrayDescriptor {
            vertex_buffer: vertex_buffer.id(),
            index_buffer: index_buffer.as_ref().map(GpuHandle::id),
            attributes: &data.attributes,
        });
        Some(MeshBuffers {
            vertex_array: gpu.track(vertex_array),
            _vertex_buffer: vertex_buffer,
            _index_buffer: index_buffer,
        })
    }

    pub fn data(&self) -> &MeshData {
        &self.data
    }

    pub fn vertex_count(&self) -> u32 {
        self.data.vertex_count()
    }

    pub fn is_indexed(&self) -> bool {
        self.data.indices.is_some()
    }

    pub fn is_uploaded(&self) -> bool {
        self.buffers.is_some()
    }

    pub fn vertex_array(&self) -> Option<VertexArrayId> {
        self.buffers.as_ref().map(|b| b.vertex_array.id())
    }

    pub fn bind(&self, gpu: &mut Gpu) {
        if let Some(vertex_array) = self.vertex_array() {
            gpu.api_mut().bind_vertex_array(Some(vertex_array));
        }
    }

    pub fn unbind(&self, gpu: &mut Gpu) {
        if self.is_uploaded() {
            gpu.api_mut().bind_vertex_array(None);
        }
    }

    /// Issues the draw call. The mesh must be bound.
    pub fn draw(&self, gpu: &mut Gpu) {
        if !self.is_uploaded() {
            return;
        }
        let count = self.vertex_count();
        if self.is_indexed() {
            gpu.api_mut().draw_elements(count);
        } else {
            gpu.api_mut().draw_arrays(0, count);
        }
    }

    /// Draws in line mode, then restores the mode that was set before.
    pub fn draw_wireframe(&self, gpu: &mut Gpu) {
        let previous = gpu.polygon_mode();
        gpu.set_polygon_mode(PolygonMode::Line);
        self.draw(gpu);
        gpu.set_polygon_mode(previous);
    }
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("vertex_count", &self.vertex_count())
            .field("indexed", &self.is_indexed())
            .field("vertex_array", &self.vertex_array())
            .finish()
    }
}
