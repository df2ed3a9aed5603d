use crate::gpu::{AttributeKind, PolygonMode, VertexAttribute};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Vertex buffer layout of one vertex array, hashable so pipelines can be
/// cached per layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayoutKey {
    pub stride: u64,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexLayoutKey {
    /// All attributes must come from one interleaved buffer, so the stride of
    /// the first attribute wins.
    pub fn from_attributes(attributes: &[VertexAttribute]) -> Self {
        let stride = attributes.first().map_or(0, |a| u64::from(a.stride));
        if attributes.iter().any(|a| u64::from(a.stride) != stride) {
            log::warn!("Vertex attributes with mixed strides, using {stride}");
        }
        Self {
            stride,
            attributes: attributes
                .iter()
                .map(|a| wgpu::VertexAttribute {
                    format: vertex_format(a),
                    offset: a.offset,
                    shader_location: a.location,
                })
                .collect(),
        }
    }

    pub fn desc(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

fn vertex_format(attribute: &VertexAttribute) -> wgpu::VertexFormat {
    use wgpu::VertexFormat as F;
    match (attribute.kind, attribute.components, attribute.normalized) {
        (AttributeKind::Float, 1, _) => F::Float32,
        (AttributeKind::Float, 2, _) => F::Float32x2,
        (AttributeKind::Float, 3, _) => F::Float32x3,
        (AttributeKind::Float, 4, _) => F::Float32x4,
        (AttributeKind::Int, 1, _) => F::Sint32,
        (AttributeKind::Int, 2, _) => F::Sint32x2,
        (AttributeKind::Int, 3, _) => F::Sint32x3,
        (AttributeKind::Int, 4, _) => F::Sint32x4,
        (AttributeKind::UnsignedInt, 1, _) => F::Uint32,
        (AttributeKind::UnsignedInt, 2, _) => F::Uint32x2,
        (AttributeKind::UnsignedInt, 3, _) => F::Uint32x3,
        (AttributeKind::UnsignedInt, 4, _) => F::Uint32x4,
        (AttributeKind::UnsignedByte, 2, true) => F::Unorm8x2,
        (AttributeKind::UnsignedByte, 2, false) => F::Uint8x2,
        (AttributeKind::UnsignedByte, 4, true) => F::Unorm8x4,
        (AttributeKind::UnsignedByte, 4, false) => F::Uint8x4,
        (kind, components, _) => {
            // meshes reject these before upload
            log::warn!("No vertex format for {components} x {kind:?}, reading Float32x4");
            F::Float32x4
        }
    }
}

/// Fixed function state a draw call selects its pipeline with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PipelineState {
    pub polygon_mode: PolygonMode,
    pub blending: bool,
    pub depth_test: bool,
}

pub fn mk_pipeline_layout(
    device: &wgpu::Device,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Block Pipeline Layout"),
        bind_group_layouts: &bind_group_layouts
            .iter()
            .copied()
            .map(Some)
            .collect::<Vec<_>>(),
        immediate_size: 0,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    vertex_layout: &VertexLayoutKey,
    vertex_module: &wgpu::ShaderModule,
    fragment_module: &wgpu::ShaderModule,
    state: PipelineState,
    line_mode_supported: bool,
) -> wgpu::RenderPipeline {
    let polygon_mode = match state.polygon_mode {
        PolygonMode::Line if line_mode_supported => wgpu::PolygonMode::Line,
        PolygonMode::Line => {
            log::warn!("Adapter lacks POLYGON_MODE_LINE, drawing filled");
            wgpu::PolygonMode::Fill
        }
        PolygonMode::Fill => wgpu::PolygonMode::Fill,
    };
    let blend = state.blending.then_some(wgpu::BlendState::ALPHA_BLENDING);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex_module,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout.desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment_module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },
        // The pass always carries a depth attachment, so a disabled depth
        // test still needs a matching depth state.
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: Some(state.depth_test),
            depth_compare: Some(if state.depth_test {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            }),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
