mod common;

use std::collections::HashSet;

use common::test_utils::{headless_gpu, triangle_mesh};
use voxel_ngin::{
    data_structures::mesh::{Mesh, MeshData},
    gpu::{headless::GpuCommand, AttributeKind, BufferUsage, PolygonMode, VertexAttribute},
    render::Renderer,
};

fn quad_data() -> MeshData {
    let attributes = vec![VertexAttribute::float(0, 3, 12, 0)];
    #[rustfmt::skip]
    let vertices = vec![
        0.0, 0.0, 0.0,
        1.0, 0.0, 0.0,
        1.0, 1.0, 0.0,
        0.0, 1.0, 0.0,
    ];
    MeshData::new(vertices, attributes, Some(vec![0, 1, 2, 2, 3, 0]))
}

#[test]
fn vertex_count_follows_indices_when_present() {
    let data = quad_data();
    assert_eq!(data.floats_per_vertex(), 3);
    assert_eq!(data.vertex_count(), 6);
    assert_eq!(data.vertex(2), Some(&[1.0, 1.0, 0.0][..]));
    assert_eq!(data.vertex(4), None);

    let plain = MeshData::new(data.vertices.clone(), data.attributes.clone(), None);
    assert_eq!(plain.vertex_count(), 4);
}

#[test]
fn indexed_mesh_uploads_both_buffers() {
    let (mut gpu, probe) = headless_gpu();
    let mesh = Mesh::new(&mut gpu, quad_data());

    assert!(mesh.is_uploaded());
    assert!(mesh.is_indexed());
    assert_eq!(probe.count(|c| matches!(c, GpuCommand::CreateBuffer { usage: BufferUsage::Vertex, len: 48, .. })), 1);
    assert_eq!(probe.count(|c| matches!(c, GpuCommand::CreateBuffer { usage: BufferUsage::Index, len: 24, .. })), 1);
    assert_eq!(
        probe.count(|c| matches!(c, GpuCommand::CreateVertexArray { index_buffer: Some(_), .. })),
        1
    );
}

#[test]
fn draw_uses_elements_or_arrays() {
    let (mut gpu, probe) = headless_gpu();
    let indexed = Mesh::new(&mut gpu, quad_data());
    let plain = triangle_mesh(&mut gpu);
    probe.take_commands();

    indexed.bind(&mut gpu);
    indexed.draw(&mut gpu);
    indexed.unbind(&mut gpu);
    plain.bind(&mut gpu);
    plain.draw(&mut gpu);
    plain.unbind(&mut gpu);

    assert_eq!(
        probe.take_commands(),
        vec![
            GpuCommand::BindVertexArray(indexed.vertex_array()),
            GpuCommand::DrawElements { count: 6 },
            GpuCommand::BindVertexArray(None),
            GpuCommand::BindVertexArray(plain.vertex_array()),
            GpuCommand::DrawArrays { first: 0, count: 3 },
            GpuCommand::BindVertexArray(None),
        ]
    );
}

#[test]
fn wireframe_draw_restores_fill_mode() {
    let (mut gpu, probe) = headless_gpu();
    let mesh = triangle_mesh(&mut gpu);
    probe.take_commands();

    mesh.draw_wireframe(&mut gpu);
    assert_eq!(
        probe.take_commands(),
        vec![
            GpuCommand::SetPolygonMode(PolygonMode::Line),
            GpuCommand::DrawArrays { first: 0, count: 3 },
            GpuCommand::SetPolygonMode(PolygonMode::Fill),
        ]
    );
}

#[test]
fn wireframe_draw_keeps_global_line_mode() {
    let (gpu, probe) = headless_gpu();
    let mut renderer = Renderer::new(gpu);
    let mesh = triangle_mesh(renderer.gpu_mut());
    renderer.set_wireframe_rendering(true);
    probe.take_commands();

    mesh.draw_wireframe(renderer.gpu_mut());
    assert_eq!(
        probe.take_commands().last(),
        Some(&GpuCommand::SetPolygonMode(PolygonMode::Line))
    );
    assert_eq!(renderer.gpu().polygon_mode(), PolygonMode::Line);
    assert!(renderer.is_wireframe());
}

#[test]
fn mesh_without_attributes_is_never_uploaded() {
    let (mut gpu, probe) = headless_gpu();
    let mesh = Mesh::new(&mut gpu, MeshData::new(vec![0.0; 9], Vec::new(), None));

    assert!(!mesh.is_uploaded());
    mesh.bind(&mut gpu);
    mesh.draw(&mut gpu);
    mesh.unbind(&mut gpu);
    assert!(probe.commands().is_empty());
}

#[test]
fn attributes_without_a_vertex_format_are_rejected() {
    let (mut gpu, probe) = headless_gpu();
    let five_floats = VertexAttribute::float(0, 5, 20, 0);
    let three_bytes = VertexAttribute {
        kind: AttributeKind::UnsignedByte,
        ..VertexAttribute::float(1, 3, 20, 0)
    };
    assert!(!five_floats.is_supported());
    assert!(!three_bytes.is_supported());
    assert!(VertexAttribute { components: 4, ..three_bytes }.is_supported());

    for attribute in [five_floats, three_bytes] {
        let mesh = Mesh::new(&mut gpu, MeshData::new(vec![0.0; 10], vec![attribute], None));
        assert!(!mesh.is_uploaded());
    }
    assert!(probe.commands().is_empty());
}

#[test]
fn dropped_mesh_releases_each_object_once() {
    let (mut gpu, probe) = headless_gpu();
    let mesh = Mesh::new(&mut gpu, quad_data());
    assert_eq!(probe.live_count(), 3);

    drop(mesh);
    assert_eq!(gpu.pending_releases(), 3);
    gpu.collect_garbage();
    gpu.collect_garbage();

    let released = probe.released();
    assert_eq!(released.len(), 3);
    assert_eq!(released.iter().collect::<HashSet<_>>().len(), 3);
    assert_eq!(probe.live_count(), 0);
}
