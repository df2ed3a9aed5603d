#![allow(dead_code)]

use std::rc::Rc;

use cgmath::{InnerSpace, Vector3};
use image::{DynamicImage, Rgba, RgbaImage};
use voxel_ngin::{
    camera::Camera,
    data_structures::{
        material::Material,
        mesh::Mesh,
        render_entity::RenderEntity,
        shader::{Shader, ShaderProvider, ShaderType},
        texture::Texture,
        texture_atlas::TextureAtlas,
    },
    gpu::{
        Gpu,
        headless::{GpuCommand, HeadlessApi, HeadlessProbe},
        VertexAttribute,
    },
    resources::texture::MemoryImageLoader,
};

pub const EPSILON: f32 = 1e-4;

/// A [`Gpu`] over a fresh [`HeadlessApi`] plus a probe into its state.
pub fn headless_gpu() -> (Gpu, HeadlessProbe) {
    let api = HeadlessApi::new();
    let probe = api.probe();
    (Gpu::new(api), probe)
}

pub fn solid_tile(size: u32, rgba: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(size, size, Rgba(rgba)))
}

pub fn tile_path(name: &str) -> String {
    format!("{name}.png")
}

/// Loader serving one solid `tile` x `tile` image per name at `<name>.png`.
pub fn atlas_loader(names: &[&str], tile: u32) -> MemoryImageLoader {
    let mut loader = MemoryImageLoader::new();
    for (i, name) in names.iter().enumerate() {
        let shade = (i as u8).wrapping_mul(40);
        loader.insert(tile_path(name), solid_tile(tile, [shade, 255 - shade, 128, 255]));
    }
    loader
}

pub fn atlas_entries(names: &[&str]) -> Vec<(String, String)> {
    names
        .iter()
        .map(|name| (name.to_string(), tile_path(name)))
        .collect()
}

pub fn built_atlas(gpu: &mut Gpu, names: &[&str], tile: u32) -> TextureAtlas {
    let mut atlas = TextureAtlas::new(atlas_entries(names), tile);
    atlas
        .build(gpu, &atlas_loader(names, tile))
        .expect("atlas builds");
    atlas
}

pub fn builtin_shaders(gpu: &mut Gpu) -> ShaderProvider {
    ShaderProvider::with_builtin_shaders(gpu).expect("bundled shaders compile")
}

pub fn block_shader(gpu: &mut Gpu) -> Rc<Shader> {
    builtin_shaders(gpu)
        .get_shader(ShaderType::Block)
        .expect("block shader registered")
}

pub fn white_texture(gpu: &mut Gpu) -> Texture {
    Texture::from_image(gpu, &solid_tile(4, [255, 255, 255, 255]), "white")
}

/// One triangle with position and uv attributes.
pub fn triangle_mesh(gpu: &mut Gpu) -> Mesh {
    let stride = 5 * 4;
    let attributes = [
        VertexAttribute::float(0, 3, stride, 0),
        VertexAttribute::float(1, 2, stride, 12),
    ];
    #[rustfmt::skip]
    let vertices = [
        0.0, 0.0, 0.0, 0.0, 1.0,
        1.0, 0.0, 0.0, 1.0, 1.0,
        0.0, 1.0, 0.0, 0.0, 0.0,
    ];
    Mesh::from_slice(gpu, &vertices, &attributes, None)
}

pub fn test_entity(gpu: &mut Gpu) -> RenderEntity {
    let shader = block_shader(gpu);
    let texture = white_texture(gpu);
    let mesh = triangle_mesh(gpu);
    RenderEntity::new(mesh, Material::new(shader, texture))
}

/// Camera at `position` looking down -z with a 16:9 projection.
pub fn test_camera(position: Vector3<f32>) -> Camera {
    let mut camera = Camera::new(position, Vector3::unit_y(), -90.0, 0.0);
    camera.set_projection_matrix(45.0, 16.0 / 9.0, 0.1, 100.0);
    camera
}

pub fn assert_vec3_eq(actual: Vector3<f32>, expected: Vector3<f32>) {
    assert!(
        (actual - expected).magnitude() < EPSILON,
        "expected {expected:?}, got {actual:?}"
    );
}

pub fn assert_f32_eq(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

/// Index of the first command matching `predicate`.
pub fn position_of(commands: &[GpuCommand], predicate: impl Fn(&GpuCommand) -> bool) -> usize {
    commands
        .iter()
        .position(predicate)
        .unwrap_or_else(|| panic!("no matching command in {commands:#?}"))
}

pub fn uniform_position(commands: &[GpuCommand], uniform: &str) -> usize {
    position_of(commands, |c| {
        matches!(c, GpuCommand::SetUniform { name, .. } if name == uniform)
    })
}
