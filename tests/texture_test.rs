mod common;

use std::path::Path;

use common::test_utils::{headless_gpu, solid_tile};
use image::{DynamicImage, Rgba, RgbaImage};
use voxel_ngin::{
    data_structures::texture::{Texture, mip_level_count},
    errors::RenderError,
    gpu::{FilterMode, SamplerState, TextureRegion, WrapMode, headless::GpuCommand},
    resources::texture::{FsImageLoader, MemoryImageLoader},
};

fn mip_writes(commands: &[GpuCommand]) -> Vec<TextureRegion> {
    commands
        .iter()
        .filter_map(|c| match c {
            GpuCommand::WriteTexture { region, .. } => Some(*region),
            _ => None,
        })
        .collect()
}

#[test]
fn mip_chain_reaches_one_texel() {
    assert_eq!(mip_level_count(1, 1), 1);
    assert_eq!(mip_level_count(16, 16), 5);
    assert_eq!(mip_level_count(16, 8), 5);
    assert_eq!(mip_level_count(3, 17), 5);
    assert_eq!(mip_level_count(0, 0), 1);
}

#[test]
fn every_mip_level_is_uploaded_at_half_size() {
    let (mut gpu, probe) = headless_gpu();
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 8, Rgba([10, 20, 30, 255])));

    let texture = Texture::from_image(&mut gpu, &img, "wide");
    let commands = probe.take_commands();

    assert!(commands.contains(&GpuCommand::CreateTexture {
        texture: texture.id(),
        width: 16,
        height: 8,
        mip_level_count: 5,
    }));
    let sizes: Vec<(u32, u32, u32)> = mip_writes(&commands)
        .iter()
        .map(|r| (r.mip_level, r.width, r.height))
        .collect();
    assert_eq!(sizes, vec![(0, 16, 8), (1, 8, 4), (2, 4, 2), (3, 2, 1), (4, 1, 1)]);
    assert_eq!((texture.width(), texture.height()), (16, 8));
}

#[test]
fn loaded_textures_repeat_with_nearest_filtering() {
    let (mut gpu, probe) = headless_gpu();
    let loader = MemoryImageLoader::new().with("stone.png", solid_tile(8, [90, 90, 90, 255]));

    let texture = Texture::from_path(&mut gpu, &loader, Path::new("stone.png")).expect("registered image");
    assert_eq!(texture.sampler(), SamplerState::PIXELATED);
    assert_eq!(texture.sampler().wrap, WrapMode::Repeat);
    assert_eq!(texture.sampler().min_filter, FilterMode::Nearest);
    assert_eq!(probe.texture_size(texture.id()), Some((8, 8)));
}

#[test]
fn unknown_path_reports_image_load() {
    let (mut gpu, probe) = headless_gpu();
    let loader = FsImageLoader::new("no/such/root");

    let result = Texture::from_path(&mut gpu, &loader, Path::new("missing.png"));
    match result {
        Err(RenderError::ImageLoad { path, .. }) => assert_eq!(path, Path::new("missing.png")),
        other => panic!("expected ImageLoad, got {other:?}"),
    }
    assert_eq!(probe.live_count(), 0);
}

#[test]
fn wrapping_and_filter_changes_reach_the_sampler() {
    let (mut gpu, probe) = headless_gpu();
    let mut texture = Texture::from_image(&mut gpu, &solid_tile(4, [255; 4]), "tile");
    probe.take_commands();

    texture.set_wrapping_mode(&mut gpu, WrapMode::ClampToEdge);
    let clamped = SamplerState {
        wrap: WrapMode::ClampToEdge,
        ..SamplerState::PIXELATED
    };
    assert_eq!(
        probe.take_commands(),
        vec![GpuCommand::SetTextureSampler {
            texture: texture.id(),
            sampler: clamped,
        }]
    );

    texture.set_scaling_filter(&mut gpu, FilterMode::Linear, FilterMode::Nearest);
    assert_eq!(texture.sampler().min_filter, FilterMode::Linear);
    assert_eq!(texture.sampler().wrap, WrapMode::ClampToEdge);
    assert_eq!(probe.count(|c| matches!(c, GpuCommand::SetTextureSampler { .. })), 1);
}
