mod common;

use common::test_utils::{
    assert_f32_eq, atlas_entries, atlas_loader, built_atlas, headless_gpu, solid_tile, tile_path,
};
use voxel_ngin::{
    data_structures::texture_atlas::{TextureAtlas, UvRegion},
    errors::RenderError,
    gpu::headless::GpuCommand,
    resources::texture::MemoryImageLoader,
};

const FIVE: [&str; 5] = ["dirt", "grass_side", "grass_top", "sand", "stone"];

#[test]
fn five_textures_pack_into_a_three_by_three_grid() {
    let (mut gpu, probe) = headless_gpu();
    let atlas = built_atlas(&mut gpu, &FIVE, 16);

    assert_eq!(atlas.grid_size(), 3);
    assert_eq!(atlas.atlas_size(), 48);
    assert_eq!(
        probe.count(|c| matches!(
            c,
            GpuCommand::CreateTexture { width: 48, height: 48, mip_level_count: 1, .. }
        )),
        1
    );
    assert_eq!(probe.count(|c| matches!(c, GpuCommand::WriteTexture { .. })), 5);

    for name in FIVE {
        let region = atlas.uv_region(name);
        assert_f32_eq(region.width(), 1.0 / 3.0);
        assert_f32_eq(region.height(), 1.0 / 3.0);
        assert!(region.u_min >= 0.0 && region.u_max <= 1.0);
        assert!(region.v_min >= 0.0 && region.v_max <= 1.0);
    }
}

#[test]
fn cells_fill_row_by_row_in_name_order() {
    let (mut gpu, _probe) = headless_gpu();
    // inserted out of order on purpose
    let names = ["stone", "dirt", "sand", "grass_top", "grass_side"];
    let atlas = built_atlas(&mut gpu, &names, 16);

    let third = 1.0 / 3.0;
    let expect = |name: &str, gx: f32, gy: f32| {
        let region = atlas.uv_region(name);
        assert_f32_eq(region.u_min, gx * third);
        assert_f32_eq(region.v_min, gy * third);
        assert_f32_eq(region.u_max, (gx + 1.0) * third);
        assert_f32_eq(region.v_max, (gy + 1.0) * third);
    };
    expect("dirt", 0.0, 0.0);
    expect("grass_side", 1.0, 0.0);
    expect("grass_top", 2.0, 0.0);
    expect("sand", 0.0, 1.0);
    expect("stone", 1.0, 1.0);
}

#[test]
fn regions_do_not_overlap() {
    let (mut gpu, _probe) = headless_gpu();
    let atlas = built_atlas(&mut gpu, &FIVE, 8);
    let regions: Vec<UvRegion> = FIVE.iter().map(|n| atlas.uv_region(n)).collect();
    for (i, a) in regions.iter().enumerate() {
        for b in &regions[i + 1..] {
            let disjoint = a.u_max <= b.u_min + 1e-6
                || b.u_max <= a.u_min + 1e-6
                || a.v_max <= b.v_min + 1e-6
                || b.v_max <= a.v_min + 1e-6;
            assert!(disjoint, "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn queries_before_build_fail_softly() {
    let atlas = TextureAtlas::new(atlas_entries(&FIVE), 16);
    assert!(!atlas.is_built());
    assert_eq!(atlas.uv_region("dirt"), UvRegion::ZERO);
    assert!(matches!(atlas.try_uv_region("dirt"), Err(RenderError::AtlasNotBuilt)));
    assert!(matches!(atlas.texture(), Err(RenderError::AtlasNotBuilt)));
}

#[test]
fn unknown_texture_yields_the_zero_region() {
    let (mut gpu, _probe) = headless_gpu();
    let atlas = built_atlas(&mut gpu, &FIVE, 16);
    assert_eq!(atlas.uv_region("lava"), UvRegion::ZERO);
    assert!(matches!(
        atlas.try_uv_region("lava"),
        Err(RenderError::AtlasRegionNotFound(name)) if name == "lava"
    ));
}

#[test]
fn building_twice_is_rejected() {
    let (mut gpu, probe) = headless_gpu();
    let mut atlas = built_atlas(&mut gpu, &FIVE, 16);
    let loader = atlas_loader(&FIVE, 16);

    assert!(matches!(atlas.build(&mut gpu, &loader), Err(RenderError::AtlasAlreadyBuilt)));
    assert_eq!(probe.count(|c| matches!(c, GpuCommand::CreateTexture { .. })), 1);
}

#[test]
fn unreadable_and_mis_sized_images_are_skipped() {
    let (mut gpu, probe) = headless_gpu();
    let names = ["a", "b", "c", "d"];
    let loader = MemoryImageLoader::new()
        .with(tile_path("a"), solid_tile(16, [255, 0, 0, 255]))
        // "b" is missing
        .with(tile_path("c"), solid_tile(8, [0, 255, 0, 255]))
        .with(tile_path("d"), solid_tile(16, [0, 0, 255, 255]));
    let mut atlas = TextureAtlas::new(atlas_entries(&names), 16);
    atlas.build(&mut gpu, &loader).expect("build succeeds with skipped entries");

    assert!(atlas.contains("a"));
    assert!(!atlas.contains("b"));
    assert!(!atlas.contains("c"));
    assert!(atlas.contains("d"));
    assert_eq!(probe.count(|c| matches!(c, GpuCommand::WriteTexture { .. })), 2);

    // skipped entries do not take a cell, "d" lands right after "a"
    let d = atlas.uv_region("d");
    assert_f32_eq(d.u_min, 0.5);
    assert_f32_eq(d.v_min, 0.0);
}

#[test]
fn atlas_texture_is_shared_not_copied() {
    let (mut gpu, probe) = headless_gpu();
    let atlas = built_atlas(&mut gpu, &FIVE, 16);

    let first = atlas.texture().expect("built");
    let second = atlas.texture().expect("built");
    assert_eq!(first.id(), second.id());
    assert!(first.is_shared());
    assert_eq!(probe.texture_size(first.id()), Some((48, 48)));

    drop(first);
    drop(second);
    gpu.collect_garbage();
    assert!(probe.released().is_empty());

    let id = atlas.texture().expect("built").id();
    drop(atlas);
    gpu.collect_garbage();
    assert!(!probe.is_live(id));
}
