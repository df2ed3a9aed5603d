mod common;

use std::rc::Rc;

use common::test_utils::{assert_f32_eq, atlas_entries, built_atlas, builtin_shaders, headless_gpu};
use voxel_ngin::{
    data_structures::{
        block::{BlockType, BLOCK_VERTEX_COUNT},
        block_registry::BlockRegistry,
        shader::{ShaderProvider, ShaderType},
        texture_atlas::TextureAtlas,
    },
    errors::RenderError,
};

const NAMES: [&str; 5] = ["diamond_ore", "dirt", "grass_side", "grass_top", "lamp"];

#[test]
fn registry_needs_a_built_atlas() {
    let atlas = TextureAtlas::new(atlas_entries(&NAMES), 16);
    assert!(matches!(BlockRegistry::new(atlas), Err(RenderError::AtlasNotBuilt)));
}

#[test]
fn unknown_block_is_not_found() {
    let (mut gpu, _probe) = headless_gpu();
    let registry = BlockRegistry::new(built_atlas(&mut gpu, &NAMES, 16)).expect("atlas built");
    assert!(matches!(
        registry.get_block_render_entity("bedrock"),
        Err(RenderError::BlockNotFound(id)) if id == "bedrock"
    ));
}

#[test]
fn registered_block_uses_the_requested_shader_and_the_atlas() {
    let (mut gpu, _probe) = headless_gpu();
    let shaders = builtin_shaders(&mut gpu);
    let mut registry = BlockRegistry::new(built_atlas(&mut gpu, &NAMES, 16)).expect("atlas built");
    let grass = BlockType::top_bottom_side("grass_top", "dirt", "grass_side")
        .with_shader(ShaderType::LightReceiver);

    registry
        .register_block(&mut gpu, &shaders, "grass", &grass)
        .expect("grass registers");

    let entity = registry.get_block_render_entity("grass").expect("registered");
    assert_eq!(entity.mesh().vertex_count() as usize, BLOCK_VERTEX_COUNT);

    let material = entity.material();
    let expected = shaders.get_shader(ShaderType::LightReceiver).expect("builtin");
    assert!(Rc::ptr_eq(material.shader(), &expected));

    let atlas_texture = registry.atlas().texture().expect("built");
    assert_eq!(material.diffuse_texture().id(), atlas_texture.id());
    assert!(material.emissive_texture().is_none());
}

#[test]
fn emissive_block_glows_with_the_atlas() {
    let (mut gpu, _probe) = headless_gpu();
    let shaders = builtin_shaders(&mut gpu);
    let mut registry = BlockRegistry::new(built_atlas(&mut gpu, &NAMES, 16)).expect("atlas built");
    let lamp = BlockType::uniform("lamp")
        .with_shader(ShaderType::LightBlock)
        .with_emissive(true);

    registry
        .register_block(&mut gpu, &shaders, "lamp", &lamp)
        .expect("lamp registers");

    let material = registry.get_block_render_entity("lamp").expect("registered").material();
    let emissive = material.emissive_texture().expect("emissive map");
    assert_eq!(emissive.id(), material.diffuse_texture().id());
}

#[test]
fn missing_shader_variant_fails_registration() {
    let (mut gpu, _probe) = headless_gpu();
    let shaders = ShaderProvider::new();
    let mut registry = BlockRegistry::new(built_atlas(&mut gpu, &NAMES, 16)).expect("atlas built");

    let result = registry.register_block(&mut gpu, &shaders, "dirt", &BlockType::uniform("dirt"));
    assert!(matches!(result, Err(RenderError::ShaderNotFound(ShaderType::Block))));
    assert!(!registry.has_block("dirt"));
}

#[test]
fn block_faces_cover_a_third_of_the_atlas() {
    let (mut gpu, _probe) = headless_gpu();
    let shaders = builtin_shaders(&mut gpu);
    let mut registry = BlockRegistry::new(built_atlas(&mut gpu, &NAMES, 16)).expect("atlas built");
    registry
        .register_block(&mut gpu, &shaders, "diamond_ore", &BlockType::uniform("diamond_ore"))
        .expect("registers");

    let data = registry
        .get_block_render_entity("diamond_ore")
        .expect("registered")
        .mesh()
        .data();
    for face in 0..6 {
        let us: Vec<f32> = (face * 6..face * 6 + 6).map(|i| data.vertex(i).expect("vertex in range")[3]).collect();
        let min = us.iter().copied().fold(f32::MAX, f32::min);
        let max = us.iter().copied().fold(f32::MIN, f32::max);
        assert_f32_eq(max - min, 1.0 / 3.0);
    }
}

#[test]
fn re_registering_replaces_the_block() {
    let (mut gpu, probe) = headless_gpu();
    let shaders = builtin_shaders(&mut gpu);
    let mut registry = BlockRegistry::new(built_atlas(&mut gpu, &NAMES, 16)).expect("atlas built");
    registry
        .register_block(&mut gpu, &shaders, "dirt", &BlockType::uniform("dirt"))
        .expect("registers");
    let first = registry
        .get_block_render_entity("dirt")
        .expect("registered")
        .mesh()
        .vertex_array()
        .expect("uploaded");

    registry
        .register_block(&mut gpu, &shaders, "dirt", &BlockType::uniform("grass_top"))
        .expect("registers again");
    gpu.collect_garbage();

    assert_eq!(registry.len(), 1);
    assert!(!probe.is_live(first));
}

#[test]
fn block_ids_are_sorted() {
    let (mut gpu, _probe) = headless_gpu();
    let shaders = builtin_shaders(&mut gpu);
    let mut registry = BlockRegistry::new(built_atlas(&mut gpu, &NAMES, 16)).expect("atlas built");
    for id in ["lamp", "dirt", "grass"] {
        registry
            .register_block(&mut gpu, &shaders, id, &BlockType::uniform("dirt"))
            .expect("registers");
    }
    assert_eq!(registry.block_ids(), vec!["dirt", "grass", "lamp"]);
}
