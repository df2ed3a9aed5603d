//! A floor of textured blocks, a stacked oak log and a lamp circling them
//! with a point light.
//!
//! Textures come from `assets.textures` in the configuration. Files that
//! cannot be read are replaced by flat colored tiles so the demo runs without
//! an asset pack.

use std::path::Path;

use cgmath::Vector3;
use image::{DynamicImage, ImageError, Rgba, RgbaImage};
use instant::Duration;
use voxel_ngin::{
    KeyCode, WindowEvent,
    config::EngineConfig,
    data_structures::{
        block::BlockType,
        block_registry::BlockRegistry,
        color::Color,
        light::{DirectionalLight, PointLight},
        light_manager::LightManager,
        shader::{ShaderProvider, ShaderType},
        texture_atlas::TextureAtlas,
    },
    flow::{self, GraphicsFlow, InputState, Out},
    render::Renderer,
    resources::texture::{FsImageLoader, ImageLoader},
};
use winit::keyboard::PhysicalKey;

const FLOOR_BLOCKS: [&str; 5] = ["dirt", "diamond_ore", "sand", "grass", "stone"];
const LIGHT_ORBIT_RADIUS: f32 = 3.0;
const LIGHT_ORBIT_SPEED: f32 = 0.5;

/// Reads from disk and falls back to a flat tile tinted by the file name.
struct FallbackLoader {
    fs: FsImageLoader,
    tile_size: u32,
}

impl ImageLoader for FallbackLoader {
    fn load_image(&self, path: &Path) -> Result<DynamicImage, ImageError> {
        self.fs.load_image(path).or_else(|e| {
            log::warn!("{}: {e}, using a flat tile", path.display());
            Ok(flat_tile(path, self.tile_size))
        })
    }
}

fn flat_tile(path: &Path, size: u32) -> DynamicImage {
    let seed = path
        .to_string_lossy()
        .bytes()
        .fold(7u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    let [r, g, b, _] = seed.to_le_bytes();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(size, size, Rgba([r, g, b, 255])))
}

fn default_blocks() -> Vec<(&'static str, BlockType)> {
    let lit = |block: BlockType| block.with_shader(ShaderType::LightReceiver);
    vec![
        ("grass", lit(BlockType::top_bottom_side("grass_top", "dirt", "grass_side"))),
        ("oak_log", lit(BlockType::top_bottom_sides("oak_log_top", "oak_log"))),
        ("dirt", lit(BlockType::uniform("dirt"))),
        ("diamond_ore", lit(BlockType::uniform("diamond_ore"))),
        ("sand", lit(BlockType::uniform("sand"))),
        ("stone", lit(BlockType::uniform("stone"))),
        (
            "lamp",
            BlockType::uniform("lamp")
                .with_shader(ShaderType::LightBlock)
                .with_emissive(true),
        ),
    ]
}

struct VoxelDemo {
    shaders: ShaderProvider,
    blocks: Option<BlockRegistry>,
    lights: LightManager,
    light_position: Vector3<f32>,
    moving_light: bool,
    time: f32,
}

impl Default for VoxelDemo {
    fn default() -> Self {
        Self {
            shaders: ShaderProvider::default(),
            blocks: None,
            lights: LightManager::default(),
            light_position: Vector3::new(0.0, 0.0, 0.0),
            moving_light: false,
            time: 0.0,
        }
    }
}

impl VoxelDemo {
    fn floor_positions() -> impl Iterator<Item = Vector3<f32>> {
        (-1..=2).flat_map(|z| (-1..=2).map(move |x| Vector3::new(x as f32, -5.0, z as f32)))
    }
}

impl GraphicsFlow for VoxelDemo {
    fn on_init(&mut self, renderer: &mut Renderer, config: &EngineConfig) -> anyhow::Result<()> {
        let gpu = renderer.gpu_mut();
        self.shaders = ShaderProvider::with_builtin_shaders(gpu)?;

        let assets = &config.assets;
        let loader = FallbackLoader {
            fs: FsImageLoader::new(&assets.root),
            tile_size: assets.tile_size,
        };
        let mut atlas = TextureAtlas::new(assets.textures.clone(), assets.tile_size);
        atlas.build(gpu, &loader)?;

        let mut blocks = BlockRegistry::new(atlas)?;
        for (id, block_type) in default_blocks() {
            blocks.register_block(gpu, &self.shaders, id, &block_type)?;
        }
        log::info!("Registered blocks: {:?}", blocks.block_ids());
        self.blocks = Some(blocks);

        self.lights.set_influence_threshold(config.rendering.light_influence_threshold);
        self.lights.add_directional_light(
            DirectionalLight::new(Vector3::new(-0.2, -1.0, -0.3), Color::grey(0.4), Color::grey(0.5))
                .with_ambient(Color::grey(0.15)),
        )?;
        self.light_position = Vector3::new(-3.0, -2.0, 1.0);
        self.lights.add_point_light(PointLight::at(self.light_position).with_color(Color::WHITE))?;
        self.moving_light = true;

        if let Some(camera) = renderer.active_camera_mut() {
            camera.position = Vector3::new(0.0, 0.0, 8.0);
        }
        Ok(())
    }

    fn on_window_events(&mut self, _renderer: &mut Renderer, event: &WindowEvent) -> Out {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return Out::Empty;
        };
        if !event.state.is_pressed() || event.repeat {
            return Out::Empty;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => Out::Exit,
            PhysicalKey::Code(KeyCode::KeyL) => {
                self.moving_light = !self.moving_light;
                Out::Empty
            }
            PhysicalKey::Code(KeyCode::KeyF) => Out::Configure(Box::new(|renderer| {
                let wireframe = !renderer.is_wireframe();
                renderer.set_wireframe_rendering(wireframe);
            })),
            PhysicalKey::Code(KeyCode::KeyG) => Out::Configure(Box::new(|renderer| {
                if let Some(camera) = renderer.active_camera_mut() {
                    let fly = !camera.is_flying();
                    camera.set_fly(fly);
                }
            })),
            _ => Out::Empty,
        }
    }

    fn on_update(&mut self, renderer: &mut Renderer, _input: &InputState, dt: Duration) -> Out {
        if self.moving_light {
            self.time += dt.as_secs_f32();
            let angle = self.time * LIGHT_ORBIT_SPEED;
            self.light_position.x = angle.sin() * LIGHT_ORBIT_RADIUS;
            self.light_position.z = angle.cos() * LIGHT_ORBIT_RADIUS;
            let light = PointLight::at(self.light_position).with_color(Color::WHITE);
            if let Err(e) = self.lights.update_point_light(0, light) {
                log::error!("Moving the lamp light failed: {e}");
            }
        }

        if let Some(camera) = renderer.active_camera().cloned() {
            self.lights.update_ubo(renderer.gpu_mut(), &camera);
        }
        Out::Empty
    }

    fn on_render(&mut self, renderer: &mut Renderer) {
        let Some(blocks) = self.blocks.as_mut() else {
            return;
        };

        for (i, position) in Self::floor_positions().enumerate() {
            let id = FLOOR_BLOCKS[i % FLOOR_BLOCKS.len()];
            if let Ok(entity) = blocks.get_block_render_entity_mut(id) {
                entity.transform_mut().set_position(position);
                renderer.render_entity(entity);
            }
        }

        if let Ok(oak_log) = blocks.get_block_render_entity_mut("oak_log") {
            for y in [-4.0, -3.0] {
                oak_log.transform_mut().set_position((0.0, y, 0.0));
                renderer.render_entity(oak_log);
            }
        }

        if let Ok(lamp) = blocks.get_block_render_entity_mut("lamp") {
            lamp.transform_mut().set_position(self.light_position);
            lamp.transform_mut().set_scale((0.4, 0.4, 0.4));
            lamp.material()
                .shader()
                .set_vec3(renderer.gpu_mut(), "lightColor", Color::WHITE.to_vec3());
            renderer.render_entity(lamp);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = EngineConfig::load()?;
    flow::run(config, VoxelDemo::default())
}
