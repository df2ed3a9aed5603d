//! Frame orchestration.
//!
//! The [`Renderer`] owns the [`Gpu`] state and the cameras, and turns
//! render entities into draw calls with a fixed protocol:
//!
//! 1. bind the material (activates its shader, binds texture units)
//! 2. bind the mesh
//! 3. set `view`, `projection` and `viewPos` from the camera
//! 4. set `model` from the entity's transform
//! 5. draw
//! 6. unbind the mesh, then the material
//!

use crate::{
    camera::Camera,
    data_structures::{color::Color, render_entity::RenderEntity, scene::Scene},
    gpu::{Gpu, PolygonMode},
};

pub struct Renderer {
    gpu: Gpu,
    cameras: Vec<Camera>,
    active_camera: Option<usize>,
    wireframe: bool,
}

impl Renderer {
    pub fn new(gpu: Gpu) -> Self {
        Self {
            gpu,
            cameras: Vec::new(),
            active_camera: None,
            wireframe: false,
        }
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut Gpu {
        &mut self.gpu
    }

    /// Adds a camera and returns its index. The first camera becomes active.
    pub fn add_camera(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        let index = self.cameras.len() - 1;
        if self.active_camera.is_none() {
            self.active_camera = Some(index);
        }
        index
    }

    /// Removes the camera at `index`. Removing the active camera leaves no
    /// camera active.
    pub fn remove_camera(&mut self, index: usize) -> Option<Camera> {
        if index >= self.cameras.len() {
            log::error!("Cannot remove camera {index}, only {} registered", self.cameras.len());
            return None;
        }
        let camera = self.cameras.remove(index);
        self.active_camera = match self.active_camera {
            Some(active) if active == index => {
                log::warn!("Removed the active camera, no camera is active now");
                None
            }
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        Some(camera)
    }

    pub fn set_active_camera(&mut self, index: usize) {
        if index >= self.cameras.len() {
            log::error!("Camera index {index} out of range, {} registered", self.cameras.len());
            return;
        }
        self.active_camera = Some(index);
    }

    pub fn active_camera_index(&self) -> Option<usize> {
        self.active_camera
    }

    pub fn active_camera(&self) -> Option<&Camera> {
        self.active_camera.and_then(|i| self.cameras.get(i))
    }

    pub fn active_camera_mut(&mut self) -> Option<&mut Camera> {
        self.active_camera.and_then(|i| self.cameras.get_mut(i))
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn is_wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn set_wireframe_rendering(&mut self, enabled: bool) {
        self.wireframe = enabled;
        let mode = if enabled {
            PolygonMode::Line
        } else {
            PolygonMode::Fill
        };
        self.gpu.set_polygon_mode(mode);
    }

    /// Releases dropped GPU objects, enables blending and depth testing and
    /// clears the frame.
    pub fn init_frame(&mut self, clear_color: Color) {
        self.gpu.collect_garbage();
        let api = self.gpu.api_mut();
        api.set_blending(true);
        api.set_depth_test(true);
        api.clear(clear_color);
    }

    pub fn end_frame(&mut self) -> anyhow::Result<()> {
        self.gpu.api_mut().present()
    }

    /// Draws `entity` through the active camera. Without an active camera the
    /// entity is drawn without view and projection uniforms.
    pub fn render_entity(&mut self, entity: &RenderEntity) {
        let camera = self.active_camera.and_then(|i| self.cameras.get(i));
        if camera.is_none() {
            log::error!("No active camera, drawing entity {:?} without one", entity.id());
        }
        draw_entity(&mut self.gpu, entity, camera);
    }

    /// Renders `scene` through the active camera.
    pub fn render_scene(&mut self, scene: &mut Scene) {
        match self.active_camera.and_then(|i| self.cameras.get(i)) {
            Some(camera) => draw_scene(&mut self.gpu, scene, camera),
            None => {
                log::error!("No active camera, skipping light upload");
                for entity in scene.entities() {
                    draw_entity(&mut self.gpu, entity, None);
                }
            }
        }
    }

    /// Uploads the scene's lights for `camera`, then draws every entity in
    /// insertion order.
    pub fn render_scene_with(&mut self, scene: &mut Scene, camera: &Camera) {
        draw_scene(&mut self.gpu, scene, camera);
    }
}

fn draw_scene(gpu: &mut Gpu, scene: &mut Scene, camera: &Camera) {
    let (entities, lights) = scene.split_mut();
    lights.update_ubo(gpu, camera);
    for entity in entities {
        draw_entity(gpu, entity, Some(camera));
    }
}

fn draw_entity(gpu: &mut Gpu, entity: &RenderEntity, camera: Option<&Camera>) {
    let material = entity.material();
    let mesh = entity.mesh();
    let shader = material.shader();

    material.bind(gpu);
    mesh.bind(gpu);

    if let Some(camera) = camera {
        shader.set_mat4(gpu, "view", camera.view_matrix());
        shader.set_mat4(gpu, "projection", camera.projection_matrix());
        shader.set_vec3(gpu, "viewPos", camera.position);
    }
    shader.set_mat4(gpu, "model", entity.transform().model_matrix());

    mesh.draw(gpu);

    mesh.unbind(gpu);
    material.unbind(gpu);
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("gpu", &self.gpu)
            .field("cameras", &self.cameras.len())
            .field("active_camera", &self.active_camera)
            .field("wireframe", &self.wireframe)
            .finish()
    }
}
