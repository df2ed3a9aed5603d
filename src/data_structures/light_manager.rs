//! Owns a scene's lights and keeps the light uniform buffer in sync.

use cgmath::InnerSpace;

use crate::{
    camera::Camera,
    data_structures::{
        light::{
            DirectionalLight, LightDataRaw, LightKind, MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS,
            MAX_SPOT_LIGHTS, PointLight, SpotLight,
        },
        render_entity::RenderEntity,
    },
    errors::{RenderError, Result},
    gpu::{BufferId, BufferUsage, Gpu, GpuHandle},
};

/// Uniform block slot the light buffer is bound to.
pub const LIGHT_BLOCK_SLOT: u32 = 0;

/// Attenuation below which a point light no longer counts as affecting a
/// surface.
pub const DEFAULT_INFLUENCE_THRESHOLD: f32 = 0.01;

/// Distance at which `light`'s attenuation drops to `threshold`.
///
/// Solves `quadratic * d² + linear * d + constant = 1 / threshold` for the
/// positive root. Lights that never fall below the threshold get `f32::MAX`.
pub fn point_light_influence_radius(light: &PointLight, threshold: f32) -> f32 {
    let a = light.quadratic;
    let b = light.linear;
    let c = light.constant - 1.0 / threshold;
    if a == 0.0 {
        if b <= 0.0 {
            return f32::MAX;
        }
        return (-c / b).max(0.0);
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return f32::MAX;
    }
    (-b + discriminant.sqrt()) / (2.0 * a)
}

#[derive(Debug)]
pub struct LightManager {
    directional: Vec<DirectionalLight>,
    point: Vec<PointLight>,
    point_radii: Vec<f32>,
    spot: Vec<SpotLight>,
    influence_threshold: f32,
    ubo: Option<GpuHandle<BufferId>>,
}

impl Default for LightManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LightManager {
    pub fn new() -> Self {
        Self {
            directional: Vec::new(),
            point: Vec::new(),
            point_radii: Vec::new(),
            spot: Vec::new(),
            influence_threshold: DEFAULT_INFLUENCE_THRESHOLD,
            ubo: None,
        }
    }

    pub fn directional_lights(&self) -> &[DirectionalLight] {
        &self.directional
    }

    pub fn point_lights(&self) -> &[PointLight] {
        &self.point
    }

    pub fn point_light_radii(&self) -> &[f32] {
        &self.point_radii
    }

    pub fn spot_lights(&self) -> &[SpotLight] {
        &self.spot
    }

    pub fn influence_threshold(&self) -> f32 {
        self.influence_threshold
    }

    pub fn ubo(&self) -> Option<BufferId> {
        self.ubo.as_ref().map(GpuHandle::id)
    }

    pub fn add_directional_light(&mut self, light: DirectionalLight) -> Result<usize> {
        check_capacity(LightKind::Directional, self.directional.len(), MAX_DIRECTIONAL_LIGHTS)?;
        self.directional.push(light);
        Ok(self.directional.len() - 1)
    }

    pub fn add_point_light(&mut self, light: PointLight) -> Result<usize> {
        check_capacity(LightKind::Point, self.point.len(), MAX_POINT_LIGHTS)?;
        self.point_radii
            .push(point_light_influence_radius(&light, self.influence_threshold));
        self.point.push(light);
        Ok(self.point.len() - 1)
    }

    pub fn add_spot_light(&mut self, light: SpotLight) -> Result<usize> {
        check_capacity(LightKind::Spot, self.spot.len(), MAX_SPOT_LIGHTS)?;
        self.spot.push(light);
        Ok(self.spot.len() - 1)
    }

    pub fn update_directional_light(&mut self, index: usize, light: DirectionalLight) -> Result<()> {
        let len = self.directional.len();
        let slot = self
            .directional
            .get_mut(index)
            .ok_or_else(|| out_of_range(LightKind::Directional, index, len))?;
        *slot = light;
        Ok(())
    }

    pub fn update_point_light(&mut self, index: usize, light: PointLight) -> Result<()> {
        let len = self.point.len();
        let slot = self
            .point
            .get_mut(index)
            .ok_or_else(|| out_of_range(LightKind::Point, index, len))?;
        *slot = light;
        self.point_radii[index] = point_light_influence_radius(&light, self.influence_threshold);
        Ok(())
    }

    pub fn update_spot_light(&mut self, index: usize, light: SpotLight) -> Result<()> {
        let len = self.spot.len();
        let slot = self
            .spot
            .get_mut(index)
            .ok_or_else(|| out_of_range(LightKind::Spot, index, len))?;
        *slot = light;
        Ok(())
    }

    pub fn set_influence_threshold(&mut self, threshold: f32) {
        self.influence_threshold = threshold;
        self.recalculate_all_point_light_radii();
    }

    pub fn recalculate_all_point_light_radii(&mut self) {
        let threshold = self.influence_threshold;
        self.point_radii = self
            .point
            .iter()
            .map(|light| point_light_influence_radius(light, threshold))
            .collect();
    }

    pub fn applicable_directional_lights(&self, _entity: &RenderEntity) -> Vec<usize> {
        (0..self.directional.len()).collect()
    }

    /// Point lights whose influence radius reaches the entity's position.
    pub fn applicable_point_lights(&self, entity: &RenderEntity) -> Vec<usize> {
        let position = entity.transform().position();
        self.point
            .iter()
            .zip(&self.point_radii)
            .enumerate()
            .filter(|(_, (light, radius))| (light.position - position).magnitude() <= **radius)
            .map(|(index, _)| index)
            .collect()
    }

    /// Spot lights whose outer cone contains the entity's position.
    pub fn applicable_spot_lights(&self, entity: &RenderEntity) -> Vec<usize> {
        let position = entity.transform().position();
        self.spot
            .iter()
            .enumerate()
            .filter(|(_, light)| light.illuminates(position))
            .map(|(index, _)| index)
            .collect()
    }

    /// Light buffer contents with positions and directions in the view space
    /// of `camera`.
    pub fn light_data(&self, camera: &Camera) -> Box<LightDataRaw> {
        let view = camera.view_matrix();
        let mut data: Box<LightDataRaw> = bytemuck::allocation::zeroed_box();
        for (raw, light) in data.directional.iter_mut().zip(&self.directional) {
            *raw = light.to_raw(&view);
        }
        for (raw, light) in data.point.iter_mut().zip(&self.point) {
            *raw = light.to_raw(&view);
        }
        for (raw, light) in data.spot.iter_mut().zip(&self.spot) {
            *raw = light.to_raw(&view);
        }
        data.num_directional = self.directional.len() as i32;
        data.num_point = self.point.len() as i32;
        data.num_spot = self.spot.len() as i32;
        data
    }

    /// Uploads the lights for `camera` and binds the buffer to
    /// [`LIGHT_BLOCK_SLOT`]. The buffer is created on first use.
    pub fn update_ubo(&mut self, gpu: &mut Gpu, camera: &Camera) {
        let data = self.light_data(camera);
        let bytes = bytemuck::bytes_of(data.as_ref());
        let buffer = match &self.ubo {
            Some(ubo) => {
                gpu.api_mut().write_buffer(ubo.id(), 0, bytes);
                ubo.id()
            }
            None => {
                let id = gpu
                    .api_mut()
                    .create_buffer("Light Uniform Buffer", BufferUsage::Uniform, bytes);
                self.ubo = Some(gpu.track(id));
                id
            }
        };
        gpu.api_mut().bind_uniform_block(LIGHT_BLOCK_SLOT, buffer);
        log::debug!(
            "Uploaded {} directional, {} point and {} spot lights",
            data.num_directional,
            data.num_point,
            data.num_spot
        );
    }
}

fn check_capacity(kind: LightKind, len: usize, capacity: usize) -> Result<()> {
    if len >= capacity {
        let err = RenderError::LightCapacityExceeded { kind, capacity };
        log::error!("{err}");
        return Err(err);
    }
    Ok(())
}

fn out_of_range(kind: LightKind, index: usize, len: usize) -> RenderError {
    let err = RenderError::LightIndexOutOfRange { kind, index, len };
    log::error!("{err}");
    err
}
