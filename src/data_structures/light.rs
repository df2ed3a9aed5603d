//! Light sources and their uniform buffer layout.
//!
//! The `*Raw` structs mirror the WGSL structs of the light receiver shader
//! byte for byte: every `vec3` starts on a 16-byte boundary and the arrays
//! are padded to their fixed capacities.

use std::fmt;

use cgmath::{InnerSpace, Matrix4, Vector3, Vector4};

use crate::data_structures::color::Color;

pub const MAX_DIRECTIONAL_LIGHTS: usize = 32;
pub const MAX_POINT_LIGHTS: usize = 512;
pub const MAX_SPOT_LIGHTS: usize = 256;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LightKind::Directional => "directional",
            LightKind::Point => "point",
            LightKind::Spot => "spot",
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub ambient: Vector3<f32>,
}

impl DirectionalLight {
    pub fn new(direction: Vector3<f32>, diffuse: impl Into<Vector3<f32>>, specular: impl Into<Vector3<f32>>) -> Self {
        Self {
            direction,
            diffuse: diffuse.into(),
            specular: specular.into(),
            ambient: Color::grey(0.2).to_vec3(),
        }
    }

    pub fn with_ambient(mut self, ambient: impl Into<Vector3<f32>>) -> Self {
        self.ambient = ambient.into();
        self
    }
}

/// Point light with `1 / (constant + linear * d + quadratic * d²)`
/// attenuation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    /// White light at `position` with a reach of roughly 50 units.
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            diffuse: Color::grey(0.8).to_vec3(),
            ambient: Color::grey(0.05).to_vec3(),
            specular: Color::WHITE.to_vec3(),
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }

    pub fn with_color(mut self, diffuse: impl Into<Vector3<f32>>) -> Self {
        self.diffuse = diffuse.into();
        self
    }

    pub fn with_attenuation(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        self.constant = constant;
        self.linear = linear;
        self.quadratic = quadratic;
        self
    }
}

/// Spot light; both cut-offs are cosines of the cone half-angles, so
/// `cut_off >= outer_cut_off`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpotLight {
    pub position: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub cut_off: f32,
    pub outer_cut_off: f32,
}

impl SpotLight {
    pub fn new(position: Vector3<f32>, direction: Vector3<f32>, cut_off_degrees: f32, outer_cut_off_degrees: f32) -> Self {
        Self {
            position,
            direction,
            diffuse: Color::grey(0.7).to_vec3(),
            cut_off: cut_off_degrees.to_radians().cos(),
            outer_cut_off: outer_cut_off_degrees.to_radians().cos(),
        }
    }

    /// Whether `point` lies inside the outer cone.
    pub fn illuminates(&self, point: Vector3<f32>) -> bool {
        let to_point = point - self.position;
        if to_point.magnitude2() == 0.0 {
            return true;
        }
        to_point.normalize().dot(self.direction.normalize()) >= self.outer_cut_off
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightRaw {
    pub direction: [f32; 3],
    _padding: f32,
    pub diffuse: [f32; 3],
    _padding2: f32,
    pub specular: [f32; 3],
    _padding3: f32,
    pub ambient: [f32; 3],
    _padding4: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    pub position: [f32; 3],
    _padding: f32,
    pub diffuse: [f32; 3],
    _padding2: f32,
    pub ambient: [f32; 3],
    _padding3: f32,
    pub specular: [f32; 3],
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    _padding4: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightRaw {
    pub position: [f32; 3],
    pub cut_off: f32,
    pub direction: [f32; 3],
    pub outer_cut_off: f32,
    pub diffuse: [f32; 3],
    _padding: f32,
}

/// Contents of the light uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightDataRaw {
    pub directional: [DirectionalLightRaw; MAX_DIRECTIONAL_LIGHTS],
    pub point: [PointLightRaw; MAX_POINT_LIGHTS],
    pub spot: [SpotLightRaw; MAX_SPOT_LIGHTS],
    pub num_directional: i32,
    pub num_point: i32,
    pub num_spot: i32,
    _padding: i32,
}

pub const LIGHT_DATA_SIZE: usize = std::mem::size_of::<LightDataRaw>();

fn to_view(view: &Matrix4<f32>, v: Vector3<f32>, w: f32) -> [f32; 3] {
    (view * Vector4::new(v.x, v.y, v.z, w)).truncate().into()
}

impl DirectionalLight {
    pub fn to_raw(&self, view: &Matrix4<f32>) -> DirectionalLightRaw {
        DirectionalLightRaw {
            direction: to_view(view, self.direction, 0.0),
            diffuse: self.diffuse.into(),
            specular: self.specular.into(),
            ambient: self.ambient.into(),
            ..bytemuck::Zeroable::zeroed()
        }
    }
}

impl PointLight {
    pub fn to_raw(&self, view: &Matrix4<f32>) -> PointLightRaw {
        PointLightRaw {
            position: to_view(view, self.position, 1.0),
            diffuse: self.diffuse.into(),
            ambient: self.ambient.into(),
            specular: self.specular.into(),
            constant: self.constant,
            linear: self.linear,
            quadratic: self.quadratic,
            ..bytemuck::Zeroable::zeroed()
        }
    }
}

impl SpotLight {
    pub fn to_raw(&self, view: &Matrix4<f32>) -> SpotLightRaw {
        SpotLightRaw {
            position: to_view(view, self.position, 1.0),
            cut_off: self.cut_off,
            direction: to_view(view, self.direction, 0.0),
            outer_cut_off: self.outer_cut_off,
            diffuse: self.diffuse.into(),
            ..bytemuck::Zeroable::zeroed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<DirectionalLightRaw>(), 64);
        assert_eq!(std::mem::size_of::<PointLightRaw>(), 80);
        assert_eq!(std::mem::size_of::<SpotLightRaw>(), 48);
        assert_eq!(LIGHT_DATA_SIZE, 55312);
        assert_eq!(std::mem::offset_of!(PointLightRaw, constant), 60);
        assert_eq!(std::mem::offset_of!(LightDataRaw, num_directional), 55296);
    }
}
