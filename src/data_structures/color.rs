//! RGBA colors in linear float space.

use cgmath::{Vector3, Vector4};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);
    pub const ORANGE: Color = Color::rgb(1.0, 0.5, 0.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const LIME: Color = Color::rgb(0.5, 1.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with every channel set to `value`, alpha 1.
    pub const fn grey(value: f32) -> Self {
        Self::rgb(value, value, value)
    }

    /// Scales the color channels towards black by `factor` in `[0, 1]`.
    pub fn darken(self, factor: f32) -> Self {
        let keep = 1.0 - factor.clamp(0.0, 1.0);
        Self::rgba(self.r * keep, self.g * keep, self.b * keep, self.a)
    }

    /// Moves the color channels towards white by `factor` in `[0, 1]`.
    pub fn lighten(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self::rgba(
            self.r + (1.0 - self.r) * f,
            self.g + (1.0 - self.g) * f,
            self.b + (1.0 - self.b) * f,
            self.a,
        )
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, alpha.clamp(0.0, 1.0))
    }

    pub fn to_vec3(self) -> Vector3<f32> {
        Vector3::new(self.r, self.g, self.b)
    }

    pub fn to_vec4(self) -> Vector4<f32> {
        Vector4::new(self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<Color> for Vector3<f32> {
    fn from(color: Color) -> Self {
        color.to_vec3()
    }
}

impl From<Color> for [f32; 4] {
    fn from(color: Color) -> Self {
        [color.r, color.g, color.b, color.a]
    }
}

impl From<[f32; 4]> for Color {
    fn from(c: [f32; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

impl From<Color> for wgpu::Color {
    fn from(color: Color) -> Self {
        wgpu::Color {
            r: color.r as f64,
            g: color.g as f64,
            b: color.b as f64,
            a: color.a as f64,
        }
    }
}
