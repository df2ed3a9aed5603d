//! Engine configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`VOXEL_SECTION__KEY`)

use std::{collections::BTreeMap, path::Path, path::PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    camera::{self, Camera},
    data_structures::{color::Color, light_manager::DEFAULT_INFLUENCE_THRESHOLD},
};

/// Main engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub rendering: RenderingConfig,
    #[serde(default)]
    pub assets: AssetConfig,
}

#[derive(Error, Debug)]
#[error("configuration error: {0}")]
pub struct ConfigError(#[from] Box<figment::Error>);

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError(Box::new(e))
    }
}

impl EngineConfig {
    /// Load configuration from `config/`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory. Missing files are
    /// skipped; anything left unset keeps its default.
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));
        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }
        // VOXEL_WINDOW__TITLE=Test -> window.title = "Test"
        figment = figment.merge(Env::prefixed("VOXEL_").split("__"));

        Ok(figment.extract()?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "voxel-ngin".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Degrees
    pub yaw: f32,
    /// Degrees
    pub pitch: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub speed: f32,
    pub sensitivity: f32,
    pub fly: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 2.0, 6.0],
            yaw: camera::DEFAULT_YAW,
            pitch: camera::DEFAULT_PITCH,
            fov: camera::DEFAULT_ZOOM,
            near: 0.1,
            far: 500.0,
            speed: camera::DEFAULT_SPEED,
            sensitivity: camera::DEFAULT_SENSITIVITY,
            fly: false,
        }
    }
}

impl CameraConfig {
    /// A camera with this configuration and a projection for `aspect`.
    pub fn build(&self, aspect: f32) -> Camera {
        let mut camera = Camera::new(self.position.into(), cgmath::Vector3::unit_y(), self.yaw, self.pitch);
        camera.movement_speed = self.speed;
        camera.mouse_sensitivity = self.sensitivity;
        camera.set_fly(self.fly);
        camera.set_projection_matrix(self.fov, aspect, self.near, self.far);
        camera
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    pub clear_color: [f32; 4],
    pub wireframe: bool,
    /// Attenuation below which a point light stops affecting an entity
    pub light_influence_threshold: f32,
}

impl RenderingConfig {
    pub fn clear_color(&self) -> Color {
        self.clear_color.into()
    }
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.1, 0.1, 0.1, 1.0],
            wireframe: false,
            light_influence_threshold: DEFAULT_INFLUENCE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory relative texture paths are resolved against
    pub root: PathBuf,
    /// Edge length of every atlas texture in texels
    pub tile_size: u32,
    /// Atlas texture name to image path
    pub textures: BTreeMap<String, PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            tile_size: 16,
            textures: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.assets.tile_size, 16);
        assert_eq!(config.rendering.light_influence_threshold, 0.01);
    }

    #[test]
    fn test_camera_config_builds_projection() {
        let camera = CameraConfig::default().build(16.0 / 9.0);
        assert!(camera.has_projection());
        assert_eq!(camera.movement_speed, camera::DEFAULT_SPEED);
    }
}
