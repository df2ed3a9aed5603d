//! Packs equally sized block textures into one square texture.
//!
//! Entries are placed row by row in name order on a `grid x grid` layout
//! where `grid = ceil(sqrt(n))`. Images that fail to load or whose size
//! differs from the tile size are skipped and do not take a cell.

use std::{
    collections::{BTreeMap, HashMap},
    path::PathBuf,
};

use image::GenericImageView;

use crate::{
    data_structures::texture::Texture,
    errors::{RenderError, Result},
    gpu::{Gpu, SamplerState, TextureDescriptor, TextureRegion},
    resources::ImageLoader,
};

/// A rectangle in normalized texture coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct UvRegion {
    pub u_min: f32,
    pub v_min: f32,
    pub u_max: f32,
    pub v_max: f32,
}

impl UvRegion {
    pub const ZERO: UvRegion = UvRegion {
        u_min: 0.0,
        v_min: 0.0,
        u_max: 0.0,
        v_max: 0.0,
    };

    pub fn width(&self) -> f32 {
        self.u_max - self.u_min
    }

    pub fn height(&self) -> f32 {
        self.v_max - self.v_min
    }
}

#[derive(Debug)]
pub struct TextureAtlas {
    entries: BTreeMap<String, PathBuf>,
    tile_size: u32,
    grid_size: u32,
    regions: HashMap<String, UvRegion>,
    texture: Option<Texture>,
}

impl TextureAtlas {
    pub fn new<N, P>(entries: impl IntoIterator<Item = (N, P)>, tile_size: u32) -> Self
    where
        N: Into<String>,
        P: Into<PathBuf>,
    {
        let entries: BTreeMap<String, PathBuf> = entries
            .into_iter()
            .map(|(name, path)| (name.into(), path.into()))
            .collect();
        let grid_size = ((entries.len() as f64).sqrt().ceil() as u32).max(1);
        Self {
            entries,
            tile_size,
            grid_size,
            regions: HashMap::new(),
            texture: None,
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Cells per row and per column.
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Side length of the atlas texture in texels.
    pub fn atlas_size(&self) -> u32 {
        self.grid_size * self.tile_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_built(&self) -> bool {
        self.texture.is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.regions.contains_key(name)
    }

    pub fn build(&mut self, gpu: &mut Gpu, loader: &dyn ImageLoader) -> Result<()> {
        if self.is_built() {
            return Err(RenderError::AtlasAlreadyBuilt);
        }
        let side = self.atlas_size();
        let sampler = SamplerState::CLAMPED_NEAREST;
        let id = gpu.api_mut().create_texture(&TextureDescriptor {
            label: "Texture Atlas",
            width: side,
            height: side,
            mip_level_count: 1,
            sampler,
        });

        let grid = self.grid_size;
        let mut cell = 0u32;
        for (name, path) in &self.entries {
            let img = match loader.load_image(path) {
                Ok(img) => img,
                Err(source) => {
                    let err = RenderError::ImageLoad {
                        path: path.clone(),
                        source,
                    };
                    log::error!("Skipping atlas entry `{name}`: {err}");
                    continue;
                }
            };
            let (width, height) = img.dimensions();
            if width != self.tile_size || height != self.tile_size {
                let err = RenderError::TileSizeMismatch {
                    name: name.clone(),
                    width,
                    height,
                    tile: self.tile_size,
                };
                log::error!("Skipping atlas entry: {err}");
                continue;
            }

            let (gx, gy) = (cell % grid, cell / grid);
            let rgba = img.to_rgba8();
            gpu.api_mut().write_texture(
                id,
                TextureRegion {
                    mip_level: 0,
                    x: gx * self.tile_size,
                    y: gy * self.tile_size,
                    width,
                    height,
                },
                rgba.as_raw(),
            );
            let g = grid as f32;
            self.regions.insert(
                name.clone(),
                UvRegion {
                    u_min: gx as f32 / g,
                    v_min: gy as f32 / g,
                    u_max: (gx + 1) as f32 / g,
                    v_max: (gy + 1) as f32 / g,
                },
            );
            cell += 1;
        }

        log::info!(
            "Built {side}x{side} texture atlas with {} of {} textures",
            self.regions.len(),
            self.entries.len()
        );
        self.texture = Some(Texture::from_id(gpu, id, side, side, sampler));
        Ok(())
    }

    pub fn try_uv_region(&self, name: &str) -> Result<UvRegion> {
        if !self.is_built() {
            return Err(RenderError::AtlasNotBuilt);
        }
        self.regions
            .get(name)
            .copied()
            .ok_or_else(|| RenderError::AtlasRegionNotFound(name.to_string()))
    }

    /// Region of `name`, or [`UvRegion::ZERO`] when the atlas is not built or
    /// has no such texture.
    pub fn uv_region(&self, name: &str) -> UvRegion {
        if !self.is_built() {
            log::error!("Texture atlas queried for `{name}` before it was built");
            return UvRegion::ZERO;
        }
        match self.regions.get(name) {
            Some(region) => *region,
            None => {
                log::error!("Texture `{name}` not found in atlas");
                UvRegion::ZERO
            }
        }
    }

    /// A texture sharing the atlas' GPU texture.
    pub fn texture(&self) -> Result<Texture> {
        self.texture
            .as_ref()
            .map(Texture::share)
            .ok_or(RenderError::AtlasNotBuilt)
    }
}
