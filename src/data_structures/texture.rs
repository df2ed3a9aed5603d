//! GPU textures.
//!
//! This module provides [`Texture`], a shared handle to an uploaded RGBA
//! image with a full mip chain. Several textures may wrap the same GPU
//! object (see [`Texture::share`]); the object is released when the last of
//! them is dropped.

use std::{path::Path, rc::Rc};

use image::{DynamicImage, GenericImageView, RgbaImage, imageops::FilterType};

use crate::{
    errors::{RenderError, Result},
    gpu::{
        FilterMode, Gpu, GpuHandle, SamplerState, TextureDescriptor, TextureId, TextureRegion,
        WrapMode,
    },
    resources::ImageLoader,
};

/// Number of mip levels down to 1x1 for a `width` x `height` image.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

#[derive(Debug)]
pub struct Texture {
    handle: Rc<GpuHandle<TextureId>>,
    width: u32,
    height: u32,
    max_units: u32,
    sampler: SamplerState,
}

impl Texture {
    /// Loads `path` through `loader` and uploads it with mipmaps.
    pub fn from_path(gpu: &mut Gpu, loader: &dyn ImageLoader, path: &Path) -> Result<Self> {
        let img = loader
            .load_image(path)
            .map_err(|source| RenderError::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_image(gpu, &img, &path.to_string_lossy()))
    }

    /// Uploads `img` as RGBA8, generating every mip level on the CPU.
    /// Sampling repeats and uses nearest filtering.
    pub fn from_image(gpu: &mut Gpu, img: &DynamicImage, label: &str) -> Self {
        let (width, height) = img.dimensions();
        let mip_levels = mip_level_count(width, height);
        let sampler = SamplerState::PIXELATED;
        let id = gpu.api_mut().create_texture(&TextureDescriptor {
            label,
            width,
            height,
            mip_level_count: mip_levels,
            sampler,
        });

        let base = img.to_rgba8();
        write_level(gpu, id, 0, &base);
        for level in 1..mip_levels {
            let w = (width >> level).max(1);
            let h = (height >> level).max(1);
            let mip = image::imageops::resize(&base, w, h, FilterType::Nearest);
            write_level(gpu, id, level, &mip);
        }

        Self::from_id(gpu, id, width, height, sampler)
    }

    /// Wraps a texture already created on `gpu`, taking ownership of it.
    pub fn from_id(gpu: &Gpu, id: TextureId, width: u32, height: u32, sampler: SamplerState) -> Self {
        Self {
            handle: Rc::new(gpu.track(id)),
            width,
            height,
            max_units: gpu.max_texture_units(),
            sampler,
        }
    }

    /// Another wrapper around the same GPU texture, without re-uploading.
    pub fn share(&self) -> Self {
        Self {
            handle: Rc::clone(&self.handle),
            width: self.width,
            height: self.height,
            max_units: self.max_units,
            sampler: self.sampler,
        }
    }

    pub fn id(&self) -> TextureId {
        self.handle.id()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sampler(&self) -> SamplerState {
        self.sampler
    }

    pub fn max_units(&self) -> u32 {
        self.max_units
    }

    pub fn is_shared(&self) -> bool {
        Rc::strong_count(&self.handle) > 1
    }

    /// Binds to `unit`; units at or past the device limit are rejected.
    pub fn bind(&self, gpu: &mut Gpu, unit: u32) {
        if unit >= self.max_units {
            log::error!(
                "Texture unit {unit} out of range, the device supports {} units",
                self.max_units
            );
            return;
        }
        gpu.api_mut().bind_texture(unit, Some(self.id()));
    }

    /// Clears `unit` only; other units keep their textures.
    pub fn unbind(&self, gpu: &mut Gpu, unit: u32) {
        if unit >= self.max_units {
            return;
        }
        gpu.api_mut().bind_texture(unit, None);
    }

    pub fn set_wrapping_mode(&mut self, gpu: &mut Gpu, wrap: WrapMode) {
        self.sampler.wrap = wrap;
        gpu.api_mut().set_texture_sampler(self.id(), self.sampler);
    }

    pub fn set_scaling_filter(&mut self, gpu: &mut Gpu, min_filter: FilterMode, mag_filter: FilterMode) {
        self.sampler.min_filter = min_filter;
        self.sampler.mag_filter = mag_filter;
        gpu.api_mut().set_texture_sampler(self.id(), self.sampler);
    }
}

fn write_level(gpu: &mut Gpu, id: TextureId, mip_level: u32, rgba: &RgbaImage) {
    gpu.api_mut().write_texture(
        id,
        TextureRegion {
            mip_level,
            x: 0,
            y: 0,
            width: rgba.width(),
            height: rgba.height(),
        },
        rgba.as_raw(),
    );
}
