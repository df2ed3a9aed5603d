use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use image::{DynamicImage, ImageError};

/// Source of decoded images for textures and the texture atlas.
pub trait ImageLoader {
    fn load_image(&self, path: &Path) -> Result<DynamicImage, ImageError>;
}

/// Loads images from disk, resolving relative paths against `root`.
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageLoader for FsImageLoader {
    fn load_image(&self, path: &Path) -> Result<DynamicImage, ImageError> {
        image::open(super::resolve(&self.root, path))
    }
}

/// Serves images registered in memory; unknown paths fail with a not-found
/// I/O error.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageLoader {
    images: HashMap<PathBuf, DynamicImage>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, image: DynamicImage) {
        self.images.insert(path.into(), image);
    }

    pub fn with(mut self, path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        self.insert(path, image);
        self
    }
}

impl ImageLoader for MemoryImageLoader {
    fn load_image(&self, path: &Path) -> Result<DynamicImage, ImageError> {
        self.images.get(path).cloned().ok_or_else(|| {
            ImageError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not registered", path.display()),
            ))
        })
    }
}
