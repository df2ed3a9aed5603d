/**
 * This module contains all logic for loading images and shader sources from external files.
 */
pub mod texture;

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::gpu::{ShaderSource, UniformLayout};

pub use texture::{FsImageLoader, ImageLoader};

/// Resolves `file_name` against `root`, leaving absolute paths untouched.
pub fn resolve(root: &Path, file_name: impl AsRef<Path>) -> PathBuf {
    let file_name = file_name.as_ref();
    if file_name.is_absolute() {
        file_name.to_path_buf()
    } else {
        root.join(file_name)
    }
}

pub fn load_string(path: impl AsRef<Path>) -> anyhow::Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Reads a vertex and a fragment stage from disk into a [`ShaderSource`].
pub fn load_shader_source(
    label: &str,
    vertex_path: impl AsRef<Path>,
    fragment_path: impl AsRef<Path>,
    uniforms: UniformLayout,
) -> anyhow::Result<ShaderSource> {
    let vertex = load_string(vertex_path)?;
    let fragment = load_string(fragment_path)?;
    Ok(ShaderSource {
        label: label.to_string(),
        vertex: vertex.into(),
        fragment: fragment.into(),
        uniforms,
    })
}
