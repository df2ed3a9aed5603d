//! Typed errors raised by the renderer core.
//!
//! Conditions the renderer can recover from (missing camera, unknown atlas
//! region, texture unit out of range) are logged and answered with a safe
//! default instead. Everything in [`RenderError`] is surfaced to the caller.

use std::path::PathBuf;

use thiserror::Error;

use crate::data_structures::{light::LightKind, shader::ShaderType};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("block `{0}` not found in the block registry")]
    BlockNotFound(String),

    #[error("no shader registered for {0:?}")]
    ShaderNotFound(ShaderType),

    #[error("{kind} light index {index} out of range ({len} registered)")]
    LightIndexOutOfRange {
        kind: LightKind,
        index: usize,
        len: usize,
    },

    #[error("cannot add another {kind} light, capacity of {capacity} reached")]
    LightCapacityExceeded { kind: LightKind, capacity: usize },

    #[error("texture atlas has not been built")]
    AtlasNotBuilt,

    #[error("texture `{0}` is not part of the texture atlas")]
    AtlasRegionNotFound(String),

    #[error("texture atlas has already been built")]
    AtlasAlreadyBuilt,

    #[error("shader `{label}` failed to compile: {diagnostics}")]
    ShaderCompilation { label: String, diagnostics: String },

    #[error("failed to load image {path:?}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture `{name}` is {width}x{height}, atlas tiles are {tile}x{tile}")]
    TileSizeMismatch {
        name: String,
        width: u32,
        height: u32,
        tile: u32,
    },
}

pub type Result<T> = std::result::Result<T, RenderError>;
