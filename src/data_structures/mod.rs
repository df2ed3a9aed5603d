//! Engine data models.
//!
//! - `block`, `block_registry`: block types, procedural cube meshes and the
//!   block catalog
//! - `color`: RGBA colors
//! - `light`, `light_manager`: light sources, their GPU layout and culling
//! - `material`, `shader`, `texture`, `texture_atlas`: surface appearance
//! - `mesh`: vertex data and its GPU buffers
//! - `render_entity`, `scene`, `transform`: what gets drawn and where

pub mod block;
pub mod block_registry;
pub mod color;
pub mod light;
pub mod light_manager;
pub mod material;
pub mod mesh;
pub mod render_entity;
pub mod scene;
pub mod shader;
pub mod texture;
pub mod texture_atlas;
pub mod transform;
