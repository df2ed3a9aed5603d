//! Pipeline and bind group construction for the wgpu backend.
//!
//! Every program shares one pipeline layout:
//!
//! - group 0: the program's entity uniforms, bound with a dynamic offset
//! - group 1: three texture/sampler pairs for the diffuse, specular and
//!   emissive units
//! - group 2: the light uniform block
//!
//! The WGSL sources of the built-in shaders live next to this module.

pub mod basic;
pub mod light;
