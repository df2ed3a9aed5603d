//! voxel-ngin
//!
//! A small real-time block renderer on top of wgpu. It composes shaders,
//! textures, meshes and materials into render entities, draws them through a
//! fly-through camera and lights them from a fixed-layout light uniform
//! buffer. Block meshes are generated procedurally from a packed texture
//! atlas.
//!
//! High-level modules
//! - `camera`: Euler-angle camera producing view/projection matrices
//! - `config`: layered engine configuration (TOML files + environment)
//! - `context`: the wgpu implementation of [`gpu::GraphicsApi`]
//! - `data_structures`: transforms, meshes, textures, materials, shaders,
//!   blocks, lights and scenes
//! - `errors`: typed errors raised by the core
//! - `flow`: winit application loop and camera input mapping
//! - `gpu`: the graphics API abstraction, resource handles and the headless
//!   recording backend
//! - `pipelines`: render pipeline and bind group construction, WGSL shaders
//! - `resources`: image and shader source loading
//! - `render`: frame orchestration and the per-entity draw protocol
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod errors;
pub mod flow;
pub mod gpu;
pub mod pipelines;
pub mod render;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
pub use winit::keyboard::KeyCode;
