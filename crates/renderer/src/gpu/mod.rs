//! GPU plumbing for the pillar backdrop.
//!
//! - `context` owns the wgpu instance/surface/device wiring and knows how to
//!   reconfigure the swapchain when the host region resizes.
//! - `pipeline` compiles the embedded GLSL pair into a fullscreen-triangle
//!   render pipeline with the scene's compositing mode baked into the blend
//!   state.
//! - `uniforms` mirrors the shader's std140 block on the CPU and is written
//!   through the queue once per rendered frame.

pub(crate) mod context;
pub(crate) mod pipeline;
pub(crate) mod uniforms;
