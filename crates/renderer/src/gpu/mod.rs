//! GPU orchestration for the pyramid demo.
//!
//! - `context` owns wgpu instance/device/surface wiring and swapchain
//!   reconfiguration on resize.
//! - `pipeline` compiles the fixed GLSL pair into a render pipeline; a broken
//!   shader degrades to clear-only frames instead of aborting.
//! - `uniforms` holds the pure transform math and its std140 mirror.
//! - `state` glues everything together and exposes the `GpuState` API driven
//!   by the window event loop.

mod context;
mod pipeline;
mod state;
pub mod uniforms;

pub(crate) use state::GpuState;
pub use uniforms::{model_matrix, projection_matrix};
