//! Core rendering functionality
//!
//! The `wgpu` drawing surface and the per-generation frame loop that drives it.

pub mod render_engine;
pub mod render_loop;

pub use render_engine::RenderEngine;
pub use render_loop::{CancellationToken, FrameContext, FrameOutcome, LoopHandle, RenderLoop};
