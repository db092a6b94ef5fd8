//! Error types for the skeleton viewer
//!
//! Every error here is recoverable. Pose errors reject a single update, surface
//! errors defer attachment, and frame errors are absorbed by the render loop.

use thiserror::Error;

/// Problems with an incoming pose value.
#[derive(Debug, Error)]
pub enum PoseError {
    /// The value does not have the landmark/connection shape.
    #[error("malformed pose data: {0}")]
    Malformed(String),

    /// The estimation backend reported a failure instead of a pose.
    #[error("pose backend reported an error: {0}")]
    Backend(String),

    #[error("invalid pose json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while attaching a drawing surface to a container.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Container has zero width or height.
    #[error("container is not ready ({width}x{height})")]
    NotReady { width: u32, height: u32 },

    #[error("failed to create drawing surface: {0}")]
    Creation(String),

    #[error("no compatible graphics adapter: {0}")]
    Adapter(String),

    #[error("failed to open graphics device: {0}")]
    Device(String),
}

/// Failures while producing a single frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Surface was lost or went out of date and has been reconfigured.
    #[error("surface lost, reconfigured")]
    Lost,

    #[error("timed out acquiring the next surface texture")]
    Timeout,

    #[error("out of graphics memory")]
    OutOfMemory,

    #[error("frame failed: {0}")]
    Other(String),
}
