//! # Pose Data Model
//!
//! The landmark/connection structure produced by the pose-estimation backend.
//! A [`PoseData`] value is read-only input: it is consumed whole by the scene
//! builder and replaced whole by the next detection result.
//!
//! ## Wire shape
//!
//! ```json
//! {
//!   "landmarks": [{ "id": 0, "x": 0.1, "y": -0.6, "z": -0.2, "visibility": 0.99 }],
//!   "connections": [[11, 13], [13, 15]],
//!   "success": true
//! }
//! ```
//!
//! Unknown fields (`id`, `success`) are ignored. An envelope carrying `error`
//! means the backend found no person and is reported as [`PoseError::Backend`].

use serde::{Deserialize, Serialize};

use crate::error::PoseError;

/// One detected body point in model space with its confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Confidence in `[0, 1]`
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }
}

/// A bone between two landmark indices, serialized as `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Connection {
    pub start: usize,
    pub end: usize,
}

impl Connection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl From<[usize; 2]> for Connection {
    fn from([start, end]: [usize; 2]) -> Self {
        Self { start, end }
    }
}

impl From<Connection> for [usize; 2] {
    fn from(connection: Connection) -> Self {
        [connection.start, connection.end]
    }
}

/// Complete result of one pose detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseData {
    pub landmarks: Vec<Landmark>,
    pub connections: Vec<Connection>,
}

/// Backend response before the shape has been checked.
#[derive(Debug, Deserialize)]
struct PoseEnvelope {
    landmarks: Option<Vec<Landmark>>,
    connections: Option<Vec<Connection>>,
    error: Option<String>,
}

impl PoseData {
    pub fn new(landmarks: Vec<Landmark>, connections: Vec<Connection>) -> Self {
        Self {
            landmarks,
            connections,
        }
    }

    /// Parses a backend response.
    ///
    /// Missing `landmarks` or `connections` is [`PoseError::Malformed`]; a
    /// response carrying `error` is [`PoseError::Backend`].
    pub fn from_json(json: &str) -> Result<Self, PoseError> {
        let envelope: PoseEnvelope = serde_json::from_str(json)?;
        Self::from_envelope(envelope)
    }

    /// Same as [`PoseData::from_json`] for an already parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, PoseError> {
        let envelope: PoseEnvelope = serde_json::from_value(value)?;
        Self::from_envelope(envelope)
    }

    fn from_envelope(envelope: PoseEnvelope) -> Result<Self, PoseError> {
        if let Some(message) = envelope.error {
            return Err(PoseError::Backend(message));
        }

        let landmarks = envelope
            .landmarks
            .ok_or_else(|| PoseError::Malformed("missing field `landmarks`".into()))?;
        let connections = envelope
            .connections
            .ok_or_else(|| PoseError::Malformed("missing field `connections`".into()))?;

        Ok(Self::new(landmarks, connections))
    }

    /// Looks up both endpoints of a connection.
    ///
    /// Returns `None` when either index is outside the landmark sequence.
    pub fn endpoints(&self, connection: &Connection) -> Option<(&Landmark, &Landmark)> {
        let start = self.landmarks.get(connection.start)?;
        let end = self.landmarks.get(connection.end)?;
        Some((start, end))
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}
