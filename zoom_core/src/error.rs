// Typed errors with thiserror. The wasm facade turns these into JS strings.

use thiserror::Error;

/// Engine error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Path signal starts with a gap on the {axis} axis")]
    LeadingGap { axis: char },

    #[error("Path data parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Frame range {min_frame}..{max_frame} is outside a {frame_count}-frame signal")]
    FrameRange {
        min_frame: usize,
        max_frame: usize,
        frame_count: usize,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}
