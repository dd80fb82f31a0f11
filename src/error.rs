//! Error handling for audioflow
//!
//! Every failed call surfaces exactly one `FlowError` naming the path,
//! effect or stage involved.

use thiserror::Error;

use crate::engine::EngineError;

/// Result type alias for audioflow operations
pub type Result<T> = std::result::Result<T, FlowError>;

/// Main error type for audioflow operations
#[derive(Error, Debug)]
pub enum FlowError {
    // Engine handle errors
    #[error("Could not open audio resource '{path}': {reason}")]
    Open { path: String, reason: String },

    #[error("Could not finalize audio resource '{path}': {reason}")]
    Close { path: String, reason: String },

    // Windowed read errors
    #[error("Unknown length for '{path}': cannot compute a bounded read window")]
    UnknownLength { path: String },

    #[error("Offset {offset} is past the end of '{path}' ({total} samples)")]
    OffsetOutOfRange { path: String, offset: u64, total: u64 },

    #[error("Seek to sample {offset} in '{path}' reached end of stream, try reducing the offset or frame count")]
    Seek { path: String, offset: u64 },

    #[error("Empty read from '{path}': empty file or engine read failure")]
    EmptyRead { path: String },

    // Write errors
    #[error("Short write to '{path}': wrote {written} of {expected} samples")]
    ShortWrite {
        path: String,
        expected: usize,
        written: usize,
    },

    // Chain construction errors
    #[error("Cannot parse argument '{argument}' of effect '{effect}' as {expected}")]
    ArgumentParse {
        effect: String,
        argument: String,
        expected: &'static str,
    },

    #[error("Unknown effect: {name}")]
    UnknownEffect { name: String },

    #[error("Invalid options for effect '{effect}': {reason}")]
    EffectOption { effect: String, reason: String },

    #[error("Effects flow failed at stage '{stage}': {reason}")]
    FlowExecution { stage: String, reason: String },

    #[error("Invalid signal descriptor: {reason}")]
    InvalidDescriptor { reason: String },

    // Engine lifecycle errors
    #[error("Processing engine '{engine}' is not initialized")]
    NotInitialized { engine: String },

    #[error("Processing engine lifecycle error: {0}")]
    Lifecycle(#[source] EngineError),

    // Command line errors
    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FlowError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            FlowError::Open { .. } => "OPEN_ERROR",
            FlowError::Close { .. } => "CLOSE_ERROR",
            FlowError::UnknownLength { .. } => "UNKNOWN_LENGTH",
            FlowError::OffsetOutOfRange { .. } => "OFFSET_OUT_OF_RANGE",
            FlowError::Seek { .. } => "SEEK_ERROR",
            FlowError::EmptyRead { .. } => "EMPTY_READ",
            FlowError::ShortWrite { .. } => "SHORT_WRITE",
            FlowError::ArgumentParse { .. } => "ARGUMENT_PARSE",
            FlowError::UnknownEffect { .. } => "UNKNOWN_EFFECT",
            FlowError::EffectOption { .. } => "EFFECT_OPTION",
            FlowError::FlowExecution { .. } => "FLOW_EXECUTION",
            FlowError::InvalidDescriptor { .. } => "INVALID_DESCRIPTOR",
            FlowError::NotInitialized { .. } => "NOT_INITIALIZED",
            FlowError::Lifecycle(_) => "LIFECYCLE_ERROR",
            FlowError::InvalidCommand { .. } => "INVALID_COMMAND",
            FlowError::Io(_) => "IO_ERROR",
            FlowError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Wrap an engine failure to open `path`
    pub(crate) fn open(path: &std::path::Path, err: EngineError) -> Self {
        FlowError::Open {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    /// Wrap a stage failure while wiring or running a chain
    pub(crate) fn flow(stage: &str, err: EngineError) -> Self {
        FlowError::FlowExecution {
            stage: stage.to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = FlowError::OffsetOutOfRange {
            path: "test.wav".to_string(),
            offset: 10,
            total: 4,
        };
        assert_eq!(err.error_code(), "OFFSET_OUT_OF_RANGE");

        let err = FlowError::ShortWrite {
            path: "out.wav".to_string(),
            expected: 8,
            written: 3,
        };
        assert_eq!(err.error_code(), "SHORT_WRITE");
    }

    #[test]
    fn test_messages_carry_context() {
        let err = FlowError::flow("rate", EngineError::new("resampler exploded"));
        let msg = err.to_string();
        assert!(msg.contains("rate"));
        assert!(msg.contains("resampler exploded"));

        let err = FlowError::open(
            std::path::Path::new("/nope/missing.wav"),
            EngineError::new("no such file"),
        );
        assert!(err.to_string().contains("missing.wav"));
        assert_eq!(err.error_code(), "OPEN_ERROR");
    }
}
