use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when converting a custom metadata format into a
/// canonical `ModuleSchema`.
#[derive(Error, Debug, Clone)]
pub enum SchemaConversionError {
    #[error("Invalid schema metadata: {0}")]
    ValidationError(String),

    #[error("Duplicate field name '{name}' in module '{module}'")]
    DuplicateField { module: String, name: String },
}

/// Errors that can occur while resolving a schema against an input state.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    #[error("Field '{0}' is not part of the loaded schema")]
    UnknownField(String),

    #[error(
        "Resolution did not reach a fixed point after {passes} passes; the schema likely contains a conditional cycle"
    )]
    CycleDetected { passes: usize },
}

/// Errors raised by comparison state transitions.
#[derive(Error, Debug, Clone)]
pub enum StateError {
    #[error("Cannot exceed the maximum of {max} comparison cases")]
    CapacityExceeded { max: usize },

    #[error("Case index {index} is out of bounds for {len} comparison cases")]
    SlotOutOfBounds { index: usize, len: usize },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Errors surfaced by a persistence gateway implementation.
#[derive(Error, Debug, Clone)]
pub enum PersistenceError {
    #[error("Saved record '{0}' was not found")]
    NotFound(Uuid),

    #[error("Failed to encode or decode a persisted record: {0}")]
    Codec(String),

    #[error("Persistence backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by an analysis gateway implementation.
#[derive(Error, Debug, Clone)]
pub enum AnalysisError {
    #[error("Analysis request '{request_type}' failed: {message}")]
    RequestFailed {
        request_type: String,
        message: String,
    },
}

/// Errors that can occur while orchestrating a save or batch save.
#[derive(Error, Debug, Clone)]
pub enum SaveError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    State(#[from] StateError),
}

/// Errors that can occur while executing the side effects a transition
/// requested (loads, cascading deletes, analysis runs).
#[derive(Error, Debug, Clone)]
pub enum EffectError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}
