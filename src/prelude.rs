//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types from the hikaku crate so callers
//! get the core functionality without importing each type individually.

// Schema model and conversion
pub use crate::schema::{
    Conditional, DefaultRule, FieldKind, FieldOption, FieldSchema, IntoSchema, ModuleSchema,
    ValidatorKind, ValidatorRule,
};

// Input resolution
pub use crate::engine::{
    InitialValues, InputEngine, InputState, OptionCache, OptionRequest, ResolveFlags,
};

// Comparison state machine
pub use crate::state::{
    AnalysisResult, BatchRef, CaseData, ChartControlAllocation, ComparisonBoard, ComparisonCase,
    Effect, Message, ModuleConfig, ModuleState, Notice, refresh_case_options, run_case_at_index,
    run_effects,
};

// Orchestration and gateways
pub use crate::gateway::{
    AnalysisGateway, MemoryGateway, NamePrompt, OptionsGateway, PersistenceGateway,
    SavedBatchRecord, SavedCaseDataRecord, SavedCaseRecord,
};
pub use crate::orchestrator::{SaveOrchestrator, SaveOutcome};

// Bootstrap
pub use crate::bootstrap::{InitialQuery, parse_initial_query, seed_from_query};

// Error types
pub use crate::error::{
    AnalysisError, EffectError, PersistenceError, ResolveError, SaveError, SchemaConversionError,
    StateError,
};
