use super::case::{AnalysisResult, BatchRef, ComparisonCase};
use crate::engine::ResolveFlags;
use uuid::Uuid;

/// Whether duplicated cases share one chart-control widget or each get their
/// own. Derived after every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartControlAllocation {
    /// All run cases are the same underlying case duplicated into multiple
    /// slots; one shared control.
    Individual,
    /// The run cases differ; per-case controls.
    Group,
}

/// User-facing notices surfaced by transitions that must not throw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Saving was requested for a case that has not been run.
    RunBeforeSaving,
    /// Focus mode was forcibly disabled because a case ended up with no
    /// (visible) focused fields.
    FocusModeDisabled,
    /// A persisted case was saved under an outdated schema version and has
    /// been deleted; its inputs may need re-checking.
    StaleCaseDeleted { saved_case_id: Uuid },
}

/// The closed message set accepted by the comparison state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Appends an empty case; errors at `max_comparison_cases`.
    AddComparisonCol,
    /// Begins an async load of a saved case into a slot.
    SetComparisonCaseIdAtIndex { index: usize, saved_case_id: Uuid },
    /// Replaces the case at a slot, growing the array if needed.
    SetComparisonCaseAtIndex {
        index: usize,
        case: Box<ComparisonCase>,
    },
    /// Inserts a stripped copy of the case right after it; errors at capacity.
    DuplicateCaseAtIndexWithData { index: usize },
    /// Replaces the slot with an empty case whose defaults recompute.
    ResetComparisonCaseAtIndex { index: usize },
    /// Empties the slot but keeps its id and group-open state.
    ClearComparisonCaseAtIndex { index: usize },
    SetCaseToRunningAtIndex { index: usize },
    StopRunningCaseAtIndex { index: usize },
    /// Run completion: installs the merged result bag for a slot.
    SetAnalysisResultAtIndex {
        index: usize,
        result: AnalysisResult,
    },
    /// Removes a slot; removing the last slot leaves one empty case.
    RemoveComparisonCaseAtIndex { index: usize },
    /// Removes matching cases from the active set and deletes them from
    /// persistence (cascading).
    DeleteSavedCaseIds { ids: Vec<Uuid> },
    /// Begins an async load of batch metadata.
    LoadBatchId { batch_id: Uuid },
    /// Installs batch metadata and begins loading each member sequentially.
    SetBatch { batch: BatchRef },
    /// Routes a keystroke into the slot's input engine.
    SetInputValue {
        index: usize,
        name: String,
        value: String,
        flags: ResolveFlags,
    },
    /// Records a group's open/closed UI state on the slot.
    SetGroupOpenState {
        index: usize,
        group: String,
        open: bool,
    },
    ToggleFocusedInput { index: usize, name: String },
    SetFocusModeActive { index: usize, active: bool },
    /// Enabling snapshots `source_index`'s focus state onto all cases.
    SetFocusLinkActive { active: bool, source_index: usize },
}

/// Asynchronous side effects requested by a transition. The driver executes
/// them against the external gateways and dispatches the follow-up messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadSavedCase { index: usize, saved_case_id: Uuid },
    LoadBatch { batch_id: Uuid },
    DeleteSavedCases { ids: Vec<Uuid> },
}
