//! Save orchestration: persisting cases under uniqueness-checked names and
//! grouping them into saved batches.

use crate::error::{PersistenceError, SaveError};
use crate::gateway::{
    NamePrompt, PersistenceGateway, SavedBatchRecord, SavedCaseDataRecord, SavedCaseRecord, now_ms,
};
use crate::state::{BatchRef, CaseData, ComparisonBoard, ComparisonCase, Message, Notice};
use tracing::warn;
use uuid::Uuid;

/// How a save attempt ended when it did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { saved_case_id: Uuid },
    /// The case has no analysis result; a notice was surfaced instead.
    NotRun,
    /// The user cancelled the naming prompt.
    Cancelled,
}

/// Coordinates the persistence gateway and the naming prompt around the
/// comparison board.
pub struct SaveOrchestrator<'a, P: PersistenceGateway, N: NamePrompt> {
    store: &'a mut P,
    prompt: &'a mut N,
}

impl<'a, P: PersistenceGateway, N: NamePrompt> SaveOrchestrator<'a, P, N> {
    pub fn new(store: &'a mut P, prompt: &'a mut N) -> Self {
        Self { store, prompt }
    }

    /// Persists the case at `index`: first the identity record, then the
    /// linked data record, then the merged now-saved case is dispatched back
    /// into its slot. A case that has not been run is refused with a notice;
    /// cancelling the prompt aborts the whole save.
    pub fn save_case_at_index(
        &mut self,
        board: &mut ComparisonBoard,
        index: usize,
    ) -> Result<SaveOutcome, SaveError> {
        let Some(case) = board.case(index).cloned() else {
            return Err(crate::error::StateError::SlotOutOfBounds {
                index,
                len: board.state().comparison_cases.len(),
            }
            .into());
        };
        if !case.has_result() {
            board.push_notice(Notice::RunBeforeSaving);
            return Ok(SaveOutcome::NotRun);
        }

        let module = board.config().module.clone();
        let sub_module = board.config().sub_module.clone();
        let existing = self.store.case_names(&module, sub_module.as_deref())?;
        let Some(name) = resolve_unique_name(self.prompt, &existing, "case") else {
            return Ok(SaveOutcome::Cancelled);
        };

        let data = case.data.clone().unwrap_or_default();
        let saved_case_id = self.persist_case(
            &module,
            sub_module.clone(),
            board.schema().version,
            &name,
            &data,
        )?;

        let merged = ComparisonCase {
            saved_case_id: Some(saved_case_id),
            name: Some(name),
            is_unsaved: false,
            ..case
        };
        board.apply(Message::SetComparisonCaseAtIndex {
            index,
            case: Box::new(merged),
        })?;
        Ok(SaveOutcome::Saved { saved_case_id })
    }

    /// Saves every unsaved case under an auto-incremented unique name of the
    /// form `"<batch name> <n>"`, then creates one batch record whose
    /// `case_ids` is the full ordered case list. The join is all-or-nothing:
    /// a single failure rejects the batch, and records already written stay
    /// written — there is no rollback.
    pub fn save_batch(
        &mut self,
        board: &mut ComparisonBoard,
    ) -> Result<Option<BatchRef>, SaveError> {
        let module = board.config().module.clone();
        let sub_module = board.config().sub_module.clone();
        let existing_batches = self.store.batch_names(&module, sub_module.as_deref())?;
        let Some(batch_name) = resolve_unique_name(self.prompt, &existing_batches, "batch") else {
            return Ok(None);
        };

        let cases = board.state().comparison_cases.clone();
        let unsaved_count = cases.iter().filter(|c| c.saved_case_id.is_none()).count();
        let mut names = self
            .unique_incremented_case_names(&module, sub_module.as_deref(), &batch_name, unsaved_count)?
            .into_iter();

        let mut case_ids = Vec::with_capacity(cases.len());
        for (index, case) in cases.iter().enumerate() {
            if let Some(saved) = case.saved_case_id {
                // Already persisted; contributes its existing id.
                case_ids.push(saved);
                continue;
            }
            let Some(name) = names.next() else {
                break;
            };
            let data = case.data.clone().unwrap_or_default();
            let saved_case_id = match self.persist_case(
                &module,
                sub_module.clone(),
                board.schema().version,
                &name,
                &data,
            ) {
                Ok(id) => id,
                Err(e) => {
                    warn!(
                        index,
                        error = %e,
                        "batch save failed mid-way; earlier case records are not rolled back"
                    );
                    return Err(e.into());
                }
            };
            case_ids.push(saved_case_id);
            let merged = ComparisonCase {
                saved_case_id: Some(saved_case_id),
                name: Some(name),
                is_unsaved: false,
                ..case.clone()
            };
            board.apply(Message::SetComparisonCaseAtIndex {
                index,
                case: Box::new(merged),
            })?;
        }

        let batch_id = Uuid::new_v4();
        self.store.put_batch(SavedBatchRecord {
            id: batch_id,
            module,
            sub_module,
            name: batch_name.clone(),
            case_ids: case_ids.clone(),
            created_at_ms: now_ms(),
        })?;
        let batch = BatchRef {
            id: batch_id,
            name: batch_name,
            case_ids,
        };
        board.adopt_saved_batch(batch.clone());
        Ok(Some(batch))
    }

    /// Produces `num` names of the form `"<starting_name> <n>"` that collide
    /// neither with each other nor with any persisted case name in the same
    /// module scope, probing from `n = 1` and always increasing.
    pub fn unique_incremented_case_names(
        &self,
        module: &str,
        sub_module: Option<&str>,
        starting_name: &str,
        num: usize,
    ) -> Result<Vec<String>, PersistenceError> {
        let existing = self.store.case_names(module, sub_module)?;
        let mut names = Vec::with_capacity(num);
        let mut n = 1usize;
        while names.len() < num {
            let candidate = format!("{} {}", starting_name, n);
            if !existing.contains(&candidate) {
                names.push(candidate);
            }
            n += 1;
        }
        Ok(names)
    }

    fn persist_case(
        &mut self,
        module: &str,
        sub_module: Option<String>,
        module_version: u32,
        name: &str,
        data: &CaseData,
    ) -> Result<Uuid, PersistenceError> {
        let saved_case_id = Uuid::new_v4();
        self.store.put_case(SavedCaseRecord {
            id: saved_case_id,
            module: module.to_string(),
            sub_module,
            name: name.to_string(),
            created_at_ms: now_ms(),
        })?;
        self.store.put_case_data(SavedCaseDataRecord {
            case_id: saved_case_id,
            module_version,
            input_values: data.input_values.clone(),
            analysis_result: data.analysis_result.clone(),
            custom_data: data.custom_data.clone(),
            input_group_open_states: data.input_group_open_states.clone(),
        })?;
        Ok(saved_case_id)
    }
}

/// The uniqueness-checking prompt loop. Iterative rather than recursive: on a
/// collision the prompt repeats with a "name already exists" message; `None`
/// or an empty entry aborts.
fn resolve_unique_name<N: NamePrompt>(
    prompt: &mut N,
    existing: &[String],
    what: &str,
) -> Option<String> {
    let mut message = format!("Enter a name for this {}:", what);
    loop {
        let name = prompt.prompt(&message)?.trim().to_string();
        if name.is_empty() {
            return None;
        }
        if existing.iter().any(|n| n == &name) {
            message = format!(
                "A {} named \"{}\" already exists. Enter a different name:",
                what, name
            );
            continue;
        }
        return Some(name);
    }
}
