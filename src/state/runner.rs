//! Executes the side effects transitions request, dispatching follow-up
//! messages back into the board. Results deliberately race with slot
//! identity: a resolved load applies to its index whatever occupies the slot
//! by then, because no generation counter ties the request to the occupant.

use super::case::{AnalysisResult, BatchRef, CaseData, ComparisonCase};
use super::machine::ComparisonBoard;
use super::message::{Effect, Message, Notice};
use crate::error::EffectError;
use crate::gateway::{AnalysisGateway, OptionsGateway, PersistenceGateway};
use std::collections::VecDeque;
use tracing::warn;
use uuid::Uuid;

/// Drains an effect queue against the persistence gateway. Follow-up
/// transitions may request further effects (batch loads fan out into member
/// loads); those are processed in order until the queue is empty.
pub fn run_effects<P: PersistenceGateway>(
    board: &mut ComparisonBoard,
    store: &mut P,
    effects: Vec<Effect>,
) -> Result<(), EffectError> {
    let mut queue: VecDeque<Effect> = effects.into();
    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::LoadSavedCase {
                index,
                saved_case_id,
            } => {
                let follow_ups = load_saved_case(board, store, index, saved_case_id)?;
                queue.extend(follow_ups);
            }
            Effect::LoadBatch { batch_id } => match store.get_batch(batch_id)? {
                Some(record) => {
                    let batch = BatchRef {
                        id: record.id,
                        name: record.name,
                        case_ids: record.case_ids,
                    };
                    queue.extend(board.apply(Message::SetBatch { batch })?);
                }
                None => warn!(%batch_id, "batch not found; load ignored"),
            },
            Effect::DeleteSavedCases { ids } => store.delete_cases(&ids)?,
        }
    }
    Ok(())
}

/// Resolves one case load. A case persisted under another schema version is
/// stale: it is deleted outright, a warning notice is surfaced, and the slot
/// is left empty.
fn load_saved_case<P: PersistenceGateway>(
    board: &mut ComparisonBoard,
    store: &mut P,
    index: usize,
    saved_case_id: Uuid,
) -> Result<Vec<Effect>, EffectError> {
    let record = store.get_case(saved_case_id)?;
    let data = store.get_case_data(saved_case_id)?;
    let (record, data) = match (record, data) {
        (Some(record), Some(data)) => (record, data),
        _ => {
            warn!(%saved_case_id, "saved case or its data is missing; slot left empty");
            let effects = board.apply(Message::SetComparisonCaseAtIndex {
                index,
                case: Box::new(ComparisonCase::empty()),
            })?;
            return Ok(effects);
        }
    };

    if data.module_version != board.schema().version {
        warn!(
            %saved_case_id,
            saved_version = data.module_version,
            current_version = board.schema().version,
            "saved case is stale; deleting it"
        );
        store.delete_cases(&[saved_case_id])?;
        board.push_notice(Notice::StaleCaseDeleted { saved_case_id });
        let effects = board.apply(Message::SetComparisonCaseAtIndex {
            index,
            case: Box::new(ComparisonCase::empty()),
        })?;
        return Ok(effects);
    }

    // Fresh in-memory id on every load: the old one is a list key.
    let case = ComparisonCase {
        id: Uuid::new_v4(),
        saved_case_id: Some(record.id),
        name: Some(record.name),
        data: Some(CaseData {
            input_values: data.input_values,
            analysis_result: data.analysis_result,
            custom_data: data.custom_data,
            input_group_open_states: data.input_group_open_states,
        }),
        focused_inputs: Vec::new(),
        is_focus_mode_active: false,
        is_running: false,
        is_loading: false,
        is_unsaved: false,
    };
    let effects = board.apply(Message::SetComparisonCaseAtIndex {
        index,
        case: Box::new(case),
    })?;
    Ok(effects)
}

/// Drives one analysis run for a slot: marks it running, issues each named
/// request with the flattened visible-value body, merges the responses into
/// one result bag, and installs it. A slot that refuses to start (result
/// already present) is left untouched.
pub fn run_case_at_index<A: AnalysisGateway>(
    board: &mut ComparisonBoard,
    gateway: &mut A,
    index: usize,
    request_types: &[&str],
) -> Result<(), EffectError> {
    board.apply(Message::SetCaseToRunningAtIndex { index })?;
    let running = board.case(index).is_some_and(|c| c.is_running);
    if !running {
        return Ok(());
    }
    let body = board
        .engine(index)
        .map(|e| e.visible_values())
        .unwrap_or_default();

    let mut result = AnalysisResult::default();
    for request_type in request_types {
        match gateway.run(request_type, &body) {
            Ok(response) => {
                result.insert((*request_type).to_string(), response);
            }
            Err(e) => {
                board.apply(Message::StopRunningCaseAtIndex { index })?;
                return Err(e.into());
            }
        }
    }
    board.apply(Message::SetAnalysisResultAtIndex { index, result })?;
    Ok(())
}

/// Fills in the option lists a slot's categorical fields are waiting on,
/// deduplicating through the board's process-wide request cache. A signature
/// already pending elsewhere is skipped; a resolved one is served from the
/// cache without another fetch.
pub fn refresh_case_options<G: OptionsGateway>(
    board: &mut ComparisonBoard,
    gateway: &mut G,
    index: usize,
) -> Result<(), EffectError> {
    loop {
        let requests = match board.engine(index) {
            Some(engine) => engine.needed_options(),
            None => return Ok(()),
        };
        if requests.is_empty() {
            return Ok(());
        }
        // Progress means a delivery actually changed engine state. An empty
        // fetched list is a valid answer that leaves the field's options
        // empty (and still wanted), so counting the delivery itself would
        // spin forever.
        let mut progressed = false;
        for request in requests {
            if let Some(options) = board
                .option_cache()
                .ready(&request.signature)
                .map(<[String]>::to_vec)
            {
                progressed |= deliver(board, index, &request.field, options)?;
            } else if board.option_cache_mut().begin(&request.signature) {
                let options = gateway.fetch(&request)?;
                board
                    .option_cache_mut()
                    .complete(&request.signature, options.clone());
                progressed |= deliver(board, index, &request.field, options)?;
            }
            // Otherwise the same signature is in flight for another slot;
            // this request is skipped and shares the result once it lands.
        }
        if !progressed {
            return Ok(());
        }
    }
}

fn deliver(
    board: &mut ComparisonBoard,
    index: usize,
    field: &str,
    options: Vec<String>,
) -> Result<bool, EffectError> {
    match board.engine_mut(index) {
        Some(engine) => Ok(engine
            .deliver_options(field, options)
            .map_err(crate::error::StateError::Resolve)?),
        None => Ok(false),
    }
}
