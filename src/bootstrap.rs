//! One-shot seeding of the case list from initial query parameters.
//!
//! `loadCaseIds=<id,id,...>`, `loadBatchId=<id>` and
//! `duplicateCaseIds=<id,id,...>` are consumed exactly once on mount; the
//! returned query string has them stripped so a reload does not re-seed.

use crate::error::EffectError;
use crate::gateway::PersistenceGateway;
use crate::state::{ComparisonBoard, Message, run_effects};
use itertools::Itertools;
use tracing::warn;
use uuid::Uuid;

/// The recognized seeding parameters, parsed out of a query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitialQuery {
    pub load_case_ids: Vec<Uuid>,
    pub load_batch_id: Option<Uuid>,
    pub duplicate_case_ids: Vec<Uuid>,
    /// The query string with the seeding parameters removed, other
    /// parameters preserved in order.
    pub stripped_query: String,
}

/// Parses a raw query string (`a=b&loadCaseIds=x,y`). Unparseable ids are
/// skipped with a warning rather than failing the mount.
pub fn parse_initial_query(query: &str) -> InitialQuery {
    let mut parsed = InitialQuery::default();
    let mut kept = Vec::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "loadCaseIds" => parsed.load_case_ids = parse_id_list(value),
            "loadBatchId" => parsed.load_batch_id = parse_id(value),
            "duplicateCaseIds" => parsed.duplicate_case_ids = parse_id_list(value),
            _ => kept.push(pair),
        }
    }
    parsed.stripped_query = kept.iter().join("&");
    parsed
}

/// Seeds the board from the query parameters: batch first, then individual
/// case loads into successive slots, then duplicated cases (loaded and
/// replaced in place by an unsaved copy). Returns the stripped query string.
pub fn seed_from_query<P: PersistenceGateway>(
    board: &mut ComparisonBoard,
    store: &mut P,
    query: &str,
) -> Result<String, EffectError> {
    let parsed = parse_initial_query(query);

    let mut slot = 0usize;
    if let Some(batch_id) = parsed.load_batch_id {
        let effects = board.apply(Message::LoadBatchId { batch_id })?;
        run_effects(board, store, effects)?;
        slot = board.state().comparison_cases.len();
    }

    for saved_case_id in parsed.load_case_ids {
        let effects = board.apply(Message::SetComparisonCaseIdAtIndex {
            index: slot,
            saved_case_id,
        })?;
        run_effects(board, store, effects)?;
        slot += 1;
    }

    for saved_case_id in parsed.duplicate_case_ids {
        let effects = board.apply(Message::SetComparisonCaseIdAtIndex {
            index: slot,
            saved_case_id,
        })?;
        run_effects(board, store, effects)?;
        if let Some(case) = board.case(slot) {
            let copy = case.duplicate();
            let effects = board.apply(Message::SetComparisonCaseAtIndex {
                index: slot,
                case: Box::new(copy),
            })?;
            run_effects(board, store, effects)?;
        }
        slot += 1;
    }

    Ok(parsed.stripped_query)
}

fn parse_id_list(raw: &str) -> Vec<Uuid> {
    raw.split(',')
        .filter(|s| !s.is_empty())
        .filter_map(parse_id_str)
        .collect()
}

fn parse_id(raw: &str) -> Option<Uuid> {
    if raw.is_empty() { None } else { parse_id_str(raw) }
}

fn parse_id_str(raw: &str) -> Option<Uuid> {
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            warn!(raw, "ignoring unparseable case id in query parameters");
            None
        }
    }
}
