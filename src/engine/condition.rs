use super::InputState;
use crate::schema::Conditional;
use ahash::AHashMap;

/// Evaluates a single conditional against the current state map and context.
///
/// A conditional that references a field which is missing or currently hidden
/// fails outright: visibility does not cascade through hidden dependencies.
pub(crate) fn conditional_passes(
    cond: &Conditional,
    states: &AHashMap<String, InputState>,
    context: &AHashMap<String, String>,
) -> bool {
    match cond {
        Conditional::FieldEquals { field, value } => {
            visible_value(states, field).is_some_and(|v| v == value)
        }
        Conditional::FieldNotEquals { field, value } => {
            visible_value(states, field).is_some_and(|v| v != value)
        }
        Conditional::FieldIn { field, values } => {
            visible_value(states, field).is_some_and(|v| values.iter().any(|c| c == v))
        }
        Conditional::ContextEquals { key, value } => {
            context.get(key).is_some_and(|v| v == value)
        }
    }
}

/// All conditionals must pass; an empty list always passes.
pub(crate) fn all_pass(
    conds: &[Conditional],
    states: &AHashMap<String, InputState>,
    context: &AHashMap<String, String>,
) -> bool {
    conds.iter().all(|c| conditional_passes(c, states, context))
}

fn visible_value<'a>(states: &'a AHashMap<String, InputState>, field: &str) -> Option<&'a str> {
    states
        .get(field)
        .filter(|s| s.is_visible)
        .map(|s| s.value.as_str())
}
