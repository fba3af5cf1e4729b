use super::InputState;
use super::condition::all_pass;
use super::validate::{round_default, run_validators};
use crate::error::ResolveError;
use crate::schema::FieldSchema;
use ahash::AHashMap;

/// Upper bound on stabilization passes. A well-formed schema settles in a
/// handful of passes; hitting the bound means the conditionals form a cycle.
pub(crate) const MAX_RESOLVE_PASSES: usize = 64;

/// Runs one full resolution pass over every field in schema order, mutating
/// the state map in place. Returns `true` when anything changed.
///
/// Visibility, option filtering, defaulting and validation are evaluated
/// against the *current* map, so a value assigned by a default earlier in the
/// pass is already seen by conditionals later in the same pass.
pub(crate) fn resolve_once(
    fields: &[FieldSchema],
    states: &mut AHashMap<String, InputState>,
    context: &AHashMap<String, String>,
) -> bool {
    let mut changed = false;

    for field in fields {
        let was = states
            .get(&field.name)
            .cloned()
            .unwrap_or_default();
        let mut state = was.clone();

        // 1. Visibility. A flip to hidden resets the value.
        state.is_visible = all_pass(&field.conditionals, states, context);
        if !state.is_visible {
            state.value.clear();
            state.error.clear();
            state.warning.clear();
        }

        // 2. Declared options are filtered by their own conditionals; a value
        // that fell out of the filtered list is cleared. Fetched option lists
        // (categorical fields with no declared options) pass through as-is.
        if field.kind.is_selection() && !field.options.is_empty() {
            let filtered: Vec<String> = field
                .options
                .iter()
                .filter(|opt| all_pass(&opt.conditionals, states, context))
                .map(|opt| opt.value.clone())
                .collect();
            if !state.value.is_empty() && !filtered.contains(&state.value) {
                state.value.clear();
            }
            state.options = filtered;
        }

        // 3. Default assignment, suppressed while the field is mid-edit or
        // was intentionally emptied.
        if state.is_visible
            && state.value.is_empty()
            && !state.is_focused
            && !state.was_just_manually_cleared
        {
            if let Some(default) = pick_default(field, &state.options, states, context) {
                state.value = default;
            }
        }

        // 4. Validation applies to numeric fields with a non-empty value.
        if field.kind.is_numeric() && state.is_visible && !state.value.is_empty() {
            let outcome = run_validators(&field.validators, &state.value);
            state.error = outcome.error;
            state.warning = outcome.warning;
        } else {
            state.error.clear();
            state.warning.clear();
        }

        if state != was {
            changed = true;
        }
        states.insert(field.name.clone(), state);
    }

    changed
}

/// Iterates `resolve_once` to a fixed point, with a bounded pass count so a
/// schema whose conditionals chase each other is reported instead of looping.
pub(crate) fn stabilize(
    fields: &[FieldSchema],
    states: &mut AHashMap<String, InputState>,
    context: &AHashMap<String, String>,
) -> Result<(), ResolveError> {
    for _ in 0..MAX_RESOLVE_PASSES {
        if !resolve_once(fields, states, context) {
            return Ok(());
        }
    }
    Err(ResolveError::CycleDetected {
        passes: MAX_RESOLVE_PASSES,
    })
}

/// Picks the default value for an empty field: the first declared rule whose
/// conditionals pass, else the single remaining option, with boolean-shaped
/// option lists pinned to `"No"`.
fn pick_default(
    field: &FieldSchema,
    options: &[String],
    states: &AHashMap<String, InputState>,
    context: &AHashMap<String, String>,
) -> Option<String> {
    if !field.defaults.is_empty() {
        return field
            .defaults
            .iter()
            .find(|rule| all_pass(&rule.conditionals, states, context))
            .map(|rule| round_default(&rule.value));
    }
    if is_boolean_shaped(options) {
        return Some("No".to_string());
    }
    if options.len() == 1 {
        return Some(options[0].clone());
    }
    None
}

/// Options are exactly `{Yes, No}` in either order, or a singleton of one.
fn is_boolean_shaped(options: &[String]) -> bool {
    match options {
        [a] => a == "Yes" || a == "No",
        [a, b] => (a == "Yes" && b == "No") || (a == "No" && b == "Yes"),
        _ => false,
    }
}

/// Creates a blank state entry for one field; everything is derived by the
/// first stabilization pass.
pub(crate) fn blank_state() -> InputState {
    InputState {
        value: String::new(),
        is_visible: true,
        error: String::new(),
        warning: String::new(),
        options: Vec::new(),
        is_focused: false,
        was_just_manually_cleared: false,
    }
}
