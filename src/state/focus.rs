//! Focus-link synchronization: while linking is active every case keeps an
//! identical focused-field set, and focus mode cannot stay active on a case
//! with nothing (visibly) focused.

use super::machine::ModuleState;
use super::message::Notice;
use crate::engine::InputEngine;
use tracing::debug;

pub(crate) fn toggle_focused_input(state: &mut ModuleState, index: usize, name: &str) {
    {
        let case = &mut state.comparison_cases[index];
        if let Some(pos) = case.focused_inputs.iter().position(|f| f == name) {
            case.focused_inputs.remove(pos);
        } else {
            case.focused_inputs.push(name.to_string());
        }
    }
    if state.is_focus_link_active {
        mirror_from(state, index);
    }
}

pub(crate) fn set_focus_mode(state: &mut ModuleState, index: usize, active: bool) {
    state.comparison_cases[index].is_focus_mode_active = active;
    if state.is_focus_link_active {
        mirror_from(state, index);
    }
}

/// Enabling linking snapshots the currently-edited case's focus state onto
/// all others; disabling leaves each case's state as-is (they were already
/// mirrored while the link was active).
pub(crate) fn set_focus_link(state: &mut ModuleState, active: bool, source_index: usize) {
    state.is_focus_link_active = active;
    if active {
        mirror_from(state, source_index);
    }
}

/// Copies `source`'s focus selection onto every other case, skipping cases
/// that already match.
fn mirror_from(state: &mut ModuleState, source: usize) {
    let focused = state.comparison_cases[source].focused_inputs.clone();
    let mode = state.comparison_cases[source].is_focus_mode_active;
    for (i, case) in state.comparison_cases.iter_mut().enumerate() {
        if i == source {
            continue;
        }
        if case.focused_inputs == focused && case.is_focus_mode_active == mode {
            continue;
        }
        case.focused_inputs = focused.clone();
        case.is_focus_mode_active = mode;
    }
}

/// Forcibly disables focus mode wherever a case has zero focused fields, or
/// all of its focused fields are currently hidden by conditionals. With
/// linking active the disable applies to every case; otherwise only to the
/// offending one. A notice is surfaced either way.
pub(crate) fn enforce(state: &mut ModuleState, engines: &[InputEngine], notices: &mut Vec<Notice>) {
    let mut disable_all = false;
    let mut disabled_any = false;

    for (i, case) in state.comparison_cases.iter_mut().enumerate() {
        if !case.is_focus_mode_active {
            continue;
        }
        let visible = engines
            .get(i)
            .map(|e| e.visible_fields())
            .unwrap_or_default();
        let any_visible_focused = case
            .focused_inputs
            .iter()
            .any(|f| visible.iter().any(|v| v == f));
        if case.focused_inputs.is_empty() || !any_visible_focused {
            debug!(index = i, "focus mode disabled: no visible focused fields");
            case.is_focus_mode_active = false;
            disabled_any = true;
            if state.is_focus_link_active {
                disable_all = true;
            }
        }
    }

    if disable_all {
        for case in &mut state.comparison_cases {
            case.is_focus_mode_active = false;
        }
    }
    if disabled_any {
        notices.push(Notice::FocusModeDisabled);
    }
}
