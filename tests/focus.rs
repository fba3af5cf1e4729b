mod common;

use common::{board_with, set_input, small_schema};
use hikaku::prelude::*;

fn two_case_board() -> ComparisonBoard {
    let mut board = board_with(small_schema(), 4);
    board.apply(Message::AddComparisonCol).expect("second case");
    board
}

fn focus(board: &mut ComparisonBoard, index: usize, name: &str) {
    board
        .apply(Message::ToggleFocusedInput {
            index,
            name: name.to_string(),
        })
        .expect("toggle focus");
}

#[test]
fn toggling_focus_without_linking_stays_local() {
    let mut board = two_case_board();
    focus(&mut board, 0, "rate");
    assert_eq!(board.case(0).expect("case").focused_inputs, vec!["rate"]);
    assert!(board.case(1).expect("case").focused_inputs.is_empty());

    // Toggling again removes the entry.
    focus(&mut board, 0, "rate");
    assert!(board.case(0).expect("case").focused_inputs.is_empty());
}

#[test]
fn enabling_the_link_snapshots_the_source_case() {
    let mut board = two_case_board();
    focus(&mut board, 0, "rate");
    focus(&mut board, 0, "region");
    focus(&mut board, 1, "backup");

    board
        .apply(Message::SetFocusLinkActive {
            active: true,
            source_index: 0,
        })
        .expect("enable link");

    assert!(board.state().is_focus_link_active);
    let expected = vec!["rate".to_string(), "region".to_string()];
    for case in &board.state().comparison_cases {
        assert_eq!(case.focused_inputs, expected);
    }
}

#[test]
fn linked_cases_mirror_every_focus_change() {
    let mut board = two_case_board();
    board
        .apply(Message::SetFocusLinkActive {
            active: true,
            source_index: 0,
        })
        .expect("enable link");

    focus(&mut board, 1, "backup");
    focus(&mut board, 0, "rate");

    let cases = &board.state().comparison_cases;
    assert_eq!(cases[0].focused_inputs, cases[1].focused_inputs);
    assert_eq!(
        cases[0].focused_inputs,
        vec!["backup".to_string(), "rate".to_string()]
    );
}

#[test]
fn disabling_the_link_leaves_cases_independent_again() {
    let mut board = two_case_board();
    board
        .apply(Message::SetFocusLinkActive {
            active: true,
            source_index: 0,
        })
        .expect("enable link");
    focus(&mut board, 0, "rate");

    board
        .apply(Message::SetFocusLinkActive {
            active: false,
            source_index: 0,
        })
        .expect("disable link");
    focus(&mut board, 0, "backup");

    let cases = &board.state().comparison_cases;
    assert_eq!(
        cases[0].focused_inputs,
        vec!["rate".to_string(), "backup".to_string()]
    );
    assert_eq!(cases[1].focused_inputs, vec!["rate".to_string()]);
}

#[test]
fn focus_mode_with_nothing_focused_is_forced_off() {
    let mut board = two_case_board();
    board
        .apply(Message::SetFocusModeActive {
            index: 0,
            active: true,
        })
        .expect("activate focus mode");

    assert!(!board.case(0).expect("case").is_focus_mode_active);
    assert!(board.drain_notices().contains(&Notice::FocusModeDisabled));
}

#[test]
fn focus_mode_survives_while_a_focused_field_is_visible() {
    let mut board = two_case_board();
    set_input(&mut board, 0, "backup", "Yes");
    focus(&mut board, 0, "capacity");
    board
        .apply(Message::SetFocusModeActive {
            index: 0,
            active: true,
        })
        .expect("activate focus mode");

    assert!(board.case(0).expect("case").is_focus_mode_active);
    assert!(board.drain_notices().is_empty());
}

#[test]
fn hiding_the_last_focused_field_disables_focus_mode() {
    let mut board = two_case_board();
    set_input(&mut board, 0, "backup", "Yes");
    focus(&mut board, 0, "capacity");
    board
        .apply(Message::SetFocusModeActive {
            index: 0,
            active: true,
        })
        .expect("activate focus mode");
    assert!(board.case(0).expect("case").is_focus_mode_active);
    board.drain_notices();

    // Flipping backup hides capacity, the only focused field.
    set_input(&mut board, 0, "backup", "No");

    assert!(!board.case(0).expect("case").is_focus_mode_active);
    assert!(board.drain_notices().contains(&Notice::FocusModeDisabled));
}

#[test]
fn forced_disable_propagates_to_all_cases_while_linked() {
    let mut board = two_case_board();
    set_input(&mut board, 0, "backup", "Yes");
    set_input(&mut board, 1, "backup", "Yes");
    focus(&mut board, 0, "capacity");
    board
        .apply(Message::SetFocusLinkActive {
            active: true,
            source_index: 0,
        })
        .expect("enable link");
    board
        .apply(Message::SetFocusModeActive {
            index: 0,
            active: true,
        })
        .expect("activate focus mode");
    assert!(
        board
            .state()
            .comparison_cases
            .iter()
            .all(|c| c.is_focus_mode_active)
    );
    board.drain_notices();

    // Case 0 loses its only visible focused field; with the link active the
    // disable applies everywhere, even though case 1 still shows capacity.
    set_input(&mut board, 0, "backup", "No");

    assert!(
        board
            .state()
            .comparison_cases
            .iter()
            .all(|c| !c.is_focus_mode_active)
    );
    assert!(board.drain_notices().contains(&Notice::FocusModeDisabled));
}
