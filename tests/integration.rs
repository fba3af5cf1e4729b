mod common;

use common::{
    FixedOptions, ScriptedPrompt, board_with, run_stub_analysis, seed_saved_case, set_input,
    small_schema,
};
use hikaku::prelude::*;
use uuid::Uuid;

#[test]
fn query_parsing_strips_seeding_parameters() {
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let batch = Uuid::new_v4();
    let query = format!(
        "tab=results&loadCaseIds={},{}&loadBatchId={}&theme=dark",
        first, second, batch
    );

    let parsed = parse_initial_query(&query);
    assert_eq!(parsed.load_case_ids, vec![first, second]);
    assert_eq!(parsed.load_batch_id, Some(batch));
    assert!(parsed.duplicate_case_ids.is_empty());
    assert_eq!(parsed.stripped_query, "tab=results&theme=dark");
}

#[test]
fn unparseable_ids_are_skipped_not_fatal() {
    let good = Uuid::new_v4();
    let query = format!("loadCaseIds=not-a-uuid,{}", good);
    let parsed = parse_initial_query(&query);
    assert_eq!(parsed.load_case_ids, vec![good]);
}

#[test]
fn seeding_loads_cases_into_successive_slots() {
    let mut store = MemoryGateway::new();
    let first = seed_saved_case(&mut store, "A", 2, &[("region", "US")], true);
    let second = seed_saved_case(&mut store, "B", 2, &[("region", "EU")], true);

    let mut board = board_with(small_schema(), 4);
    let stripped = seed_from_query(
        &mut board,
        &mut store,
        &format!("tab=results&loadCaseIds={},{}", first, second),
    )
    .expect("seed");

    assert_eq!(stripped, "tab=results");
    assert_eq!(board.state().comparison_cases.len(), 2);
    assert_eq!(board.case(0).expect("case").saved_case_id, Some(first));
    assert_eq!(board.case(1).expect("case").saved_case_id, Some(second));
}

#[test]
fn seeding_a_batch_then_cases_appends_after_the_members() {
    let mut store = MemoryGateway::new();
    let member = seed_saved_case(&mut store, "A", 2, &[("region", "US")], true);
    let extra = seed_saved_case(&mut store, "B", 2, &[("region", "EU")], true);
    let batch_id = Uuid::new_v4();
    store
        .put_batch(SavedBatchRecord {
            id: batch_id,
            module: "electricity".to_string(),
            sub_module: None,
            name: "Fleet".to_string(),
            case_ids: vec![member],
            created_at_ms: 0,
        })
        .expect("put batch");

    let mut board = board_with(small_schema(), 4);
    seed_from_query(
        &mut board,
        &mut store,
        &format!("loadBatchId={}&loadCaseIds={}", batch_id, extra),
    )
    .expect("seed");

    assert_eq!(board.case(0).expect("case").saved_case_id, Some(member));
    assert_eq!(board.case(1).expect("case").saved_case_id, Some(extra));
}

#[test]
fn seeding_duplicates_yields_unsaved_copies() {
    let mut store = MemoryGateway::new();
    let source = seed_saved_case(&mut store, "A", 2, &[("region", "US")], true);

    let mut board = board_with(small_schema(), 4);
    seed_from_query(
        &mut board,
        &mut store,
        &format!("duplicateCaseIds={}", source),
    )
    .expect("seed");

    let case = board.case(0).expect("case");
    assert_eq!(case.saved_case_id, None);
    assert_eq!(case.name, None);
    assert!(case.is_unsaved);
    let data = case.data.as_ref().expect("copied data");
    assert!(data.analysis_result.is_none());
    assert_eq!(data.input_values.get("region").map(String::as_str), Some("US"));
    assert_eq!(board.engine(0).expect("engine").value("region"), Some("US"));
}

#[test]
fn option_fetches_are_deduplicated_across_slots() {
    let schema = common::energy_schema();
    let mut board = board_with(schema, 4);
    board.apply(Message::AddComparisonCol).expect("add");
    set_input(&mut board, 0, "region", "US");
    set_input(&mut board, 1, "region", "US");

    let mut gateway = FixedOptions::with("technology", &["Solar", "Wind"]);
    refresh_case_options(&mut board, &mut gateway, 0).expect("refresh slot 0");
    refresh_case_options(&mut board, &mut gateway, 1).expect("refresh slot 1");

    // Both slots need the same signature; the second is served from the cache.
    assert_eq!(gateway.fetch_count, 1);
    assert_eq!(board.engine(0).expect("engine").value("technology"), Some("Solar"));
    assert_eq!(board.engine(1).expect("engine").value("technology"), Some("Solar"));
}

#[test]
fn empty_option_lists_do_not_stall_the_refresh() {
    let schema = common::energy_schema();
    let mut board = board_with(schema, 4);
    set_input(&mut board, 0, "region", "US");

    // An options source with nothing to offer for this selection answers
    // with an empty list; the refresh must accept that and return.
    let mut gateway = FixedOptions::default();
    refresh_case_options(&mut board, &mut gateway, 0).expect("refresh");

    assert_eq!(gateway.fetch_count, 1);
    let tech = board
        .engine(0)
        .and_then(|e| e.state("technology"))
        .expect("technology state")
        .clone();
    assert_eq!(tech.value, "");
    assert!(tech.options.is_empty());

    // A second refresh is served from the cache and terminates too.
    refresh_case_options(&mut board, &mut gateway, 0).expect("repeat refresh");
    assert_eq!(gateway.fetch_count, 1);
}

#[test]
fn changed_upstream_selection_fetches_a_new_signature() {
    let schema = common::energy_schema();
    let mut board = board_with(schema, 4);
    set_input(&mut board, 0, "region", "US");

    let mut gateway = FixedOptions::with("technology", &["Solar", "Wind"]);
    refresh_case_options(&mut board, &mut gateway, 0).expect("refresh");
    assert_eq!(gateway.fetch_count, 1);

    // A different preceding selection invalidates the cached list.
    set_input(&mut board, 0, "region", "EU");
    refresh_case_options(&mut board, &mut gateway, 0).expect("refresh");
    assert_eq!(gateway.fetch_count, 2);
}

#[test]
fn full_lifecycle_from_keystrokes_to_reload() {
    let schema = common::energy_schema();
    let mut board = board_with(schema.clone(), 4);
    let mut store = MemoryGateway::new();
    let mut options = FixedOptions::with("technology", &["Solar", "Wind"]);

    // Fill the form.
    set_input(&mut board, 0, "region", "US");
    refresh_case_options(&mut board, &mut options, 0).expect("options");
    set_input(&mut board, 0, "backup", "Yes");
    set_input(&mut board, 0, "capacity", "5");
    assert!(board.engine(0).expect("engine").is_valid());

    // Run and save.
    run_stub_analysis(&mut board, 0);
    let mut prompt = ScriptedPrompt::new(&[Some("Reference")]);
    let outcome = SaveOrchestrator::new(&mut store, &mut prompt)
        .save_case_at_index(&mut board, 0)
        .expect("save");
    let SaveOutcome::Saved { saved_case_id } = outcome else {
        panic!("expected a saved outcome");
    };

    // A second session seeds itself from the persisted id.
    let mut reloaded = board_with(schema, 4);
    seed_from_query(
        &mut reloaded,
        &mut store,
        &format!("loadCaseIds={}", saved_case_id),
    )
    .expect("seed");

    let case = reloaded.case(0).expect("case");
    assert_eq!(case.name.as_deref(), Some("Reference"));
    assert!(case.has_result());
    let engine = reloaded.engine(0).expect("engine");
    assert_eq!(engine.value("region"), Some("US"));
    assert_eq!(engine.value("backup"), Some("Yes"));
    assert_eq!(engine.value("capacity"), Some("5"));
}
