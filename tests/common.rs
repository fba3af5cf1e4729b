//! Common test utilities: schema builders, scripted collaborators and
//! persistence seeding helpers.
use ahash::AHashMap;
use hikaku::prelude::*;
use uuid::Uuid;

/// Builds the canonical test schema for an electricity module:
///
/// - `region`: categorical with declared options `US` / `EU`, no default
/// - `rate`: continuous, default `10` conditioned on `region = US`,
///   must be greater than zero
/// - `technology`: categorical with a remotely fetched option list
/// - `backup`: boolean-shaped options field (`Yes` / `No`)
/// - `capacity`: continuous, visible only while `backup = Yes`
#[allow(dead_code)]
pub fn energy_schema() -> ModuleSchema {
    let mut region = FieldSchema::new("region", FieldKind::Categorical);
    region.options = vec![
        FieldOption {
            value: "US".to_string(),
            conditionals: vec![],
        },
        FieldOption {
            value: "EU".to_string(),
            conditionals: vec![],
        },
    ];

    let mut rate = FieldSchema::new("rate", FieldKind::Continuous);
    rate.defaults = vec![DefaultRule {
        conditionals: vec![Conditional::FieldEquals {
            field: "region".to_string(),
            value: "US".to_string(),
        }],
        value: "10".to_string(),
    }];
    rate.validators = vec![ValidatorRule {
        kind: ValidatorKind::Gt,
        args: vec![0.0],
        warning: false,
    }];

    let technology = FieldSchema::new("technology", FieldKind::Categorical);

    let mut backup = FieldSchema::new("backup", FieldKind::Options);
    backup.options = vec![
        FieldOption {
            value: "Yes".to_string(),
            conditionals: vec![],
        },
        FieldOption {
            value: "No".to_string(),
            conditionals: vec![],
        },
    ];

    let mut capacity = FieldSchema::new("capacity", FieldKind::Continuous);
    capacity.conditionals = vec![Conditional::FieldEquals {
        field: "backup".to_string(),
        value: "Yes".to_string(),
    }];
    capacity.validators = vec![ValidatorRule {
        kind: ValidatorKind::Numeric,
        args: vec![],
        warning: false,
    }];

    ModuleSchema {
        module: "electricity".to_string(),
        sub_module: None,
        version: 2,
        fields: vec![region, rate, technology, backup, capacity],
    }
}

/// A minimal schema without fetched categoricals, for state-machine tests
/// that do not exercise option loading.
#[allow(dead_code)]
pub fn small_schema() -> ModuleSchema {
    let mut schema = energy_schema();
    schema.fields.retain(|f| f.name != "technology");
    schema
}

#[allow(dead_code)]
pub fn module_config(max: usize) -> ModuleConfig {
    ModuleConfig {
        module: "electricity".to_string(),
        sub_module: None,
        max_comparison_cases: max,
    }
}

#[allow(dead_code)]
pub fn board_with(schema: ModuleSchema, max: usize) -> ComparisonBoard {
    ComparisonBoard::new(module_config(max), schema, AHashMap::new())
        .expect("board construction should succeed")
}

/// Routes one keystroke into a slot, panicking on transition errors.
#[allow(dead_code)]
pub fn set_input(board: &mut ComparisonBoard, index: usize, name: &str, value: &str) {
    board
        .apply(Message::SetInputValue {
            index,
            name: name.to_string(),
            value: value.to_string(),
            flags: ResolveFlags::default(),
        })
        .expect("set_input");
}

/// Runs one stubbed analysis for a slot.
#[allow(dead_code)]
pub fn run_stub_analysis(board: &mut ComparisonBoard, index: usize) {
    run_case_at_index(board, &mut StubAnalysis, index, &["supply"]).expect("analysis run");
}

/// Seeds a persisted case (identity plus data record) and returns its id.
#[allow(dead_code)]
pub fn seed_saved_case(
    store: &mut MemoryGateway,
    name: &str,
    module_version: u32,
    input_values: &[(&str, &str)],
    with_result: bool,
) -> Uuid {
    let id = Uuid::new_v4();
    store
        .put_case(SavedCaseRecord {
            id,
            module: "electricity".to_string(),
            sub_module: None,
            name: name.to_string(),
            created_at_ms: 0,
        })
        .expect("put_case");
    store
        .put_case_data(SavedCaseDataRecord {
            case_id: id,
            module_version,
            input_values: input_values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            analysis_result: with_result
                .then(|| AnalysisResult::from_iter([(
                    "supply".to_string(),
                    serde_json::json!({"total": 42.0}),
                )])),
            custom_data: None,
            input_group_open_states: AHashMap::new(),
        })
        .expect("put_case_data");
    id
}

/// Prompt collaborator fed from a script; records every message it was shown.
#[allow(dead_code)]
pub struct ScriptedPrompt {
    answers: Vec<Option<String>>,
    pub messages: Vec<String>,
}

#[allow(dead_code)]
impl ScriptedPrompt {
    pub fn new(answers: &[Option<&str>]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.map(str::to_string)).collect(),
            messages: Vec::new(),
        }
    }
}

impl NamePrompt for ScriptedPrompt {
    fn prompt(&mut self, message: &str) -> Option<String> {
        self.messages.push(message.to_string());
        if self.answers.is_empty() {
            None
        } else {
            self.answers.remove(0)
        }
    }
}

/// Options gateway answering from a fixed per-field table; counts fetches so
/// deduplication is observable.
#[allow(dead_code)]
#[derive(Default)]
pub struct FixedOptions {
    pub table: AHashMap<String, Vec<String>>,
    pub fetch_count: usize,
}

#[allow(dead_code)]
impl FixedOptions {
    pub fn with(field: &str, options: &[&str]) -> Self {
        let mut table = AHashMap::new();
        table.insert(
            field.to_string(),
            options.iter().map(|o| o.to_string()).collect(),
        );
        Self {
            table,
            fetch_count: 0,
        }
    }
}

impl OptionsGateway for FixedOptions {
    fn fetch(&mut self, request: &OptionRequest) -> Result<Vec<String>, AnalysisError> {
        self.fetch_count += 1;
        Ok(self.table.get(&request.field).cloned().unwrap_or_default())
    }
}

/// Analysis gateway echoing the request type back in a stub payload.
#[allow(dead_code)]
pub struct StubAnalysis;

impl AnalysisGateway for StubAnalysis {
    fn run(
        &mut self,
        request_type: &str,
        body: &AHashMap<String, String>,
    ) -> Result<serde_json::Value, AnalysisError> {
        Ok(serde_json::json!({
            "type": request_type,
            "fields": body.len(),
        }))
    }
}

/// Persistence wrapper that starts failing `put_case` after a set number of
/// successful writes, for partial-failure tests.
#[allow(dead_code)]
pub struct FlakyStore {
    pub inner: MemoryGateway,
    pub allowed_case_puts: usize,
    puts: usize,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn failing_after(allowed_case_puts: usize) -> Self {
        Self {
            inner: MemoryGateway::new(),
            allowed_case_puts,
            puts: 0,
        }
    }
}

impl PersistenceGateway for FlakyStore {
    fn get_case(&self, id: uuid::Uuid) -> Result<Option<SavedCaseRecord>, PersistenceError> {
        self.inner.get_case(id)
    }

    fn put_case(&mut self, record: SavedCaseRecord) -> Result<(), PersistenceError> {
        if self.puts >= self.allowed_case_puts {
            return Err(PersistenceError::Backend("simulated outage".to_string()));
        }
        self.puts += 1;
        self.inner.put_case(record)
    }

    fn get_case_data(
        &self,
        case_id: uuid::Uuid,
    ) -> Result<Option<SavedCaseDataRecord>, PersistenceError> {
        self.inner.get_case_data(case_id)
    }

    fn put_case_data(&mut self, record: SavedCaseDataRecord) -> Result<(), PersistenceError> {
        self.inner.put_case_data(record)
    }

    fn delete_cases(&mut self, ids: &[uuid::Uuid]) -> Result<(), PersistenceError> {
        self.inner.delete_cases(ids)
    }

    fn case_names(
        &self,
        module: &str,
        sub_module: Option<&str>,
    ) -> Result<Vec<String>, PersistenceError> {
        self.inner.case_names(module, sub_module)
    }

    fn get_batch(&self, id: uuid::Uuid) -> Result<Option<SavedBatchRecord>, PersistenceError> {
        self.inner.get_batch(id)
    }

    fn put_batch(&mut self, record: SavedBatchRecord) -> Result<(), PersistenceError> {
        self.inner.put_batch(record)
    }

    fn batch_names(
        &self,
        module: &str,
        sub_module: Option<&str>,
    ) -> Result<Vec<String>, PersistenceError> {
        self.inner.batch_names(module, sub_module)
    }
}
