use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The merged result bag of one analysis run, keyed by request type.
pub type AnalysisResult = AHashMap<String, serde_json::Value>;

/// The working or persisted payload of one comparison case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseData {
    pub input_values: AHashMap<String, String>,
    pub analysis_result: Option<AnalysisResult>,
    pub custom_data: Option<serde_json::Value>,
    /// Open/closed state of the schema's input groups, UI chrome that
    /// survives clears and duplication.
    pub input_group_open_states: AHashMap<String, bool>,
}

/// One comparison case.
///
/// `id` is process-unique and regenerated on every load or duplication: it is
/// used as a list-rendering key, so reusing it across loads would corrupt
/// per-case component state. `saved_case_id` is the persisted identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonCase {
    pub id: Uuid,
    pub saved_case_id: Option<Uuid>,
    pub name: Option<String>,
    pub data: Option<CaseData>,
    pub focused_inputs: Vec<String>,
    pub is_focus_mode_active: bool,
    pub is_running: bool,
    pub is_loading: bool,
    pub is_unsaved: bool,
}

impl ComparisonCase {
    /// A freshly keyed empty case.
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            saved_case_id: None,
            name: None,
            data: None,
            focused_inputs: Vec::new(),
            is_focus_mode_active: false,
            is_running: false,
            is_loading: false,
            is_unsaved: false,
        }
    }

    /// A case with no data and no analysis result is empty.
    pub fn is_empty(&self) -> bool {
        self.saved_case_id.is_none()
            && self.name.is_none()
            && self
                .data
                .as_ref()
                .is_none_or(|d| d.analysis_result.is_none() && d.input_values.is_empty())
    }

    pub fn has_result(&self) -> bool {
        self.data
            .as_ref()
            .is_some_and(|d| d.analysis_result.is_some())
    }

    /// The identity used for chart-control allocation and batch membership:
    /// the persisted id when saved, the in-memory key otherwise.
    pub fn identity(&self) -> Uuid {
        self.saved_case_id.unwrap_or(self.id)
    }

    /// Deep copy with a fresh id, stripped of persisted identity, name and
    /// result data; input values and group-open state are preserved.
    pub fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            saved_case_id: None,
            name: None,
            data: self.data.as_ref().map(|d| CaseData {
                input_values: d.input_values.clone(),
                analysis_result: None,
                custom_data: d.custom_data.clone(),
                input_group_open_states: d.input_group_open_states.clone(),
            }),
            focused_inputs: self.focused_inputs.clone(),
            is_focus_mode_active: self.is_focus_mode_active,
            is_running: false,
            is_loading: false,
            is_unsaved: true,
        }
    }
}

/// Reference to a saved batch the active case set belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRef {
    pub id: Uuid,
    pub name: String,
    pub case_ids: Vec<Uuid>,
}
