//! External collaborator seams: persistence, analysis, option fetches and
//! naming prompts. The state machine and orchestrator only ever see these
//! traits, so storage and transport stay swappable and tests run in-process.

pub mod memory;

pub use memory::MemoryGateway;

use crate::engine::OptionRequest;
use crate::error::{AnalysisError, PersistenceError};
use crate::state::AnalysisResult;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// A persisted case's identity row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCaseRecord {
    pub id: Uuid,
    pub module: String,
    pub sub_module: Option<String>,
    pub name: String,
    pub created_at_ms: u64,
}

/// The data record linked one-to-one to a saved case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCaseDataRecord {
    pub case_id: Uuid,
    /// Schema version the case was saved under; a mismatch on load makes the
    /// case stale.
    pub module_version: u32,
    pub input_values: AHashMap<String, String>,
    pub analysis_result: Option<AnalysisResult>,
    pub custom_data: Option<serde_json::Value>,
    pub input_group_open_states: AHashMap<String, bool>,
}

/// A persisted batch: an ordered list of saved case ids under one name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBatchRecord {
    pub id: Uuid,
    pub module: String,
    pub sub_module: Option<String>,
    pub name: String,
    pub case_ids: Vec<Uuid>,
    pub created_at_ms: u64,
}

/// The three logical persisted collections, with cascading deletes: removing
/// a case removes its data record and prunes it from any batch that
/// references it; a batch losing its last member is deleted.
pub trait PersistenceGateway {
    fn get_case(&self, id: Uuid) -> Result<Option<SavedCaseRecord>, PersistenceError>;
    fn put_case(&mut self, record: SavedCaseRecord) -> Result<(), PersistenceError>;
    fn get_case_data(&self, case_id: Uuid)
    -> Result<Option<SavedCaseDataRecord>, PersistenceError>;
    fn put_case_data(&mut self, record: SavedCaseDataRecord) -> Result<(), PersistenceError>;
    /// Bulk delete with cascade.
    fn delete_cases(&mut self, ids: &[Uuid]) -> Result<(), PersistenceError>;
    /// Names of the saved cases scoped to one module (and sub-module) type.
    fn case_names(
        &self,
        module: &str,
        sub_module: Option<&str>,
    ) -> Result<Vec<String>, PersistenceError>;
    fn get_batch(&self, id: Uuid) -> Result<Option<SavedBatchRecord>, PersistenceError>;
    fn put_batch(&mut self, record: SavedBatchRecord) -> Result<(), PersistenceError>;
    fn batch_names(
        &self,
        module: &str,
        sub_module: Option<&str>,
    ) -> Result<Vec<String>, PersistenceError>;
}

/// One named analysis request per run; a run may issue several and merge the
/// responses into one result bag keyed by request type.
pub trait AnalysisGateway {
    fn run(
        &mut self,
        request_type: &str,
        body: &AHashMap<String, String>,
    ) -> Result<serde_json::Value, AnalysisError>;
}

/// Remote source for categorical option lists.
pub trait OptionsGateway {
    fn fetch(&mut self, request: &OptionRequest) -> Result<Vec<String>, AnalysisError>;
}

/// Blocking text prompt used by the save flows; `None` means cancelled.
pub trait NamePrompt {
    fn prompt(&mut self, message: &str) -> Option<String>;
}

/// Wall-clock timestamp for `created_at` fields.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
