use super::{PersistenceGateway, SavedBatchRecord, SavedCaseDataRecord, SavedCaseRecord};
use crate::error::PersistenceError;
use ahash::AHashMap;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// In-process persistence gateway. Identity and batch rows are stored as
/// bincode blobs; case-data records carry arbitrary JSON result bags, which
/// bincode cannot round-trip, so those are stored as JSON bytes.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    cases: AHashMap<Uuid, Vec<u8>>,
    case_data: AHashMap<Uuid, Vec<u8>>,
    batches: AHashMap<Uuid, Vec<u8>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, PersistenceError> {
    encode_to_vec(value, standard()).map_err(|e| PersistenceError::Codec(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PersistenceError> {
    decode_from_slice(bytes, standard())
        .map(|(value, _)| value)
        .map_err(|e| PersistenceError::Codec(e.to_string()))
}

impl PersistenceGateway for MemoryGateway {
    fn get_case(&self, id: Uuid) -> Result<Option<SavedCaseRecord>, PersistenceError> {
        self.cases.get(&id).map(|b| decode(b)).transpose()
    }

    fn put_case(&mut self, record: SavedCaseRecord) -> Result<(), PersistenceError> {
        let bytes = encode(&record)?;
        self.cases.insert(record.id, bytes);
        Ok(())
    }

    fn get_case_data(
        &self,
        case_id: Uuid,
    ) -> Result<Option<SavedCaseDataRecord>, PersistenceError> {
        self.case_data
            .get(&case_id)
            .map(|b| serde_json::from_slice(b).map_err(|e| PersistenceError::Codec(e.to_string())))
            .transpose()
    }

    fn put_case_data(&mut self, record: SavedCaseDataRecord) -> Result<(), PersistenceError> {
        let bytes =
            serde_json::to_vec(&record).map_err(|e| PersistenceError::Codec(e.to_string()))?;
        self.case_data.insert(record.case_id, bytes);
        Ok(())
    }

    fn delete_cases(&mut self, ids: &[Uuid]) -> Result<(), PersistenceError> {
        for id in ids {
            self.cases.remove(id);
            self.case_data.remove(id);
        }
        // Prune batch membership; a batch losing its last member goes too.
        let batch_ids: Vec<Uuid> = self.batches.keys().copied().collect();
        for batch_id in batch_ids {
            let Some(bytes) = self.batches.get(&batch_id) else {
                continue;
            };
            let mut batch: SavedBatchRecord = decode(bytes)?;
            let before = batch.case_ids.len();
            batch.case_ids.retain(|id| !ids.contains(id));
            if batch.case_ids.is_empty() {
                self.batches.remove(&batch_id);
            } else if batch.case_ids.len() != before {
                let bytes = encode(&batch)?;
                self.batches.insert(batch_id, bytes);
            }
        }
        Ok(())
    }

    fn case_names(
        &self,
        module: &str,
        sub_module: Option<&str>,
    ) -> Result<Vec<String>, PersistenceError> {
        let mut names = Vec::new();
        for bytes in self.cases.values() {
            let record: SavedCaseRecord = decode(bytes)?;
            if record.module == module && record.sub_module.as_deref() == sub_module {
                names.push(record.name);
            }
        }
        Ok(names)
    }

    fn get_batch(&self, id: Uuid) -> Result<Option<SavedBatchRecord>, PersistenceError> {
        self.batches.get(&id).map(|b| decode(b)).transpose()
    }

    fn put_batch(&mut self, record: SavedBatchRecord) -> Result<(), PersistenceError> {
        let bytes = encode(&record)?;
        self.batches.insert(record.id, bytes);
        Ok(())
    }

    fn batch_names(
        &self,
        module: &str,
        sub_module: Option<&str>,
    ) -> Result<Vec<String>, PersistenceError> {
        let mut names = Vec::new();
        for bytes in self.batches.values() {
            let record: SavedBatchRecord = decode(bytes)?;
            if record.module == module && record.sub_module.as_deref() == sub_module {
                names.push(record.name);
            }
        }
        Ok(names)
    }
}
