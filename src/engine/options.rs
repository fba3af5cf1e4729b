use ahash::AHashMap;
use itertools::Itertools;

/// A request for the option list of one categorical field, identified by a
/// signature built from the field name and every preceding visible
/// categorical value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRequest {
    pub field: String,
    pub signature: String,
}

/// The lifecycle of one option fetch in the shared cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionFetchState {
    /// A fetch for this signature is outstanding; duplicates are skipped.
    Pending,
    /// The fetched option list, shared by every interested field.
    Ready(Vec<String>),
}

/// Process-wide deduplication cache for categorical option fetches, keyed by
/// request signature. Entries are never evicted or cancelled.
#[derive(Debug, Default)]
pub struct OptionCache {
    entries: AHashMap<String, OptionFetchState>,
}

impl OptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a signature as in flight. Returns `false` when a request for the
    /// same signature is already outstanding or resolved, in which case the
    /// caller must not issue another fetch.
    pub fn begin(&mut self, signature: &str) -> bool {
        if self.entries.contains_key(signature) {
            return false;
        }
        self.entries
            .insert(signature.to_string(), OptionFetchState::Pending);
        true
    }

    /// Stores a resolved option list so later requests share it.
    pub fn complete(&mut self, signature: &str, options: Vec<String>) {
        self.entries
            .insert(signature.to_string(), OptionFetchState::Ready(options));
    }

    /// The resolved options for a signature, if the fetch has completed.
    pub fn ready(&self, signature: &str) -> Option<&[String]> {
        match self.entries.get(signature) {
            Some(OptionFetchState::Ready(options)) => Some(options),
            _ => None,
        }
    }

    pub fn is_pending(&self, signature: &str) -> bool {
        matches!(self.entries.get(signature), Some(OptionFetchState::Pending))
    }
}

/// Builds the fetch signature for a field from the values of the categorical
/// fields that precede it.
pub(crate) fn request_signature(field: &str, preceding_values: &[&str]) -> String {
    if preceding_values.is_empty() {
        field.to_string()
    } else {
        format!("{}|{}", field, preceding_values.iter().join("|"))
    }
}
