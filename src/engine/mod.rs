//! Input resolution: turns a declarative field schema plus a value map into a
//! consistent per-case input state on every mutation.
//!
//! The engine exposes a single mutation entry point, [`InputEngine::set_value`].
//! Each mutation applies the cascading invalidation rules and then re-runs the
//! resolution passes until the state stops changing (a fixed point), because a
//! conditional may depend on a field whose value was just assigned by a
//! default in the same pass.

mod condition;
pub mod options;
mod resolve;
mod validate;

pub use options::{OptionCache, OptionFetchState, OptionRequest};

use crate::error::ResolveError;
use crate::schema::{FieldKind, FieldSchema, ModuleSchema};
use ahash::AHashMap;
use options::request_signature;
use resolve::{blank_state, stabilize};
use serde::{Deserialize, Serialize};

/// The resolved state of one field within one case.
///
/// Invariant: `is_visible == false` implies `value.is_empty()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputState {
    pub value: String,
    pub is_visible: bool,
    /// A failing validator message; blocks overall validity.
    pub error: String,
    /// An informational validator message; never blocks.
    pub warning: String,
    /// The current option list (declared-and-filtered, or fetched).
    pub options: Vec<String>,
    /// Set while the input is mid-edit; suppresses default refill.
    pub is_focused: bool,
    /// Set when the input was intentionally emptied; suppresses default refill.
    pub was_just_manually_cleared: bool,
}

/// Per-mutation flags carried by `set_value`, mirroring the editing state of
/// the UI control. `None` leaves the corresponding flag untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveFlags {
    pub is_focused: Option<bool>,
    pub was_just_manually_cleared: Option<bool>,
}

/// How an engine is seeded when a case is created, cleared or loaded.
#[derive(Debug, Clone, Copy)]
pub enum InitialValues<'a> {
    /// All fields empty; defaults recompute on the first pass (reset / new case).
    Fresh,
    /// All fields empty and default-suppressed (an intentional clear).
    Cleared,
    /// Values from a saved or duplicated case; missing fields default.
    Loaded(&'a AHashMap<String, String>),
}

/// Resolves one case's field schema against its value map.
pub struct InputEngine {
    fields: Vec<FieldSchema>,
    context: AHashMap<String, String>,
    states: AHashMap<String, InputState>,
}

impl InputEngine {
    /// Builds the initial state map for a schema and stabilizes it.
    pub fn initialize(
        schema: &ModuleSchema,
        initial: InitialValues<'_>,
        context: AHashMap<String, String>,
    ) -> Result<Self, ResolveError> {
        let fields = schema.flatten();
        let mut states = AHashMap::with_capacity(fields.len());
        for field in &fields {
            let mut state = blank_state();
            match initial {
                InitialValues::Fresh => {}
                InitialValues::Cleared => state.was_just_manually_cleared = true,
                InitialValues::Loaded(values) => {
                    if let Some(value) = values.get(&field.name) {
                        state.value = value.clone();
                    }
                }
            }
            states.insert(field.name.clone(), state);
        }
        let mut engine = Self {
            fields,
            context,
            states,
        };
        stabilize(&engine.fields, &mut engine.states, &engine.context)?;
        Ok(engine)
    }

    /// The single mutation entry point. Applies the cascading invalidation
    /// rules for `name`, then stabilizes:
    ///
    /// - every categorical field *after* `name` in schema order is reset,
    ///   since a changed upstream selection invalidates downstream chains;
    /// - if `name` is itself a categorical preceded by another categorical,
    ///   `name` is reset instead of assigned (its options will be refetched);
    /// - any field whose defaults reference `name` is cleared so its default
    ///   recomputes.
    pub fn set_value(
        &mut self,
        name: &str,
        value: impl Into<String>,
        flags: ResolveFlags,
    ) -> Result<(), ResolveError> {
        let index = self
            .fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| ResolveError::UnknownField(name.to_string()))?;
        let target_kind = self.fields[index].kind;
        let preceded_by_categorical = self.fields[..index]
            .iter()
            .any(|f| f.kind == FieldKind::Categorical);

        {
            let state = self
                .states
                .get_mut(name)
                .ok_or_else(|| ResolveError::UnknownField(name.to_string()))?;
            if let Some(focused) = flags.is_focused {
                state.is_focused = focused;
            }
            if let Some(cleared) = flags.was_just_manually_cleared {
                state.was_just_manually_cleared = cleared;
            }
            if target_kind == FieldKind::Categorical && preceded_by_categorical {
                state.value.clear();
                state.error.clear();
                state.options.clear();
            } else {
                state.value = value.into();
            }
        }

        for field in &self.fields[index + 1..] {
            if field.kind == FieldKind::Categorical {
                if let Some(state) = self.states.get_mut(&field.name) {
                    state.value.clear();
                    state.error.clear();
                    state.options.clear();
                }
            }
        }

        for field in &self.fields {
            if field.name != name && field.defaults_depend_on(name) {
                if let Some(state) = self.states.get_mut(&field.name) {
                    state.value.clear();
                }
            }
        }

        stabilize(&self.fields, &mut self.states, &self.context)
    }

    /// Categorical fields that currently need an option fetch: visible, no
    /// options yet, and every preceding visible categorical already has a
    /// value. The caller deduplicates through the shared [`OptionCache`].
    pub fn needed_options(&self) -> Vec<OptionRequest> {
        let mut requests = Vec::new();
        for (index, field) in self.fields.iter().enumerate() {
            if field.kind != FieldKind::Categorical || !field.options.is_empty() {
                continue;
            }
            let Some(state) = self.states.get(&field.name) else {
                continue;
            };
            if !state.is_visible || !state.options.is_empty() {
                continue;
            }
            let preceding: Vec<&str> = self.fields[..index]
                .iter()
                .filter(|f| f.kind == FieldKind::Categorical)
                .filter_map(|f| self.states.get(&f.name))
                .filter(|s| s.is_visible)
                .map(|s| s.value.as_str())
                .collect();
            if preceding.iter().any(|v| v.is_empty()) {
                continue;
            }
            requests.push(OptionRequest {
                field: field.name.clone(),
                signature: request_signature(&field.name, &preceding),
            });
        }
        requests
    }

    /// Applies a fetched option list to a categorical field. When the list
    /// differs from the current one a new value is chosen: the existing value
    /// if still valid, else the first default whose conditionals pass, else
    /// the first option. Returns whether anything changed.
    pub fn deliver_options(
        &mut self,
        name: &str,
        options: Vec<String>,
    ) -> Result<bool, ResolveError> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownField(name.to_string()))?;
        let chosen = {
            let state = self
                .states
                .get(name)
                .ok_or_else(|| ResolveError::UnknownField(name.to_string()))?;
            if state.options == options {
                return Ok(false);
            }
            if !state.value.is_empty() && options.contains(&state.value) {
                state.value.clone()
            } else {
                field
                    .defaults
                    .iter()
                    .find(|rule| {
                        rule.conditionals
                            .iter()
                            .all(|c| condition::conditional_passes(c, &self.states, &self.context))
                    })
                    .map(|rule| rule.value.clone())
                    .or_else(|| options.first().cloned())
                    .unwrap_or_default()
            }
        };
        if let Some(state) = self.states.get_mut(name) {
            state.options = options;
            state.value = chosen;
        }
        stabilize(&self.fields, &mut self.states, &self.context)?;
        Ok(true)
    }

    /// True iff every visible field is non-empty and error-free. Groups are
    /// already expanded away by [`ModuleSchema::flatten`], so every field in
    /// the engine's list carries a value.
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|field| {
            match self.states.get(&field.name) {
                Some(state) if state.is_visible => {
                    !state.value.is_empty() && state.error.is_empty()
                }
                _ => true,
            }
        })
    }

    pub fn states(&self) -> &AHashMap<String, InputState> {
        &self.states
    }

    pub fn state(&self, name: &str) -> Option<&InputState> {
        self.states.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.states.get(name).map(|s| s.value.as_str())
    }

    /// The flattened `{field: value}` map of visible fields, used both as the
    /// analysis request body and as the persisted input values.
    pub fn visible_values(&self) -> AHashMap<String, String> {
        self.fields
            .iter()
            .filter_map(|field| {
                let state = self.states.get(&field.name)?;
                state
                    .is_visible
                    .then(|| (field.name.clone(), state.value.clone()))
            })
            .collect()
    }

    /// Names of the currently visible fields, in schema order.
    pub fn visible_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| {
                self.states
                    .get(&f.name)
                    .is_some_and(|s| s.is_visible)
            })
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }
}
