use serde::{Deserialize, Serialize};

/// The shape of a single form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// Free numeric entry (a cost, a rate, a capacity).
    Continuous,
    /// A selection whose option list may be fetched remotely and depends on
    /// earlier categorical selections.
    Categorical,
    /// A selection from a fixed, schema-declared option list.
    Options,
    /// A container whose `children` are flattened into the field list.
    Group,
    /// A table of numeric shares; validated like a continuous field.
    ShareTable,
}

impl FieldKind {
    /// Whether values of this kind are numbers and subject to numeric validators.
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Continuous | FieldKind::ShareTable)
    }

    /// Whether this kind selects from an option list.
    pub fn is_selection(self) -> bool {
        matches!(self, FieldKind::Categorical | FieldKind::Options)
    }
}

/// A visibility or applicability predicate evaluated against the current
/// input state (or the externally supplied context).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Conditional {
    /// Passes when the referenced field is visible and holds exactly `value`.
    FieldEquals { field: String, value: String },
    /// Passes when the referenced field is visible and holds anything but `value`.
    FieldNotEquals { field: String, value: String },
    /// Passes when the referenced field is visible and its value is in `values`.
    FieldIn { field: String, values: Vec<String> },
    /// Passes when the context entry `key` equals `value`. Context entries are
    /// supplied by the caller at engine construction and are not fields.
    ContextEquals { key: String, value: String },
}

impl Conditional {
    /// The field this conditional depends on, if it references one.
    pub fn dependency(&self) -> Option<&str> {
        match self {
            Conditional::FieldEquals { field, .. }
            | Conditional::FieldNotEquals { field, .. }
            | Conditional::FieldIn { field, .. } => Some(field),
            Conditional::ContextEquals { .. } => None,
        }
    }
}

/// One entry of a field's ordered default list. The first entry whose
/// conditionals all pass supplies the field's default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultRule {
    #[serde(default)]
    pub conditionals: Vec<Conditional>,
    pub value: String,
}

/// The closed set of validators a field may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidatorKind {
    Numeric,
    Integer,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// A validator attached to a numeric field. Comparison validators carry their
/// threshold in `args`; a rule flagged `warning` reports without blocking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorRule {
    pub kind: ValidatorKind,
    #[serde(default)]
    pub args: Vec<f64>,
    #[serde(default)]
    pub warning: bool,
}

/// A declared option of a selection field, gated by its own conditionals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    #[serde(default)]
    pub conditionals: Vec<Conditional>,
}

/// Declarative description of one form field. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// Unique key within a case.
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub conditionals: Vec<Conditional>,
    #[serde(default)]
    pub defaults: Vec<DefaultRule>,
    #[serde(default)]
    pub validators: Vec<ValidatorRule>,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    /// Only populated for `Group` fields.
    #[serde(default)]
    pub children: Vec<FieldSchema>,
}

impl FieldSchema {
    /// Creates a bare field of the given kind; the remaining pieces are
    /// filled in by the metadata source (or test builders).
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: String::new(),
            unit: String::new(),
            conditionals: Vec::new(),
            defaults: Vec::new(),
            validators: Vec::new(),
            options: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Whether any of this field's default rules reference `name` in a conditional.
    pub fn defaults_depend_on(&self, name: &str) -> bool {
        self.defaults
            .iter()
            .flat_map(|rule| rule.conditionals.iter())
            .any(|cond| cond.dependency() == Some(name))
    }
}

/// The complete, canonical field list for one analysis module, ready to drive
/// an input engine. This is the target structure for any metadata conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSchema {
    /// Module type, used to scope persisted names.
    pub module: String,
    /// Optional sub-module type, a second scoping key.
    #[serde(default)]
    pub sub_module: Option<String>,
    /// Schema version; persisted cases from another version are stale.
    pub version: u32,
    pub fields: Vec<FieldSchema>,
}

impl ModuleSchema {
    /// Expands `Group` fields into their children, in document order. A
    /// group's conditionals are prepended to each child so hiding the group
    /// hides everything inside it.
    pub fn flatten(&self) -> Vec<FieldSchema> {
        let mut flat = Vec::new();
        for field in &self.fields {
            flatten_into(field, &[], &mut flat);
        }
        flat
    }

    /// Names of the groups declared at any level, for group-open UI state.
    pub fn group_names(&self) -> Vec<String> {
        fn collect(field: &FieldSchema, out: &mut Vec<String>) {
            if field.kind == FieldKind::Group {
                out.push(field.name.clone());
                for child in &field.children {
                    collect(child, out);
                }
            }
        }
        let mut out = Vec::new();
        for field in &self.fields {
            collect(field, &mut out);
        }
        out
    }
}

fn flatten_into(field: &FieldSchema, inherited: &[Conditional], flat: &mut Vec<FieldSchema>) {
    if field.kind == FieldKind::Group {
        let mut gate: Vec<Conditional> = inherited.to_vec();
        gate.extend(field.conditionals.iter().cloned());
        for child in &field.children {
            flatten_into(child, &gate, flat);
        }
    } else {
        let mut leaf = field.clone();
        let mut conditionals: Vec<Conditional> = inherited.to_vec();
        conditionals.append(&mut leaf.conditionals);
        leaf.conditionals = conditionals;
        leaf.children = Vec::new();
        flat.push(leaf);
    }
}
