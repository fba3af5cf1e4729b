use super::definition::ModuleSchema;
use crate::error::SchemaConversionError;
use std::collections::HashSet;

/// A trait for custom metadata formats that can be converted into a canonical
/// `ModuleSchema`.
///
/// A module's field list may come from a static bundle or a dynamic metadata
/// fetch; both are expected to land in the same canonical shape. Implementing
/// this trait on your own metadata structs provides that translation layer.
///
/// # Example
///
/// ```rust,no_run
/// use hikaku::schema::{FieldKind, FieldSchema, IntoSchema, ModuleSchema};
/// use hikaku::error::SchemaConversionError;
///
/// struct MyMetadataRow { key: String, widget: String }
/// struct MyMetadata { module: String, rows: Vec<MyMetadataRow> }
///
/// impl IntoSchema for MyMetadata {
///     fn into_schema(self) -> Result<ModuleSchema, SchemaConversionError> {
///         let fields = self
///             .rows
///             .into_iter()
///             .map(|row| {
///                 let kind = match row.widget.as_str() {
///                     "select" => FieldKind::Categorical,
///                     _ => FieldKind::Continuous,
///                 };
///                 Ok(FieldSchema::new(row.key, kind))
///             })
///             .collect::<Result<_, SchemaConversionError>>()?;
///         Ok(ModuleSchema {
///             module: self.module,
///             sub_module: None,
///             version: 1,
///             fields,
///         })
///     }
/// }
/// ```
pub trait IntoSchema {
    /// Consumes the object and converts it into a canonical module schema.
    fn into_schema(self) -> Result<ModuleSchema, SchemaConversionError>;
}

impl IntoSchema for ModuleSchema {
    fn into_schema(self) -> Result<ModuleSchema, SchemaConversionError> {
        validate_schema(&self)?;
        Ok(self)
    }
}

/// Checks the structural invariants a loaded schema must satisfy: field names
/// are unique within the module after group flattening.
pub fn validate_schema(schema: &ModuleSchema) -> Result<(), SchemaConversionError> {
    let mut seen = HashSet::new();
    for field in schema.flatten() {
        if !seen.insert(field.name.clone()) {
            return Err(SchemaConversionError::DuplicateField {
                module: schema.module.clone(),
                name: field.name,
            });
        }
    }
    Ok(())
}
