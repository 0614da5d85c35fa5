//! Key field resolution.

use crate::adapter::SchemaAdapter;
use crate::entity::KeyFieldType;
use crate::names::{KEY_FIELD_CANDIDATES, camel};
use crate::shape::{FieldDef, ObjectShape, ScalarKind, Shape};

/// The field identifying unique rows of an item type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyField {
    pub name: String,
    pub ty: KeyFieldType,
}

/// Pick the key field of `item`.
///
/// Priority: the override (when it names a real field), an `id` of the
/// schema's identifier scalar, the first of [`KEY_FIELD_CANDIDATES`], and
/// finally `<camelCase(entity)>Id` where the adapter allows it. A missing
/// override pushes one warning and falls through to inference.
pub fn resolve_key_field(
    adapter: &dyn SchemaAdapter,
    item: &ObjectShape,
    entity_name: &str,
    override_name: Option<&str>,
    warnings: &mut Vec<String>,
) -> Option<KeyField> {
    if let Some(name) = override_name {
        match item.field(name) {
            Some(field) => return Some(key_of(adapter, field)),
            None => warnings.push(format!(
                "Entity '{entity_name}': keyField override '{name}' is not a field of {}; \
                 falling back to automatic key detection.",
                item.name.as_deref().unwrap_or(entity_name),
            )),
        }
    }

    let conventions = adapter.conventions();
    if let Some(scalar) = conventions.identifier_scalar {
        let canonical = item.field("id").filter(|field| {
            matches!(adapter.unwrap(&field.ty), Some(Shape::Scalar { name, .. }) if name == scalar)
        });
        if let Some(field) = canonical {
            return Some(key_of(adapter, field));
        }
    }

    if let Some(field) = KEY_FIELD_CANDIDATES
        .iter()
        .find_map(|candidate| item.field(candidate))
    {
        return Some(key_of(adapter, field));
    }

    if conventions.entity_id_key {
        let name = format!("{}Id", camel(entity_name));
        if let Some(field) = item.field(&name) {
            return Some(key_of(adapter, field));
        }
    }

    None
}

fn key_of(adapter: &dyn SchemaAdapter, field: &FieldDef) -> KeyField {
    let ty = match adapter.unwrap(&field.ty) {
        Some(Shape::Scalar { kind, .. }) => match kind {
            ScalarKind::Integer | ScalarKind::Number => KeyFieldType::Number,
            ScalarKind::Boolean => KeyFieldType::Boolean,
            ScalarKind::String | ScalarKind::Other => KeyFieldType::String,
        },
        _ => KeyFieldType::String,
    };
    KeyField {
        name: field.name.clone(),
        ty,
    }
}
