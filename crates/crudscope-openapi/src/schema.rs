//! JSON Schema objects lowered into crudscope type descriptors.
//!
//! `$ref`s to `#/components/schemas/*` stay symbolic ([`TypeRef::Named`]) and
//! are resolved lazily through the adapter's type map, so recursive schemas
//! never need to be expanded. `allOf` is merged eagerly into one object.

use crudscope::{FieldDef, ObjectShape, ScalarKind, TypeRef, TypeShape};
use serde_json::Value;

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Bound on nested inline schemas and chained `allOf` references.
const MAX_DEPTH: usize = 32;

/// Bound on `$ref` chains followed by [`resolve`].
const MAX_REF_HOPS: usize = 8;

/// Component name of a schema reference (`#/components/schemas/Pet` → `Pet`).
pub(crate) fn ref_name(reference: &str) -> Option<&str> {
    reference.strip_prefix(SCHEMA_REF_PREFIX)
}

/// Follow local `$ref`s (`#/components/...`) to the object they point at.
/// Unresolvable references return the reference object itself.
pub(crate) fn resolve<'a>(document: &'a Value, value: &'a Value) -> &'a Value {
    let mut current = value;
    for _ in 0..MAX_REF_HOPS {
        let target = current
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|reference| reference.strip_prefix('#'))
            .and_then(|pointer| document.pointer(pointer));
        match target {
            Some(target) => current = target,
            None => break,
        }
    }
    current
}

pub(crate) struct Lowering<'a> {
    document: &'a Value,
}

impl<'a> Lowering<'a> {
    pub fn new(document: &'a Value) -> Self {
        Self { document }
    }

    /// A named component schema as a type-map entry.
    pub fn definition(&self, name: &str, schema: &Value) -> TypeShape {
        if let Some(values) = enum_values(schema) {
            return TypeShape::Enum {
                name: name.to_string(),
                values,
            };
        }
        match self.lower(schema) {
            TypeRef::Object(mut object) => {
                object.name = Some(name.to_string());
                TypeShape::Object(object)
            }
            TypeRef::Scalar(kind) => TypeShape::Scalar {
                name: name.to_string(),
                kind,
            },
            target => TypeShape::Alias {
                name: name.to_string(),
                target,
            },
        }
    }

    pub fn lower(&self, schema: &Value) -> TypeRef {
        self.lower_at(schema, 0)
    }

    fn lower_at(&self, schema: &Value, depth: usize) -> TypeRef {
        if depth > MAX_DEPTH {
            tracing::debug!("schema nesting too deep; treating as opaque");
            return TypeRef::Scalar(ScalarKind::Other);
        }

        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            return match ref_name(reference) {
                Some(name) => TypeRef::named(name),
                None => {
                    tracing::debug!(reference, "unsupported $ref; treating as opaque");
                    TypeRef::Scalar(ScalarKind::Other)
                }
            };
        }

        if let Some(parts) = schema.get("allOf").and_then(Value::as_array) {
            return TypeRef::Object(self.merge_all_of(schema, parts, depth));
        }

        if let Some(variants) = schema
            .get("oneOf")
            .or_else(|| schema.get("anyOf"))
            .and_then(Value::as_array)
        {
            // `anyOf: [X, {type: "null"}]` is a nullable X.
            let concrete: Vec<&Value> = variants
                .iter()
                .filter(|variant| type_name(variant) != Some("null"))
                .collect();
            return match concrete.as_slice() {
                [only] => self.lower_at(only, depth + 1),
                _ => TypeRef::Scalar(ScalarKind::Other),
            };
        }

        let kind = type_name(schema);
        if kind == Some("object") || schema.get("properties").is_some() {
            return TypeRef::Object(self.object(schema, depth));
        }
        match kind {
            Some("array") => schema
                .get("items")
                .map(|items| self.lower_at(items, depth + 1))
                .unwrap_or(TypeRef::Scalar(ScalarKind::Other))
                .list(),
            Some("string") => TypeRef::Scalar(ScalarKind::String),
            Some("integer") => TypeRef::Scalar(ScalarKind::Integer),
            Some("number") => TypeRef::Scalar(ScalarKind::Number),
            Some("boolean") => TypeRef::Scalar(ScalarKind::Boolean),
            _ => TypeRef::Scalar(ScalarKind::Other),
        }
    }

    fn object(&self, schema: &Value, depth: usize) -> ObjectShape {
        let required: Vec<&str> = schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();

        let fields = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, property)| {
                        let ty = self.lower_at(property, depth + 1);
                        let ty = if required.contains(&name.as_str()) {
                            ty.non_null()
                        } else {
                            ty
                        };
                        FieldDef::new(name.clone(), ty)
                    })
                    .collect()
            })
            .unwrap_or_default();

        ObjectShape::new(title(schema), fields)
    }

    /// Merge every `allOf` member (and any sibling `properties`) into one
    /// object. Later members win on field name clashes.
    fn merge_all_of(&self, schema: &Value, parts: &[Value], depth: usize) -> ObjectShape {
        let mut merged = ObjectShape::new(title(schema), Vec::new());
        for part in parts {
            let part = resolve(self.document, part);
            if let TypeRef::Object(object) = self.lower_at(part, depth + 1) {
                extend(&mut merged, object.fields);
            }
        }
        if schema.get("properties").is_some() {
            extend(&mut merged, self.object(schema, depth).fields);
        }
        merged
    }
}

fn extend(target: &mut ObjectShape, fields: Vec<FieldDef>) {
    for field in fields {
        match target.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => target.fields.push(field),
        }
    }
}

/// The schema's `type`, taking the first non-null entry of a 3.1 type array.
fn type_name(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(name) => Some(name.as_str()),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .find(|name| *name != "null"),
        _ => None,
    }
}

fn title(schema: &Value) -> Option<String> {
    schema
        .get("title")
        .and_then(Value::as_str)
        .map(String::from)
}

fn enum_values(schema: &Value) -> Option<Vec<String>> {
    let values = schema.get("enum")?.as_array()?;
    Some(
        values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
    )
}
