//! Structural type descriptions shared by every schema adapter.
//!
//! Adapters lower their native type systems (GraphQL introspection types,
//! OpenAPI schema objects) into [`TypeRef`] and [`TypeShape`] so the analysis
//! core can ask "is this an array?", "what are this object's fields?" and
//! "what is this field's named type?" without knowing where the schema came from.

use serde::{Deserialize, Serialize};

/// Primitive kind of a scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Integer,
    Number,
    Boolean,
    /// Custom scalars (`DateTime`, `JSON`, ...) and anything unrecognized.
    Other,
}

impl ScalarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Other => "unknown",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ScalarKind::Integer | ScalarKind::Number)
    }
}

/// A declared type as it appears on a field, argument or response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeRef {
    /// Reference to a named type, resolved through the adapter.
    Named(String),
    /// Non-nullable wrapper (GraphQL `!`, OpenAPI `required`).
    NonNull(Box<TypeRef>),
    /// Array wrapper.
    List(Box<TypeRef>),
    /// Anonymous inline object (REST response envelopes, inline bodies).
    Object(ObjectShape),
    /// Anonymous inline scalar.
    Scalar(ScalarKind),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn non_null(self) -> Self {
        match self {
            TypeRef::NonNull(_) => self,
            other => TypeRef::NonNull(Box::new(other)),
        }
    }

    pub fn list(self) -> Self {
        TypeRef::List(Box::new(self))
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// Strip the outer non-null wrapper, if any.
    pub fn nullable(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) => inner,
            other => other,
        }
    }

    /// Name of the innermost named type, stripping every wrapper.
    ///
    /// Inline objects report their title when they have one.
    pub fn named_type(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name.as_str()),
            TypeRef::NonNull(inner) | TypeRef::List(inner) => inner.named_type(),
            TypeRef::Object(object) => object.name.as_deref(),
            TypeRef::Scalar(_) => None,
        }
    }
}

/// An object type: named (from the schema's type map) or inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectShape {
    pub name: Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDef>,
}

impl ObjectShape {
    pub fn new(name: Option<String>, fields: Vec<FieldDef>) -> Self {
        Self { name, fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Case-insensitive field lookup.
    pub fn field_ci(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// A named field of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A named type from the schema's type map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeShape {
    /// Object, interface or input object.
    Object(ObjectShape),
    Scalar { name: String, kind: ScalarKind },
    Enum { name: String, values: Vec<String> },
    /// A named alias of another type (e.g. an OpenAPI `Pets: { type: array }`).
    Alias { name: String, target: TypeRef },
}

/// Borrowed view of a type once wrappers and aliases are stripped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    Object(&'a ObjectShape),
    Scalar { name: &'a str, kind: ScalarKind },
    Enum(&'a str),
}

impl<'a> Shape<'a> {
    pub fn as_object(self) -> Option<&'a ObjectShape> {
        match self {
            Shape::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn scalar_kind(self) -> Option<ScalarKind> {
        match self {
            Shape::Scalar { kind, .. } => Some(kind),
            _ => None,
        }
    }
}
