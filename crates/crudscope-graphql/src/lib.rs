//! GraphQL front end for crudscope.
//!
//! Reads a standard introspection result (either the bare `{ "__schema": ... }`
//! object or the full `{ "data": { "__schema": ... } }` response) and lowers it
//! for discovery:
//!
//! - every field of the query root is a list candidate; its arguments are
//!   the candidate's filter/sort/pagination inputs
//! - every field of the mutation root is a write candidate, matched to
//!   entities by name prefix (`createPet`, `update_pets`, ...)
//! - object, interface and input object types become object shapes;
//!   `__`-prefixed introspection types are dropped
//!
//! Result arrays are only searched for under the envelope fields in
//! [`crudscope::names::GRAPHQL_ENVELOPE_FIELDS`], so relations such as
//! `User.posts` are never mistaken for results.

pub mod introspection;

use crudscope::names::{GRAPHQL_ENVELOPE_FIELDS, WHERE_ARG_NAMES, pascal};
use crudscope::{
    ArgLocation, ArgumentDef, Conventions, FieldDef, MutationDescriptor, MutationVerb,
    NamePrefixMatcher, ObjectShape, QueryDescriptor, ScalarKind, SchemaAdapter, TypeRef,
    TypeShape,
};
use introspection::{FullType, IntrospectionSchema, TypeKind};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Error type for introspection parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unsupported schema construct: {0}")]
    Unsupported(String),
    #[error("invalid introspection result: {0}")]
    Json(#[from] serde_json::Error),
}

static CONVENTIONS: Conventions = Conventions {
    family: "graphql",
    envelope_fields: Some(GRAPHQL_ENVELOPE_FIELDS),
    identifier_scalar: Some("ID"),
    entity_id_key: false,
    structured_filter_args: Some(WHERE_ARG_NAMES),
    mutation_matcher: &NamePrefixMatcher,
};

/// A lowered introspection schema, ready for discovery.
#[derive(Debug, Clone)]
pub struct GraphQlAdapter {
    types: BTreeMap<String, TypeShape>,
    queries: Vec<QueryDescriptor>,
    mutations: Vec<MutationDescriptor>,
    has_query_root: bool,
}

impl GraphQlAdapter {
    pub fn from_value(input: &Value) -> Result<Self, ParseError> {
        let schema = input
            .get("__schema")
            .or_else(|| input.pointer("/data/__schema"))
            .ok_or_else(|| {
                ParseError::Unsupported(
                    "expected an introspection result with a __schema field".to_string(),
                )
            })?;
        let schema = IntrospectionSchema::deserialize(schema)?;
        Ok(Self::from_introspection(&schema))
    }

    pub fn from_json_str(text: &str) -> Result<Self, ParseError> {
        let input: Value = serde_json::from_str(text)?;
        Self::from_value(&input)
    }

    pub fn from_introspection(schema: &IntrospectionSchema) -> Self {
        let types: BTreeMap<String, TypeShape> = schema
            .types
            .iter()
            .filter_map(|ty| {
                let name = ty.name.as_deref()?;
                (!name.starts_with("__")).then(|| (name.to_string(), lower_type(name, ty)))
            })
            .collect();

        let root_fields = |root: Option<&introspection::NamedRef>| {
            root.and_then(|root| {
                schema
                    .types
                    .iter()
                    .find(|ty| ty.name.as_deref() == Some(root.name.as_str()))
            })
            .map(|ty| ty.fields.as_deref().unwrap_or_default())
        };

        let query_root = root_fields(schema.query_type.as_ref());
        let queries: Vec<QueryDescriptor> = query_root
            .unwrap_or_default()
            .iter()
            .map(list_query)
            .collect();
        let mutations: Vec<MutationDescriptor> = root_fields(schema.mutation_type.as_ref())
            .unwrap_or_default()
            .iter()
            .map(mutation)
            .collect();

        tracing::debug!(
            types = types.len(),
            queries = queries.len(),
            mutations = mutations.len(),
            "lowered GraphQL introspection"
        );
        Self {
            types,
            queries,
            mutations,
            has_query_root: query_root.is_some(),
        }
    }
}

impl SchemaAdapter for GraphQlAdapter {
    fn has_query_root(&self) -> bool {
        self.has_query_root
    }

    fn list_queries(&self) -> &[QueryDescriptor] {
        &self.queries
    }

    fn mutations(&self) -> &[MutationDescriptor] {
        &self.mutations
    }

    fn resolve_named_type(&self, name: &str) -> Option<&TypeShape> {
        self.types.get(name)
    }

    fn conventions(&self) -> &Conventions {
        &CONVENTIONS
    }
}

// ============================================================================
// Lowering
// ============================================================================

fn list_query(field: &introspection::Field) -> QueryDescriptor {
    let arguments: Vec<ArgumentDef> = field
        .args
        .iter()
        .flatten()
        .map(|arg| ArgumentDef::new(arg.name.clone(), lower_ref(&arg.ty), ArgLocation::Argument))
        .collect();
    QueryDescriptor {
        operation_name: field.name.clone(),
        params_type_name: (!arguments.is_empty())
            .then(|| format!("{}Variables", pascal(&field.name))),
        arguments,
        response: lower_ref(&field.ty),
        query_key: vec![field.name.clone()],
        path: None,
    }
}

fn mutation(field: &introspection::Field) -> MutationDescriptor {
    MutationDescriptor {
        operation_name: field.name.clone(),
        verb: MutationVerb::GraphQl,
        path: None,
        has_input: field.args.as_ref().is_some_and(|args| !args.is_empty()),
        input_type_name: None,
        path_params: Vec::new(),
    }
}

fn lower_type(name: &str, ty: &FullType) -> TypeShape {
    match ty.kind {
        TypeKind::Object | TypeKind::Interface => {
            let fields = ty
                .fields
                .iter()
                .flatten()
                .map(|f| FieldDef::new(f.name.clone(), lower_ref(&f.ty)))
                .collect();
            TypeShape::Object(ObjectShape::new(Some(name.to_string()), fields))
        }
        TypeKind::InputObject => {
            let fields = ty
                .input_fields
                .iter()
                .flatten()
                .map(|f| FieldDef::new(f.name.clone(), lower_ref(&f.ty)))
                .collect();
            TypeShape::Object(ObjectShape::new(Some(name.to_string()), fields))
        }
        // Members are only reachable through fragments; no shared fields.
        TypeKind::Union => TypeShape::Object(ObjectShape::new(Some(name.to_string()), Vec::new())),
        TypeKind::Enum => TypeShape::Enum {
            name: name.to_string(),
            values: ty
                .enum_values
                .iter()
                .flatten()
                .map(|v| v.name.clone())
                .collect(),
        },
        TypeKind::Scalar | TypeKind::List | TypeKind::NonNull => TypeShape::Scalar {
            name: name.to_string(),
            kind: scalar_kind(name),
        },
    }
}

fn lower_ref(ty: &introspection::TypeRef) -> TypeRef {
    match (ty.kind, ty.of_type.as_deref()) {
        (TypeKind::NonNull, Some(inner)) => lower_ref(inner).non_null(),
        (TypeKind::List, Some(inner)) => lower_ref(inner).list(),
        _ => match &ty.name {
            Some(name) => TypeRef::named(name.clone()),
            None => TypeRef::Scalar(ScalarKind::Other),
        },
    }
}

fn scalar_kind(name: &str) -> ScalarKind {
    match name {
        "String" | "ID" => ScalarKind::String,
        "Int" => ScalarKind::Integer,
        "Float" => ScalarKind::Number,
        "Boolean" => ScalarKind::Boolean,
        _ => ScalarKind::Other,
    }
}
