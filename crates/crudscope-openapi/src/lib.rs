//! OpenAPI 3.x front end for crudscope.
//!
//! Lowers an OpenAPI document into the structural descriptors the discovery
//! core works on:
//!
//! - `#/components/schemas/*` become the named type map (`allOf` merged,
//!   `required` as non-null, array components as aliases)
//! - `GET` operations on collection paths (last segment static) become list
//!   candidates, with path-item and operation parameters
//! - `POST`/`PUT`/`PATCH`/`DELETE` operations become write candidates,
//!   matched to entities by path shape
//!
//! ```ignore
//! use crudscope::{Overrides, discover};
//! use crudscope_openapi::OpenApiAdapter;
//!
//! let adapter = OpenApiAdapter::from_json_str(&text)?;
//! let result = discover(&adapter, &Overrides::default());
//! ```

mod operations;
mod schema;

use crudscope::{
    Conventions, MutationDescriptor, PathShapeMatcher, QueryDescriptor, SchemaAdapter, TypeShape,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Error type for document parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unsupported schema construct: {0}")]
    Unsupported(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "yaml")]
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

static CONVENTIONS: Conventions = Conventions {
    family: "openapi",
    envelope_fields: None,
    identifier_scalar: None,
    entity_id_key: true,
    structured_filter_args: None,
    mutation_matcher: &PathShapeMatcher,
};

/// A parsed OpenAPI document, ready for discovery.
#[derive(Debug, Clone)]
pub struct OpenApiAdapter {
    types: BTreeMap<String, TypeShape>,
    queries: Vec<QueryDescriptor>,
    mutations: Vec<MutationDescriptor>,
    has_reads: bool,
}

impl OpenApiAdapter {
    /// Build an adapter from an OpenAPI 3.x document.
    pub fn from_value(input: &Value) -> Result<Self, ParseError> {
        // Check OpenAPI version
        let version = input
            .get("openapi")
            .or_else(|| input.get("swagger"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        if !version.starts_with("3.") {
            return Err(ParseError::Unsupported(format!(
                "OpenAPI version {} not supported (expected 3.x)",
                version
            )));
        }

        let lowering = schema::Lowering::new(input);
        let types: BTreeMap<String, TypeShape> = input
            .pointer("/components/schemas")
            .and_then(|s| s.as_object())
            .map(|schemas| {
                schemas
                    .iter()
                    .map(|(name, schema)| (name.clone(), lowering.definition(name, schema)))
                    .collect()
            })
            .unwrap_or_default();
        let operations = operations::collect(input, &lowering);

        tracing::debug!(
            version,
            types = types.len(),
            queries = operations.queries.len(),
            "parsed OpenAPI document"
        );
        Ok(Self {
            types,
            queries: operations.queries,
            mutations: operations.mutations,
            has_reads: operations.has_reads,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self, ParseError> {
        let input: Value = serde_json::from_str(text)?;
        Self::from_value(&input)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(text: &str) -> Result<Self, ParseError> {
        let input: Value = serde_yaml::from_str(text)?;
        Self::from_value(&input)
    }
}

impl SchemaAdapter for OpenApiAdapter {
    fn has_query_root(&self) -> bool {
        self.has_reads
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
