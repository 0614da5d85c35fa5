//! Discovery output records.

use crate::capability::{FilterCapabilities, FilterStyle, PaginationCapabilities, SortCapabilities};
use crate::response::PaginationResponseInfo;
use serde::{Deserialize, Serialize};

/// A domain type discovered from a list-returning operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    pub type_name: String,
    pub key_field: String,
    pub key_field_type: KeyFieldType,
    pub list_query: ListQuery,
    pub mutations: Vec<Mutation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_mode: Option<SyncMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate_mapping: Option<PredicateMapping>,
    pub filter_capabilities: FilterCapabilities,
    pub sort_capabilities: SortCapabilities,
    pub pagination_capabilities: PaginationCapabilities,
    pub pagination_response: PaginationResponseInfo,
}

impl Entity {
    /// First mutation of the given kind; code generation only uses one per kind.
    pub fn mutation(&self, kind: MutationKind) -> Option<&Mutation> {
        self.mutations.iter().find(|m| m.kind == kind)
    }

    /// The predicate style translation would use: the override, else the
    /// detected filter style when it is translatable.
    pub fn effective_mapping(&self) -> Option<PredicateMapping> {
        self.predicate_mapping
            .or_else(|| self.filter_capabilities.filter_style.and_then(FilterStyle::mapping))
    }
}

/// How an entity's list operation is invoked and read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub operation_name: String,
    pub query_key_tokens: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params_type_name: Option<String>,
    /// Dotted path from the response root to the item array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector_path: Option<String>,
    /// Path inside each array element to the item (Relay `edges[].node`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    pub kind: MutationKind,
    pub operation_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type_name: Option<String>,
    /// Item field substituted into the single-item path (REST only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_param_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFieldType {
    #[default]
    String,
    Number,
    Boolean,
}

/// How a collection is kept in sync with the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// Fetch the entire collection unconditionally.
    Full,
    /// Push predicates down and fetch matching subsets.
    OnDemand,
}

/// A filter convention a predicate translator can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum PredicateMapping {
    #[serde(rename = "hasura")]
    Hasura,
    #[serde(rename = "prisma")]
    Prisma,
    #[serde(rename = "jsonapi")]
    JsonApi,
    #[serde(rename = "rest-simple")]
    RestSimple,
}

impl PredicateMapping {
    pub fn as_str(self) -> &'static str {
        match self {
            PredicateMapping::Hasura => "hasura",
            PredicateMapping::Prisma => "prisma",
            PredicateMapping::JsonApi => "jsonapi",
            PredicateMapping::RestSimple => "rest-simple",
        }
    }
}

impl std::fmt::Display for PredicateMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities plus the warnings produced while discovering them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub entities: Vec<Entity>,
    pub warnings: Vec<String>,
}

impl DiscoveryResult {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}
