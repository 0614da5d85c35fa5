//! Operation descriptors supplied by schema adapters.

use crate::shape::TypeRef;
use serde::{Deserialize, Serialize};

/// Where an argument or parameter is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgLocation {
    /// GraphQL field argument.
    Argument,
    Query,
    Path,
    Header,
    Cookie,
}

/// A declared argument (GraphQL) or parameter (REST).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentDef {
    pub name: String,
    pub ty: TypeRef,
    pub location: ArgLocation,
}

impl ArgumentDef {
    pub fn new(name: impl Into<String>, ty: TypeRef, location: ArgLocation) -> Self {
        Self {
            name: name.into(),
            ty,
            location,
        }
    }

    /// Required arguments are declared non-null.
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null()
    }

    /// Arguments that shape the query itself (as opposed to path/header plumbing).
    pub fn is_query_side(&self) -> bool {
        matches!(self.location, ArgLocation::Argument | ArgLocation::Query)
    }
}

/// A candidate list-fetch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    /// GraphQL field name or REST operation id.
    pub operation_name: String,
    pub arguments: Vec<ArgumentDef>,
    pub response: TypeRef,
    /// Tokens identifying the query for cache keys (field name, or path segments).
    pub query_key: Vec<String>,
    /// Generated type name for the operation's parameters, when it has any.
    pub params_type_name: Option<String>,
    /// REST path template (`/pets/{petId}/toys`).
    pub path: Option<String>,
}

impl QueryDescriptor {
    pub fn query_side_arguments(&self) -> impl Iterator<Item = &ArgumentDef> {
        self.arguments.iter().filter(|a| a.is_query_side())
    }
}

/// HTTP verb or GraphQL operation kind of a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationVerb {
    #[serde(rename = "graphql")]
    GraphQl,
    Post,
    Put,
    Patch,
    Delete,
}

/// A candidate write operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationDescriptor {
    pub operation_name: String,
    pub verb: MutationVerb,
    /// REST path template.
    pub path: Option<String>,
    /// Whether the operation takes a structured input payload.
    pub has_input: bool,
    pub input_type_name: Option<String>,
    /// Path parameter names, in path order (REST only).
    pub path_params: Vec<String>,
}
