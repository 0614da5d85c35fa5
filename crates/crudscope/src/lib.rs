//! Entity, capability and pagination discovery over API schemas.
//!
//! `crudscope` inspects a parsed GraphQL or OpenAPI schema and works out which
//! operations are entities with list/create/update/delete semantics, how each
//! list operation filters, sorts and paginates, and how to drive it: an
//! infinite-query plan plus a translator from generic subset requests to the
//! operation's native arguments.
//!
//! # Architecture
//!
//! ```text
//! Schema Adapters          Analysis Core                     Outputs
//! ───────────────     ──────────────────────────     ─────────────────────
//! GraphQL         ─┐  locate ─┐                    ┌─> Entity records
//! (introspection)  ├─> key ───┼─> discover ────────┼─> warnings
//! OpenAPI 3.x     ─┘  caps ───┤   (discover.rs)    ├─> InfiniteQueryPlan
//!  (SchemaAdapter)    resp ───┤                    └─> TranslatorSpec
//!                     muts ───┘
//! ```
//!
//! Adapters live in their own crates (`crudscope-graphql`,
//! `crudscope-openapi`) and lower their schema into the structural
//! descriptors of [`shape`] and [`descriptor`]. The core never asks where a
//! schema came from; per-family differences travel as [`Conventions`] data.
//!
//! # Example
//!
//! ```ignore
//! use crudscope::{Overrides, discover, plan_infinite_query, synthesize_translator};
//! use crudscope_openapi::OpenApiAdapter;
//!
//! let document: serde_json::Value = serde_json::from_str(&spec_text)?;
//! let adapter = OpenApiAdapter::from_value(&document)?;
//! let result = discover(&adapter, &Overrides::default());
//!
//! for warning in &result.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! for entity in &result.entities {
//!     let plan = plan_infinite_query(entity, None);
//!     let translator = synthesize_translator(entity);
//!     // hand entity, plan and translator to an emitter
//! }
//! ```
//!
//! # Feature Flags
//!
//! - `schema` - derive `schemars::JsonSchema` for the override file format and
//!   expose `overrides_json_schema()`

pub mod adapter;
pub mod capability;
pub mod config;
pub mod descriptor;
pub mod discover;
pub mod entity;
pub mod infinite;
pub mod key;
pub mod locate;
pub mod mutations;
pub mod names;
pub mod response;
pub mod rules;
pub mod shape;
pub mod translate;

// Re-export the adapter seam
pub use adapter::{Conventions, SchemaAdapter};
pub use descriptor::{ArgLocation, ArgumentDef, MutationDescriptor, MutationVerb, QueryDescriptor};
pub use mutations::{MutationMatcher, NamePrefixMatcher, PathShapeMatcher};
pub use shape::{FieldDef, ObjectShape, ScalarKind, Shape, TypeRef, TypeShape};

// Re-export discovery
pub use capability::{
    FilterCapabilities, FilterStyle, PaginationCapabilities, PaginationStyle, SortCapabilities,
    SortStyle,
};
pub use discover::discover;
pub use entity::{
    DiscoveryResult, Entity, KeyFieldType, ListQuery, Mutation, MutationKind, PredicateMapping,
    SyncMode,
};
pub use response::{PaginationResponseInfo, ResponsePaginationStyle};

// Re-export configuration
#[cfg(feature = "schema")]
pub use config::overrides_json_schema;
pub use config::{ConfigError, EntityOverride, Overrides};

// Re-export planning and translation
pub use infinite::{
    InfiniteQueryPlan, NextPage, NotInferable, PageContext, PageParam, plan_infinite_queries,
    plan_infinite_query,
};
pub use translate::{
    Direction, Operator, OrderBy, Predicate, SubsetRequest, TranslateError, TranslatorSpec,
    synthesize_translator,
};
