//! Fixed name tables and case helpers.
//!
//! Every recognized convention is a row in one of these tables; extending
//! detection to a new API style means adding names here, not control flow.

use convert_case::{Case, Casing};

// ============================================================================
// Response envelopes
// ============================================================================

/// Envelope field names that may hold list results in a GraphQL response.
/// Anything else (e.g. `User.posts`) is treated as a relation, not a result.
pub const GRAPHQL_ENVELOPE_FIELDS: &[&str] = &[
    "data", "items", "edges", "nodes", "results", "records", "list", "rows",
];

/// Relay edge wrapper field and the item field inside each edge.
pub const EDGES_FIELD: &str = "edges";
pub const EDGE_NODE_FIELD: &str = "node";

/// Sub-objects searched for pagination metadata after the response root.
pub const META_ENVELOPE_FIELDS: &[&str] = &["meta", "pagination", "paging", "page"];

// ============================================================================
// Key fields
// ============================================================================

pub const KEY_FIELD_CANDIDATES: &[&str] = &["id", "_id", "uuid", "key"];

// ============================================================================
// Filtering
// ============================================================================

/// Arguments carrying a structured filter object.
pub const WHERE_ARG_NAMES: &[&str] = &["where", "filter", "filters"];

pub const HASURA_FILTER_SUFFIXES: &[&str] = &["_bool_exp", "_where"];
pub const HASURA_OPERATOR_FIELDS: &[&str] = &[
    "_eq", "_neq", "_gt", "_gte", "_lt", "_lte", "_in", "_nin", "_like", "_ilike", "_is_null",
    "_and", "_or", "_not",
];

pub const PRISMA_FILTER_SUFFIXES: &[&str] = &["WhereInput", "WhereUniqueInput"];
pub const PRISMA_OPERATOR_FIELDS: &[&str] = &[
    "equals",
    "in",
    "notIn",
    "lt",
    "lte",
    "gt",
    "gte",
    "contains",
    "startsWith",
    "endsWith",
    "AND",
    "OR",
    "NOT",
];

/// Operator suffixes on flat REST filter parameters (`price_gte`).
pub const REST_OPERATOR_SUFFIXES: &[&str] = &[
    "_eq", "_ne", "_neq", "_lt", "_lte", "_gt", "_gte", "_in", "_nin", "_like", "_ilike",
    "_contains",
];

// ============================================================================
// Sorting
// ============================================================================

pub const SORT_PARAM_NAMES: &[&str] = &[
    "sort", "sortBy", "order", "orderBy", "order_by", "$orderby",
];

pub const HASURA_ORDER_BY_SUFFIXES: &[&str] = &["_order_by"];
pub const PRISMA_ORDER_BY_SUFFIXES: &[&str] = &["OrderByInput", "OrderByWithRelationInput"];

// ============================================================================
// Pagination (request side)
// ============================================================================

pub const RELAY_CURSOR_ARGS: &[&str] = &["after", "before"];
pub const RELAY_COUNT_ARGS: &[&str] = &["first", "last"];
pub const CURSOR_PARAM_NAMES: &[&str] = &["cursor", "after", "before", "pageToken", "page_token"];
pub const PAGE_PARAM_NAMES: &[&str] = &["page", "pageNumber", "page_number"];
pub const PER_PAGE_PARAM_NAMES: &[&str] = &[
    "per_page", "perPage", "pageSize", "page_size", "size", "limit",
];
pub const PRISMA_TAKE: &str = "take";
pub const PRISMA_SKIP: &str = "skip";
pub const LIMIT_PARAM_NAMES: &[&str] = &[
    "limit",
    "take",
    "top",
    "$top",
    "max_results",
    "maxResults",
];
pub const OFFSET_PARAM_NAMES: &[&str] = &["offset", "skip", "$skip", "start"];

/// Parameters that never count as filters.
pub const NON_FILTER_PARAM_NAMES: &[&str] = &["fields", "include", "expand", "select"];

// ============================================================================
// Pagination (response side)
// ============================================================================

pub const PAGE_INFO_FIELD: &str = "pageInfo";
pub const HAS_NEXT_PAGE_FIELD: &str = "hasNextPage";
pub const END_CURSOR_FIELD: &str = "endCursor";

pub const CURSOR_RESPONSE_FIELDS: &[&str] = &[
    "nextCursor",
    "next_cursor",
    "cursor",
    "endCursor",
    "end_cursor",
    "nextPageToken",
    "next_page_token",
    "continuationToken",
    "continuation_token",
];
pub const HAS_MORE_FIELDS: &[&str] = &[
    "hasMore",
    "has_more",
    "hasNextPage",
    "has_next_page",
    "moreResults",
    "more_results",
    "hasMoreResults",
];
pub const TOTAL_FIELDS: &[&str] = &[
    "total",
    "totalCount",
    "total_count",
    "count",
    "totalItems",
    "total_items",
    "totalResults",
    "total_results",
];

// ============================================================================
// Helpers
// ============================================================================

/// Whether any parameter name needs to be treated as reserved for sorting or
/// pagination.
pub fn is_reserved_param(name: &str) -> bool {
    [
        SORT_PARAM_NAMES,
        RELAY_CURSOR_ARGS,
        RELAY_COUNT_ARGS,
        CURSOR_PARAM_NAMES,
        PAGE_PARAM_NAMES,
        PER_PAGE_PARAM_NAMES,
        LIMIT_PARAM_NAMES,
        OFFSET_PARAM_NAMES,
        NON_FILTER_PARAM_NAMES,
    ]
    .iter()
    .any(|table| table.contains(&name))
}

pub fn ends_with_any(name: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|s| name.ends_with(s))
}

pub fn pascal(name: &str) -> String {
    name.to_case(Case::Pascal)
}

pub fn camel(name: &str) -> String {
    name.to_case(Case::Camel)
}

/// Naive English singular for resource path segments (`pets` → `pet`).
pub fn singular(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    for suffix in ["sses", "xes", "ches", "shes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && word.len() > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singularize_path_segments() {
        assert_eq!(singular("pets"), "pet");
        assert_eq!(singular("categories"), "category");
        assert_eq!(singular("boxes"), "box");
        assert_eq!(singular("addresses"), "address");
        assert_eq!(singular("status"), "status");
        assert_eq!(singular("glass"), "glass");
    }

    #[test]
    fn case_conversion() {
        assert_eq!(pascal("pets"), "Pets");
        assert_eq!(pascal("pet_owner"), "PetOwner");
        assert_eq!(camel("PetOwner"), "petOwner");
    }

    #[test]
    fn reserved_params() {
        assert!(is_reserved_param("limit"));
        assert!(is_reserved_param("$orderby"));
        assert!(is_reserved_param("fields"));
        assert!(!is_reserved_param("status"));
    }
}
