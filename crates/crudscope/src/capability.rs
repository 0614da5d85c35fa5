//! Request-side capability analysis: filtering, sorting and pagination.
//!
//! Each classification is an ordered [`Rule`] table; the first rule that
//! recognizes the arguments decides the style.

use crate::adapter::SchemaAdapter;
use crate::descriptor::{ArgLocation, ArgumentDef, QueryDescriptor};
use crate::entity::PredicateMapping;
use crate::names::{
    CURSOR_PARAM_NAMES, HASURA_FILTER_SUFFIXES, HASURA_OPERATOR_FIELDS, HASURA_ORDER_BY_SUFFIXES,
    LIMIT_PARAM_NAMES, OFFSET_PARAM_NAMES, PAGE_PARAM_NAMES, PER_PAGE_PARAM_NAMES,
    PRISMA_FILTER_SUFFIXES, PRISMA_OPERATOR_FIELDS, PRISMA_ORDER_BY_SUFFIXES, PRISMA_SKIP,
    PRISMA_TAKE, RELAY_COUNT_ARGS, RELAY_CURSOR_ARGS, REST_OPERATOR_SUFFIXES, SORT_PARAM_NAMES,
    ends_with_any, is_reserved_param,
};
use crate::rules::{Rule, first_match};
use crate::shape::{ObjectShape, Shape};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterStyle {
    #[serde(rename = "hasura")]
    Hasura,
    #[serde(rename = "prisma")]
    Prisma,
    #[serde(rename = "jsonapi")]
    JsonApi,
    #[serde(rename = "rest-simple")]
    RestSimple,
    /// Filtering exists but follows no recognized convention.
    #[serde(rename = "custom")]
    Custom,
}

impl FilterStyle {
    /// The translator mapping for this style; `None` for `custom`.
    pub fn mapping(self) -> Option<PredicateMapping> {
        match self {
            FilterStyle::Hasura => Some(PredicateMapping::Hasura),
            FilterStyle::Prisma => Some(PredicateMapping::Prisma),
            FilterStyle::JsonApi => Some(PredicateMapping::JsonApi),
            FilterStyle::RestSimple => Some(PredicateMapping::RestSimple),
            FilterStyle::Custom => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCapabilities {
    pub has_filtering: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_style: Option<FilterStyle>,
    /// Flat parameter names carrying filters (REST styles).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_params: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_input_type_name: Option<String>,
    /// Argument carrying a structured filter object (`where`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_arg_name: Option<String>,
}

impl FilterCapabilities {
    fn params(style: FilterStyle, params: Vec<String>) -> Self {
        Self {
            has_filtering: true,
            filter_style: Some(style),
            filter_params: Some(params),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStyle {
    Hasura,
    Prisma,
    /// A plain string parameter (`sort=-name`).
    Plain,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortCapabilities {
    pub has_sorting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_param_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by_input_type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_style: Option<SortStyle>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationStyle {
    Offset,
    Page,
    Cursor,
    Relay,
    #[default]
    None,
}

impl PaginationStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            PaginationStyle::Offset => "offset",
            PaginationStyle::Page => "page",
            PaginationStyle::Cursor => "cursor",
            PaginationStyle::Relay => "relay",
            PaginationStyle::None => "none",
        }
    }
}

/// What the request side of a list operation accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationCapabilities {
    pub style: PaginationStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_param: Option<String>,
}

/// All request-side capabilities of one list operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub filter: FilterCapabilities,
    pub sort: SortCapabilities,
    pub pagination: PaginationCapabilities,
}

/// Classify filter, sort and pagination support of `query`.
pub fn analyze(adapter: &dyn SchemaAdapter, query: &QueryDescriptor) -> Capabilities {
    let args: Vec<&ArgumentDef> = query.query_side_arguments().collect();
    let capabilities = Capabilities {
        filter: analyze_filter(adapter, &args),
        sort: analyze_sort(adapter, &args),
        pagination: analyze_pagination(&args),
    };
    tracing::debug!(
        operation = %query.operation_name,
        filter = ?capabilities.filter.filter_style,
        sort = capabilities.sort.has_sorting,
        pagination = ?capabilities.pagination.style,
        "analyzed list capabilities"
    );
    capabilities
}

// ============================================================================
// Filtering
// ============================================================================

type FilterTest = fn(&[&ArgumentDef]) -> Option<FilterCapabilities>;

/// Flat query parameters, for schemas without structured filter arguments.
static FLAT_FILTER_RULES: &[Rule<FilterTest>] = &[
    Rule {
        name: "jsonapi-brackets",
        test: jsonapi_brackets,
    },
    Rule {
        name: "operator-suffix",
        test: operator_suffix,
    },
    Rule {
        name: "residual-params",
        test: residual_params,
    },
];

static JSONAPI_FILTER: OnceLock<Regex> = OnceLock::new();

/// `filter[field]` or `filter[field][op]`.
fn jsonapi_filter() -> &'static Regex {
    JSONAPI_FILTER.get_or_init(|| {
        Regex::new(r"^filter\[[^\[\]]+\](\[[^\[\]]+\])?$").expect("static pattern compiles")
    })
}

pub fn analyze_filter(adapter: &dyn SchemaAdapter, args: &[&ArgumentDef]) -> FilterCapabilities {
    if let Some(names) = adapter.conventions().structured_filter_args {
        return where_argument(adapter, args, names).unwrap_or_default();
    }
    first_match(FLAT_FILTER_RULES, args)
        .map(|(_, capabilities)| capabilities)
        .unwrap_or_default()
}

fn where_argument(
    adapter: &dyn SchemaAdapter,
    args: &[&ArgumentDef],
    names: &[&str],
) -> Option<FilterCapabilities> {
    args.iter().find_map(|arg| {
        if !names.contains(&arg.name.as_str()) {
            return None;
        }
        let object = adapter.object(&arg.ty)?;
        let where_input = WhereInput { adapter, object };
        let style = first_match(WHERE_STYLE_RULES, &where_input)
            .map(|(_, style)| style)
            .unwrap_or(FilterStyle::Custom);
        Some(FilterCapabilities {
            has_filtering: true,
            filter_style: Some(style),
            filter_params: None,
            filter_input_type_name: object.name.clone(),
            filter_arg_name: Some(arg.name.clone()),
        })
    })
}

fn jsonapi_brackets(args: &[&ArgumentDef]) -> Option<FilterCapabilities> {
    let params = matching_params(args, |name| jsonapi_filter().is_match(name));
    (!params.is_empty()).then(|| FilterCapabilities::params(FilterStyle::JsonApi, params))
}

fn operator_suffix(args: &[&ArgumentDef]) -> Option<FilterCapabilities> {
    let params = matching_params(args, |name| {
        REST_OPERATOR_SUFFIXES
            .iter()
            .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix))
    });
    (!params.is_empty()).then(|| FilterCapabilities::params(FilterStyle::RestSimple, params))
}

fn residual_params(args: &[&ArgumentDef]) -> Option<FilterCapabilities> {
    let params: Vec<String> = args
        .iter()
        .filter(|arg| arg.location == ArgLocation::Query)
        .map(|arg| arg.name.as_str())
        .filter(|name| !is_reserved_param(name) && !name.starts_with('$') && !name.contains('['))
        .map(String::from)
        .collect();
    (!params.is_empty()).then(|| FilterCapabilities::params(FilterStyle::RestSimple, params))
}

fn matching_params(args: &[&ArgumentDef], test: impl Fn(&str) -> bool) -> Vec<String> {
    args.iter()
        .map(|arg| arg.name.as_str())
        .filter(|name| test(name))
        .map(String::from)
        .collect()
}

// --- where-input style ---

struct WhereInput<'a> {
    adapter: &'a dyn SchemaAdapter,
    object: &'a ObjectShape,
}

impl WhereInput<'_> {
    fn type_name(&self) -> &str {
        self.object.name.as_deref().unwrap_or("")
    }

    /// Field names of the where type and of its nested input objects
    /// (comparison types like `String_comparison_exp` or `StringFilter`).
    fn has_field(&self, names: &[&str]) -> bool {
        self.object.fields.iter().any(|field| {
            names.contains(&field.name.as_str())
                || self
                    .adapter
                    .object(&field.ty)
                    .is_some_and(|nested| nested.field_names().any(|n| names.contains(&n)))
        })
    }
}

type WhereTest = fn(&WhereInput<'_>) -> Option<FilterStyle>;

static WHERE_STYLE_RULES: &[Rule<WhereTest>] = &[
    Rule {
        name: "hasura-where",
        test: |input| {
            (ends_with_any(input.type_name(), HASURA_FILTER_SUFFIXES)
                || input.has_field(HASURA_OPERATOR_FIELDS))
            .then_some(FilterStyle::Hasura)
        },
    },
    Rule {
        name: "prisma-where",
        test: |input| {
            (ends_with_any(input.type_name(), PRISMA_FILTER_SUFFIXES)
                || input.has_field(PRISMA_OPERATOR_FIELDS))
            .then_some(FilterStyle::Prisma)
        },
    },
];

// ============================================================================
// Sorting
// ============================================================================

pub fn analyze_sort(adapter: &dyn SchemaAdapter, args: &[&ArgumentDef]) -> SortCapabilities {
    let Some(arg) = SORT_PARAM_NAMES
        .iter()
        .find_map(|name| args.iter().find(|arg| arg.name == *name))
    else {
        return SortCapabilities::default();
    };

    let input_type = match adapter.unwrap(&arg.ty) {
        Some(Shape::Object(object)) => object.name.clone(),
        Some(Shape::Enum(name)) => Some(name.to_string()),
        _ => None,
    };
    let sort_style = match input_type.as_deref() {
        Some(name) if ends_with_any(name, HASURA_ORDER_BY_SUFFIXES) => SortStyle::Hasura,
        Some(name) if ends_with_any(name, PRISMA_ORDER_BY_SUFFIXES) => SortStyle::Prisma,
        _ => SortStyle::Plain,
    };
    SortCapabilities {
        has_sorting: true,
        sort_param_name: Some(arg.name.clone()),
        order_by_input_type_name: input_type,
        sort_style: Some(sort_style),
    }
}

// ============================================================================
// Pagination
// ============================================================================

struct ParamSet<'a> {
    names: Vec<&'a str>,
}

impl ParamSet<'_> {
    fn has(&self, name: &str) -> bool {
        self.names.contains(&name)
    }

    /// First name from `table` present in the set, in table order.
    fn find(&self, table: &[&str]) -> Option<String> {
        table
            .iter()
            .find(|name| self.has(name))
            .map(|name| name.to_string())
    }
}

type PaginationTest = fn(&ParamSet<'_>) -> Option<PaginationCapabilities>;

static PAGINATION_RULES: &[Rule<PaginationTest>] = &[
    Rule {
        name: "relay",
        test: relay,
    },
    Rule {
        name: "cursor",
        test: cursor,
    },
    Rule {
        name: "page",
        test: page,
    },
    Rule {
        name: "offset",
        test: offset,
    },
];

pub fn analyze_pagination(args: &[&ArgumentDef]) -> PaginationCapabilities {
    let params = ParamSet {
        names: args.iter().map(|arg| arg.name.as_str()).collect(),
    };
    first_match(PAGINATION_RULES, &params)
        .map(|(_, capabilities)| capabilities)
        .unwrap_or_default()
}

fn relay(params: &ParamSet<'_>) -> Option<PaginationCapabilities> {
    let cursor = params.find(RELAY_CURSOR_ARGS)?;
    let count = params.find(RELAY_COUNT_ARGS)?;
    Some(PaginationCapabilities {
        style: PaginationStyle::Relay,
        limit_param: Some(count),
        cursor_param: Some(cursor),
        ..Default::default()
    })
}

fn cursor(params: &ParamSet<'_>) -> Option<PaginationCapabilities> {
    let cursor = params.find(CURSOR_PARAM_NAMES)?;
    Some(PaginationCapabilities {
        style: PaginationStyle::Cursor,
        limit_param: params.find(LIMIT_PARAM_NAMES),
        cursor_param: Some(cursor),
        ..Default::default()
    })
}

fn page(params: &ParamSet<'_>) -> Option<PaginationCapabilities> {
    let page = params.find(PAGE_PARAM_NAMES)?;
    Some(PaginationCapabilities {
        style: PaginationStyle::Page,
        page_param: Some(page),
        per_page_param: params.find(PER_PAGE_PARAM_NAMES),
        ..Default::default()
    })
}

fn offset(params: &ParamSet<'_>) -> Option<PaginationCapabilities> {
    if params.has(PRISMA_TAKE) {
        return Some(PaginationCapabilities {
            style: PaginationStyle::Offset,
            limit_param: Some(PRISMA_TAKE.to_string()),
            offset_param: params.has(PRISMA_SKIP).then(|| PRISMA_SKIP.to_string()),
            ..Default::default()
        });
    }
    let limit = params.find(LIMIT_PARAM_NAMES)?;
    let offset = params.find(OFFSET_PARAM_NAMES)?;
    Some(PaginationCapabilities {
        style: PaginationStyle::Offset,
        limit_param: Some(limit),
        offset_param: Some(offset),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::testing::{GRAPHQL, REST, TestAdapter};
    use crate::shape::{ScalarKind, TypeRef};

    fn query_params(names: &[&str]) -> Vec<ArgumentDef> {
        names
            .iter()
            .map(|n| ArgumentDef::new(*n, TypeRef::Scalar(ScalarKind::String), ArgLocation::Query))
            .collect()
    }

    fn refs(args: &[ArgumentDef]) -> Vec<&ArgumentDef> {
        args.iter().collect()
    }

    #[test]
    fn rest_operator_suffixes() {
        let adapter = TestAdapter::new(&REST);
        let args = query_params(&["status_eq", "price_gte", "limit"]);
        let filter = analyze_filter(&adapter, &refs(&args));
        assert_eq!(filter.filter_style, Some(FilterStyle::RestSimple));
        assert_eq!(
            filter.filter_params,
            Some(vec!["status_eq".to_string(), "price_gte".to_string()])
        );
    }

    #[test]
    fn jsonapi_brackets_win_over_suffixes() {
        let adapter = TestAdapter::new(&REST);
        let args = query_params(&["filter[status]", "filter[price][gte]", "page[size]"]);
        let filter = analyze_filter(&adapter, &refs(&args));
        assert_eq!(filter.filter_style, Some(FilterStyle::JsonApi));
        assert_eq!(filter.filter_params.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn residual_params_are_rest_only() {
        let args = query_params(&["status", "limit", "offset", "$select", "fields"]);

        let rest = TestAdapter::new(&REST);
        let filter = analyze_filter(&rest, &refs(&args));
        assert_eq!(filter.filter_style, Some(FilterStyle::RestSimple));
        assert_eq!(filter.filter_params, Some(vec!["status".to_string()]));

        let graphql = TestAdapter::new(&GRAPHQL);
        let filter = analyze_filter(&graphql, &refs(&args));
        assert!(!filter.has_filtering);
    }

    #[test]
    fn flat_rules_are_rest_only() {
        let graphql = TestAdapter::new(&GRAPHQL);
        let args = vec![
            ArgumentDef::new("filter[status]", TypeRef::named("String"), ArgLocation::Argument),
            ArgumentDef::new("price_gte", TypeRef::named("Float"), ArgLocation::Argument),
        ];
        assert_eq!(analyze_filter(&graphql, &refs(&args)), FilterCapabilities::default());
    }

    #[test]
    fn rest_filter_object_is_a_plain_param() {
        let mut rest = TestAdapter::new(&REST);
        rest.add_object("PetFilter", &[("status", TypeRef::named("String"))]);
        let args = vec![
            ArgumentDef::new("filter", TypeRef::named("PetFilter"), ArgLocation::Query),
            ArgumentDef::new("limit", TypeRef::named("Int"), ArgLocation::Query),
        ];
        let filter = analyze_filter(&rest, &refs(&args));
        assert_eq!(filter.filter_style, Some(FilterStyle::RestSimple));
        assert_eq!(filter.filter_params, Some(vec!["filter".to_string()]));
        assert_eq!(filter.filter_arg_name, None);
    }

    #[test]
    fn no_filter_params() {
        let adapter = TestAdapter::new(&REST);
        let args = query_params(&["limit", "offset", "sort"]);
        assert_eq!(analyze_filter(&adapter, &refs(&args)), FilterCapabilities::default());
    }

    #[test]
    fn hasura_where_by_type_name() {
        let mut adapter = TestAdapter::new(&GRAPHQL);
        adapter.add_object("pets_bool_exp", &[("name", TypeRef::named("String_comparison_exp"))]);
        let args = vec![ArgumentDef::new(
            "where",
            TypeRef::named("pets_bool_exp"),
            ArgLocation::Argument,
        )];
        let filter = analyze_filter(&adapter, &refs(&args));
        assert_eq!(filter.filter_style, Some(FilterStyle::Hasura));
        assert_eq!(filter.filter_input_type_name.as_deref(), Some("pets_bool_exp"));
        assert_eq!(filter.filter_arg_name.as_deref(), Some("where"));
    }

    #[test]
    fn prisma_where_by_nested_operators() {
        let mut adapter = TestAdapter::new(&GRAPHQL);
        adapter
            .add_object(
                "StringFilter",
                &[
                    ("equals", TypeRef::named("String")),
                    ("contains", TypeRef::named("String")),
                ],
            )
            .add_object("PetFilter", &[("name", TypeRef::named("StringFilter"))]);
        let args = vec![ArgumentDef::new(
            "filter",
            TypeRef::named("PetFilter"),
            ArgLocation::Argument,
        )];
        let filter = analyze_filter(&adapter, &refs(&args));
        assert_eq!(filter.filter_style, Some(FilterStyle::Prisma));
    }

    #[test]
    fn unknown_where_is_custom() {
        let mut adapter = TestAdapter::new(&GRAPHQL);
        adapter.add_object("PetQuery", &[("name", TypeRef::named("String"))]);
        let args = vec![ArgumentDef::new(
            "where",
            TypeRef::named("PetQuery"),
            ArgLocation::Argument,
        )];
        let filter = analyze_filter(&adapter, &refs(&args));
        assert!(filter.has_filtering);
        assert_eq!(filter.filter_style, Some(FilterStyle::Custom));
        assert_eq!(filter.filter_style.and_then(FilterStyle::mapping), None);
    }

    #[test]
    fn sort_styles() {
        let mut adapter = TestAdapter::new(&GRAPHQL);
        adapter.add_object("pets_order_by", &[("name", TypeRef::named("order_by"))]);
        let args = vec![ArgumentDef::new(
            "order_by",
            TypeRef::named("pets_order_by").non_null().list(),
            ArgLocation::Argument,
        )];
        let sort = analyze_sort(&adapter, &refs(&args));
        assert!(sort.has_sorting);
        assert_eq!(sort.sort_param_name.as_deref(), Some("order_by"));
        assert_eq!(sort.order_by_input_type_name.as_deref(), Some("pets_order_by"));
        assert_eq!(sort.sort_style, Some(SortStyle::Hasura));

        let rest = TestAdapter::new(&REST);
        let args = query_params(&["sortBy", "sort"]);
        let sort = analyze_sort(&rest, &refs(&args));
        assert_eq!(sort.sort_param_name.as_deref(), Some("sort"));
        assert_eq!(sort.sort_style, Some(SortStyle::Plain));
    }

    #[test]
    fn pagination_priority() {
        let style = |names: &[&str]| analyze_pagination(&refs(&query_params(names))).style;
        assert_eq!(style(&["first", "after"]), PaginationStyle::Relay);
        assert_eq!(style(&["last", "before"]), PaginationStyle::Relay);
        assert_eq!(style(&["after"]), PaginationStyle::Cursor);
        assert_eq!(style(&["cursor", "limit"]), PaginationStyle::Cursor);
        assert_eq!(style(&["page", "per_page"]), PaginationStyle::Page);
        assert_eq!(style(&["take", "skip"]), PaginationStyle::Offset);
        assert_eq!(style(&["limit", "offset"]), PaginationStyle::Offset);
        assert_eq!(style(&["limit"]), PaginationStyle::None);
        assert_eq!(style(&["first"]), PaginationStyle::None);
        assert_eq!(style(&[]), PaginationStyle::None);
    }

    #[test]
    fn pagination_params_are_recorded() {
        let page = analyze_pagination(&refs(&query_params(&["page", "pageSize"])));
        assert_eq!(page.page_param.as_deref(), Some("page"));
        assert_eq!(page.per_page_param.as_deref(), Some("pageSize"));

        let offset = analyze_pagination(&refs(&query_params(&["offset", "limit"])));
        assert_eq!(offset.limit_param.as_deref(), Some("limit"));
        assert_eq!(offset.offset_param.as_deref(), Some("offset"));

        let relay = analyze_pagination(&refs(&query_params(&["first", "after"])));
        assert_eq!(relay.limit_param.as_deref(), Some("first"));
        assert_eq!(relay.cursor_param.as_deref(), Some("after"));
    }
}
