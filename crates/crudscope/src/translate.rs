//! Predicate translators: generic subset requests to native query arguments.
//!
//! A [`TranslatorSpec`] is synthesized once per entity from its detected (or
//! overridden) filter style, sort style and pagination capabilities. It is a
//! pure mapping; [`TranslatorSpec::translate`] renders one [`SubsetRequest`]
//! as the JSON arguments of the entity's list operation.
//!
//! ```text
//! status = "available" AND owner.name CONTAINS "bo"
//!
//! hasura       { where: { _and: [ { status: { _eq: "available" } },
//!                                 { owner: { name: { _ilike: "%bo%" } } } ] } }
//! prisma       { where: { AND: [ { status: { equals: "available" } },
//!                                { owner: { name: { contains: "bo" } } } ] } }
//! jsonapi      { "filter[status]": "available", "filter[owner.name][contains]": "bo" }
//! rest-simple  { status_eq: "available", "owner.name_contains": "bo" }
//! ```

use crate::capability::{PaginationCapabilities, PaginationStyle, SortStyle};
use crate::entity::{Entity, PredicateMapping};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ============================================================================
// Requests
// ============================================================================

/// A backend-neutral "fetch a subset of rows" request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsetRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Predicate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Boolean filter expression. Field names may be dotted (`owner.name`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Predicate {
    And { operands: Vec<Predicate> },
    Or { operands: Vec<Predicate> },
    Not { operand: Box<Predicate> },
    Compare { field: String, op: Operator, value: Value },
}

impl Predicate {
    pub fn compare(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn and(operands: Vec<Predicate>) -> Self {
        Predicate::And { operands }
    }

    pub fn or(operands: Vec<Predicate>) -> Self {
        Predicate::Or { operands }
    }

    pub fn not(operand: Predicate) -> Self {
        Predicate::Not {
            operand: Box::new(operand),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Like,
    #[serde(rename = "ilike")]
    ILike,
    /// Substring match.
    Contains,
    /// `true` matches nulls, `false` non-nulls.
    IsNull,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Like => "like",
            Operator::ILike => "ilike",
            Operator::Contains => "contains",
            Operator::IsNull => "isNull",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// A request the entity's API cannot express.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("{mapping} filters have no equivalent of operator '{op}'")]
    UnsupportedOperator {
        mapping: PredicateMapping,
        op: Operator,
    },
    #[error("{mapping} filters cannot express {combinator}")]
    UnsupportedCombinator {
        mapping: PredicateMapping,
        combinator: String,
    },
    #[error("entity '{0}' has no sort parameter")]
    UnsupportedSort(String),
    #[error("entity '{entity}' cannot page by {what} with {style} pagination")]
    UnsupportedPagination {
        entity: String,
        what: &'static str,
        style: &'static str,
    },
}

// ============================================================================
// Operator tables
// ============================================================================

/// Native operator per generic operator. An empty native name means "the
/// bare field is the equality filter".
type OperatorTable = &'static [(Operator, &'static str)];

static HASURA_OPERATORS: OperatorTable = &[
    (Operator::Eq, "_eq"),
    (Operator::Ne, "_neq"),
    (Operator::Gt, "_gt"),
    (Operator::Gte, "_gte"),
    (Operator::Lt, "_lt"),
    (Operator::Lte, "_lte"),
    (Operator::In, "_in"),
    (Operator::NotIn, "_nin"),
    (Operator::Like, "_like"),
    (Operator::ILike, "_ilike"),
    (Operator::Contains, "_ilike"),
    (Operator::IsNull, "_is_null"),
];

static PRISMA_OPERATORS: OperatorTable = &[
    (Operator::Eq, "equals"),
    (Operator::Ne, "not"),
    (Operator::Gt, "gt"),
    (Operator::Gte, "gte"),
    (Operator::Lt, "lt"),
    (Operator::Lte, "lte"),
    (Operator::In, "in"),
    (Operator::NotIn, "notIn"),
    (Operator::Contains, "contains"),
    (Operator::IsNull, "equals"),
];

static JSONAPI_OPERATORS: OperatorTable = &[
    (Operator::Eq, ""),
    (Operator::Ne, "ne"),
    (Operator::Gt, "gt"),
    (Operator::Gte, "gte"),
    (Operator::Lt, "lt"),
    (Operator::Lte, "lte"),
    (Operator::In, "in"),
    (Operator::NotIn, "nin"),
    (Operator::Like, "like"),
    (Operator::Contains, "contains"),
];

static REST_SIMPLE_OPERATORS: OperatorTable = &[
    (Operator::Eq, "_eq"),
    (Operator::Ne, "_ne"),
    (Operator::Gt, "_gt"),
    (Operator::Gte, "_gte"),
    (Operator::Lt, "_lt"),
    (Operator::Lte, "_lte"),
    (Operator::In, "_in"),
    (Operator::NotIn, "_nin"),
    (Operator::Like, "_like"),
    (Operator::Contains, "_contains"),
];

fn operator_table(mapping: PredicateMapping) -> OperatorTable {
    match mapping {
        PredicateMapping::Hasura => HASURA_OPERATORS,
        PredicateMapping::Prisma => PRISMA_OPERATORS,
        PredicateMapping::JsonApi => JSONAPI_OPERATORS,
        PredicateMapping::RestSimple => REST_SIMPLE_OPERATORS,
    }
}

// ============================================================================
// Translator
// ============================================================================

/// Everything needed to turn a [`SubsetRequest`] into one entity's native
/// list arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatorSpec {
    pub entity: String,
    pub mapping: PredicateMapping,
    /// Argument holding a structured filter object (Hasura, Prisma).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_param: Option<String>,
    /// Known flat filter parameters (REST styles).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_params: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_style: Option<SortStyle>,
    pub pagination: PaginationCapabilities,
    /// Generic operator name to native operator.
    pub operators: BTreeMap<&'static str, &'static str>,
}

/// Build the translator of `entity`, or `None` when its filter convention
/// is not translatable (`custom` or absent) and no mapping is overridden.
pub fn synthesize_translator(entity: &Entity) -> Option<TranslatorSpec> {
    let mapping = entity.effective_mapping()?;
    let filter = &entity.filter_capabilities;
    let filter_param = match mapping {
        PredicateMapping::Hasura | PredicateMapping::Prisma => Some(
            filter
                .filter_arg_name
                .clone()
                .unwrap_or_else(|| "where".to_string()),
        ),
        PredicateMapping::JsonApi | PredicateMapping::RestSimple => None,
    };
    tracing::debug!(entity = %entity.name, %mapping, "synthesized translator");
    Some(TranslatorSpec {
        entity: entity.name.clone(),
        mapping,
        filter_param,
        filter_params: filter.filter_params.clone(),
        sort_param: entity.sort_capabilities.sort_param_name.clone(),
        sort_style: entity.sort_capabilities.sort_style,
        pagination: entity.pagination_capabilities.clone(),
        operators: operator_table(mapping)
            .iter()
            .map(|(op, native)| (op.as_str(), *native))
            .collect(),
    })
}

impl TranslatorSpec {
    /// Render `request` as native list arguments.
    pub fn translate(&self, request: &SubsetRequest) -> Result<Map<String, Value>, TranslateError> {
        let mut args = Map::new();
        if let Some(filter) = &request.filter {
            match self.mapping {
                PredicateMapping::Hasura | PredicateMapping::Prisma => {
                    let param = self.filter_param.as_deref().unwrap_or("where");
                    args.insert(param.to_string(), self.object_filter(filter)?);
                }
                PredicateMapping::JsonApi | PredicateMapping::RestSimple => {
                    self.flat_filter(filter, &mut args)?;
                }
            }
        }
        if !request.order_by.is_empty() {
            self.sort(&request.order_by, &mut args)?;
        }
        self.paginate(request, &mut args)?;
        Ok(args)
    }

    fn native(&self, op: Operator) -> Result<&'static str, TranslateError> {
        operator_table(self.mapping)
            .iter()
            .find(|(candidate, _)| *candidate == op)
            .map(|(_, native)| *native)
            .ok_or(TranslateError::UnsupportedOperator {
                mapping: self.mapping,
                op,
            })
    }

    // --- object styles (Hasura, Prisma) ---

    fn object_filter(&self, predicate: &Predicate) -> Result<Value, TranslateError> {
        let (and, or, not) = match self.mapping {
            PredicateMapping::Hasura => ("_and", "_or", "_not"),
            _ => ("AND", "OR", "NOT"),
        };
        Ok(match predicate {
            Predicate::And { operands } => single(and, self.object_filters(operands)?),
            Predicate::Or { operands } => single(or, self.object_filters(operands)?),
            Predicate::Not { operand } => single(not, self.object_filter(operand)?),
            Predicate::Compare { field, op, value } => nest(field, self.object_leaf(*op, value)?),
        })
    }

    fn object_filters(&self, operands: &[Predicate]) -> Result<Value, TranslateError> {
        operands
            .iter()
            .map(|operand| self.object_filter(operand))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    fn object_leaf(&self, op: Operator, value: &Value) -> Result<Value, TranslateError> {
        let native = self.native(op)?;
        let value = match (self.mapping, op) {
            (PredicateMapping::Hasura, Operator::Contains) => {
                Value::String(format!("%{}%", escape_like(&flat_value(value))))
            }
            (PredicateMapping::Prisma, Operator::IsNull) if value == &Value::Bool(false) => {
                return Ok(single("not", Value::Null));
            }
            (PredicateMapping::Prisma, Operator::IsNull) => Value::Null,
            _ => value.clone(),
        };
        Ok(single(native, value))
    }

    // --- flat styles (JSON:API, rest-simple) ---

    fn flat_filter(
        &self,
        predicate: &Predicate,
        args: &mut Map<String, Value>,
    ) -> Result<(), TranslateError> {
        match predicate {
            Predicate::And { operands } => {
                for operand in operands {
                    self.flat_filter(operand, args)?;
                }
                Ok(())
            }
            Predicate::Or { .. } => Err(self.combinator("'or'".to_string())),
            Predicate::Not { .. } => Err(self.combinator("'not'".to_string())),
            Predicate::Compare { field, op, value } => {
                let key = self.flat_key(field, *op)?;
                if args.contains_key(&key) {
                    return Err(self.combinator(format!("two conditions on '{key}'")));
                }
                args.insert(key, Value::String(flat_value(value)));
                Ok(())
            }
        }
    }

    fn flat_key(&self, field: &str, op: Operator) -> Result<String, TranslateError> {
        let native = self.native(op)?;
        Ok(match self.mapping {
            PredicateMapping::JsonApi if native.is_empty() => format!("filter[{field}]"),
            PredicateMapping::JsonApi => format!("filter[{field}][{native}]"),
            _ if op == Operator::Eq && self.is_plain_param(field) => field.to_string(),
            _ => format!("{field}{native}"),
        })
    }

    /// A residual parameter (`status=`) filters by equality on its own.
    fn is_plain_param(&self, field: &str) -> bool {
        self.filter_params.as_ref().is_some_and(|params| {
            params.iter().any(|p| p == field) && !params.iter().any(|p| *p == format!("{field}_eq"))
        })
    }

    fn combinator(&self, combinator: String) -> TranslateError {
        TranslateError::UnsupportedCombinator {
            mapping: self.mapping,
            combinator,
        }
    }

    // --- sorting ---

    fn sort(
        &self,
        order_by: &[OrderBy],
        args: &mut Map<String, Value>,
    ) -> Result<(), TranslateError> {
        let (Some(param), Some(style)) = (&self.sort_param, self.sort_style) else {
            return Err(TranslateError::UnsupportedSort(self.entity.clone()));
        };
        let value = match style {
            SortStyle::Hasura | SortStyle::Prisma => Value::Array(
                order_by
                    .iter()
                    .map(|o| nest(&o.field, Value::String(o.direction.as_str().to_string())))
                    .collect(),
            ),
            SortStyle::Plain => Value::String(
                order_by
                    .iter()
                    .map(|o| match o.direction {
                        Direction::Asc => o.field.clone(),
                        Direction::Desc => format!("-{}", o.field),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        };
        args.insert(param.clone(), value);
        Ok(())
    }

    // --- pagination ---

    fn paginate(
        &self,
        request: &SubsetRequest,
        args: &mut Map<String, Value>,
    ) -> Result<(), TranslateError> {
        let caps = &self.pagination;
        let put = |args: &mut Map<String, Value>,
                   param: &Option<String>,
                   value: Option<Value>,
                   what: &'static str|
         -> Result<(), TranslateError> {
            let Some(value) = value else {
                return Ok(());
            };
            match param {
                Some(param) => {
                    args.insert(param.clone(), value);
                    Ok(())
                }
                None => Err(self.unsupported_pagination(what)),
            }
        };
        let limit = request.limit.map(Value::from);
        let cursor = request.cursor.clone().map(Value::String);
        let offset = request.offset.filter(|offset| *offset > 0);

        match caps.style {
            PaginationStyle::Offset => {
                put(args, &caps.limit_param, limit, "limit")?;
                put(args, &caps.offset_param, offset.map(Value::from), "offset")?;
                put(args, &None, cursor, "cursor")
            }
            PaginationStyle::Page => {
                put(args, &caps.per_page_param, limit, "limit")?;
                // Pages only start at multiples of the page size.
                let page = match (offset, request.limit) {
                    (None, _) => None,
                    (Some(offset), Some(size)) if size > 0 && offset % size == 0 => {
                        Some(Value::from(offset / size + 1))
                    }
                    (Some(_), _) => return Err(self.unsupported_pagination("offset")),
                };
                put(args, &caps.page_param, page, "offset")?;
                put(args, &None, cursor, "cursor")
            }
            PaginationStyle::Cursor | PaginationStyle::Relay => {
                put(args, &caps.limit_param, limit, "limit")?;
                put(args, &caps.cursor_param, cursor, "cursor")?;
                put(args, &None, offset.map(Value::from), "offset")
            }
            PaginationStyle::None => {
                put(args, &None, limit, "limit")?;
                put(args, &None, offset.map(Value::from), "offset")?;
                put(args, &None, cursor, "cursor")
            }
        }
    }

    fn unsupported_pagination(&self, what: &'static str) -> TranslateError {
        TranslateError::UnsupportedPagination {
            entity: self.entity.clone(),
            what,
            style: self.pagination.style.as_str(),
        }
    }
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

/// `owner.name` + leaf gives `{ owner: { name: leaf } }`.
fn nest(field: &str, leaf: Value) -> Value {
    field.rsplit('.').fold(leaf, |inner, segment| single(segment, inner))
}

/// Escape `LIKE` wildcards so the value matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Query-string rendering of a filter value; arrays are comma-joined.
fn flat_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(flat_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{FilterCapabilities, FilterStyle, SortCapabilities};
    use crate::entity::{KeyFieldType, ListQuery};
    use crate::response::PaginationResponseInfo;
    use serde_json::json;

    fn entity(
        filter: FilterCapabilities,
        sort: SortCapabilities,
        pagination: PaginationCapabilities,
    ) -> Entity {
        Entity {
            name: "Pet".into(),
            type_name: "Pet".into(),
            key_field: "id".into(),
            key_field_type: KeyFieldType::String,
            list_query: ListQuery {
                operation_name: "pets".into(),
                query_key_tokens: vec!["pets".into()],
                params_type_name: None,
                selector_path: None,
                node_path: None,
            },
            mutations: Vec::new(),
            sync_mode: None,
            predicate_mapping: None,
            filter_capabilities: filter,
            sort_capabilities: sort,
            pagination_capabilities: pagination,
            pagination_response: PaginationResponseInfo::default(),
        }
    }

    fn filter(style: FilterStyle, params: &[&str]) -> FilterCapabilities {
        FilterCapabilities {
            has_filtering: true,
            filter_style: Some(style),
            filter_params: (!params.is_empty())
                .then(|| params.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    fn sort(param: &str, style: SortStyle) -> SortCapabilities {
        SortCapabilities {
            has_sorting: true,
            sort_param_name: Some(param.into()),
            order_by_input_type_name: None,
            sort_style: Some(style),
        }
    }

    fn offset(limit: &str, offset: &str) -> PaginationCapabilities {
        PaginationCapabilities {
            style: PaginationStyle::Offset,
            limit_param: Some(limit.into()),
            offset_param: Some(offset.into()),
            ..Default::default()
        }
    }

    fn translate(entity: &Entity, request: &SubsetRequest) -> Result<Value, TranslateError> {
        synthesize_translator(entity)
            .expect("translatable entity")
            .translate(request)
            .map(Value::Object)
    }

    fn sample_filter() -> Predicate {
        Predicate::and(vec![
            Predicate::compare("status", Operator::Eq, "available"),
            Predicate::compare("owner.name", Operator::Contains, "bo"),
        ])
    }

    #[test]
    fn hasura_arguments() {
        let pet = entity(
            FilterCapabilities {
                filter_arg_name: Some("where".into()),
                ..filter(FilterStyle::Hasura, &[])
            },
            sort("order_by", SortStyle::Hasura),
            offset("limit", "offset"),
        );
        let request = SubsetRequest {
            filter: Some(sample_filter()),
            order_by: vec![OrderBy::desc("name")],
            limit: Some(10),
            offset: Some(20),
            cursor: None,
        };
        assert_eq!(
            translate(&pet, &request).unwrap(),
            json!({
                "where": {"_and": [
                    {"status": {"_eq": "available"}},
                    {"owner": {"name": {"_ilike": "%bo%"}}}
                ]},
                "order_by": [{"name": "desc"}],
                "limit": 10,
                "offset": 20
            })
        );
    }

    #[test]
    fn prisma_arguments() {
        let pet = entity(
            filter(FilterStyle::Prisma, &[]),
            sort("orderBy", SortStyle::Prisma),
            offset("take", "skip"),
        );
        let request = SubsetRequest {
            filter: Some(Predicate::and(vec![
                Predicate::compare("price", Operator::Gte, 5),
                Predicate::not(Predicate::compare("name", Operator::Eq, "x")),
                Predicate::compare("deletedAt", Operator::IsNull, true),
            ])),
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(
            translate(&pet, &request).unwrap(),
            json!({
                "where": {"AND": [
                    {"price": {"gte": 5}},
                    {"NOT": {"name": {"equals": "x"}}},
                    {"deletedAt": {"equals": null}}
                ]},
                "take": 10
            })
        );

        let like = SubsetRequest {
            filter: Some(Predicate::compare("name", Operator::Like, "a%")),
            ..Default::default()
        };
        assert_eq!(
            translate(&pet, &like).unwrap_err(),
            TranslateError::UnsupportedOperator {
                mapping: PredicateMapping::Prisma,
                op: Operator::Like
            }
        );
    }

    #[test]
    fn jsonapi_arguments() {
        let pet = entity(
            filter(FilterStyle::JsonApi, &["filter[status]"]),
            sort("sort", SortStyle::Plain),
            PaginationCapabilities::default(),
        );
        let request = SubsetRequest {
            filter: Some(Predicate::and(vec![
                Predicate::compare("status", Operator::Eq, "available"),
                Predicate::compare("price", Operator::Gte, 5),
                Predicate::compare("tags", Operator::In, json!(["a", "b"])),
            ])),
            order_by: vec![OrderBy::desc("name"), OrderBy::asc("age")],
            ..Default::default()
        };
        assert_eq!(
            translate(&pet, &request).unwrap(),
            json!({
                "filter[status]": "available",
                "filter[price][gte]": "5",
                "filter[tags][in]": "a,b",
                "sort": "-name,age"
            })
        );

        let either = SubsetRequest {
            filter: Some(Predicate::or(vec![sample_filter()])),
            ..Default::default()
        };
        assert!(matches!(
            translate(&pet, &either),
            Err(TranslateError::UnsupportedCombinator { .. })
        ));
    }

    #[test]
    fn rest_simple_suffixed_and_plain() {
        let suffixed = entity(
            filter(FilterStyle::RestSimple, &["status_eq", "price_gte"]),
            SortCapabilities::default(),
            offset("limit", "offset"),
        );
        let request = SubsetRequest {
            filter: Some(Predicate::and(vec![
                Predicate::compare("status", Operator::Eq, "available"),
                Predicate::compare("price", Operator::Gte, 5),
            ])),
            ..Default::default()
        };
        assert_eq!(
            translate(&suffixed, &request).unwrap(),
            json!({"status_eq": "available", "price_gte": "5"})
        );

        let plain = entity(
            filter(FilterStyle::RestSimple, &["status"]),
            SortCapabilities::default(),
            offset("limit", "offset"),
        );
        let request = SubsetRequest {
            filter: Some(Predicate::compare("status", Operator::Eq, "sold")),
            order_by: vec![OrderBy::asc("name")],
            ..Default::default()
        };
        assert_eq!(
            translate(&plain, &request).unwrap_err(),
            TranslateError::UnsupportedSort("Pet".into())
        );
        let request = SubsetRequest {
            order_by: Vec::new(),
            ..request
        };
        assert_eq!(translate(&plain, &request).unwrap(), json!({"status": "sold"}));
    }

    #[test]
    fn page_and_relay_pagination() {
        let paged = entity(
            filter(FilterStyle::RestSimple, &[]),
            SortCapabilities::default(),
            PaginationCapabilities {
                style: PaginationStyle::Page,
                page_param: Some("page".into()),
                per_page_param: Some("per_page".into()),
                ..Default::default()
            },
        );
        let request = SubsetRequest {
            limit: Some(20),
            offset: Some(40),
            ..Default::default()
        };
        assert_eq!(
            translate(&paged, &request).unwrap(),
            json!({"per_page": 20, "page": 3})
        );

        let relay = entity(
            filter(FilterStyle::Hasura, &[]),
            SortCapabilities::default(),
            PaginationCapabilities {
                style: PaginationStyle::Relay,
                limit_param: Some("first".into()),
                cursor_param: Some("after".into()),
                ..Default::default()
            },
        );
        let request = SubsetRequest {
            limit: Some(50),
            cursor: Some("YXJyYXk=".into()),
            ..Default::default()
        };
        assert_eq!(
            translate(&relay, &request).unwrap(),
            json!({"first": 50, "after": "YXJyYXk="})
        );

        let request = SubsetRequest {
            offset: Some(10),
            ..Default::default()
        };
        assert!(matches!(
            translate(&relay, &request),
            Err(TranslateError::UnsupportedPagination { what: "offset", .. })
        ));
    }

    #[test]
    fn page_offset_must_start_a_page() {
        let paged = entity(
            filter(FilterStyle::RestSimple, &[]),
            SortCapabilities::default(),
            PaginationCapabilities {
                style: PaginationStyle::Page,
                page_param: Some("page".into()),
                per_page_param: Some("per_page".into()),
                ..Default::default()
            },
        );
        let request = SubsetRequest {
            limit: Some(20),
            offset: Some(30),
            ..Default::default()
        };
        let err = translate(&paged, &request).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::UnsupportedPagination { what: "offset", .. }
        ));
        assert_eq!(err.to_string(), "entity 'Pet' cannot page by offset with page pagination");

        let request = SubsetRequest {
            offset: Some(10),
            ..Default::default()
        };
        assert!(translate(&paged, &request).is_err());
    }

    #[test]
    fn hasura_contains_matches_wildcards_literally() {
        let pet = entity(
            filter(FilterStyle::Hasura, &[]),
            SortCapabilities::default(),
            PaginationCapabilities::default(),
        );
        let request = SubsetRequest {
            filter: Some(Predicate::compare("label", Operator::Contains, "50%_off")),
            ..Default::default()
        };
        assert_eq!(
            translate(&pet, &request).unwrap(),
            json!({"where": {"label": {"_ilike": "%50\\%\\_off%"}}})
        );
    }

    #[test]
    fn no_translator_for_custom_filters() {
        let mut pet = entity(
            filter(FilterStyle::Custom, &[]),
            SortCapabilities::default(),
            PaginationCapabilities::default(),
        );
        assert!(synthesize_translator(&pet).is_none());

        pet.predicate_mapping = Some(PredicateMapping::RestSimple);
        let spec = synthesize_translator(&pet).unwrap();
        assert_eq!(spec.mapping, PredicateMapping::RestSimple);
        assert_eq!(spec.operators.get("eq"), Some(&"_eq"));
    }
}
