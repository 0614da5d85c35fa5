//! Infinite-query planning: initial page parameter plus a next-page recipe.
//!
//! A plan combines what the list operation accepts (request pagination
//! style) with what its response reports (response pagination style):
//!
//! | request        | response           | initial     | next page                      |
//! |----------------|--------------------|-------------|--------------------------------|
//! | cursor / relay | cursor / relay     | `undefined` | response cursor, gated on more |
//! | offset         | offset (total)     | `0`         | `last + limit` while `< total` |
//! | offset         | hasMore            | `0`         | `last + limit` while more      |
//! | page           | hasMore            | `1`         | `last + 1` while more          |
//!
//! Any other combination needs an explicit `nextPagePath` override.

use crate::capability::PaginationStyle;
use crate::config::{EntityOverride, Overrides};
use crate::entity::{DiscoveryResult, Entity};
use crate::response::ResponsePaginationStyle;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A page parameter; `Undefined` both starts cursor pagination and stops
/// every style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageParam {
    Undefined,
    Number(u64),
    Cursor(String),
}

impl PageParam {
    pub fn is_undefined(&self) -> bool {
        matches!(self, PageParam::Undefined)
    }

    fn as_number(&self) -> u64 {
        match self {
            PageParam::Number(n) => *n,
            _ => 0,
        }
    }
}

/// How the next page parameter is derived from the last page.
///
/// Paths are dotted paths from the response root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NextPage {
    #[serde(rename_all = "camelCase")]
    Cursor {
        cursor_path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        has_more_path: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    OffsetTotal {
        #[serde(skip_serializing_if = "Option::is_none")]
        limit_param: Option<String>,
        total_path: String,
    },
    #[serde(rename_all = "camelCase")]
    OffsetHasMore {
        #[serde(skip_serializing_if = "Option::is_none")]
        limit_param: Option<String>,
        has_more_path: String,
    },
    #[serde(rename_all = "camelCase")]
    PageHasMore { has_more_path: String },
    /// Read the next parameter verbatim from a user-supplied path.
    #[serde(rename_all = "camelCase")]
    Custom { next_path: String },
}

impl NextPage {
    /// The recipe in `lastPage` / `lastPageParam` notation.
    pub fn expression(&self) -> String {
        match self {
            NextPage::Cursor {
                cursor_path,
                has_more_path: Some(has_more),
            } => format!("lastPage.{has_more} ? lastPage.{cursor_path} : undefined"),
            NextPage::Cursor {
                cursor_path,
                has_more_path: None,
            } => format!("lastPage.{cursor_path} ?? undefined"),
            NextPage::OffsetTotal { total_path, .. } => format!(
                "lastPageParam + limit < lastPage.{total_path} ? lastPageParam + limit : undefined"
            ),
            NextPage::OffsetHasMore { has_more_path, .. } => {
                format!("lastPage.{has_more_path} ? lastPageParam + limit : undefined")
            }
            NextPage::PageHasMore { has_more_path } => {
                format!("lastPage.{has_more_path} ? lastPageParam + 1 : undefined")
            }
            NextPage::Custom { next_path } => format!("lastPage.{next_path} ?? undefined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfiniteQueryPlan {
    pub initial_page_param: PageParam,
    pub next_page: NextPage,
    /// Where the items sit in each page, for counting them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector_path: Option<String>,
}

/// Neither inference nor an override could produce a next-page recipe.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Entity '{entity}': cannot infer infinite-query pagination from request style '{request}' \
     and response style '{response}'. Set nextPagePath in its override."
)]
pub struct NotInferable {
    pub entity: String,
    pub request: &'static str,
    pub response: &'static str,
}

/// Plan incremental pagination for `entity`. An override `nextPagePath`
/// always wins over inference.
pub fn plan_infinite_query(
    entity: &Entity,
    entry: Option<&EntityOverride>,
) -> Result<InfiniteQueryPlan, NotInferable> {
    let request = &entity.pagination_capabilities;
    let response = &entity.pagination_response;
    let plan = |next_page: NextPage| InfiniteQueryPlan {
        initial_page_param: initial_page_param(request.style),
        next_page,
        selector_path: entity.list_query.selector_path.clone(),
    };

    if let Some(next_path) = entry.and_then(|e| e.next_page_path.as_deref()) {
        return Ok(plan(NextPage::Custom {
            next_path: next_path.to_string(),
        }));
    }

    let next_page = match (request.style, response.style) {
        (
            PaginationStyle::Cursor | PaginationStyle::Relay,
            ResponsePaginationStyle::Cursor | ResponsePaginationStyle::Relay,
        ) => response
            .next_cursor_path
            .clone()
            .map(|cursor_path| NextPage::Cursor {
                cursor_path,
                has_more_path: response.has_more_path.clone(),
            }),
        (PaginationStyle::Offset, ResponsePaginationStyle::Offset) => {
            response
                .total_path
                .clone()
                .map(|total_path| NextPage::OffsetTotal {
                    limit_param: request.limit_param.clone(),
                    total_path,
                })
        }
        (PaginationStyle::Offset, ResponsePaginationStyle::HasMore) => response
            .has_more_path
            .clone()
            .map(|has_more_path| NextPage::OffsetHasMore {
                limit_param: request.limit_param.clone(),
                has_more_path,
            }),
        (PaginationStyle::Page, ResponsePaginationStyle::HasMore) => response
            .has_more_path
            .clone()
            .map(|has_more_path| NextPage::PageHasMore { has_more_path }),
        _ => None,
    };

    match next_page {
        Some(next_page) => {
            tracing::debug!(
                entity = %entity.name,
                next = %next_page.expression(),
                "planned infinite query"
            );
            Ok(plan(next_page))
        }
        None => Err(NotInferable {
            entity: entity.name.clone(),
            request: request.style.as_str(),
            response: response.style.as_str(),
        }),
    }
}

/// Plan every entity of a discovery result. Entities whose plan cannot be
/// inferred are left out and reported as warnings.
pub fn plan_infinite_queries(
    result: &DiscoveryResult,
    overrides: &Overrides,
) -> (BTreeMap<String, InfiniteQueryPlan>, Vec<String>) {
    let mut plans = BTreeMap::new();
    let mut warnings = Vec::new();
    for entity in &result.entities {
        let entry = overrides
            .find(&[
                entity.name.as_str(),
                entity.list_query.operation_name.as_str(),
                entity.type_name.as_str(),
            ])
            .map(|(_, entry)| entry);
        match plan_infinite_query(entity, entry) {
            Ok(plan) => {
                plans.insert(entity.name.clone(), plan);
            }
            Err(err) => warnings.push(err.to_string()),
        }
    }
    (plans, warnings)
}

fn initial_page_param(style: PaginationStyle) -> PageParam {
    match style {
        PaginationStyle::Offset => PageParam::Number(0),
        PaginationStyle::Page => PageParam::Number(1),
        PaginationStyle::Cursor | PaginationStyle::Relay | PaginationStyle::None => {
            PageParam::Undefined
        }
    }
}

// ============================================================================
// Evaluation
// ============================================================================

/// The inputs of a next-page computation.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub last_page: &'a Value,
    pub last_page_param: &'a PageParam,
    /// Requested page size; when absent, the item count of `last_page` is used.
    pub page_size: Option<u64>,
}

impl InfiniteQueryPlan {
    /// Evaluate the recipe against a fetched page. `Undefined` means there
    /// are no more pages.
    pub fn next_page_param(&self, ctx: &PageContext<'_>) -> PageParam {
        let page = ctx.last_page;
        match &self.next_page {
            NextPage::Cursor {
                cursor_path,
                has_more_path,
            } => {
                if let Some(path) = has_more_path {
                    if !truthy(value_at(page, path)) {
                        return PageParam::Undefined;
                    }
                }
                page_param_of(value_at(page, cursor_path))
            }
            NextPage::OffsetTotal { total_path, .. } => {
                let Some(total) = value_at(page, total_path).and_then(Value::as_u64) else {
                    return PageParam::Undefined;
                };
                let limit = self.page_size(ctx);
                let next = ctx.last_page_param.as_number() + limit;
                if limit > 0 && next < total {
                    PageParam::Number(next)
                } else {
                    PageParam::Undefined
                }
            }
            NextPage::OffsetHasMore { has_more_path, .. } => {
                let limit = self.page_size(ctx);
                if limit > 0 && truthy(value_at(page, has_more_path)) {
                    PageParam::Number(ctx.last_page_param.as_number() + limit)
                } else {
                    PageParam::Undefined
                }
            }
            NextPage::PageHasMore { has_more_path } => {
                if truthy(value_at(page, has_more_path)) {
                    PageParam::Number(ctx.last_page_param.as_number() + 1)
                } else {
                    PageParam::Undefined
                }
            }
            NextPage::Custom { next_path } => page_param_of(value_at(page, next_path)),
        }
    }

    fn page_size(&self, ctx: &PageContext<'_>) -> u64 {
        ctx.page_size.unwrap_or_else(|| {
            let items = match &self.selector_path {
                Some(path) => value_at(ctx.last_page, path),
                None => Some(ctx.last_page),
            };
            items
                .and_then(Value::as_array)
                .map_or(0, |items| items.len() as u64)
        })
    }
}

fn value_at<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| current.get(segment))
}

/// JavaScript truthiness, which the rendered expressions rely on.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

fn page_param_of(value: Option<&Value>) -> PageParam {
    match value {
        Some(Value::String(s)) if !s.is_empty() => PageParam::Cursor(s.clone()),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(n) => PageParam::Number(n),
            None => PageParam::Cursor(n.to_string()),
        },
        _ => PageParam::Undefined,
    }
}
