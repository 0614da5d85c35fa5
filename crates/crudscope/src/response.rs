//! Response-side pagination analysis: how a page says "there is more".

use crate::adapter::SchemaAdapter;
use crate::names::{
    CURSOR_RESPONSE_FIELDS, END_CURSOR_FIELD, HAS_MORE_FIELDS, HAS_NEXT_PAGE_FIELD,
    META_ENVELOPE_FIELDS, PAGE_INFO_FIELD, TOTAL_FIELDS,
};
use crate::rules::{Rule, first_match};
use crate::shape::{ObjectShape, ScalarKind, Shape, TypeRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponsePaginationStyle {
    Cursor,
    Relay,
    HasMore,
    /// A total count is returned; offsets are computed by the client.
    Offset,
    #[default]
    None,
}

impl ResponsePaginationStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponsePaginationStyle::Cursor => "cursor",
            ResponsePaginationStyle::Relay => "relay",
            ResponsePaginationStyle::HasMore => "hasMore",
            ResponsePaginationStyle::Offset => "offset",
            ResponsePaginationStyle::None => "none",
        }
    }
}

/// Where a response carries its pagination signals.
///
/// `*Field` is the bare field name, `*Path` the dotted path from the
/// response root (`pageInfo.endCursor`, `meta.total`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponseInfo {
    pub style: ResponsePaginationStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_path: Option<String>,
}

/// Classify the pagination signals of a list operation's response.
///
/// Fields are searched at the response root, then inside the metadata
/// envelopes (`meta`, `pagination`, ...). A response that is itself an
/// array carries no signals.
pub fn analyze_response(adapter: &dyn SchemaAdapter, response: &TypeRef) -> PaginationResponseInfo {
    let Some(root) = adapter.object(response) else {
        return PaginationResponseInfo::default();
    };

    let mut scopes = vec![Scope {
        prefix: None,
        object: root,
    }];
    for name in META_ENVELOPE_FIELDS {
        let Some(field) = root.field(name) else {
            continue;
        };
        if let Some(object) = adapter.object(&field.ty) {
            scopes.push(Scope {
                prefix: Some(field.name.as_str()),
                object,
            });
        }
    }

    let input = ResponseInput { adapter, scopes };
    match first_match(RESPONSE_RULES, &input) {
        Some((rule, info)) => {
            tracing::debug!(rule, style = ?info.style, "classified response pagination");
            info
        }
        None => PaginationResponseInfo::default(),
    }
}

struct Scope<'a> {
    prefix: Option<&'a str>,
    object: &'a ObjectShape,
}

impl Scope<'_> {
    fn path(&self, field: &str) -> String {
        match self.prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        }
    }
}

struct ResponseInput<'a> {
    adapter: &'a dyn SchemaAdapter,
    scopes: Vec<Scope<'a>>,
}

/// A matched signal field: `(name, path)`.
type Found = (String, String);

impl ResponseInput<'_> {
    /// First scalar field named in `table` whose kind passes `accept`,
    /// scopes searched in order.
    fn scalar(&self, table: &[&str], accept: fn(ScalarKind) -> bool) -> Option<Found> {
        self.scopes.iter().find_map(|scope| {
            table.iter().find_map(|candidate| {
                let field = scope.object.field(candidate)?;
                let kind = self.adapter.unwrap(&field.ty).and_then(Shape::scalar_kind)?;
                accept(kind).then(|| (field.name.clone(), scope.path(&field.name)))
            })
        })
    }

    fn has_more(&self) -> Option<Found> {
        self.scalar(HAS_MORE_FIELDS, |kind| kind == ScalarKind::Boolean)
    }

    fn total(&self) -> Option<Found> {
        self.scalar(TOTAL_FIELDS, ScalarKind::is_numeric)
    }
}

fn split(found: Option<Found>) -> (Option<String>, Option<String>) {
    match found {
        Some((field, path)) => (Some(field), Some(path)),
        None => (None, None),
    }
}

type ResponseTest = fn(&ResponseInput<'_>) -> Option<PaginationResponseInfo>;

static RESPONSE_RULES: &[Rule<ResponseTest>] = &[
    Rule {
        name: "relay-page-info",
        test: relay_page_info,
    },
    Rule {
        name: "cursor-field",
        test: cursor_field,
    },
    Rule {
        name: "has-more-flag",
        test: has_more_flag,
    },
    Rule {
        name: "total-count",
        test: total_count,
    },
];

fn relay_page_info(input: &ResponseInput<'_>) -> Option<PaginationResponseInfo> {
    input.scopes.iter().find_map(|scope| {
        let page_info = scope.object.field_ci(PAGE_INFO_FIELD)?;
        let info = input.adapter.object(&page_info.ty)?;
        let has_next = info.field_ci(HAS_NEXT_PAGE_FIELD);
        let end_cursor = info.field_ci(END_CURSOR_FIELD);
        if has_next.is_none() && end_cursor.is_none() {
            return None;
        }
        let base = scope.path(&page_info.name);
        Some(PaginationResponseInfo {
            style: ResponsePaginationStyle::Relay,
            next_cursor_field: end_cursor.map(|f| f.name.clone()),
            next_cursor_path: end_cursor.map(|f| format!("{base}.{}", f.name)),
            has_more_field: has_next.map(|f| f.name.clone()),
            has_more_path: has_next.map(|f| format!("{base}.{}", f.name)),
            ..Default::default()
        })
    })
}

fn cursor_field(input: &ResponseInput<'_>) -> Option<PaginationResponseInfo> {
    let (field, path) = input.scalar(CURSOR_RESPONSE_FIELDS, |kind| kind != ScalarKind::Boolean)?;
    let (has_more_field, has_more_path) = split(input.has_more());
    Some(PaginationResponseInfo {
        style: ResponsePaginationStyle::Cursor,
        next_cursor_field: Some(field),
        next_cursor_path: Some(path),
        has_more_field,
        has_more_path,
        ..Default::default()
    })
}

fn has_more_flag(input: &ResponseInput<'_>) -> Option<PaginationResponseInfo> {
    let (field, path) = input.has_more()?;
    let (total_field, total_path) = split(input.total());
    Some(PaginationResponseInfo {
        style: ResponsePaginationStyle::HasMore,
        has_more_field: Some(field),
        has_more_path: Some(path),
        total_field,
        total_path,
        ..Default::default()
    })
}

fn total_count(input: &ResponseInput<'_>) -> Option<PaginationResponseInfo> {
    let (field, path) = input.total()?;
    Some(PaginationResponseInfo {
        style: ResponsePaginationStyle::Offset,
        total_field: Some(field),
        total_path: Some(path),
        ..Default::default()
    })
}
