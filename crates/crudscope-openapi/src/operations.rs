//! Path item walking: list candidates and write operations.

use crate::schema::{Lowering, ref_name, resolve};
use crudscope::names::{camel, pascal};
use crudscope::{
    ArgLocation, ArgumentDef, MutationDescriptor, MutationVerb, QueryDescriptor, ScalarKind,
    TypeRef,
};
use serde_json::Value;

const WRITE_METHODS: &[(&str, MutationVerb)] = &[
    ("post", MutationVerb::Post),
    ("put", MutationVerb::Put),
    ("patch", MutationVerb::Patch),
    ("delete", MutationVerb::Delete),
];

#[derive(Debug, Default)]
pub(crate) struct Operations {
    pub queries: Vec<QueryDescriptor>,
    pub mutations: Vec<MutationDescriptor>,
    /// Whether the document has any GET operation at all.
    pub has_reads: bool,
}

pub(crate) fn collect(document: &Value, lowering: &Lowering<'_>) -> Operations {
    let mut operations = Operations::default();
    let Some(paths) = document.get("paths").and_then(|p| p.as_object()) else {
        return operations;
    };

    for (path, item) in paths {
        let item = resolve(document, item);
        let Some(methods) = item.as_object() else {
            continue;
        };
        for (method, op) in methods {
            let method = method.to_ascii_lowercase();
            if method == "get" {
                operations.has_reads = true;
                if !is_collection_path(path) {
                    continue;
                }
                match list_query(document, lowering, path, item, op) {
                    Some(query) => operations.queries.push(query),
                    None => tracing::debug!(path = %path, "GET without a JSON response; skipped"),
                }
            } else if let Some((_, verb)) = WRITE_METHODS.iter().find(|(m, _)| *m == method) {
                operations
                    .mutations
                    .push(mutation(document, path, &method, *verb, op));
            }
        }
    }

    tracing::debug!(
        queries = operations.queries.len(),
        mutations = operations.mutations.len(),
        "collected OpenAPI operations"
    );
    operations
}

fn list_query(
    document: &Value,
    lowering: &Lowering<'_>,
    path: &str,
    item: &Value,
    op: &Value,
) -> Option<QueryDescriptor> {
    let schema = response_schema(document, op)?;
    let operation_name = operation_name(op, "get", path);
    let arguments = parameters(document, lowering, item, op);
    let params_type_name =
        (!arguments.is_empty()).then(|| format!("{}Params", pascal(&operation_name)));

    Some(QueryDescriptor {
        query_key: segments(path).map(String::from).collect(),
        response: lowering.lower(schema),
        params_type_name,
        arguments,
        path: Some(path.to_string()),
        operation_name,
    })
}

fn mutation(
    document: &Value,
    path: &str,
    method: &str,
    verb: MutationVerb,
    op: &Value,
) -> MutationDescriptor {
    let body = op.get("requestBody").map(|b| resolve(document, b));
    let input_type_name = body
        .and_then(|b| json_schema(document, b))
        .and_then(|schema| {
            schema
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(ref_name)
                .or_else(|| schema.get("title").and_then(Value::as_str))
        })
        .map(String::from);

    MutationDescriptor {
        operation_name: operation_name(op, method, path),
        verb,
        path: Some(path.to_string()),
        has_input: body.is_some(),
        input_type_name,
        path_params: segments(path).filter_map(template_param).map(String::from).collect(),
    }
}

/// Path-item and operation parameters, the operation's winning on
/// `(name, in)` clashes.
fn parameters(
    document: &Value,
    lowering: &Lowering<'_>,
    item: &Value,
    op: &Value,
) -> Vec<ArgumentDef> {
    let mut params: Vec<ArgumentDef> = Vec::new();
    let declared = [item, op]
        .into_iter()
        .filter_map(|v| v.get("parameters").and_then(|p| p.as_array()))
        .flatten();

    for raw in declared {
        let param = resolve(document, raw);
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            continue;
        };
        let location = match param.get("in").and_then(Value::as_str) {
            Some("query") => ArgLocation::Query,
            Some("path") => ArgLocation::Path,
            Some("header") => ArgLocation::Header,
            Some("cookie") => ArgLocation::Cookie,
            other => {
                tracing::debug!(name, location = ?other, "parameter location not recognized");
                continue;
            }
        };
        let required = location == ArgLocation::Path
            || param.get("required").and_then(Value::as_bool).unwrap_or(false);
        let ty = param
            .get("schema")
            .map(|schema| lowering.lower(schema))
            .unwrap_or(TypeRef::Scalar(ScalarKind::String));
        let ty = if required { ty.non_null() } else { ty };

        let def = ArgumentDef::new(name, ty, location);
        match params
            .iter_mut()
            .find(|p| p.name == def.name && p.location == def.location)
        {
            Some(existing) => *existing = def,
            None => params.push(def),
        }
    }
    params
}

/// JSON body schema of the lowest 2xx response, or `default`.
fn response_schema<'a>(document: &'a Value, op: &'a Value) -> Option<&'a Value> {
    let responses = op.get("responses")?.as_object()?;
    let (_, response) = responses
        .iter()
        .filter(|(code, _)| code.starts_with('2'))
        .min_by(|(a, _), (b, _)| a.cmp(b))
        .or_else(|| responses.iter().find(|(code, _)| code.as_str() == "default"))?;
    json_schema(document, resolve(document, response))
}

/// Schema of the JSON media type of a request body or response.
fn json_schema<'a>(document: &'a Value, body: &'a Value) -> Option<&'a Value> {
    let content = body.get("content")?.as_object()?;
    let media = content
        .get("application/json")
        .or_else(|| {
            content
                .iter()
                .find(|(media_type, _)| media_type.contains("json"))
                .map(|(_, media)| media)
        })?;
    media.get("schema").map(|schema| resolve_non_component(document, schema))
}

/// Follow `$ref`s that do not name a component schema (so `#/components/schemas/X`
/// stays symbolic for the type map).
fn resolve_non_component<'a>(document: &'a Value, schema: &'a Value) -> &'a Value {
    let is_component = schema
        .get("$ref")
        .and_then(Value::as_str)
        .is_some_and(|r| ref_name(r).is_some());
    if is_component {
        schema
    } else {
        resolve(document, schema)
    }
}

/// `operationId`, or one synthesized from the method and path
/// (`get /pets/{petId}/toys` → `getPetsPetIdToys`).
fn operation_name(op: &Value, method: &str, path: &str) -> String {
    if let Some(id) = op.get("operationId").and_then(Value::as_str) {
        return id.to_string();
    }
    let words: Vec<&str> = segments(path)
        .map(|segment| template_param(segment).unwrap_or(segment))
        .collect();
    camel(&format!("{method} {}", words.join(" ")))
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// `{petId}` → `petId`.
fn template_param(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

/// A path lists a collection when its last segment is static.
fn is_collection_path(path: &str) -> bool {
    segments(path)
        .last()
        .is_some_and(|segment| template_param(segment).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collection_paths() {
        assert!(is_collection_path("/pets"));
        assert!(is_collection_path("/stores/{storeId}/pets/"));
        assert!(!is_collection_path("/pets/{petId}"));
        assert!(!is_collection_path("/"));
    }

    #[test]
    fn synthesized_operation_names() {
        assert_eq!(
            operation_name(&json!({}), "get", "/pets/{petId}/toys"),
            "getPetsPetIdToys"
        );
        assert_eq!(
            operation_name(&json!({ "operationId": "listToys" }), "get", "/toys"),
            "listToys"
        );
    }

    #[test]
    fn operation_parameters_override_path_item() {
        let document = json!({
            "components": { "parameters": {
                "Limit": { "name": "limit", "in": "query", "schema": { "type": "integer" } }
            }}
        });
        let lowering = Lowering::new(&document);
        let item = json!({
            "parameters": [
                { "name": "storeId", "in": "path", "schema": { "type": "string" } },
                { "name": "status", "in": "query", "schema": { "type": "string" } }
            ]
        });
        let op = json!({
            "parameters": [
                { "$ref": "#/components/parameters/Limit" },
                { "name": "status", "in": "query", "required": true, "schema": { "type": "string" } }
            ]
        });
        let params = parameters(&document, &lowering, &item, &op);
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["storeId", "status", "limit"]);
        assert!(params[0].is_required());
        assert!(params[1].is_required());
        assert_eq!(params[2].ty, TypeRef::Scalar(ScalarKind::Integer));
    }

    #[test]
    fn lowest_success_response_wins() {
        let document = json!({});
        let op = json!({
            "responses": {
                "default": { "content": { "application/json": { "schema": { "type": "string" } } } },
                "201": { "content": { "application/json": { "schema": { "type": "integer" } } } },
                "200": { "content": { "application/vnd.api+json": { "schema": { "type": "boolean" } } } }
            }
        });
        assert_eq!(
            response_schema(&document, &op),
            Some(&json!({ "type": "boolean" }))
        );
    }
}
