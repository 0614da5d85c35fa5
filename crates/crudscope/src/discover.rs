//! Entity discovery: turning list operations into [`Entity`] records.

use crate::adapter::SchemaAdapter;
use crate::capability;
use crate::config::{EntityOverride, Overrides};
use crate::descriptor::QueryDescriptor;
use crate::entity::{DiscoveryResult, Entity, ListQuery, SyncMode};
use crate::key::resolve_key_field;
use crate::locate::{ArrayLocation, follow_selector, locate_array};
use crate::mutations::{MatchTarget, match_mutations};
use crate::names::{EDGE_NODE_FIELD, EDGES_FIELD, KEY_FIELD_CANDIDATES, pascal, singular};
use crate::response::analyze_response;
use crate::shape::ObjectShape;
use std::collections::BTreeSet;

/// Discover every entity exposed by `adapter`.
///
/// List operations are visited in operation-name order; the first operation
/// to yield a given item type defines the entity and later ones are dropped.
/// Problems never abort discovery: each one becomes a single entry in
/// [`DiscoveryResult::warnings`].
pub fn discover(adapter: &dyn SchemaAdapter, overrides: &Overrides) -> DiscoveryResult {
    if !adapter.has_query_root() {
        return DiscoveryResult {
            entities: Vec::new(),
            warnings: vec![format!(
                "The {} schema has no query root; no entities can be discovered. \
                 Check that the schema document is complete.",
                adapter.conventions().family
            )],
        };
    }

    let mut queries: Vec<&QueryDescriptor> = adapter.list_queries().iter().collect();
    queries.sort_by(|a, b| a.operation_name.cmp(&b.operation_name));

    let mut discoverer = Discoverer {
        adapter,
        overrides,
        seen: BTreeSet::new(),
        used: BTreeSet::new(),
        result: DiscoveryResult::default(),
    };
    for query in queries {
        discoverer.visit(query);
    }
    discoverer.finish()
}

struct Discoverer<'a> {
    adapter: &'a dyn SchemaAdapter,
    overrides: &'a Overrides,
    /// Item type names already claimed by an entity (or failed for lack of a key).
    seen: BTreeSet<String>,
    /// Override keys that matched something.
    used: BTreeSet<&'a str>,
    result: DiscoveryResult,
}

impl<'a> Discoverer<'a> {
    fn visit(&mut self, query: &'a QueryDescriptor) {
        let operation = query.operation_name.as_str();
        let mut warnings = Vec::new();

        let inferred = locate_array(self.adapter, &query.response, operation, &mut warnings);
        let preliminary = match &inferred {
            Some(location) => self.override_for(query, location),
            None => self.lookup(&[operation]),
        };
        let location = match preliminary.and_then(|entry| entry.selector_path.as_deref()) {
            Some(path) => match follow_selector(self.adapter, &query.response, path) {
                Some(location) => {
                    // An explicit selector settles any ambiguity.
                    warnings.clear();
                    Some(location)
                }
                None => {
                    warnings.push(format!(
                        "{operation}: selectorPath '{path}' does not lead to an array in the \
                         response; using the inferred location instead."
                    ));
                    inferred
                }
            },
            None => inferred,
        };

        let Some(location) = location else {
            self.result.warnings.append(&mut warnings);
            return;
        };
        let Some((item, node_path)) = self.item_of(&location) else {
            tracing::trace!(operation, "list items are not objects");
            self.result.warnings.append(&mut warnings);
            return;
        };

        let type_name = item
            .name
            .clone()
            .unwrap_or_else(|| fallback_type_name(query));
        if !self.seen.insert(type_name.clone()) {
            tracing::trace!(operation, type_name = %type_name, "item type already discovered");
            return;
        }
        let name = pascal(&type_name);
        let entry = self
            .lookup(&[operation, name.as_str(), type_name.as_str()])
            .or(preliminary);

        let Some(key) = resolve_key_field(
            self.adapter,
            item,
            &name,
            entry.and_then(|e| e.key_field.as_deref()),
            &mut warnings,
        ) else {
            warnings.push(format!(
                "Entity '{name}' (type {type_name}, from {operation}) has no key field: none of \
                 {} is present. Set keyField for '{name}' in the overrides to include it.",
                KEY_FIELD_CANDIDATES.join(", "),
            ));
            self.result.warnings.append(&mut warnings);
            return;
        };

        let capabilities = capability::analyze(self.adapter, query);
        let pagination_response = analyze_response(self.adapter, &query.response);
        let target = MatchTarget {
            entity_name: &name,
            type_name: &type_name,
            list_path: query.path.as_deref(),
        };
        let mutations = match_mutations(
            self.adapter.conventions().mutation_matcher,
            &target,
            self.adapter.mutations(),
        );

        let mut entity = Entity {
            name: name.clone(),
            type_name: type_name.clone(),
            key_field: key.name,
            key_field_type: key.ty,
            list_query: ListQuery {
                operation_name: query.operation_name.clone(),
                query_key_tokens: query.query_key.clone(),
                params_type_name: query.params_type_name.clone(),
                selector_path: location.selector(),
                node_path,
            },
            mutations,
            sync_mode: entry.and_then(|e| e.sync_mode),
            predicate_mapping: entry.and_then(|e| e.predicate_mapping),
            filter_capabilities: capabilities.filter,
            sort_capabilities: capabilities.sort,
            pagination_capabilities: capabilities.pagination,
            pagination_response,
        };

        if entity.sync_mode == Some(SyncMode::OnDemand) && entity.effective_mapping().is_none() {
            warnings.push(format!(
                "Entity '{name}': syncMode 'on-demand' needs a recognized filter style, but \
                 {operation} has none; falling back to 'full'. Set predicateMapping to enable \
                 on-demand sync."
            ));
            entity.sync_mode = Some(SyncMode::Full);
        }

        tracing::debug!(
            entity = %entity.name,
            operation,
            key = %entity.key_field,
            mutations = entity.mutations.len(),
            "discovered entity"
        );
        self.result.warnings.append(&mut warnings);
        self.result.entities.push(entity);
    }

    fn override_for(
        &mut self,
        query: &QueryDescriptor,
        location: &ArrayLocation<'a>,
    ) -> Option<&'a EntityOverride> {
        let type_name = self
            .item_of(location)
            .and_then(|(item, _)| item.name.clone())
            .unwrap_or_else(|| fallback_type_name(query));
        let name = pascal(&type_name);
        self.lookup(&[query.operation_name.as_str(), name.as_str(), type_name.as_str()])
    }

    fn lookup(&mut self, names: &[&str]) -> Option<&'a EntityOverride> {
        let (key, entry) = self.overrides.find(names)?;
        self.used.insert(key);
        Some(entry)
    }

    /// The item object of a located array, seeing through Relay edges.
    fn item_of(&self, location: &ArrayLocation<'a>) -> Option<(&'a ObjectShape, Option<String>)> {
        let item = self.adapter.object(location.item)?;
        if location.path.last().map(String::as_str) == Some(EDGES_FIELD) {
            let node = item
                .field(EDGE_NODE_FIELD)
                .and_then(|field| self.adapter.object(&field.ty));
            if let Some(node) = node {
                return Some((node, Some(EDGE_NODE_FIELD.to_string())));
            }
        }
        Some((item, None))
    }

    fn finish(mut self) -> DiscoveryResult {
        for key in self.overrides.entities.keys() {
            if !self.used.contains(key.as_str()) {
                self.result.warnings.push(format!(
                    "Override '{key}' matches no discovered entity, list operation or type; \
                     it was ignored."
                ));
            }
        }
        self.result
    }
}

/// Type name for inline item schemas: the singular of the last static
/// path segment (`/stores/{id}/pets` gives `Pet`).
fn fallback_type_name(query: &QueryDescriptor) -> String {
    let token = query
        .path
        .as_deref()
        .and_then(|path| {
            path.split('/')
                .rev()
                .find(|segment| !segment.is_empty() && !segment.starts_with('{'))
        })
        .unwrap_or(&query.operation_name);
    pascal(&singular(token))
}
