//! Matching create/update/delete operations to entities.

use crate::descriptor::{MutationDescriptor, MutationVerb};
use crate::entity::{Mutation, MutationKind};
use crate::names::pascal;

/// The entity a matcher is looking for mutations of.
#[derive(Debug, Clone, Copy)]
pub struct MatchTarget<'a> {
    pub entity_name: &'a str,
    pub type_name: &'a str,
    /// REST list path the entity was discovered from.
    pub list_path: Option<&'a str>,
}

/// A convention for recognizing an entity's write operations.
pub trait MutationMatcher: Send + Sync {
    /// Matcher identifier (e.g., "name-prefix", "path-shape").
    fn name(&self) -> &'static str;

    /// Classify one mutation against the target, if it belongs to it.
    fn classify(
        &self,
        target: &MatchTarget<'_>,
        mutation: &MutationDescriptor,
    ) -> Option<Mutation>;
}

/// Every mutation in `mutations` that `matcher` attaches to `target`, in
/// descriptor order. Several mutations of one kind may match.
pub fn match_mutations(
    matcher: &dyn MutationMatcher,
    target: &MatchTarget<'_>,
    mutations: &[MutationDescriptor],
) -> Vec<Mutation> {
    let found: Vec<Mutation> = mutations
        .iter()
        .filter_map(|m| matcher.classify(target, m))
        .collect();
    tracing::trace!(
        matcher = matcher.name(),
        entity = target.entity_name,
        found = found.len(),
        "matched mutations"
    );
    found
}

// --- GraphQL (name prefix) ---

/// Matches `createPet` / `updatePet` / `deletePet` style operation names.
pub struct NamePrefixMatcher;

const NAME_PREFIXES: &[(&str, MutationKind)] = &[
    ("create", MutationKind::Insert),
    ("insert", MutationKind::Insert),
    ("update", MutationKind::Update),
    ("delete", MutationKind::Delete),
    ("remove", MutationKind::Delete),
];

impl MutationMatcher for NamePrefixMatcher {
    fn name(&self) -> &'static str {
        "name-prefix"
    }

    fn classify(
        &self,
        target: &MatchTarget<'_>,
        mutation: &MutationDescriptor,
    ) -> Option<Mutation> {
        let lower = mutation.operation_name.to_lowercase();
        let (_, kind) = NAME_PREFIXES
            .iter()
            .find(|(prefix, _)| lower.starts_with(prefix))?;
        let mentions_entity = lower.contains(&target.entity_name.to_lowercase())
            || lower.contains(&target.type_name.to_lowercase());
        if !mentions_entity {
            return None;
        }
        Some(Mutation {
            kind: *kind,
            operation_name: mutation.operation_name.clone(),
            input_type_name: mutation
                .has_input
                .then(|| format!("{}Variables", pascal(&mutation.operation_name))),
            path_param_name: None,
        })
    }
}

// --- REST (path shape) ---

/// Matches `POST /pets`, `PUT|PATCH /pets/{id}` and `DELETE /pets/{id}`
/// against the list path `/pets`.
pub struct PathShapeMatcher;

impl MutationMatcher for PathShapeMatcher {
    fn name(&self) -> &'static str {
        "path-shape"
    }

    fn classify(
        &self,
        target: &MatchTarget<'_>,
        mutation: &MutationDescriptor,
    ) -> Option<Mutation> {
        let list_path = target.list_path?.trim_end_matches('/');
        let path = mutation.path.as_deref()?.trim_end_matches('/');

        let (kind, path_param_name) = match mutation.verb {
            MutationVerb::Post if path == list_path => (MutationKind::Insert, None),
            MutationVerb::Put | MutationVerb::Patch => (
                MutationKind::Update,
                Some(item_param(list_path, path, &mutation.path_params)?),
            ),
            MutationVerb::Delete => (
                MutationKind::Delete,
                Some(item_param(list_path, path, &mutation.path_params)?),
            ),
            _ => return None,
        };
        Some(Mutation {
            kind,
            operation_name: mutation.operation_name.clone(),
            input_type_name: mutation.input_type_name.clone(),
            path_param_name,
        })
    }
}

/// `"/pets/{petId}"` against `"/pets"` yields `"petId"`, the last declared
/// path parameter.
fn item_param(list_path: &str, path: &str, path_params: &[String]) -> Option<String> {
    let param = path_params.last()?;
    let rest = path.strip_prefix(list_path)?.strip_prefix('/')?;
    (rest.strip_prefix('{')?.strip_suffix('}')? == param).then(|| param.clone())
}
