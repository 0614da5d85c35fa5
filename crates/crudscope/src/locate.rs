//! Array location: finding the list results inside a response shape.

use crate::adapter::SchemaAdapter;
use crate::shape::TypeRef;

/// Maximum number of nested objects traversed while searching for the array.
pub const MAX_DEPTH: usize = 3;

/// Where a response keeps its item array.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLocation<'a> {
    /// Field names from the response root to the array (empty when the
    /// response itself is the array).
    pub path: Vec<String>,
    pub item: &'a TypeRef,
}

impl ArrayLocation<'_> {
    /// Dotted selector path, or `None` for a bare array response.
    pub fn selector(&self) -> Option<String> {
        (!self.path.is_empty()).then(|| self.path.join("."))
    }
}

/// Find the array holding list results in `ty`.
///
/// When several array fields sit at the same level the first in declaration
/// order wins and a warning naming every candidate is pushed onto `warnings`.
/// `context` names the operation in that warning.
pub fn locate_array<'a>(
    adapter: &'a dyn SchemaAdapter,
    ty: &'a TypeRef,
    context: &str,
    warnings: &mut Vec<String>,
) -> Option<ArrayLocation<'a>> {
    let mut locator = Locator {
        adapter,
        context,
        visited: Vec::new(),
        warnings,
    };
    locator.visit(ty, 0)
}

/// Follow an explicit dotted `path` through object fields and return the
/// array it lands on.
pub fn follow_selector<'a>(
    adapter: &'a dyn SchemaAdapter,
    ty: &'a TypeRef,
    path: &str,
) -> Option<ArrayLocation<'a>> {
    let mut current = ty;
    let mut segments = Vec::new();
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let object = adapter.object(current)?;
        current = &object.field(segment)?.ty;
        segments.push(segment.to_string());
    }
    let item = adapter.list_item(current)?;
    Some(ArrayLocation {
        path: segments,
        item,
    })
}

struct Locator<'a, 'w> {
    adapter: &'a dyn SchemaAdapter,
    context: &'w str,
    /// Named object types on the current search path.
    visited: Vec<&'a str>,
    warnings: &'w mut Vec<String>,
}

impl<'a> Locator<'a, '_> {
    fn visit(&mut self, ty: &'a TypeRef, depth: usize) -> Option<ArrayLocation<'a>> {
        if let Some(item) = self.adapter.list_item(ty) {
            return Some(ArrayLocation {
                path: Vec::new(),
                item,
            });
        }
        if depth >= MAX_DEPTH {
            return None;
        }
        let object = self.adapter.object(ty)?;
        let type_name = object.name.as_deref();
        if let Some(name) = type_name {
            if self.visited.contains(&name) {
                tracing::trace!(type_name = name, "skipping recursive type");
                return None;
            }
            self.visited.push(name);
        }

        let envelope = self.adapter.conventions().envelope_fields;
        let mut candidates = Vec::new();
        for field in &object.fields {
            if let Some(allowed) = envelope {
                if !allowed.contains(&field.name.as_str()) {
                    continue;
                }
            }
            if let Some(mut found) = self.visit(&field.ty, depth + 1) {
                found.path.insert(0, field.name.clone());
                candidates.push(found);
            }
        }

        if type_name.is_some() {
            self.visited.pop();
        }

        if candidates.len() > 1 {
            let names: Vec<&str> = candidates.iter().map(|c| c.path[0].as_str()).collect();
            self.warnings.push(format!(
                "{}: multiple array fields found at the same level ({}); using '{}'. \
                 Set selectorPath to pick a different one.",
                self.context,
                names.join(", "),
                names[0],
            ));
        }
        // First in declaration order.
        candidates.into_iter().next()
    }
}
