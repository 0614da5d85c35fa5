//! The seam between schema front ends and the analysis core.

use crate::descriptor::{MutationDescriptor, QueryDescriptor};
use crate::mutations::MutationMatcher;
use crate::shape::{Shape, TypeRef, TypeShape};

/// Upper bound on wrapper/alias hops when unwrapping a type.
const MAX_UNWRAP_STEPS: usize = 32;

/// Per-family conventions, carried as data so the core never branches on
/// where a schema came from.
pub struct Conventions {
    /// Short family label used in warnings ("graphql", "openapi").
    pub family: &'static str,
    /// When set, only these field names are considered while searching a
    /// response for its result array.
    pub envelope_fields: Option<&'static [&'static str]>,
    /// The schema's canonical identifier scalar (GraphQL `ID`).
    pub identifier_scalar: Option<&'static str>,
    /// Accept `<camelCase(entity)>Id` as a key field of last resort.
    pub entity_id_key: bool,
    /// Argument names carrying a structured filter object (`where`). When
    /// set, filters are only read from these; otherwise flat query
    /// parameters are classified (JSON:API brackets, operator suffixes,
    /// leftover plain parameters).
    pub structured_filter_args: Option<&'static [&'static str]>,
    /// How create/update/delete operations are matched to an entity.
    pub mutation_matcher: &'static dyn MutationMatcher,
}

/// A schema front end lowered into structural descriptors.
///
/// # Implementing Adapters
///
/// ```ignore
/// use crudscope::{Conventions, SchemaAdapter, QueryDescriptor, MutationDescriptor, TypeShape};
///
/// struct MyAdapter { /* ... */ }
///
/// impl SchemaAdapter for MyAdapter {
///     fn has_query_root(&self) -> bool { true }
///     fn list_queries(&self) -> &[QueryDescriptor] { &self.queries }
///     fn mutations(&self) -> &[MutationDescriptor] { &self.mutations }
///     fn resolve_named_type(&self, name: &str) -> Option<&TypeShape> { self.types.get(name) }
///     fn conventions(&self) -> &Conventions { &MY_CONVENTIONS }
/// }
/// ```
pub trait SchemaAdapter {
    /// Whether the schema exposes any root query surface at all.
    fn has_query_root(&self) -> bool;

    /// Candidate list-fetch operations, in the adapter's enumeration order.
    fn list_queries(&self) -> &[QueryDescriptor];

    /// Candidate write operations.
    fn mutations(&self) -> &[MutationDescriptor];

    /// Look up a named type.
    fn resolve_named_type(&self, name: &str) -> Option<&TypeShape>;

    fn conventions(&self) -> &Conventions;

    /// Strip nullability and list wrappers (and follow aliases) down to the
    /// named type's shape.
    fn unwrap<'a>(&'a self, ty: &'a TypeRef) -> Option<Shape<'a>> {
        let mut current = ty;
        for _ in 0..MAX_UNWRAP_STEPS {
            match current {
                TypeRef::NonNull(inner) | TypeRef::List(inner) => current = inner,
                TypeRef::Object(object) => return Some(Shape::Object(object)),
                TypeRef::Scalar(kind) => {
                    return Some(Shape::Scalar {
                        name: kind.as_str(),
                        kind: *kind,
                    });
                }
                TypeRef::Named(name) => match self.resolve_named_type(name)? {
                    TypeShape::Object(object) => return Some(Shape::Object(object)),
                    TypeShape::Scalar { name, kind } => {
                        return Some(Shape::Scalar { name, kind: *kind });
                    }
                    TypeShape::Enum { name, .. } => return Some(Shape::Enum(name)),
                    TypeShape::Alias { target, .. } => current = target,
                },
            }
        }
        None
    }

    /// If `ty` is array-valued (through non-null wrappers and aliases),
    /// return the item type.
    fn list_item<'a>(&'a self, ty: &'a TypeRef) -> Option<&'a TypeRef> {
        let mut current = ty;
        for _ in 0..MAX_UNWRAP_STEPS {
            match current {
                TypeRef::NonNull(inner) => current = inner,
                TypeRef::List(item) => return Some(item),
                TypeRef::Named(name) => match self.resolve_named_type(name)? {
                    TypeShape::Alias { target, .. } => current = target,
                    _ => return None,
                },
                TypeRef::Object(_) | TypeRef::Scalar(_) => return None,
            }
        }
        None
    }

    /// Object shape of `ty`, unless `ty` is array-valued.
    fn object<'a>(&'a self, ty: &'a TypeRef) -> Option<&'a crate::shape::ObjectShape> {
        if self.list_item(ty).is_some() {
            return None;
        }
        self.unwrap(ty).and_then(Shape::as_object)
    }
}
