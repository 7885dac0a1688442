//! The traversal engine.
//!
//! One central primitive, [`walk`]: invoke a [`Visitor`] on a type, handing
//! it a [`Visit`] through which it can recurse along labelled edges. The
//! walker is synchronous, single-threaded, and makes no ordering choices
//! beyond what the visitor requests.
//!
//! Cycle prevention is deliberately *not* built into the walker. Visitors
//! that must tolerate cycles wrap themselves in [`PreventCycles`], which
//! short-circuits with a [`Walked::Cyclical`] carrying the cyclic subpath.
//! Visitors that break cycles another way (the compiler orchestrator uses
//! reference nodes) skip the wrapper.
//!
//! Any error a visitor raises is annotated exactly once with the diagnostic
//! path it occurred at, then rethrown unchanged.

pub mod steps;

pub use steps::{any_edges, json_edges, Edge};

use crate::errors::CompileError;
use crate::model::{Path, Step, TypeGraph, TypeId};

/// A traversal visitor producing `R` per visited type.
pub trait Visitor<R> {
    fn visit(&self, ty: TypeId, path: &Path, visit: Visit<'_, R>) -> Result<R, CompileError>;
}

impl<R, F> Visitor<R> for F
where
    F: Fn(TypeId, &Path, Visit<'_, R>) -> Result<R, CompileError>,
{
    fn visit(&self, ty: TypeId, path: &Path, visit: Visit<'_, R>) -> Result<R, CompileError> {
        self(ty, path, visit)
    }
}

/// The recursion handle passed to a visitor.
pub struct Visit<'a, R> {
    graph: &'a TypeGraph,
    path: &'a Path,
    visitor: &'a dyn Visitor<R>,
}

impl<'a, R> Clone for Visit<'a, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, R> Copy for Visit<'a, R> {}

impl<'a, R> Visit<'a, R> {
    pub fn graph(&self) -> &'a TypeGraph {
        self.graph
    }

    pub fn path(&self) -> &'a Path {
        self.path
    }

    /// Recurse into `child` along `step` with the current visitor.
    pub fn step(&self, step: Step, child: TypeId) -> Result<R, CompileError> {
        walk_at(self.graph, self.path.appended(step), child, self.visitor)
    }

    /// Recurse along a pre-enumerated edge.
    pub fn edge(&self, edge: &Edge) -> Result<R, CompileError> {
        self.step(edge.step.clone(), edge.to)
    }

    /// Recurse into `child` along `step` with a one-off visitor; recursion
    /// below that child continues with `visitor`.
    pub fn step_with(
        &self,
        step: Step,
        child: TypeId,
        visitor: &dyn Visitor<R>,
    ) -> Result<R, CompileError> {
        walk_at(self.graph, self.path.appended(step), child, visitor)
    }

    /// A `Visit` whose default recursive visitor is replaced.
    pub fn with(&self, visitor: &'a dyn Visitor<R>) -> Visit<'a, R> {
        Visit {
            graph: self.graph,
            path: self.path,
            visitor,
        }
    }
}

/// Walk `ty` at `path`, returning the visitor's result.
pub fn walk<R>(
    graph: &TypeGraph,
    path: &Path,
    ty: TypeId,
    visitor: &dyn Visitor<R>,
) -> Result<R, CompileError> {
    walk_at(graph, path.clone(), ty, visitor)
}

fn walk_at<R>(
    graph: &TypeGraph,
    path: Path,
    ty: TypeId,
    visitor: &dyn Visitor<R>,
) -> Result<R, CompileError> {
    let visit = Visit {
        graph,
        path: &path,
        visitor,
    };
    visitor
        .visit(ty, &path, visit)
        .map_err(|err| err.with_path_context(|| path.to_diagnostic_string(graph, Some(ty))))
}

/// Result of a cycle-tolerant walk: a value, or the cyclic subpath that
/// prevented one.
#[derive(Debug, Clone, PartialEq)]
pub enum Walked<T> {
    Value(T),
    Cyclical(Path),
}

impl<T> Walked<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Walked::Value(value) => Some(value),
            Walked::Cyclical(_) => None,
        }
    }

    pub fn is_cyclical(&self) -> bool {
        matches!(self, Walked::Cyclical(_))
    }

    pub fn cyclical_path(&self) -> Option<&Path> {
        match self {
            Walked::Cyclical(path) => Some(path),
            Walked::Value(_) => None,
        }
    }
}

/// Wraps a visitor so that revisiting a type already on the path yields
/// [`Walked::Cyclical`] instead of recursing forever.
pub struct PreventCycles<V> {
    inner: V,
}

impl<V> PreventCycles<V> {
    pub fn new(inner: V) -> Self {
        Self { inner }
    }
}

impl<T, V> Visitor<Walked<T>> for PreventCycles<V>
where
    V: Visitor<Walked<T>>,
{
    fn visit(
        &self,
        ty: TypeId,
        path: &Path,
        visit: Visit<'_, Walked<T>>,
    ) -> Result<Walked<T>, CompileError> {
        if let Some(subpath) = path.subpath_from(ty) {
            return Ok(Walked::Cyclical(subpath));
        }
        self.inner.visit(ty, path, visit)
    }
}

/// Which enumerator a depth-first walk uses.
pub enum Traverse<'a> {
    AnySteps,
    JsonSteps,
    Custom(&'a dyn Fn(&TypeGraph, TypeId) -> Vec<Edge>),
}

impl Traverse<'_> {
    fn edges(&self, graph: &TypeGraph, ty: TypeId) -> Vec<Edge> {
        match self {
            Traverse::AnySteps => any_edges(graph, ty),
            Traverse::JsonSteps => json_edges(graph, ty),
            Traverse::Custom(enumerate) => enumerate(graph, ty),
        }
    }
}

/// Hooks for [`walk_depth_first`]. Both hooks may accumulate external
/// state; enumerator results are discarded.
pub struct DepthFirst<'a> {
    pub before: Option<&'a mut dyn FnMut(TypeId, &Path)>,
    pub after: Option<&'a mut dyn FnMut(TypeId, &Path)>,
    pub traverse: Traverse<'a>,
}

impl<'a> Default for DepthFirst<'a> {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
            traverse: Traverse::AnySteps,
        }
    }
}

/// Depth-first walk: `before`, recurse along the traverse enumerator's
/// edges, `after`. Types already on the current path are not re-entered,
/// so the walk terminates on cyclic graphs.
pub fn walk_depth_first(graph: &TypeGraph, path: &Path, ty: TypeId, hooks: &mut DepthFirst<'_>) {
    if path.includes(ty) {
        return;
    }
    if let Some(before) = hooks.before.as_mut() {
        before(ty, path);
    }
    let edges = hooks.traverse.edges(graph, ty);
    for edge in edges {
        let child_path = path.appended(edge.step);
        walk_depth_first(graph, &child_path, edge.to, hooks);
    }
    if let Some(after) = hooks.after.as_mut() {
        after(ty, path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Member, Modifiers, ObjectType, Type, TypeKind};

    fn object_with_member(graph: &TypeGraph, name: &str, member: &str, ty: TypeId) -> TypeId {
        graph.insert(Type::new(TypeKind::Interface(ObjectType {
            name: Some(name.to_string()),
            members: vec![Member {
                name: member.to_string(),
                ty,
                optional: false,
                modifiers: Modifiers::empty(),
            }],
            ..ObjectType::default()
        })))
    }

    /// Counts visited types by recursing along every edge.
    struct CountingVisitor;

    impl Visitor<Walked<usize>> for CountingVisitor {
        fn visit(
            &self,
            ty: TypeId,
            _path: &Path,
            visit: Visit<'_, Walked<usize>>,
        ) -> Result<Walked<usize>, CompileError> {
            let mut count = 1;
            for edge in any_edges(visit.graph(), ty) {
                if let Walked::Value(inner) = visit.edge(&edge)? {
                    count += inner;
                }
            }
            Ok(Walked::Value(count))
        }
    }

    struct FailingVisitor;

    impl Visitor<()> for FailingVisitor {
        fn visit(&self, ty: TypeId, _path: &Path, visit: Visit<'_, ()>) -> Result<(), CompileError> {
            let edges = any_edges(visit.graph(), ty);
            match edges.first() {
                Some(edge) => visit.edge(edge),
                None => Err(CompileError::backend("leaf failure")),
            }
        }
    }

    #[test]
    fn test_walk_counts_reachable_types() {
        let graph = TypeGraph::new();
        let n = graph.insert(Type::new(TypeKind::Number));
        let outer = object_with_member(&graph, "Outer", "n", n);
        let result = walk(
            &graph,
            &Path::empty(),
            outer,
            &PreventCycles::new(CountingVisitor),
        )
        .expect("walk");
        assert_eq!(result.value(), Some(2));
    }

    #[test]
    fn test_prevent_cycles_reports_subpath() {
        let graph = TypeGraph::new();
        let node = graph.reserve();
        graph.fill(
            node,
            Type::new(TypeKind::Interface(ObjectType {
                name: Some("Node".into()),
                members: vec![Member {
                    name: "next".into(),
                    ty: node,
                    optional: true,
                    modifiers: Modifiers::empty(),
                }],
                ..ObjectType::default()
            })),
        );

        /// Recurses blindly; only the wrapper stops the cycle.
        struct Recurse;
        impl Visitor<Walked<usize>> for Recurse {
            fn visit(
                &self,
                ty: TypeId,
                _path: &Path,
                visit: Visit<'_, Walked<usize>>,
            ) -> Result<Walked<usize>, CompileError> {
                let mut cyclical = 0;
                for edge in any_edges(visit.graph(), ty) {
                    if visit.edge(&edge)?.is_cyclical() {
                        cyclical += 1;
                    }
                }
                Ok(Walked::Value(cyclical))
            }
        }

        let result = walk(
            &graph,
            &Path::empty(),
            node,
            &PreventCycles::new(Recurse),
        )
        .expect("walk");
        assert_eq!(result.value(), Some(1));
    }

    #[test]
    fn test_error_annotated_once_with_deepest_path() {
        let graph = TypeGraph::new();
        let n = graph.insert(Type::new(TypeKind::Number));
        let inner = object_with_member(&graph, "Inner", "leaf", n);
        let outer = object_with_member(&graph, "Outer", "inner", inner);
        let err = walk(&graph, &Path::empty(), outer, &FailingVisitor)
            .expect_err("leaf visitor fails");
        let path = err.path_context().expect("annotated");
        assert_eq!(path, "Outer.inner.leaf -> number");
        assert_eq!(err.to_string().matches("Path:").count(), 1);
    }

    #[test]
    fn test_depth_first_orders_before_and_after() {
        let graph = TypeGraph::new();
        let n = graph.insert(Type::new(TypeKind::Number));
        let outer = object_with_member(&graph, "Outer", "n", n);

        let mut pre = Vec::new();
        let mut post = Vec::new();
        let mut before = |ty: TypeId, _: &Path| pre.push(ty);
        let mut after = |ty: TypeId, _: &Path| post.push(ty);
        walk_depth_first(
            &graph,
            &Path::empty(),
            outer,
            &mut DepthFirst {
                before: Some(&mut before),
                after: Some(&mut after),
                traverse: Traverse::AnySteps,
            },
        );
        assert_eq!(pre, vec![outer, n]);
        assert_eq!(post, vec![n, outer]);
    }

    #[test]
    fn test_depth_first_terminates_on_cycles() {
        let graph = TypeGraph::new();
        let node = graph.reserve();
        graph.fill(
            node,
            Type::new(TypeKind::Interface(ObjectType {
                name: Some("Node".into()),
                members: vec![Member {
                    name: "next".into(),
                    ty: node,
                    optional: true,
                    modifiers: Modifiers::empty(),
                }],
                ..ObjectType::default()
            })),
        );
        let mut visited = 0;
        let mut before = |_: TypeId, _: &Path| visited += 1;
        walk_depth_first(
            &graph,
            &Path::empty(),
            node,
            &mut DepthFirst {
                before: Some(&mut before),
                after: None,
                traverse: Traverse::AnySteps,
            },
        );
        assert_eq!(visited, 1);
    }
}
