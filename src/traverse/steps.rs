//! Edge enumerators.
//!
//! For each type kind with outgoing edges there is an enumerator producing
//! [`Edge`]s: single-edge enumerators return `Option<Edge>` (absent when the
//! corresponding optional slot is empty), multi-edge enumerators return
//! `Vec<Edge>` preserving the source order of the underlying sequence.
//!
//! Two universal enumerators combine them: [`any_edges`] yields every
//! outgoing edge in a fixed registry order per kind, and [`json_edges`]
//! yields only the edges that survive a value-oriented projection.
//! Dispatch is a static `match` on the kind.

use crate::model::{Step, Type, TypeGraph, TypeId, TypeKind};

/// One outgoing edge: the labelled step plus its destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub step: Step,
    pub to: TypeId,
}

impl Edge {
    fn new(step: Step, to: TypeId) -> Self {
        Self { step, to }
    }
}

pub fn named_member_edges(graph: &TypeGraph, ty: TypeId) -> Vec<Edge> {
    let t = graph.get(ty);
    match t.object_like() {
        Some(object) => object
            .members
            .iter()
            .enumerate()
            .map(|(index, member)| {
                Edge::new(
                    Step::NamedMember {
                        from: ty,
                        index,
                        member: member.clone(),
                    },
                    member.ty,
                )
            })
            .collect(),
        None => Vec::new(),
    }
}

pub fn indexed_member_edges(graph: &TypeGraph, ty: TypeId) -> Vec<Edge> {
    let t = graph.get(ty);
    match &t.kind {
        TypeKind::Tuple(tuple) => tuple
            .members
            .iter()
            .enumerate()
            .map(|(index, member)| {
                Edge::new(
                    Step::IndexedMember {
                        from: ty,
                        index,
                        member: member.clone(),
                    },
                    member.ty,
                )
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Constituents of a union, intersection, or enum.
pub fn variant_edges(graph: &TypeGraph, ty: TypeId) -> Vec<Edge> {
    let t = graph.get(ty);
    let variants: &[TypeId] = match &t.kind {
        TypeKind::Union(u) => &u.variants,
        TypeKind::Intersection(i) => &i.variants,
        TypeKind::Enum(e) => &e.members,
        _ => return Vec::new(),
    };
    variants
        .iter()
        .enumerate()
        .map(|(index, &to)| Edge::new(Step::Variant { from: ty, index }, to))
        .collect()
}

pub fn parameter_edges(graph: &TypeGraph, ty: TypeId) -> Vec<Edge> {
    let t = graph.get(ty);
    match t.callable() {
        Some(callable) => callable
            .parameters
            .iter()
            .enumerate()
            .map(|(index, parameter)| {
                Edge::new(
                    Step::Parameter {
                        from: ty,
                        index,
                        parameter: parameter.clone(),
                    },
                    parameter.ty,
                )
            })
            .collect(),
        None => Vec::new(),
    }
}

pub fn type_parameter_edges(graph: &TypeGraph, ty: TypeId) -> Vec<Edge> {
    let t = graph.get(ty);
    type_parameters_of(&t)
        .iter()
        .enumerate()
        .map(|(index, &to)| {
            let parameter = graph.get(to);
            Edge::new(
                Step::TypeParameter {
                    from: ty,
                    index,
                    name: parameter.name().unwrap_or("T").to_string(),
                },
                to,
            )
        })
        .collect()
}

pub fn generic_argument_edges(graph: &TypeGraph, ty: TypeId) -> Vec<Edge> {
    let t = graph.get(ty);
    match &t.kind {
        TypeKind::GenericArguments(generic) => {
            let target = graph.get(generic.target);
            let parameters = type_parameters_of(&target).to_vec();
            generic
                .type_arguments
                .iter()
                .enumerate()
                .map(|(index, &to)| {
                    let name = parameters.get(index).and_then(|&p| {
                        let p = graph.get(p);
                        p.name().map(str::to_string)
                    });
                    Edge::new(Step::GenericArgument { from: ty, index, name }, to)
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

pub fn string_index_edge(graph: &TypeGraph, ty: TypeId) -> Option<Edge> {
    let t = graph.get(ty);
    let to = t.object_like()?.string_index?;
    Some(Edge::new(Step::StringIndex { from: ty }, to))
}

/// The number-index type of an object-like, or the element of an array.
pub fn number_index_edge(graph: &TypeGraph, ty: TypeId) -> Option<Edge> {
    let t = graph.get(ty);
    let to = match &t.kind {
        TypeKind::Array(array) => Some(array.element),
        _ => t.object_like().and_then(|object| object.number_index),
    }?;
    Some(Edge::new(Step::NumberIndex { from: ty }, to))
}

pub fn call_signature_edge(graph: &TypeGraph, ty: TypeId) -> Option<Edge> {
    let t = graph.get(ty);
    let to = t.object_like()?.call_signature?;
    Some(Edge::new(Step::CallSignature { from: ty }, to))
}

pub fn ctor_signature_edge(graph: &TypeGraph, ty: TypeId) -> Option<Edge> {
    let t = graph.get(ty);
    let to = t.object_like()?.ctor_signature?;
    Some(Edge::new(Step::CtorSignature { from: ty }, to))
}

pub fn return_edge(graph: &TypeGraph, ty: TypeId) -> Option<Edge> {
    let t = graph.get(ty);
    let to = t.callable()?.return_type;
    Some(Edge::new(Step::Return { from: ty }, to))
}

pub fn awaited_edge(graph: &TypeGraph, ty: TypeId) -> Option<Edge> {
    let t = graph.get(ty);
    match &t.kind {
        TypeKind::Promise(promise) => {
            Some(Edge::new(Step::Awaited { from: ty }, promise.element))
        }
        _ => None,
    }
}

/// The inner target of an alias, enum member (its literal value), or
/// generic instantiation (its post-substitution body).
pub fn aliased_edge(graph: &TypeGraph, ty: TypeId) -> Option<Edge> {
    let t = graph.get(ty);
    let to = match &t.kind {
        TypeKind::Alias(alias) => Some(alias.target),
        TypeKind::EnumMember(member) => Some(member.value),
        TypeKind::GenericArguments(generic) => Some(generic.instantiated),
        _ => None,
    }?;
    Some(Edge::new(Step::Aliased { from: ty }, to))
}

pub fn generic_target_edge(graph: &TypeGraph, ty: TypeId) -> Option<Edge> {
    let t = graph.get(ty);
    match &t.kind {
        TypeKind::GenericArguments(generic) => {
            Some(Edge::new(Step::GenericTarget { from: ty }, generic.target))
        }
        _ => None,
    }
}

pub fn constraint_edge(graph: &TypeGraph, ty: TypeId) -> Option<Edge> {
    let t = graph.get(ty);
    match &t.kind {
        TypeKind::TypeParameter(parameter) => parameter
            .constraint
            .map(|to| Edge::new(Step::TypeParameterConstraint { from: ty }, to)),
        _ => None,
    }
}

pub fn default_edge(graph: &TypeGraph, ty: TypeId) -> Option<Edge> {
    let t = graph.get(ty);
    match &t.kind {
        TypeKind::TypeParameter(parameter) => parameter
            .default
            .map(|to| Edge::new(Step::TypeParameterDefault { from: ty }, to)),
        _ => None,
    }
}

/// Every outgoing edge of `ty`, in the fixed registry order for its kind.
pub fn any_edges(graph: &TypeGraph, ty: TypeId) -> Vec<Edge> {
    let t = graph.get(ty);
    let mut edges = Vec::new();
    match &t.kind {
        TypeKind::Interface(_) | TypeKind::Object(_) | TypeKind::Class(_) => {
            edges.extend(named_member_edges(graph, ty));
            edges.extend(string_index_edge(graph, ty));
            edges.extend(number_index_edge(graph, ty));
            edges.extend(call_signature_edge(graph, ty));
            edges.extend(ctor_signature_edge(graph, ty));
            edges.extend(type_parameter_edges(graph, ty));
        }
        TypeKind::Function(_) | TypeKind::Method(_) => {
            edges.extend(type_parameter_edges(graph, ty));
            edges.extend(parameter_edges(graph, ty));
            edges.extend(return_edge(graph, ty));
        }
        TypeKind::Union(_) | TypeKind::Intersection(_) | TypeKind::Enum(_) => {
            edges.extend(variant_edges(graph, ty));
        }
        TypeKind::EnumMember(_) => {
            edges.extend(aliased_edge(graph, ty));
        }
        TypeKind::Alias(_) => {
            edges.extend(type_parameter_edges(graph, ty));
            edges.extend(aliased_edge(graph, ty));
        }
        TypeKind::GenericArguments(_) => {
            edges.extend(generic_target_edge(graph, ty));
            edges.extend(generic_argument_edges(graph, ty));
            edges.extend(aliased_edge(graph, ty));
        }
        TypeKind::TypeParameter(_) => {
            edges.extend(constraint_edge(graph, ty));
            edges.extend(default_edge(graph, ty));
        }
        TypeKind::Array(_) => {
            edges.extend(number_index_edge(graph, ty));
        }
        TypeKind::Tuple(_) => {
            edges.extend(indexed_member_edges(graph, ty));
        }
        TypeKind::Promise(_) => {
            edges.extend(awaited_edge(graph, ty));
        }
        _ => {}
    }
    edges
}

/// The edges that survive a value-oriented projection: algebraic
/// constituents, named and indexed members, index signatures, array
/// elements, and aliasing. Call/ctor signatures, type parameters,
/// generic-argument structure, and promise awaiting are excluded.
pub fn json_edges(graph: &TypeGraph, ty: TypeId) -> Vec<Edge> {
    let t = graph.get(ty);
    let mut edges = Vec::new();
    match &t.kind {
        TypeKind::Interface(_) | TypeKind::Object(_) | TypeKind::Class(_) => {
            edges.extend(named_member_edges(graph, ty));
            edges.extend(string_index_edge(graph, ty));
            edges.extend(number_index_edge(graph, ty));
        }
        TypeKind::Union(_) | TypeKind::Intersection(_) | TypeKind::Enum(_) => {
            edges.extend(variant_edges(graph, ty));
        }
        TypeKind::EnumMember(_) | TypeKind::Alias(_) | TypeKind::GenericArguments(_) => {
            edges.extend(aliased_edge(graph, ty));
        }
        TypeKind::Array(_) => {
            edges.extend(number_index_edge(graph, ty));
        }
        TypeKind::Tuple(_) => {
            edges.extend(indexed_member_edges(graph, ty));
        }
        _ => {}
    }
    edges
}

fn type_parameters_of(ty: &Type) -> &[TypeId] {
    match &ty.kind {
        TypeKind::Interface(o) | TypeKind::Object(o) | TypeKind::Class(o) => &o.type_parameters,
        TypeKind::Function(c) | TypeKind::Method(c) => &c.type_parameters,
        TypeKind::Alias(a) => &a.type_parameters,
        _ => &[],
    }
}
