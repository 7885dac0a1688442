//! Structural name inference.
//!
//! When a type has no declared name, a deterministic one is derived from
//! its structure with a fixed depth-first traversal order, so repeated runs
//! produce identical outputs.

use crate::model::{TypeGraph, TypeId, TypeKind};

/// Derive a declaration base name for `ty`.
///
/// Declared names win. Otherwise: arrays become `ArrayOf<Element>`, unions
/// `<V1>Or<V2>…` (discriminant literal values preferred), intersections
/// `<V1>And<V2>…`, instantiations `<Target>Of<Arg1>And<Arg2>`, aliases
/// defer to their target, and everything else becomes
/// `Anonymous<KindInCamelCase>`.
pub fn infer_type_name(graph: &TypeGraph, ty: TypeId) -> String {
    infer(graph, ty, &mut Vec::new())
}

fn infer(graph: &TypeGraph, ty: TypeId, seen: &mut Vec<TypeId>) -> String {
    let t = graph.get(ty);
    if let Some(name) = t.name() {
        return name.to_string();
    }
    if seen.contains(&ty) {
        return anonymous(&t.kind_name());
    }
    seen.push(ty);
    let name = match &t.kind {
        TypeKind::Array(array) => {
            let element = infer(graph, array.element, seen);
            if is_anonymous(&element) {
                "Array".to_string()
            } else {
                format!("ArrayOf{}", element)
            }
        }
        TypeKind::Union(union) => {
            let discriminated = union
                .discriminant_members
                .as_ref()
                .and_then(|members| members.first())
                .and_then(|member| discriminant_name(graph, &union.variants, member));
            match discriminated {
                Some(name) => name,
                None => joined_name(graph, &union.variants, "Or", "Union", seen),
            }
        }
        TypeKind::Intersection(intersection) => {
            joined_name(graph, &intersection.variants, "And", "Intersection", seen)
        }
        TypeKind::GenericArguments(generic) => {
            let target = infer(graph, generic.target, seen);
            let base = if is_anonymous(&target) {
                let instantiated = graph.get(generic.instantiated);
                match instantiated.name() {
                    Some(name) => name.to_string(),
                    None => target,
                }
            } else {
                target
            };
            if generic.type_arguments.is_empty() {
                base
            } else {
                let arguments: Vec<String> = generic
                    .type_arguments
                    .iter()
                    .map(|&a| infer(graph, a, seen))
                    .collect();
                format!("{}Of{}", base, arguments.join("And"))
            }
        }
        TypeKind::Alias(alias) => infer(graph, alias.target, seen),
        _ => anonymous(t.kind_name()),
    };
    seen.pop();
    name
}

fn joined_name(
    graph: &TypeGraph,
    variants: &[TypeId],
    join: &str,
    fallback: &str,
    seen: &mut Vec<TypeId>,
) -> String {
    let parts: Vec<String> = variants.iter().map(|&v| infer(graph, v, seen)).collect();
    if parts.is_empty() || parts.iter().any(|part| is_anonymous(part)) {
        fallback.to_string()
    } else {
        parts.join(join)
    }
}

/// Name a discriminated union from the literal values of its discriminant
/// member, e.g. `{kind:"a"} | {kind:"b"}` becomes `AOrB`.
fn discriminant_name(graph: &TypeGraph, variants: &[TypeId], member: &str) -> Option<String> {
    let mut parts = Vec::with_capacity(variants.len());
    for &variant in variants {
        let t = graph.get(variant);
        let object = t.object_like()?;
        let discriminant = object.members.iter().find(|m| m.name == member)?;
        let value = graph.get(discriminant.ty);
        let label = match &value.kind {
            TypeKind::StringLiteral(s) => capitalize(s),
            TypeKind::NumberLiteral(n) => number_label(*n),
            TypeKind::BooleanLiteral(b) => capitalize(&b.to_string()),
            _ => return None,
        };
        parts.push(label);
    }
    Some(parts.join("Or"))
}

fn anonymous(kind_name: &str) -> String {
    format!("Anonymous{}", camel(kind_name))
}

fn is_anonymous(name: &str) -> bool {
    name.starts_with("Anonymous")
        || name == "Array"
        || name == "Union"
        || name == "Intersection"
}

/// `non-primitive-object` → `NonPrimitiveObject`.
fn camel(hyphenated: &str) -> String {
    hyphenated.split('-').map(capitalize).collect()
}

fn capitalize(word: impl AsRef<str>) -> String {
    let word = word.as_ref();
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn number_label(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{}", value as i64)
    } else {
        format!("{}", value).replace(['.', '-'], "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ArrayType, GenericArgumentsType, Member, Modifiers, ObjectType, Type, UnionType,
    };

    fn named_interface(graph: &TypeGraph, name: &str) -> TypeId {
        graph.insert(Type::new(TypeKind::Interface(ObjectType {
            name: Some(name.to_string()),
            ..ObjectType::default()
        })))
    }

    #[test]
    fn test_declared_name_wins() {
        let graph = TypeGraph::new();
        let id = named_interface(&graph, "Point");
        assert_eq!(infer_type_name(&graph, id), "Point");
    }

    #[test]
    fn test_array_of_named_element() {
        let graph = TypeGraph::new();
        let element = named_interface(&graph, "Point");
        let array = graph.insert(Type::new(TypeKind::Array(ArrayType { element })));
        assert_eq!(infer_type_name(&graph, array), "ArrayOfPoint");
    }

    #[test]
    fn test_array_of_anonymous_element() {
        let graph = TypeGraph::new();
        let element = graph.insert(Type::new(TypeKind::Number));
        let array = graph.insert(Type::new(TypeKind::Array(ArrayType { element })));
        assert_eq!(infer_type_name(&graph, array), "Array");
    }

    #[test]
    fn test_union_of_named_variants() {
        let graph = TypeGraph::new();
        let a = named_interface(&graph, "Cat");
        let b = named_interface(&graph, "Dog");
        let union = graph.insert(Type::new(TypeKind::Union(UnionType {
            variants: vec![a, b],
            discriminant_members: None,
        })));
        assert_eq!(infer_type_name(&graph, union), "CatOrDog");
    }

    #[test]
    fn test_discriminated_union_names_from_literals() {
        let graph = TypeGraph::new();
        let lit_a = graph.insert(Type::new(TypeKind::StringLiteral("a".into())));
        let lit_b = graph.insert(Type::new(TypeKind::StringLiteral("b".into())));
        let variant = |lit| {
            Type::new(TypeKind::Object(ObjectType {
                members: vec![Member {
                    name: "kind".into(),
                    ty: lit,
                    optional: false,
                    modifiers: Modifiers::empty(),
                }],
                ..ObjectType::default()
            }))
        };
        let va = graph.insert(variant(lit_a));
        let vb = graph.insert(variant(lit_b));
        let union = graph.insert(Type::new(TypeKind::Union(UnionType {
            variants: vec![va, vb],
            discriminant_members: Some(vec!["kind".into()]),
        })));
        assert_eq!(infer_type_name(&graph, union), "AOrB");
    }

    #[test]
    fn test_generic_arguments_name() {
        let graph = TypeGraph::new();
        let target = named_interface(&graph, "Box");
        let arg = named_interface(&graph, "Point");
        let instantiated = named_interface(&graph, "Box");
        let generic = graph.insert(Type::new(TypeKind::GenericArguments(
            GenericArgumentsType {
                target,
                type_arguments: vec![arg],
                instantiated,
            },
        )));
        assert_eq!(infer_type_name(&graph, generic), "BoxOfPoint");
    }

    #[test]
    fn test_anonymous_kind_fallback() {
        let graph = TypeGraph::new();
        let id = graph.insert(Type::new(TypeKind::StringLiteral("x".into())));
        assert_eq!(infer_type_name(&graph, id), "AnonymousStringLiteral");
        let np = graph.insert(Type::new(TypeKind::NonPrimitiveObject));
        assert_eq!(infer_type_name(&graph, np), "AnonymousNonPrimitiveObject");
    }

    #[test]
    fn test_cyclic_structure_terminates() {
        let graph = TypeGraph::new();
        let array = graph.reserve();
        graph.fill(array, Type::new(TypeKind::Array(ArrayType { element: array })));
        // the cycle bottoms out at the kind fallback
        assert_eq!(infer_type_name(&graph, array), "Array");
    }
}
