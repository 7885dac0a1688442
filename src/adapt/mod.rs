//! The type-source adapter.
//!
//! Converts host type-checker handles into model types:
//!
//! ```text
//! host handle → classify → lift generics → lift aliases → Type in the graph
//! ```
//!
//! The adapter owns the host-keyed cache, so for a given adapter two
//! adaptations of the same handle return the same [`TypeId`] — downstream
//! cycle detection and memoization depend on this. Cycles are handled by
//! reserving the arena slot and inserting the cache entry *before*
//! recursing into fields, then filling the slot in place.
//!
//! In lazy mode (`eager: false`) field population is deferred: referenced
//! types become deferred slots that the adapter hydrates on first graph
//! access. A deferred type is indistinguishable from an eager one to all
//! downstream code.

pub mod source;

pub use source::{
    HostClass, HostEnumMember, HostMember, HostParameter, HostPredicate, HostTupleMember,
    HostTypeId, TypeSource,
};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use thiserror::Error;

use crate::model::{
    AliasType, ArrayType, CallableType, EnumMemberType, EnumType, GenericArgumentsType, Hydrate,
    IndexedMember, IntersectionType, Member, ObjectType, Parameter, PromiseType, TupleType, Type,
    TypeGraph, TypeId, TypeKind, TypeParameterType, TypePredicate, UnionType,
};
use crate::output::source_map::SourceTextProvider;

/// Failures local to adaptation. These never abort an adaptation run: the
/// offending type becomes a `TypeKind::Error` value and only surfaces if a
/// backend tries to compile it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdaptError {
    #[error("unsupported host type: {0}")]
    Unsupported(String),
    #[error("enum member without member info")]
    MissingEnumMemberInfo,
}

/// Adaptation options.
#[derive(Debug, Clone)]
pub struct AdaptOptions {
    /// Construct transitively right away (`true`) or defer field population
    /// until first access (`false`).
    pub eager: bool,
    /// Keep the host handle, declaration position, and doc comment on each
    /// adapted type.
    pub attach_host: bool,
    /// Keep alias wrappers even when the aliased type already has a name
    /// of its own.
    pub preserve_simple_aliases: bool,
}

impl Default for AdaptOptions {
    fn default() -> Self {
        Self {
            eager: true,
            attach_host: true,
            preserve_simple_aliases: false,
        }
    }
}

enum Built {
    Type(Type),
    /// Simplification collapsed the adapted type onto an existing one.
    Redirect(TypeId),
}

/// Adapts host handles into the shared type graph, memoized per handle.
pub struct Adapter {
    source: Rc<dyn TypeSource>,
    graph: Rc<TypeGraph>,
    options: AdaptOptions,
    cache: RefCell<HashMap<HostTypeId, TypeId>>,
    pending: RefCell<HashMap<TypeId, HostTypeId>>,
}

impl Adapter {
    pub fn new(source: Rc<dyn TypeSource>, options: AdaptOptions) -> Rc<Self> {
        Self::with_graph(source, Rc::new(TypeGraph::new()), options)
    }

    /// Adapt into an existing graph (types are shared across compilations;
    /// the graph is append-only).
    pub fn with_graph(
        source: Rc<dyn TypeSource>,
        graph: Rc<TypeGraph>,
        options: AdaptOptions,
    ) -> Rc<Self> {
        let adapter = Rc::new(Self {
            source,
            graph: Rc::clone(&graph),
            options,
            cache: RefCell::new(HashMap::new()),
            pending: RefCell::new(HashMap::new()),
        });
        let hydrator: Weak<dyn Hydrate> = Rc::downgrade(&(Rc::clone(&adapter) as Rc<dyn Hydrate>));
        graph.set_hydrator(hydrator);
        adapter
    }

    pub fn graph(&self) -> Rc<TypeGraph> {
        Rc::clone(&self.graph)
    }

    pub fn options(&self) -> &AdaptOptions {
        &self.options
    }

    /// Adapt one host handle. Idempotent: the same handle always maps to
    /// the same id.
    pub fn adapt(&self, handle: HostTypeId) -> TypeId {
        if let Some(&id) = self.cache.borrow().get(&handle) {
            return id;
        }
        if self.options.eager {
            let id = self.graph.reserve();
            self.cache.borrow_mut().insert(handle, id);
            match self.build(handle) {
                Built::Type(ty) => self.graph.fill(id, ty),
                Built::Redirect(to) => self.graph.redirect(id, to),
            }
            id
        } else {
            let id = self.graph.defer();
            self.cache.borrow_mut().insert(handle, id);
            self.pending.borrow_mut().insert(id, handle);
            id
        }
    }

    fn adapt_all(&self, handles: Vec<HostTypeId>) -> Vec<TypeId> {
        handles.into_iter().map(|h| self.adapt(h)).collect()
    }

    fn build(&self, handle: HostTypeId) -> Built {
        match self.build_kind(handle) {
            Built::Type(ty) => Built::Type(self.attach(handle, ty)),
            redirect => redirect,
        }
    }

    /// Generic lifting happens first, alias wrapping second, so an aliased
    /// instantiation adapts to `alias → generic-arguments → …`.
    fn build_kind(&self, handle: HostTypeId) -> Built {
        let inner = self.build_unaliased(handle);
        match self.source.alias_name(handle) {
            Some(name) if self.keeps_alias(&inner) => {
                let target = self.intern(handle, inner);
                Built::Type(Type::new(TypeKind::Alias(AliasType {
                    name,
                    target,
                    type_parameters: self.adapt_all(self.source.type_parameters(handle)),
                })))
            }
            _ => inner,
        }
    }

    /// An alias wrapper earns its keep only when the aliased type has no
    /// name of its own; otherwise it is elided (unless preservation is
    /// requested).
    fn keeps_alias(&self, inner: &Built) -> bool {
        if self.options.preserve_simple_aliases {
            return true;
        }
        match inner {
            Built::Type(ty) => ty.name().is_none() && !ty.is_primitive(),
            Built::Redirect(id) => {
                let ty = self.graph.get(*id);
                ty.name().is_none() && !ty.is_primitive()
            }
        }
    }

    fn build_unaliased(&self, handle: HostTypeId) -> Built {
        if self.source.type_name(handle).as_deref() == Some("Date") {
            return Built::Type(Type::new(TypeKind::Date));
        }
        if let Some(target) = self.source.reference_target(handle) {
            let arguments = self.source.reference_arguments(handle);
            let target_name = self.source.type_name(target);
            if arguments.len() == 1 {
                match target_name.as_deref() {
                    Some("Array" | "ReadonlyArray" | "ArrayLike" | "ConcatArray") => {
                        return Built::Type(Type::new(TypeKind::Array(ArrayType {
                            element: self.adapt(arguments[0]),
                        })));
                    }
                    Some("Promise" | "PromiseLike") => {
                        return Built::Type(Type::new(TypeKind::Promise(PromiseType {
                            element: self.adapt(arguments[0]),
                        })));
                    }
                    _ => {}
                }
            }
            if !arguments.is_empty() {
                let target_id = self.adapt(target);
                let type_arguments = self.adapt_all(arguments);
                let instantiated = {
                    let structural = self.build_structural(handle);
                    self.intern(handle, structural)
                };
                return Built::Type(Type::new(TypeKind::GenericArguments(
                    GenericArgumentsType {
                        target: target_id,
                        type_arguments,
                        instantiated,
                    },
                )));
            }
        }
        self.build_structural(handle)
    }

    fn build_structural(&self, handle: HostTypeId) -> Built {
        match self.source.classify(handle) {
            HostClass::String => Built::Type(Type::new(TypeKind::String)),
            HostClass::Number => Built::Type(Type::new(TypeKind::Number)),
            HostClass::Boolean => Built::Type(Type::new(TypeKind::Boolean)),
            HostClass::BigInt => Built::Type(Type::new(TypeKind::BigInt)),
            HostClass::Symbol => Built::Type(Type::new(TypeKind::Symbol)),
            HostClass::Null => Built::Type(Type::new(TypeKind::Null)),
            HostClass::Undefined => Built::Type(Type::new(TypeKind::Undefined)),
            HostClass::Void => Built::Type(Type::new(TypeKind::Void)),
            HostClass::Any => Built::Type(Type::new(TypeKind::Any)),
            HostClass::Unknown => Built::Type(Type::new(TypeKind::Unknown)),
            HostClass::Never => Built::Type(Type::new(TypeKind::Never)),
            HostClass::NonPrimitiveObject => Built::Type(Type::new(TypeKind::NonPrimitiveObject)),
            HostClass::StringLiteral(value) => {
                Built::Type(Type::new(TypeKind::StringLiteral(value)))
            }
            HostClass::NumberLiteral(value) => {
                Built::Type(Type::new(TypeKind::NumberLiteral(value)))
            }
            HostClass::BooleanLiteral(value) => {
                Built::Type(Type::new(TypeKind::BooleanLiteral(value)))
            }
            HostClass::BigIntLiteral(value) => {
                Built::Type(Type::new(TypeKind::BigIntLiteral(value)))
            }
            HostClass::UniqueSymbol(name) => Built::Type(Type::new(TypeKind::UniqueSymbol(name))),
            HostClass::EnumMember => match self.source.enum_member_info(handle) {
                Some(info) => Built::Type(Type::new(TypeKind::EnumMember(EnumMemberType {
                    name: info.name,
                    qualified_name: info.qualified_name,
                    value: self.adapt(info.value),
                }))),
                None => Built::Type(Type::error(AdaptError::MissingEnumMemberInfo.to_string())),
            },
            HostClass::Enum => Built::Type(Type::new(TypeKind::Enum(EnumType {
                name: self.source.type_name(handle).unwrap_or_default(),
                members: self.adapt_all(self.source.enum_members(handle)),
            }))),
            HostClass::Union => {
                let variants = self.simplified_constituents(handle);
                match variants.len() {
                    0 => Built::Type(Type::new(TypeKind::Never)),
                    1 => Built::Redirect(variants[0]),
                    _ => Built::Type(Type::new(TypeKind::Union(UnionType {
                        variants,
                        discriminant_members: self.source.discriminant_members(handle),
                    }))),
                }
            }
            HostClass::Intersection => {
                let variants = self.simplified_constituents(handle);
                match variants.len() {
                    1 => Built::Redirect(variants[0]),
                    _ => Built::Type(Type::new(TypeKind::Intersection(IntersectionType {
                        variants,
                        intersected: self
                            .source
                            .reduced_intersection(handle)
                            .map(|r| self.adapt(r)),
                    }))),
                }
            }
            HostClass::Interface => {
                Built::Type(Type::new(TypeKind::Interface(self.build_object(handle))))
            }
            HostClass::Object => {
                Built::Type(Type::new(TypeKind::Object(self.build_object(handle))))
            }
            HostClass::Class => Built::Type(Type::new(TypeKind::Class(self.build_object(handle)))),
            HostClass::Function => {
                Built::Type(Type::new(TypeKind::Function(self.build_callable(handle))))
            }
            HostClass::Method => {
                Built::Type(Type::new(TypeKind::Method(self.build_callable(handle))))
            }
            HostClass::TypeParameter => {
                Built::Type(Type::new(TypeKind::TypeParameter(TypeParameterType {
                    name: self
                        .source
                        .type_name(handle)
                        .unwrap_or_else(|| "T".to_string()),
                    constraint: self.source.constraint(handle).map(|c| self.adapt(c)),
                    default: self.source.default_type(handle).map(|d| self.adapt(d)),
                })))
            }
            HostClass::Tuple => Built::Type(Type::new(TypeKind::Tuple(TupleType {
                members: self
                    .source
                    .tuple_members(handle)
                    .into_iter()
                    .map(|m| IndexedMember {
                        ty: self.adapt(m.ty),
                        optional: m.optional,
                        rest: m.rest,
                    })
                    .collect(),
                has_rest: self.source.tuple_has_rest(handle),
            }))),
            HostClass::Unsupported(message) => {
                Built::Type(Type::error(AdaptError::Unsupported(message).to_string()))
            }
        }
    }

    fn build_object(&self, handle: HostTypeId) -> ObjectType {
        ObjectType {
            name: self.source.type_name(handle),
            members: self
                .source
                .members(handle)
                .into_iter()
                .filter(|m| m.has_declaration)
                .map(|m| Member {
                    name: m.name,
                    ty: self.adapt(m.ty),
                    optional: m.optional,
                    modifiers: m.modifiers,
                })
                .collect(),
            call_signature: self.source.call_signature(handle).map(|s| self.adapt(s)),
            ctor_signature: self.source.ctor_signature(handle).map(|s| self.adapt(s)),
            type_parameters: self.adapt_all(self.source.type_parameters(handle)),
            string_index: self.source.string_index_type(handle).map(|s| self.adapt(s)),
            number_index: self.source.number_index_type(handle).map(|s| self.adapt(s)),
        }
    }

    fn build_callable(&self, handle: HostTypeId) -> CallableType {
        CallableType {
            name: self.source.type_name(handle),
            parameters: self
                .source
                .parameters(handle)
                .into_iter()
                .map(|p| Parameter {
                    name: p.name,
                    ty: self.adapt(p.ty),
                    optional: p.optional,
                    rest: p.rest,
                    has_initializer: p.has_initializer,
                })
                .collect(),
            type_parameters: self.adapt_all(self.source.type_parameters(handle)),
            return_type: match self.source.return_type(handle) {
                Some(r) => self.adapt(r),
                None => self.graph.insert(Type::new(TypeKind::Void)),
            },
            predicate: self.source.type_predicate(handle).map(|p| TypePredicate {
                parameter_name: p.parameter_name,
                parameter_index: p.parameter_index,
                ty: self.adapt(p.ty),
            }),
        }
    }

    /// Adapt constituents, dropping trivially identical duplicates while
    /// preserving first-occurrence order.
    fn simplified_constituents(&self, handle: HostTypeId) -> Vec<TypeId> {
        let mut variants = Vec::new();
        for constituent in self.source.constituents(handle) {
            let id = self.adapt(constituent);
            if !variants.contains(&id) {
                variants.push(id);
            }
        }
        variants
    }

    fn intern(&self, handle: HostTypeId, built: Built) -> TypeId {
        match built {
            Built::Type(ty) => self.graph.insert(self.attach(handle, ty)),
            Built::Redirect(id) => id,
        }
    }

    fn attach(&self, handle: HostTypeId, mut ty: Type) -> Type {
        if self.options.attach_host {
            ty.host = Some(handle);
            if ty.declared_at.is_none() {
                ty.declared_at = self.source.declaration_position(handle);
            }
            if ty.documentation.is_none() {
                ty.documentation = self.source.documentation(handle);
            }
        }
        ty
    }
}

impl Hydrate for Adapter {
    fn hydrate(&self, _graph: &TypeGraph, id: TypeId) -> Type {
        let handle = self.pending.borrow_mut().remove(&id);
        match handle {
            Some(handle) => match self.build(handle) {
                Built::Type(ty) => ty,
                Built::Redirect(to) => (*self.graph.get(to)).clone(),
            },
            None => Type::error("deferred type slot has no pending host type"),
        }
    }
}

impl SourceTextProvider for Adapter {
    fn source_text(&self, file_name: &str) -> Option<String> {
        self.source.source_text(file_name)
    }
}

/// Any type source can hand out original file text for source maps.
impl<T: TypeSource> SourceTextProvider for T {
    fn source_text(&self, file_name: &str) -> Option<String> {
        TypeSource::source_text(self, file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockSource {
        classes: HashMap<HostTypeId, HostClass>,
        names: HashMap<HostTypeId, String>,
        aliases: HashMap<HostTypeId, String>,
        members: HashMap<HostTypeId, Vec<HostMember>>,
        constituents: HashMap<HostTypeId, Vec<HostTypeId>>,
        references: HashMap<HostTypeId, (HostTypeId, Vec<HostTypeId>)>,
    }

    impl MockSource {
        fn class(mut self, h: u64, class: HostClass) -> Self {
            self.classes.insert(HostTypeId(h), class);
            self
        }

        fn name(mut self, h: u64, name: &str) -> Self {
            self.names.insert(HostTypeId(h), name.to_string());
            self
        }

        fn alias(mut self, h: u64, name: &str) -> Self {
            self.aliases.insert(HostTypeId(h), name.to_string());
            self
        }

        fn member(mut self, h: u64, name: &str, ty: u64) -> Self {
            self.members.entry(HostTypeId(h)).or_default().push(HostMember {
                name: name.to_string(),
                ty: HostTypeId(ty),
                optional: false,
                modifiers: crate::model::Modifiers::empty(),
                has_declaration: true,
            });
            self
        }

        fn union(mut self, h: u64, constituents: &[u64]) -> Self {
            self.classes.insert(HostTypeId(h), HostClass::Union);
            self.constituents
                .insert(HostTypeId(h), constituents.iter().map(|&c| HostTypeId(c)).collect());
            self
        }

        fn reference(mut self, h: u64, target: u64, arguments: &[u64]) -> Self {
            self.references.insert(
                HostTypeId(h),
                (
                    HostTypeId(target),
                    arguments.iter().map(|&a| HostTypeId(a)).collect(),
                ),
            );
            self
        }
    }

    impl TypeSource for MockSource {
        fn classify(&self, handle: HostTypeId) -> HostClass {
            self.classes
                .get(&handle)
                .cloned()
                .unwrap_or_else(|| HostClass::Unsupported(format!("unknown handle {:?}", handle)))
        }

        fn type_name(&self, handle: HostTypeId) -> Option<String> {
            self.names.get(&handle).cloned()
        }

        fn alias_name(&self, handle: HostTypeId) -> Option<String> {
            self.aliases.get(&handle).cloned()
        }

        fn members(&self, handle: HostTypeId) -> Vec<HostMember> {
            self.members.get(&handle).cloned().unwrap_or_default()
        }

        fn constituents(&self, handle: HostTypeId) -> Vec<HostTypeId> {
            self.constituents.get(&handle).cloned().unwrap_or_default()
        }

        fn reference_target(&self, handle: HostTypeId) -> Option<HostTypeId> {
            self.references.get(&handle).map(|(t, _)| *t)
        }

        fn reference_arguments(&self, handle: HostTypeId) -> Vec<HostTypeId> {
            self.references
                .get(&handle)
                .map(|(_, a)| a.clone())
                .unwrap_or_default()
        }
    }

    fn eager(source: MockSource) -> Rc<Adapter> {
        Adapter::new(Rc::new(source), AdaptOptions::default())
    }

    #[test]
    fn test_identity_preserved_per_handle() {
        let adapter = eager(MockSource::default().class(1, HostClass::String));
        assert_eq!(adapter.adapt(HostTypeId(1)), adapter.adapt(HostTypeId(1)));
    }

    #[test]
    fn test_cyclic_object_adapts_without_recursion_blowup() {
        let source = MockSource::default()
            .class(1, HostClass::Interface)
            .name(1, "Node")
            .member(1, "next", 1);
        let adapter = eager(source);
        let id = adapter.adapt(HostTypeId(1));
        let ty = adapter.graph().get(id);
        let object = ty.object_like().expect("object-like");
        assert_eq!(object.members[0].ty, id);
    }

    #[test]
    fn test_well_known_array_recognition() {
        let source = MockSource::default()
            .class(1, HostClass::Number)
            .class(2, HostClass::Interface)
            .name(2, "Array")
            .class(3, HostClass::Interface)
            .reference(3, 2, &[1]);
        let adapter = eager(source);
        let id = adapter.adapt(HostTypeId(3));
        let graph = adapter.graph();
        match &graph.get(id).kind {
            TypeKind::Array(array) => {
                assert_eq!(graph.get(array.element).kind, TypeKind::Number);
            }
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_generic_lifting() {
        let source = MockSource::default()
            .class(1, HostClass::String)
            .class(2, HostClass::Interface)
            .name(2, "Box")
            .class(3, HostClass::Interface)
            .name(3, "Box")
            .member(3, "value", 1)
            .reference(3, 2, &[1]);
        let adapter = eager(source);
        let id = adapter.adapt(HostTypeId(3));
        let graph = adapter.graph();
        match &graph.get(id).kind {
            TypeKind::GenericArguments(generic) => {
                assert_eq!(generic.type_arguments.len(), 1);
                let instantiated = graph.get(generic.instantiated);
                assert!(instantiated.object_like().is_some());
            }
            other => panic!("expected generic-arguments, got {:?}", other),
        }
    }

    #[test]
    fn test_union_simplification() {
        let source = MockSource::default()
            .class(1, HostClass::Number)
            .union(10, &[])
            .union(11, &[1, 1]);
        let adapter = eager(source);
        let graph = adapter.graph();
        let empty = adapter.adapt(HostTypeId(10));
        assert_eq!(graph.get(empty).kind, TypeKind::Never);
        let single = adapter.adapt(HostTypeId(11));
        assert_eq!(graph.get(single).kind, TypeKind::Number);
    }

    #[test]
    fn test_alias_elision_and_preservation() {
        let anonymous = MockSource::default()
            .class(1, HostClass::Number)
            .class(2, HostClass::Object)
            .member(2, "x", 1)
            .alias(2, "Anon");
        let adapter = eager(anonymous);
        let id = adapter.adapt(HostTypeId(2));
        let graph = adapter.graph();
        match &graph.get(id).kind {
            TypeKind::Alias(alias) => assert_eq!(alias.name, "Anon"),
            other => panic!("expected alias around anonymous object, got {:?}", other),
        }

        let simple = MockSource::default()
            .class(1, HostClass::Interface)
            .name(1, "Bar")
            .alias(1, "Baz");
        let adapter = eager(simple);
        let id = adapter.adapt(HostTypeId(1));
        assert!(matches!(adapter.graph().get(id).kind, TypeKind::Interface(_)));

        let preserved = MockSource::default()
            .class(1, HostClass::Interface)
            .name(1, "Bar")
            .alias(1, "Baz");
        let adapter = Adapter::new(
            Rc::new(preserved),
            AdaptOptions {
                preserve_simple_aliases: true,
                ..AdaptOptions::default()
            },
        );
        let id = adapter.adapt(HostTypeId(1));
        assert!(matches!(adapter.graph().get(id).kind, TypeKind::Alias(_)));
    }

    #[test]
    fn test_lazy_hydration_on_first_access() {
        let source = MockSource::default()
            .class(1, HostClass::Interface)
            .name(1, "Node")
            .member(1, "next", 1);
        let adapter = Adapter::new(
            Rc::new(source),
            AdaptOptions {
                eager: false,
                ..AdaptOptions::default()
            },
        );
        let id = adapter.adapt(HostTypeId(1));
        let graph = adapter.graph();
        assert!(graph.try_get(id).is_none());
        let ty = graph.get(id);
        let object = ty.object_like().expect("hydrated object");
        assert_eq!(object.members[0].ty, id);
        assert!(graph.try_get(id).is_some());
    }

    #[test]
    fn test_date_recognition() {
        let source = MockSource::default().class(1, HostClass::Interface).name(1, "Date");
        let adapter = eager(source);
        let id = adapter.adapt(HostTypeId(1));
        assert_eq!(adapter.graph().get(id).kind, TypeKind::Date);
    }

    #[test]
    fn test_unsupported_becomes_error_type() {
        let adapter = eager(MockSource::default());
        let id = adapter.adapt(HostTypeId(99));
        assert!(matches!(adapter.graph().get(id).kind, TypeKind::Error(_)));
    }
}
