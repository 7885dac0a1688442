//! The intermediate type model.
//!
//! Three layers:
//!
//! - `types`: the closed sum of type kinds and their payloads
//! - `graph`: the append-only arena giving every type a stable identity
//! - `path`: labelled edge sequences used by traversal and diagnostics
//!
//! Types are immutable value objects created only by the adapter
//! (`crate::adapt`) and shared freely across compilations.

pub mod graph;
pub mod path;
pub mod types;

pub use graph::{Hydrate, TypeGraph, TypeId};
pub use path::{Path, Step, StepKind};
pub use types::{
    AliasType, ArrayType, CallableType, EnumMemberType, EnumType, GenericArgumentsType,
    IndexedMember, IntersectionType, Member, Modifiers, ObjectType, Parameter, PromiseType,
    SourcePosition, TupleType, Type, TypeKind, TypeParameterType, TypePredicate, UnionType,
};
