//! Typemill: a type-directed code generation engine.
//!
//! Typemill ingests a declarative model of program types produced by a host
//! type-checker and emits textual artifacts in arbitrary target languages,
//! with cross-file references, deduplicated declarations, stable naming,
//! and source maps back to the original declaration sites.
//!
//! ## Pipeline
//!
//! ```text
//! host checker → Adapter → TypeGraph → Compiler ⇄ Backend → files + maps
//! ```
//!
//! ## Modules
//!
//! - `model` - the immutable type model, arena, and path machinery
//! - `traverse` - the generic walker and edge enumerators
//! - `adapt` - converts host type-checker handles into model types
//! - `output` - the source-mapped output AST and serializer
//! - `compile` - the orchestrator and the pluggable backend contract
//!
//! Backends are pluggable: the crate ships the engine, not a target. A
//! backend implements [`Backend`] and decides per kind whether a type
//! becomes a standalone declaration or an inline expression; the compiler
//! handles memoization, cycle breaking via references, deterministic
//! naming, file routing, and serialization.

pub mod adapt;
pub mod compile;
pub mod errors;
pub mod location;
pub mod model;
pub mod output;
pub mod traverse;

pub use adapt::{AdaptError, AdaptOptions, Adapter, HostClass, HostTypeId, TypeSource};
pub use compile::{
    infer_type_name, Backend, CompileArgs, CompiledFile, Compiler, EntryPoint, FileView, Output,
    Program, ReferenceArgs, MAX_COMPILE_DEPTH,
};
pub use errors::{CompileError, CompileErrorKind, CompileWarning};
pub use location::{DeclarationLocation, Location};
pub use model::{Path, SourcePosition, Step, StepKind, Type, TypeGraph, TypeId, TypeKind};
pub use output::{serialize_node, NodeFlavor, OutputNode, SourceMap, SourceTextProvider};
pub use traverse::{
    any_edges, json_edges, walk, walk_depth_first, DepthFirst, Edge, PreventCycles, Traverse,
    Visit, Visitor, Walked,
};
