//! The target-backend contract.
//!
//! A backend renders each type kind for one target language. It receives
//! the compiler as an explicit context and may reenter it: recursive
//! `compile_type`, `compile_reference`, and `assign_declaration_location`
//! calls are all legal from inside a backend method; the compiler saves and
//! restores its scoped state around every one.

use crate::errors::CompileError;
use crate::location::{DeclarationLocation, Location};
use crate::model::{Path, TypeId};
use crate::output::OutputNode;

use super::Compiler;

/// Arguments to [`Backend::compile_type`]: the type under compilation and
/// the path it was reached by.
#[derive(Debug, Clone, Copy)]
pub struct CompileArgs<'a> {
    pub ty: TypeId,
    pub path: &'a Path,
}

/// Arguments to [`Backend::compile_reference`]: the declaration the
/// reference appears in and the declaration it points to.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceArgs<'a> {
    pub from: &'a DeclarationLocation,
    pub to: &'a DeclarationLocation,
}

/// One file's accumulated declarations and outgoing references, handed to
/// [`Backend::compile_file`] to produce the full file node (headers,
/// imports, body, footer).
#[derive(Debug, Clone, Copy)]
pub struct FileView<'a> {
    pub file_name: &'a str,
    pub nodes: &'a [OutputNode],
    pub references: &'a [DeclarationLocation],
}

/// A pluggable target backend.
pub trait Backend {
    /// Render one type. Called for every encountered type; recursion into
    /// inner types goes through `cx` so memoization and cycle breaking
    /// apply.
    fn compile_type(
        &self,
        cx: &mut Compiler,
        args: CompileArgs<'_>,
    ) -> Result<OutputNode, CompileError>;

    /// Render the syntactic form used at `args.from` to refer to
    /// `args.to`. Typical behavior: same file and namespace, a bare name;
    /// different file, a qualified name plus whatever import machinery the
    /// target needs.
    fn compile_reference(
        &self,
        cx: &mut Compiler,
        args: ReferenceArgs<'_>,
    ) -> Result<OutputNode, CompileError>;

    /// Render one whole file from its declarations and references.
    fn compile_file(
        &self,
        cx: &mut Compiler,
        file: FileView<'_>,
    ) -> Result<OutputNode, CompileError>;

    /// Optional placement policy hook for types without an explicit
    /// location.
    fn suggest_declaration_location(
        &self,
        cx: &Compiler,
        ty: TypeId,
        from: Option<&DeclarationLocation>,
    ) -> Option<Location> {
        let _ = (cx, ty, from);
        None
    }
}
