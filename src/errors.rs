//! Compile errors and warnings.
//!
//! The engine never recovers automatically: errors propagate to the
//! `compile_program` caller. The only transformations performed on the way
//! up are (a) annotating an error once with the diagnostic path it occurred
//! at and (b) translating runaway recursion into an actionable message.

use std::fmt;

use crate::location::DeclarationLocation;

/// An error raised by the compilation engine or a target backend.
///
/// Carries an optional diagnostic path (`Path: ...`) describing where in the
/// type graph the error occurred. The path is attached at most once per
/// error value, by the innermost traversal frame that sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    kind: CompileErrorKind,
    path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompileErrorKind {
    /// The adapter produced an error type (untranslatable host type) and a
    /// backend attempted to compile it.
    TypeHasError { message: String },
    /// The backend's kind dispatch has no entry for this type kind.
    NoBackendForKind { kind: String },
    /// Compilation recursed through a cycle without a declaration break.
    CircularCompilation {
        type_name: Option<String>,
        path: String,
    },
    /// A reference was requested while no output location was in scope.
    ReferenceWithoutLocation,
    /// Backend-raised failure (missing fields, unsupported shapes, ...).
    Backend { message: String },
}

impl CompileError {
    pub fn type_has_error(message: impl Into<String>) -> Self {
        Self::of(CompileErrorKind::TypeHasError {
            message: message.into(),
        })
    }

    pub fn no_backend_for_kind(kind: impl Into<String>) -> Self {
        Self::of(CompileErrorKind::NoBackendForKind { kind: kind.into() })
    }

    pub fn circular_compilation(type_name: Option<String>, path: impl Into<String>) -> Self {
        Self::of(CompileErrorKind::CircularCompilation {
            type_name,
            path: path.into(),
        })
    }

    pub fn reference_without_location() -> Self {
        Self::of(CompileErrorKind::ReferenceWithoutLocation)
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::of(CompileErrorKind::Backend {
            message: message.into(),
        })
    }

    fn of(kind: CompileErrorKind) -> Self {
        Self { kind, path: None }
    }

    pub fn kind(&self) -> &CompileErrorKind {
        &self.kind
    }

    /// The diagnostic path this error was annotated with, if any.
    pub fn path_context(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Attach a diagnostic path unless one is already present.
    ///
    /// The closure runs only for the first annotation, so outer traversal
    /// frames passing an already-annotated error through pay nothing.
    pub fn with_path_context(mut self, path: impl FnOnce() -> String) -> Self {
        if self.path.is_none() {
            self.path = Some(path());
        }
        self
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CompileErrorKind::TypeHasError { message } => {
                write!(f, "type carries an adapter error: {}", message)?;
            }
            CompileErrorKind::NoBackendForKind { kind } => {
                write!(f, "no backend handler for type kind `{}`", kind)?;
            }
            CompileErrorKind::CircularCompilation { type_name, path } => {
                write!(
                    f,
                    "compilation recursed through a cycle without assigning a declaration location"
                )?;
                if let Some(name) = type_name {
                    write!(
                        f,
                        "; assign a declaration location to `{}` before recursing into it, \
                         or build a reference node for it directly",
                        name
                    )?;
                } else {
                    write!(
                        f,
                        "; assign a declaration location before recursing, \
                         or build a reference node directly"
                    )?;
                }
                write!(f, " (cycle: {})", path)?;
            }
            CompileErrorKind::ReferenceWithoutLocation => {
                write!(
                    f,
                    "cannot compile a reference: no output location is in scope"
                )?;
            }
            CompileErrorKind::Backend { message } => {
                write!(f, "backend error: {}", message)?;
            }
        }
        if let Some(path) = &self.path {
            write!(f, "\nPath: {}", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

/// A non-fatal condition noticed during compilation.
///
/// Warnings accumulate on the program state; the engine defines no output
/// channel for them, callers render them however they report diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileWarning {
    pub message: String,
    pub location: Option<DeclarationLocation>,
}

impl CompileWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    pub fn at(message: impl Into<String>, location: DeclarationLocation) -> Self {
        Self {
            message: message.into(),
            location: Some(location),
        }
    }
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning: {}", self.message)?;
        if let Some(location) = &self.location {
            write!(f, " ({})", location)?;
        }
        Ok(())
    }
}
