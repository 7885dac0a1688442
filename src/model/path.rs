//! Paths: labelled edge sequences through the type graph.
//!
//! A [`Step`] is one labelled outgoing edge from a type to an inner type; a
//! [`Path`] is an ordered sequence of steps from a declared root. Every
//! step's origin is the destination of the preceding step (for step 0, the
//! root). Paths are pure values; all operations return fresh paths.

use std::fmt::Write as _;

use super::graph::{TypeGraph, TypeId};
use super::types::{IndexedMember, Member, Parameter};

/// Discriminant of a [`Step`], for dispatch and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    NamedMember,
    IndexedMember,
    StringIndex,
    NumberIndex,
    Variant,
    Awaited,
    TypeParameter,
    TypeParameterConstraint,
    TypeParameterDefault,
    Parameter,
    Return,
    CallSignature,
    CtorSignature,
    GenericArgument,
    GenericTarget,
    Aliased,
}

impl StepKind {
    pub fn label(self) -> &'static str {
        match self {
            StepKind::NamedMember => "named-member",
            StepKind::IndexedMember => "indexed-member",
            StepKind::StringIndex => "string-index",
            StepKind::NumberIndex => "number-index",
            StepKind::Variant => "variant",
            StepKind::Awaited => "awaited",
            StepKind::TypeParameter => "type-parameter",
            StepKind::TypeParameterConstraint => "type-parameter-constraint",
            StepKind::TypeParameterDefault => "type-parameter-default",
            StepKind::Parameter => "parameter",
            StepKind::Return => "return",
            StepKind::CallSignature => "call-signature",
            StepKind::CtorSignature => "ctor-signature",
            StepKind::GenericArgument => "generic-argument",
            StepKind::GenericTarget => "generic-target",
            StepKind::Aliased => "aliased",
        }
    }
}

/// One labelled edge. Carries the originating type and the payload that
/// identifies the edge among its siblings.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    NamedMember {
        from: TypeId,
        index: usize,
        member: Member,
    },
    IndexedMember {
        from: TypeId,
        index: usize,
        member: IndexedMember,
    },
    StringIndex {
        from: TypeId,
    },
    NumberIndex {
        from: TypeId,
    },
    Variant {
        from: TypeId,
        index: usize,
    },
    Awaited {
        from: TypeId,
    },
    TypeParameter {
        from: TypeId,
        index: usize,
        name: String,
    },
    TypeParameterConstraint {
        from: TypeId,
    },
    TypeParameterDefault {
        from: TypeId,
    },
    Parameter {
        from: TypeId,
        index: usize,
        parameter: Parameter,
    },
    Return {
        from: TypeId,
    },
    CallSignature {
        from: TypeId,
    },
    CtorSignature {
        from: TypeId,
    },
    GenericArgument {
        from: TypeId,
        index: usize,
        name: Option<String>,
    },
    GenericTarget {
        from: TypeId,
    },
    Aliased {
        from: TypeId,
    },
}

impl Step {
    /// The type this edge leaves from.
    pub fn origin(&self) -> TypeId {
        match self {
            Step::NamedMember { from, .. }
            | Step::IndexedMember { from, .. }
            | Step::StringIndex { from }
            | Step::NumberIndex { from }
            | Step::Variant { from, .. }
            | Step::Awaited { from }
            | Step::TypeParameter { from, .. }
            | Step::TypeParameterConstraint { from }
            | Step::TypeParameterDefault { from }
            | Step::Parameter { from, .. }
            | Step::Return { from }
            | Step::CallSignature { from }
            | Step::CtorSignature { from }
            | Step::GenericArgument { from, .. }
            | Step::GenericTarget { from }
            | Step::Aliased { from } => *from,
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Step::NamedMember { .. } => StepKind::NamedMember,
            Step::IndexedMember { .. } => StepKind::IndexedMember,
            Step::StringIndex { .. } => StepKind::StringIndex,
            Step::NumberIndex { .. } => StepKind::NumberIndex,
            Step::Variant { .. } => StepKind::Variant,
            Step::Awaited { .. } => StepKind::Awaited,
            Step::TypeParameter { .. } => StepKind::TypeParameter,
            Step::TypeParameterConstraint { .. } => StepKind::TypeParameterConstraint,
            Step::TypeParameterDefault { .. } => StepKind::TypeParameterDefault,
            Step::Parameter { .. } => StepKind::Parameter,
            Step::Return { .. } => StepKind::Return,
            Step::CallSignature { .. } => StepKind::CallSignature,
            Step::CtorSignature { .. } => StepKind::CtorSignature,
            Step::GenericArgument { .. } => StepKind::GenericArgument,
            Step::GenericTarget { .. } => StepKind::GenericTarget,
            Step::Aliased { .. } => StepKind::Aliased,
        }
    }

    /// The fixed accessor text for diagnostics. Identical steps always
    /// render identically.
    fn accessor(&self) -> String {
        match self {
            Step::NamedMember { member, .. } => format!(".{}", member.name),
            Step::IndexedMember { index, .. } => format!("[{}]", index),
            Step::StringIndex { .. } => "[string]".to_string(),
            Step::NumberIndex { .. } => "[number]".to_string(),
            Step::Variant { index, .. } => format!("#{}", index),
            Step::Awaited { .. } => ".awaited".to_string(),
            Step::TypeParameter { name, .. } => format!("<{}>", name),
            Step::TypeParameterConstraint { .. } => ":constraint".to_string(),
            Step::TypeParameterDefault { .. } => ":default".to_string(),
            Step::Parameter {
                index, parameter, ..
            } => format!("({}:{})", index, parameter.name),
            Step::Return { .. } => "=>".to_string(),
            Step::CallSignature { .. } => ".call".to_string(),
            Step::CtorSignature { .. } => ".new".to_string(),
            Step::GenericArgument { index, name, .. } => match name {
                Some(name) => format!("<{}={}>", index, name),
                None => format!("<{}>", index),
            },
            Step::GenericTarget { .. } => "<target>".to_string(),
            Step::Aliased { .. } => "=".to_string(),
        }
    }
}

/// An ordered sequence of steps from a root type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The origin of the first step, i.e. the declared root.
    pub fn root(&self) -> Option<TypeId> {
        self.steps.first().map(Step::origin)
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// A new path with one more step.
    pub fn appended(&self, step: Step) -> Path {
        let mut steps = self.steps.clone();
        steps.push(step);
        Path { steps }
    }

    /// A new path with an optional extra step (skipped when absent).
    pub fn concat(&self, step: Option<Step>) -> Path {
        match step {
            Some(step) => self.appended(step),
            None => self.clone(),
        }
    }

    /// A new path with all of `other`'s steps appended.
    pub fn concat_path(&self, other: &Path) -> Path {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());
        Path { steps }
    }

    /// True iff any step originates at `ty`.
    pub fn includes(&self, ty: TypeId) -> bool {
        self.steps.iter().any(|step| step.origin() == ty)
    }

    /// The suffix starting at the first step originating at `ty`, or `None`
    /// when `ty` does not occur as an origin. Under a cyclic walk this is
    /// the cycle itself.
    pub fn subpath_from(&self, ty: TypeId) -> Option<Path> {
        let start = self.steps.iter().position(|step| step.origin() == ty)?;
        Some(Path {
            steps: self.steps[start..].to_vec(),
        })
    }

    /// Human-readable rendering for diagnostics.
    pub fn to_diagnostic_string(&self, graph: &TypeGraph, target: Option<TypeId>) -> String {
        let mut out = String::new();
        match self.root() {
            Some(root) => out.push_str(&type_label(graph, root)),
            None => {
                if let Some(target) = target {
                    out.push_str(&type_label(graph, target));
                }
            }
        }
        for step in &self.steps {
            out.push_str(&step.accessor());
        }
        if let Some(target) = target {
            if !self.steps.is_empty() {
                let _ = write!(out, " -> {}", type_label(graph, target));
            }
        }
        out
    }

    /// Best-effort projection into a structural type-accessor dialect,
    /// used when deriving readable type names. Steps with no accessor
    /// equivalent pass the accumulator through unchanged.
    pub fn to_typescript(&self, graph: &TypeGraph) -> String {
        let mut acc = match self.root() {
            Some(root) => type_label(graph, root),
            None => "T".to_string(),
        };
        for step in &self.steps {
            acc = match step {
                Step::NamedMember { member, .. } => format!("{}[\"{}\"]", acc, member.name),
                Step::IndexedMember { index, .. } => format!("{}[{}]", acc, index),
                Step::StringIndex { .. } => format!("{}[string]", acc),
                Step::NumberIndex { .. } => format!("{}[number]", acc),
                Step::Variant { .. } => acc,
                Step::Awaited { .. } => format!("Awaited<{}>", acc),
                Step::Return { .. } => format!("ReturnType<{}>", acc),
                Step::Parameter { index, .. } => format!("Parameters<{}>[{}]", acc, index),
                Step::GenericArgument { .. }
                | Step::GenericTarget { .. }
                | Step::TypeParameter { .. }
                | Step::TypeParameterConstraint { .. }
                | Step::TypeParameterDefault { .. }
                | Step::CallSignature { .. }
                | Step::CtorSignature { .. }
                | Step::Aliased { .. } => acc,
            };
        }
        acc
    }
}

fn type_label(graph: &TypeGraph, id: TypeId) -> String {
    let ty = graph.get(id);
    match ty.name() {
        Some(name) => name.to_string(),
        None => ty.kind_name().to_string(),
    }
}
