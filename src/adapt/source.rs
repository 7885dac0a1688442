//! The host type-checker interface.
//!
//! The engine never talks to a real checker directly; it consumes this
//! capability surface: classification, member and signature enumeration,
//! generic target/arguments, declaration positions, export visibility, and
//! documentation. Everything except [`TypeSource::classify`] has a default
//! so in-memory sources implement only what their types exercise.

use crate::model::{Modifiers, SourcePosition};

/// An opaque handle to a type inside the host checker. The host guarantees
/// handle identity: the same type always yields the same handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostTypeId(pub u64);

/// Coarse classification of a host type. Shape details are queried through
/// the per-capability methods.
#[derive(Debug, Clone, PartialEq)]
pub enum HostClass {
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Null,
    Undefined,
    Void,
    Any,
    Unknown,
    Never,
    NonPrimitiveObject,
    StringLiteral(String),
    NumberLiteral(f64),
    BooleanLiteral(bool),
    BigIntLiteral(String),
    UniqueSymbol(String),
    /// A literal whose symbol is an enum member; details via
    /// [`TypeSource::enum_member_info`].
    EnumMember,
    Enum,
    Union,
    Intersection,
    Interface,
    Object,
    Class,
    Function,
    Method,
    TypeParameter,
    Tuple,
    /// A host type the source cannot express in the model. Adapted to an
    /// error type; surfaces only if a backend tries to compile it.
    Unsupported(String),
}

/// A named member as the host reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct HostMember {
    pub name: String,
    pub ty: HostTypeId,
    pub optional: bool,
    pub modifiers: Modifiers,
    /// Members without a declaration (synthesized by the checker) are
    /// dropped during adaptation.
    pub has_declaration: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostParameter {
    pub name: String,
    pub ty: HostTypeId,
    pub optional: bool,
    pub rest: bool,
    pub has_initializer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostPredicate {
    pub parameter_name: String,
    pub parameter_index: usize,
    pub ty: HostTypeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostTupleMember {
    pub ty: HostTypeId,
    pub optional: bool,
    pub rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostEnumMember {
    pub name: String,
    pub qualified_name: String,
    /// Handle of the member's literal value type.
    pub value: HostTypeId,
}

/// The capability surface of the host type-checker.
pub trait TypeSource {
    fn classify(&self, handle: HostTypeId) -> HostClass;

    /// The type's own name (interface/class/enum/type-parameter name).
    fn type_name(&self, handle: HostTypeId) -> Option<String> {
        let _ = handle;
        None
    }

    /// The alias symbol's name, when the type was reached through one.
    fn alias_name(&self, handle: HostTypeId) -> Option<String> {
        let _ = handle;
        None
    }

    fn members(&self, handle: HostTypeId) -> Vec<HostMember> {
        let _ = handle;
        Vec::new()
    }

    /// The call signature of an object-like type, as a callable handle.
    fn call_signature(&self, handle: HostTypeId) -> Option<HostTypeId> {
        let _ = handle;
        None
    }

    fn ctor_signature(&self, handle: HostTypeId) -> Option<HostTypeId> {
        let _ = handle;
        None
    }

    fn parameters(&self, handle: HostTypeId) -> Vec<HostParameter> {
        let _ = handle;
        Vec::new()
    }

    fn return_type(&self, handle: HostTypeId) -> Option<HostTypeId> {
        let _ = handle;
        None
    }

    fn type_predicate(&self, handle: HostTypeId) -> Option<HostPredicate> {
        let _ = handle;
        None
    }

    fn type_parameters(&self, handle: HostTypeId) -> Vec<HostTypeId> {
        let _ = handle;
        Vec::new()
    }

    /// Constraint of a type-parameter handle.
    fn constraint(&self, handle: HostTypeId) -> Option<HostTypeId> {
        let _ = handle;
        None
    }

    /// Default of a type-parameter handle.
    fn default_type(&self, handle: HostTypeId) -> Option<HostTypeId> {
        let _ = handle;
        None
    }

    fn string_index_type(&self, handle: HostTypeId) -> Option<HostTypeId> {
        let _ = handle;
        None
    }

    fn number_index_type(&self, handle: HostTypeId) -> Option<HostTypeId> {
        let _ = handle;
        None
    }

    /// Union or intersection constituents, in source order.
    fn constituents(&self, handle: HostTypeId) -> Vec<HostTypeId> {
        let _ = handle;
        Vec::new()
    }

    /// Member names whose literal types discriminate a union's variants.
    fn discriminant_members(&self, handle: HostTypeId) -> Option<Vec<String>> {
        let _ = handle;
        None
    }

    /// The reduced single-type form of an intersection, when the host can
    /// compute one.
    fn reduced_intersection(&self, handle: HostTypeId) -> Option<HostTypeId> {
        let _ = handle;
        None
    }

    fn tuple_members(&self, handle: HostTypeId) -> Vec<HostTupleMember> {
        let _ = handle;
        Vec::new()
    }

    fn tuple_has_rest(&self, handle: HostTypeId) -> bool {
        let _ = handle;
        false
    }

    /// The generic declaration this type instantiates, if any.
    fn reference_target(&self, handle: HostTypeId) -> Option<HostTypeId> {
        let _ = handle;
        None
    }

    fn reference_arguments(&self, handle: HostTypeId) -> Vec<HostTypeId> {
        let _ = handle;
        Vec::new()
    }

    /// Enum-member handles of an enum, in declaration order.
    fn enum_members(&self, handle: HostTypeId) -> Vec<HostTypeId> {
        let _ = handle;
        Vec::new()
    }

    fn enum_member_info(&self, handle: HostTypeId) -> Option<HostEnumMember> {
        let _ = handle;
        None
    }

    fn declaration_position(&self, handle: HostTypeId) -> Option<SourcePosition> {
        let _ = handle;
        None
    }

    fn is_exported(&self, handle: HostTypeId) -> bool {
        let _ = handle;
        false
    }

    fn documentation(&self, handle: HostTypeId) -> Option<String> {
        let _ = handle;
        None
    }

    /// Full text of an original source file, for source-map embedding.
    fn source_text(&self, file_name: &str) -> Option<String> {
        let _ = file_name;
        None
    }
}
