//! Type model definitions.
//!
//! A [`Type`] is an immutable tagged record describing one kind of type, as
//! reported by the host type-checker and translated by the adapter. Types
//! reference each other by [`TypeId`](super::graph::TypeId) into the shared
//! [`TypeGraph`](super::graph::TypeGraph); the graph may contain cycles
//! through any id-carrying field, so algorithms must not assume acyclicity.
//!
//! Construction is performed only by the adapter (`crate::adapt`); once a
//! type's arena slot is filled it never changes.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::adapt::HostTypeId;

use super::graph::TypeId;

/// A position in an original source file (0-based line and column).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub file_name: String,
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    pub fn new(file_name: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file_name: file_name.into(),
            line,
            column,
        }
    }
}

/// One type in the model.
///
/// The `kind` determines the shape; the remaining fields are host metadata
/// captured at adaptation time so downstream code never talks to the host
/// checker directly: the original handle (for escape-hatch lookups), the
/// declaration site (for source maps), and the doc comment text.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub kind: TypeKind,
    pub host: Option<HostTypeId>,
    pub declared_at: Option<SourcePosition>,
    pub documentation: Option<String>,
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            host: None,
            declared_at: None,
            documentation: None,
        }
    }

    /// A type standing in for something the adapter could not translate.
    /// Compiling it raises `TypeHasError`.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(TypeKind::Error(message.into()))
    }

    /// The declared name, for kinds that carry one.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::EnumMember(m) => Some(&m.name),
            TypeKind::Enum(e) => Some(&e.name),
            TypeKind::Interface(o) | TypeKind::Object(o) | TypeKind::Class(o) => o.name.as_deref(),
            TypeKind::Function(c) | TypeKind::Method(c) => c.name.as_deref(),
            TypeKind::TypeParameter(p) => Some(&p.name),
            TypeKind::Alias(a) => Some(&a.name),
            _ => None,
        }
    }

    /// The stable, hyphenated kind label used in diagnostics and derived
    /// names.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            TypeKind::String => "string",
            TypeKind::Number => "number",
            TypeKind::Boolean => "boolean",
            TypeKind::BigInt => "bigint",
            TypeKind::Symbol => "symbol",
            TypeKind::Null => "null",
            TypeKind::Undefined => "undefined",
            TypeKind::Void => "void",
            TypeKind::Any => "any",
            TypeKind::Unknown => "unknown",
            TypeKind::Never => "never",
            TypeKind::NonPrimitiveObject => "non-primitive-object",
            TypeKind::Date => "date",
            TypeKind::StringLiteral(_) => "string-literal",
            TypeKind::NumberLiteral(_) => "number-literal",
            TypeKind::BooleanLiteral(_) => "boolean-literal",
            TypeKind::BigIntLiteral(_) => "bigint-literal",
            TypeKind::UniqueSymbol(_) => "unique-symbol",
            TypeKind::EnumMember(_) => "enum-member",
            TypeKind::Enum(_) => "enum",
            TypeKind::Union(_) => "union",
            TypeKind::Intersection(_) => "intersection",
            TypeKind::Interface(_) => "interface",
            TypeKind::Object(_) => "object",
            TypeKind::Class(_) => "class",
            TypeKind::Function(_) => "function",
            TypeKind::Method(_) => "method",
            TypeKind::TypeParameter(_) => "type-parameter",
            TypeKind::GenericArguments(_) => "generic-arguments",
            TypeKind::Alias(_) => "alias",
            TypeKind::Array(_) => "array",
            TypeKind::Tuple(_) => "tuple",
            TypeKind::Promise(_) => "promise",
            TypeKind::Error(_) => "error",
        }
    }

    /// True for primitive kinds and primitive literals.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::String
                | TypeKind::Number
                | TypeKind::Boolean
                | TypeKind::BigInt
                | TypeKind::Symbol
                | TypeKind::Null
                | TypeKind::Undefined
                | TypeKind::Void
                | TypeKind::Any
                | TypeKind::Unknown
                | TypeKind::Never
                | TypeKind::NonPrimitiveObject
                | TypeKind::Date
                | TypeKind::StringLiteral(_)
                | TypeKind::NumberLiteral(_)
                | TypeKind::BooleanLiteral(_)
                | TypeKind::BigIntLiteral(_)
                | TypeKind::UniqueSymbol(_)
        )
    }

    pub fn object_like(&self) -> Option<&ObjectType> {
        match &self.kind {
            TypeKind::Interface(o) | TypeKind::Object(o) | TypeKind::Class(o) => Some(o),
            _ => None,
        }
    }

    pub fn callable(&self) -> Option<&CallableType> {
        match &self.kind {
            TypeKind::Function(c) | TypeKind::Method(c) => Some(c),
            _ => None,
        }
    }
}

/// The closed set of type kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    // Primitives
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
    Date,

    // Primitive literals
    StringLiteral(String),
    NumberLiteral(f64),
    BooleanLiteral(bool),
    /// The literal's decimal digits; kept textual so arbitrary precision
    /// survives the trip through the model.
    BigIntLiteral(String),
    UniqueSymbol(String),

    // Enums
    EnumMember(EnumMemberType),
    Enum(EnumType),

    // Composite algebraic
    Union(UnionType),
    Intersection(IntersectionType),

    // Object-like
    Interface(ObjectType),
    Object(ObjectType),
    Class(ObjectType),

    // Callable
    Function(CallableType),
    Method(CallableType),

    // Generics
    TypeParameter(TypeParameterType),
    GenericArguments(GenericArgumentsType),

    // Wrappers and sequences
    Alias(AliasType),
    Array(ArrayType),
    Tuple(TupleType),
    Promise(PromiseType),

    /// Produced by the adapter for host types it cannot translate.
    Error(String),
}

/// Member modifier set, stored as a bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const EXPORT: Modifiers = Modifiers(1 << 0);
    pub const AMBIENT: Modifiers = Modifiers(1 << 1);
    pub const PUBLIC: Modifiers = Modifiers(1 << 2);
    pub const PRIVATE: Modifiers = Modifiers(1 << 3);
    pub const PROTECTED: Modifiers = Modifiers(1 << 4);
    pub const STATIC: Modifiers = Modifiers(1 << 5);
    pub const READONLY: Modifiers = Modifiers(1 << 6);
    pub const ABSTRACT: Modifiers = Modifiers(1 << 7);
    pub const ASYNC: Modifiers = Modifiers(1 << 8);
    pub const DEFAULT: Modifiers = Modifiers(1 << 9);

    pub const fn empty() -> Self {
        Modifiers(0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn names(self) -> Vec<&'static str> {
        static ALL: [(Modifiers, &str); 10] = [
            (Modifiers::EXPORT, "export"),
            (Modifiers::AMBIENT, "ambient"),
            (Modifiers::PUBLIC, "public"),
            (Modifiers::PRIVATE, "private"),
            (Modifiers::PROTECTED, "protected"),
            (Modifiers::STATIC, "static"),
            (Modifiers::READONLY, "readonly"),
            (Modifiers::ABSTRACT, "abstract"),
            (Modifiers::ASYNC, "async"),
            (Modifiers::DEFAULT, "default"),
        ];
        ALL.iter()
            .filter(|(m, _)| self.contains(*m))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Modifiers) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(" "))
    }
}

/// A named member of an object-like type. Order is significant.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
    pub modifiers: Modifiers,
}

/// A positional member of a tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedMember {
    pub ty: TypeId,
    pub optional: bool,
    pub rest: bool,
}

/// Shared shape of `interface`, `object`, and `class` kinds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectType {
    pub name: Option<String>,
    pub members: Vec<Member>,
    pub call_signature: Option<TypeId>,
    pub ctor_signature: Option<TypeId>,
    pub type_parameters: Vec<TypeId>,
    pub string_index: Option<TypeId>,
    pub number_index: Option<TypeId>,
}

/// One parameter of a callable. Order is significant.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
    pub rest: bool,
    pub has_initializer: bool,
}

/// A type predicate (`x is T`) on a callable's return.
#[derive(Debug, Clone, PartialEq)]
pub struct TypePredicate {
    pub parameter_name: String,
    pub parameter_index: usize,
    pub ty: TypeId,
}

/// Shared shape of `function` and `method` kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct CallableType {
    pub name: Option<String>,
    pub parameters: Vec<Parameter>,
    pub type_parameters: Vec<TypeId>,
    pub return_type: TypeId,
    pub predicate: Option<TypePredicate>,
}

/// A generic parameter declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameterType {
    pub name: String,
    pub constraint: Option<TypeId>,
    pub default: Option<TypeId>,
}

/// A generic instantiation: `target` is the generic declaration,
/// `instantiated` the post-substitution body.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericArgumentsType {
    pub target: TypeId,
    pub type_arguments: Vec<TypeId>,
    pub instantiated: TypeId,
}

/// A named pointer to another type. The adapter elides simple aliases
/// unless asked to preserve them.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasType {
    pub name: String,
    pub target: TypeId,
    pub type_parameters: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionType {
    pub variants: Vec<TypeId>,
    /// Member names whose literal types discriminate the variants, when the
    /// host checker reports them.
    pub discriminant_members: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionType {
    pub variants: Vec<TypeId>,
    /// The reduced single-type form, for targets whose type system cannot
    /// represent intersections directly.
    pub intersected: Option<TypeId>,
}

/// An enum member: a named, qualified literal.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMemberType {
    pub name: String,
    pub qualified_name: String,
    /// Id of the member's literal value type.
    pub value: TypeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    /// Enum-member types, in declaration order.
    pub members: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub element: TypeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleType {
    pub members: Vec<IndexedMember>,
    pub has_rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromiseType {
    pub element: TypeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_set_ops() {
        let m = Modifiers::READONLY | Modifiers::STATIC;
        assert!(m.contains(Modifiers::READONLY));
        assert!(m.contains(Modifiers::STATIC));
        assert!(!m.contains(Modifiers::PRIVATE));
        assert_eq!(m.to_string(), "static readonly");
    }

    #[test]
    fn test_kind_names_are_hyphenated() {
        assert_eq!(Type::new(TypeKind::NonPrimitiveObject).kind_name(), "non-primitive-object");
        assert_eq!(
            Type::new(TypeKind::StringLiteral("a".into())).kind_name(),
            "string-literal"
        );
    }

    #[test]
    fn test_name_lookup_per_kind() {
        let iface = Type::new(TypeKind::Interface(ObjectType {
            name: Some("Point".into()),
            ..ObjectType::default()
        }));
        assert_eq!(iface.name(), Some("Point"));
        assert_eq!(Type::new(TypeKind::String).name(), None);
    }
}
