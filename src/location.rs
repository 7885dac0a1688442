//! Declaration locations: where a generated declaration lives.
//!
//! A [`Location`] is a file plus an optional namespace path inside that file.
//! A [`DeclarationLocation`] adds the declared name. Equality is positional
//! and element-wise; an absent namespace equals an absent namespace.

use std::fmt;

/// A file (and optional namespace path) in the generated output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file_name: String,
    pub namespace: Option<Vec<String>>,
}

impl Location {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            namespace: None,
        }
    }

    pub fn with_namespace(file_name: impl Into<String>, namespace: Vec<String>) -> Self {
        Self {
            file_name: file_name.into(),
            namespace: Some(namespace),
        }
    }

    /// An empty location, used when no placement policy applies.
    pub fn empty() -> Self {
        Self::new("")
    }

    pub fn file_name_equal(&self, other: &Location) -> bool {
        self.file_name == other.file_name
    }

    pub fn namespace_equal(&self, other: &Location) -> bool {
        namespace_eq(self.namespace.as_deref(), other.namespace.as_deref())
    }

    pub fn file_and_namespace_equal(&self, other: &Location) -> bool {
        self.file_name_equal(other) && self.namespace_equal(other)
    }

    /// Attach a declared name, producing a full declaration location.
    pub fn with_name(self, name: impl Into<String>) -> DeclarationLocation {
        DeclarationLocation {
            file_name: self.file_name,
            namespace: self.namespace,
            name: name.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name)?;
        if let Some(namespace) = &self.namespace {
            for part in namespace {
                write!(f, "::{}", part)?;
            }
        }
        Ok(())
    }
}

/// A named declaration site in the generated output.
///
/// Unique per program: the compiler's naming counter guarantees no two
/// declarations share a `(file_name, namespace, name)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclarationLocation {
    pub file_name: String,
    pub namespace: Option<Vec<String>>,
    pub name: String,
}

impl DeclarationLocation {
    pub fn new(file_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            namespace: None,
            name: name.into(),
        }
    }

    /// The location part, without the name.
    pub fn location(&self) -> Location {
        Location {
            file_name: self.file_name.clone(),
            namespace: self.namespace.clone(),
        }
    }

    pub fn file_name_equal(&self, other: &DeclarationLocation) -> bool {
        self.file_name == other.file_name
    }

    pub fn namespace_equal(&self, other: &DeclarationLocation) -> bool {
        namespace_eq(self.namespace.as_deref(), other.namespace.as_deref())
    }

    pub fn file_and_namespace_equal(&self, other: &DeclarationLocation) -> bool {
        self.file_name_equal(other) && self.namespace_equal(other)
    }

    /// A stable string key for dedup maps (files, naming counters).
    pub fn key(&self) -> String {
        let mut key = self.file_name.clone();
        if let Some(namespace) = &self.namespace {
            for part in namespace {
                key.push_str("::");
                key.push_str(part);
            }
        }
        key.push('#');
        key.push_str(&self.name);
        key
    }
}

impl fmt::Display for DeclarationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.location(), self.name)
    }
}

fn namespace_eq(a: Option<&[String]>, b: Option<&[String]>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_absence_equals_absence() {
        let a = Location::new("a.out");
        let b = Location::new("a.out");
        assert!(a.file_and_namespace_equal(&b));
    }

    #[test]
    fn test_namespace_elementwise() {
        let a = Location::with_namespace("a.out", vec!["x".into(), "y".into()]);
        let b = Location::with_namespace("a.out", vec!["x".into(), "y".into()]);
        let c = Location::with_namespace("a.out", vec!["x".into()]);
        assert!(a.namespace_equal(&b));
        assert!(!a.namespace_equal(&c));
        assert!(!a.namespace_equal(&Location::new("a.out")));
    }

    #[test]
    fn test_declaration_key_distinguishes_names() {
        let a = DeclarationLocation::new("a.out", "Foo");
        let b = DeclarationLocation::new("a.out", "Bar");
        assert_ne!(a.key(), b.key());
    }
}
