//! The output AST.
//!
//! An [`OutputNode`] is a source-mapped text tree. Three flavors:
//!
//! - **plain** — text plus children
//! - **declaration** — the body of a top-level declaration at a
//!   [`DeclarationLocation`]; the orchestrator routes it to its file
//! - **reference** — a cross-declaration (possibly cross-file) dependency;
//!   the orchestrator records the edge in the source file's reference set
//!
//! Nodes also carry the originating type and path (for debugging and
//! source-map attribution) and a cache flag. Reference nodes default to
//! uncached; any node can opt out via [`OutputNode::do_not_cache`] — needed
//! when rendering depends on surrounding context, e.g. an enum member that
//! renders one way inside its enum and another when referenced externally.

pub mod source_map;

pub use source_map::{serialize_node, SourceMap, SourceTextProvider};

use crate::location::DeclarationLocation;
use crate::model::{Path, SourcePosition, TypeId};

/// One textual segment of a node: literal text or a child node.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Node(OutputNode),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeFlavor {
    Plain,
    Declaration {
        location: DeclarationLocation,
    },
    Reference {
        refers_to: DeclarationLocation,
        /// The referenced declaration itself, when the backend built it
        /// inline; the orchestrator routes it to its own file.
        declaration: Option<Box<OutputNode>>,
    },
}

/// The type and path a node was compiled from.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOrigin {
    pub ty: TypeId,
    pub path: Path,
}

/// A source-mapped textual segment tree.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputNode {
    segments: Vec<Segment>,
    flavor: NodeFlavor,
    origin: Option<NodeOrigin>,
    source: Option<SourcePosition>,
    cache: bool,
}

impl OutputNode {
    pub fn empty() -> Self {
        Self {
            segments: Vec::new(),
            flavor: NodeFlavor::Plain,
            origin: None,
            source: None,
            cache: true,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::empty().with_text(text)
    }

    pub fn group(children: Vec<OutputNode>) -> Self {
        let mut node = Self::empty();
        for child in children {
            node.segments.push(Segment::Node(child));
        }
        node
    }

    /// A declaration node at `location`. Its segments are the declaration
    /// body.
    pub fn declaration(location: DeclarationLocation) -> Self {
        let mut node = Self::empty();
        node.flavor = NodeFlavor::Declaration { location };
        node
    }

    /// A reference node. Uncached by default: the rendered form depends on
    /// where the reference appears.
    pub fn reference(refers_to: DeclarationLocation) -> Self {
        let mut node = Self::empty();
        node.flavor = NodeFlavor::Reference {
            refers_to,
            declaration: None,
        };
        node.cache = false;
        node
    }

    /// A reference carrying the declaration it points to. The declaration
    /// is routed to its own file when the reference is walked.
    pub fn reference_with_declaration(
        refers_to: DeclarationLocation,
        declaration: OutputNode,
    ) -> Self {
        Self::reference(refers_to).with_referenced_declaration(declaration)
    }

    /// Attach the referenced declaration to an existing reference node (a
    /// no-op on other flavors).
    pub fn with_referenced_declaration(mut self, declaration: OutputNode) -> Self {
        if let NodeFlavor::Reference {
            declaration: slot, ..
        } = &mut self.flavor
        {
            *slot = Some(Box::new(declaration));
        }
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: OutputNode) -> Self {
        self.segments.push(Segment::Node(child));
        self
    }

    pub fn with_source(mut self, source: SourcePosition) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_origin(mut self, ty: TypeId, path: Path) -> Self {
        self.origin = Some(NodeOrigin { ty, path });
        self
    }

    /// Exclude this node from the per-type compilation cache.
    pub fn do_not_cache(mut self) -> Self {
        self.cache = false;
        self
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.segments.push(Segment::Text(text.into()));
    }

    pub fn push_child(&mut self, child: OutputNode) {
        self.segments.push(Segment::Node(child));
    }

    /// Turn a plain node into a reference node, keeping its segments as the
    /// rendered form. Used by the orchestrator to keep reference edges
    /// walkable when a backend returns plain text.
    pub(crate) fn into_reference(mut self, refers_to: DeclarationLocation) -> Self {
        self.flavor = NodeFlavor::Reference {
            refers_to,
            declaration: None,
        };
        self.cache = false;
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn flavor(&self) -> &NodeFlavor {
        &self.flavor
    }

    pub fn origin(&self) -> Option<&NodeOrigin> {
        self.origin.as_ref()
    }

    pub fn source(&self) -> Option<&SourcePosition> {
        self.source.as_ref()
    }

    pub fn is_cacheable(&self) -> bool {
        self.cache
    }

    pub fn is_declaration(&self) -> bool {
        matches!(self.flavor, NodeFlavor::Declaration { .. })
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.flavor, NodeFlavor::Reference { .. })
    }

    pub fn declaration_location(&self) -> Option<&DeclarationLocation> {
        match &self.flavor {
            NodeFlavor::Declaration { location } => Some(location),
            _ => None,
        }
    }

    pub fn refers_to(&self) -> Option<&DeclarationLocation> {
        match &self.flavor {
            NodeFlavor::Reference { refers_to, .. } => Some(refers_to),
            _ => None,
        }
    }

    pub fn referenced_declaration(&self) -> Option<&OutputNode> {
        match &self.flavor {
            NodeFlavor::Reference {
                declaration: Some(declaration),
                ..
            } => Some(declaration),
            _ => None,
        }
    }

    /// The concatenated text of this node, in tree order, without source
    /// mapping. Referenced declarations are not part of the reference's own
    /// text.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.write_plain(&mut out);
        out
    }

    fn write_plain(&self, out: &mut String) {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Node(node) => node.write_plain(out),
            }
        }
    }
}

impl Default for OutputNode {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_concatenates_tree_order() {
        let node = OutputNode::text("a")
            .with_child(OutputNode::text("b").with_text("c"))
            .with_text("d");
        assert_eq!(node.plain_text(), "abcd");
    }

    #[test]
    fn test_reference_nodes_default_uncached() {
        let reference = OutputNode::reference(DeclarationLocation::new("a.out", "Foo"));
        assert!(!reference.is_cacheable());
        assert!(OutputNode::text("x").is_cacheable());
        assert!(!OutputNode::text("x").do_not_cache().is_cacheable());
    }

    #[test]
    fn test_into_reference_keeps_segments() {
        let node = OutputNode::text("Foo").into_reference(DeclarationLocation::new("a.out", "Foo"));
        assert!(node.is_reference());
        assert_eq!(node.plain_text(), "Foo");
    }
}
