//! Per-compilation state.
//!
//! A [`Program`] lives for one `compile_program` run: the requested entry
//! points, the accumulating per-file builders, the declaration-location and
//! node memos keyed by type id, the deterministic naming counters, and any
//! warnings noticed along the way. The type graph itself outlives programs;
//! everything here is dropped when the run ends.

use std::collections::{HashMap, HashSet};

use crate::errors::CompileWarning;
use crate::location::{DeclarationLocation, Location};
use crate::model::TypeId;
use crate::output::OutputNode;

/// One requested output: a type and where its declaration should land.
#[derive(Debug, Clone)]
pub struct EntryPoint {
    pub ty: TypeId,
    pub location: Location,
    /// Explicit declaration name; inferred from structure when absent.
    pub name: Option<String>,
}

impl EntryPoint {
    pub fn new(ty: TypeId, location: Location) -> Self {
        Self {
            ty,
            location,
            name: None,
        }
    }

    pub fn named(ty: TypeId, location: Location, name: impl Into<String>) -> Self {
        Self {
            ty,
            location,
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NameKey {
    file_name: String,
    namespace: Option<Vec<String>>,
    base: String,
}

/// State for one compilation run.
#[derive(Debug, Default)]
pub struct Program {
    entry_points: Vec<(TypeId, DeclarationLocation)>,
    files: Vec<FileBuilder>,
    file_index: HashMap<String, usize>,
    type_locations: HashMap<TypeId, DeclarationLocation>,
    type_nodes: HashMap<TypeId, OutputNode>,
    name_counts: HashMap<NameKey, u32>,
    warnings: Vec<CompileWarning>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_points(&self) -> &[(TypeId, DeclarationLocation)] {
        &self.entry_points
    }

    pub(crate) fn record_entry(&mut self, ty: TypeId, location: DeclarationLocation) {
        self.entry_points.push((ty, location));
    }

    /// The declaration location assigned to `ty`, if any.
    pub fn location_of(&self, ty: TypeId) -> Option<&DeclarationLocation> {
        self.type_locations.get(&ty)
    }

    pub(crate) fn set_location(&mut self, ty: TypeId, location: DeclarationLocation) {
        self.type_locations.insert(ty, location);
    }

    /// The memoized compilation of `ty`, if any.
    pub fn cached_node(&self, ty: TypeId) -> Option<&OutputNode> {
        self.type_nodes.get(&ty)
    }

    pub(crate) fn cache_node(&mut self, ty: TypeId, node: OutputNode) {
        self.type_nodes.insert(ty, node);
    }

    /// Occurrence counter for a `(file, namespace, base name)` triple.
    /// Returns 0 for the first occurrence, 1 for the second, and so on.
    pub(crate) fn next_name_count(&mut self, location: &Location, base: &str) -> u32 {
        let key = NameKey {
            file_name: location.file_name.clone(),
            namespace: location.namespace.clone(),
            base: base.to_string(),
        };
        let count = self.name_counts.entry(key).or_insert(0);
        let current = *count;
        *count += 1;
        current
    }

    /// The builder for `file_name`, created in insertion order on demand.
    pub(crate) fn file_mut(&mut self, file_name: &str) -> &mut FileBuilder {
        let index = match self.file_index.get(file_name) {
            Some(&index) => index,
            None => {
                let index = self.files.len();
                self.files.push(FileBuilder::new(file_name));
                self.file_index.insert(file_name.to_string(), index);
                index
            }
        };
        &mut self.files[index]
    }

    pub fn file(&self, file_name: &str) -> Option<&FileBuilder> {
        self.file_index.get(file_name).map(|&index| &self.files[index])
    }

    /// Touched files, in the order they were first touched.
    pub fn files(&self) -> &[FileBuilder] {
        &self.files
    }

    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.file_name.clone()).collect()
    }

    pub fn warnings(&self) -> &[CompileWarning] {
        &self.warnings
    }

    pub(crate) fn push_warning(&mut self, warning: CompileWarning) {
        self.warnings.push(warning);
    }
}

/// Accumulates one output file: its nodes in insertion order (declarations
/// deduplicated by declaration key) and its outgoing references,
/// deduplicated, also in insertion order.
#[derive(Debug)]
pub struct FileBuilder {
    file_name: String,
    nodes: Vec<OutputNode>,
    declaration_keys: HashSet<String>,
    references: Vec<DeclarationLocation>,
    reference_keys: HashSet<String>,
}

impl FileBuilder {
    fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            nodes: Vec::new(),
            declaration_keys: HashSet::new(),
            references: Vec::new(),
            reference_keys: HashSet::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn nodes(&self) -> &[OutputNode] {
        &self.nodes
    }

    pub fn references(&self) -> &[DeclarationLocation] {
        &self.references
    }

    /// Append a root node (entry-point output that is not a declaration).
    pub(crate) fn push_node(&mut self, node: OutputNode) {
        self.nodes.push(node);
    }

    /// Append a declaration once per declaration key. Returns whether the
    /// node was new.
    pub(crate) fn push_declaration(&mut self, node: OutputNode, key: String) -> bool {
        if !self.declaration_keys.insert(key) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Record an outgoing reference; same-file references are not
    /// outgoing and same targets are recorded once.
    pub(crate) fn push_reference(&mut self, location: DeclarationLocation) {
        if location.file_name == self.file_name {
            return;
        }
        if self.reference_keys.insert(location.key()) {
            self.references.push(location);
        }
    }
}
