//! The compiler orchestrator.
//!
//! Drives entry-point compilation over the type graph:
//!
//! ```text
//! entry types → compile_type kernel → backend nodes → file routing →
//! backend compile_file → text + source map
//! ```
//!
//! The orchestrator owns a single scoped `output location` cell, saved and
//! restored around every recursive invocation, so backends can reenter
//! `compile_type`, `compile_reference`, and `assign_declaration_location`
//! freely.
//!
//! Cycle breaking happens here rather than in the traversal layer: a type
//! reached again on its own path compiles to a reference node when it has
//! an assigned declaration location, and to a targeted diagnostic when it
//! does not. A depth guard turns runaway recursion (a backend that never
//! assigns a location) into the same diagnostic instead of exhausting the
//! stack.

pub mod backend;
pub mod naming;
pub mod program;

pub use backend::{Backend, CompileArgs, FileView, ReferenceArgs};
pub use naming::infer_type_name;
pub use program::{EntryPoint, FileBuilder, Program};

use std::rc::Rc;

use crate::errors::{CompileError, CompileWarning};
use crate::location::{DeclarationLocation, Location};
use crate::model::{Path, Step, TypeGraph, TypeId, TypeKind};
use crate::output::source_map::{serialize_node, SourceMap, SourceTextProvider};
use crate::output::{NodeFlavor, OutputNode, Segment};
use crate::traverse::Edge;

/// Default recursion budget for one compilation. Exceeding it means a
/// backend recursed through a cycle without a declaration break.
pub const MAX_COMPILE_DEPTH: usize = 512;

/// The result of one `compile_program` run.
#[derive(Debug)]
pub struct Output {
    /// Serialized files, in the order they were first touched.
    pub files: Vec<CompiledFile>,
    pub program: Program,
}

impl Output {
    pub fn file(&self, file_name: &str) -> Option<&CompiledFile> {
        self.files.iter().find(|f| f.file_name == file_name)
    }
}

#[derive(Debug)]
pub struct CompiledFile {
    pub file_name: String,
    pub text: String,
    pub source_map: SourceMap,
    pub ast: OutputNode,
    /// Original source files that contributed mappings.
    pub compiled_from: Vec<String>,
}

/// The compilation engine. One instance can run many programs; per-run
/// state lives in [`Program`].
pub struct Compiler {
    graph: Rc<TypeGraph>,
    backend: Rc<dyn Backend>,
    source_texts: Option<Rc<dyn SourceTextProvider>>,
    program: Program,
    output_location: Option<DeclarationLocation>,
    depth: usize,
    max_depth: usize,
}

impl Compiler {
    pub fn new(graph: Rc<TypeGraph>, backend: Rc<dyn Backend>) -> Self {
        Self {
            graph,
            backend,
            source_texts: None,
            program: Program::new(),
            output_location: None,
            depth: 0,
            max_depth: MAX_COMPILE_DEPTH,
        }
    }

    /// Embed original file contents into emitted source maps.
    pub fn with_source_texts(mut self, provider: Rc<dyn SourceTextProvider>) -> Self {
        self.source_texts = Some(provider);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The declaration currently being emitted, if any.
    pub fn current_output_location(&self) -> Option<&DeclarationLocation> {
        self.output_location.as_ref()
    }

    pub fn warn(&mut self, warning: CompileWarning) {
        self.program.push_warning(warning);
    }

    /// Compile all entry points into files.
    ///
    /// Entry declaration locations are assigned before any compilation so
    /// entry types are known to be externally referenced from the start.
    pub fn compile_program(&mut self, entries: &[EntryPoint]) -> Result<Output, CompileError> {
        self.program = Program::new();
        self.output_location = None;
        self.depth = 0;

        let mut assigned = Vec::with_capacity(entries.len());
        for entry in entries {
            let location = self.assign_declaration_location(
                entry.ty,
                Some(&entry.location),
                entry.name.as_deref(),
            );
            self.program.record_entry(entry.ty, location.clone());
            assigned.push((entry.ty, location));
        }

        for (ty, location) in &assigned {
            let root = self.compile_type_at(*ty, &Path::empty(), Some(location.clone()))?;
            self.route_root(&root, &location.file_name);
        }

        let mut files = Vec::new();
        for file_name in self.program.file_names() {
            let (nodes, references) = match self.program.file(&file_name) {
                Some(builder) => (builder.nodes().to_vec(), builder.references().to_vec()),
                None => (Vec::new(), Vec::new()),
            };
            let backend = Rc::clone(&self.backend);
            let ast = backend.compile_file(
                self,
                FileView {
                    file_name: &file_name,
                    nodes: &nodes,
                    references: &references,
                },
            )?;
            let (text, source_map) =
                serialize_node(&ast, &file_name, self.source_texts.as_deref());
            let compiled_from = source_map.sources.clone();
            files.push(CompiledFile {
                file_name,
                text,
                source_map,
                ast,
                compiled_from,
            });
        }

        Ok(Output {
            files,
            program: std::mem::take(&mut self.program),
        })
    }

    /// Compile one type at a path. Memoized per type; cycles compile to
    /// references when a declaration location exists.
    pub fn compile_type(&mut self, ty: TypeId, path: &Path) -> Result<OutputNode, CompileError> {
        self.compile_type_at(ty, path, None)
    }

    /// Like [`Compiler::compile_type`], additionally scoping the output
    /// location references are resolved against.
    pub fn compile_type_at(
        &mut self,
        ty: TypeId,
        path: &Path,
        output_location: Option<DeclarationLocation>,
    ) -> Result<OutputNode, CompileError> {
        let saved = self.output_location.clone();
        if let Some(location) = output_location {
            self.output_location = Some(location);
        }
        let result = self.compile_kernel(ty, path);
        self.output_location = saved;
        result
    }

    /// Compile the destination of a pre-enumerated edge.
    pub fn compile_edge(&mut self, path: &Path, edge: &Edge) -> Result<OutputNode, CompileError> {
        self.compile_type(edge.to, &path.appended(edge.step.clone()))
    }

    /// Compile `child` as reached from `path` along `step`.
    pub fn compile_step(
        &mut self,
        path: &Path,
        step: Step,
        child: TypeId,
    ) -> Result<OutputNode, CompileError> {
        self.compile_type(child, &path.appended(step))
    }

    fn compile_kernel(&mut self, ty: TypeId, path: &Path) -> Result<OutputNode, CompileError> {
        if let Some(node) = self.program.cached_node(ty) {
            return Ok(node.clone());
        }
        if path.includes(ty) {
            return match self.program.location_of(ty).cloned() {
                Some(location) => self.compile_reference(&location),
                None => Err(self.circular_diagnostic(ty, path)),
            };
        }
        if self.depth >= self.max_depth {
            return Err(self.circular_diagnostic(ty, path));
        }
        {
            let t = self.graph.get(ty);
            if let TypeKind::Error(message) = &t.kind {
                return Err(CompileError::type_has_error(message.clone())
                    .with_path_context(|| path.to_diagnostic_string(&self.graph, Some(ty))));
            }
        }
        self.depth += 1;
        let backend = Rc::clone(&self.backend);
        let result = backend.compile_type(self, CompileArgs { ty, path });
        self.depth -= 1;
        let node = result.map_err(|err| {
            err.with_path_context(|| path.to_diagnostic_string(&self.graph, Some(ty)))
        })?;
        if node.is_cacheable() {
            self.program.cache_node(ty, node.clone());
        }
        Ok(node)
    }

    /// Compile a reference to `to` from the current output location.
    pub fn compile_reference(
        &mut self,
        to: &DeclarationLocation,
    ) -> Result<OutputNode, CompileError> {
        let from = self
            .output_location
            .clone()
            .ok_or_else(CompileError::reference_without_location)?;
        self.compile_reference_from(&from, to)
    }

    /// Compile a reference with an explicit source declaration.
    pub fn compile_reference_from(
        &mut self,
        from: &DeclarationLocation,
        to: &DeclarationLocation,
    ) -> Result<OutputNode, CompileError> {
        let saved = self.output_location.clone();
        self.output_location = Some(from.clone());
        let backend = Rc::clone(&self.backend);
        let result = backend.compile_reference(self, ReferenceArgs { from, to });
        self.output_location = saved;
        let node = result?;
        // A plain cacheable result still represents a dependency edge; wrap
        // it so file routing can collect the edge.
        let node = if matches!(node.flavor(), NodeFlavor::Plain) && node.is_cacheable() {
            node.into_reference(to.clone())
        } else {
            node
        };
        Ok(node)
    }

    /// Assign (or look up) the declaration location for `ty`.
    ///
    /// Location precedence: explicit hint, then the backend's placement
    /// policy, then the current output location, then empty. Name
    /// precedence: explicit hint, then structural inference. Names are made
    /// unique per `(file, namespace, base)` with a deterministic counter:
    /// `Foo`, `Foo1`, `Foo2`, ... Idempotent per type and program.
    pub fn assign_declaration_location(
        &mut self,
        ty: TypeId,
        location_hint: Option<&Location>,
        name_hint: Option<&str>,
    ) -> DeclarationLocation {
        if let Some(existing) = self.program.location_of(ty) {
            return existing.clone();
        }
        let location = match location_hint {
            Some(location) => location.clone(),
            None => {
                let backend = Rc::clone(&self.backend);
                backend
                    .suggest_declaration_location(self, ty, self.output_location.as_ref())
                    .or_else(|| self.output_location.as_ref().map(DeclarationLocation::location))
                    .unwrap_or_else(Location::empty)
            }
        };
        let base = match name_hint {
            Some(name) => name.to_string(),
            None => infer_type_name(&self.graph, ty),
        };
        let count = self.program.next_name_count(&location, &base);
        let name = if count == 0 {
            base
        } else {
            format!("{}{}", base, count)
        };
        let assigned = location.with_name(name);
        {
            let t = self.graph.get(ty);
            if let TypeKind::Enum(e) = &t.kind {
                if !e.name.is_empty() && e.name != assigned.name {
                    self.program.push_warning(CompileWarning::at(
                        format!(
                            "enum `{}` was assigned the declaration name `{}`",
                            e.name, assigned.name
                        ),
                        assigned.clone(),
                    ));
                }
            }
        }
        self.program.set_location(ty, assigned.clone());
        assigned
    }

    fn circular_diagnostic(&self, ty: TypeId, path: &Path) -> CompileError {
        let subpath = path.subpath_from(ty).unwrap_or_else(|| path.clone());
        let type_name = subpath.steps().iter().find_map(|step| {
            let t = self.graph.get(step.origin());
            t.name().map(str::to_string)
        });
        CompileError::circular_compilation(
            type_name,
            subpath.to_diagnostic_string(&self.graph, Some(ty)),
        )
    }

    /// Route an entry root's node tree into file builders: declarations to
    /// their declaration files, reference edges to the referencing file's
    /// reference set. Idempotent across entry points.
    fn route_root(&mut self, root: &OutputNode, entry_file: &str) {
        let mut current_file = entry_file.to_string();
        self.route_node(root, &mut current_file, true);
    }

    fn route_node(&mut self, node: &OutputNode, current_file: &mut String, is_root: bool) {
        match node.flavor() {
            NodeFlavor::Reference {
                refers_to,
                declaration,
            } => {
                self.program
                    .file_mut(current_file)
                    .push_reference(refers_to.clone());
                if let Some(declaration) = declaration {
                    // the declaration switches to its own file as it is
                    // routed; the switch must not leak to our siblings
                    let mut declaration_file = current_file.clone();
                    self.route_node(declaration, &mut declaration_file, false);
                }
                for child in child_nodes(node) {
                    self.route_node(child, current_file, false);
                }
            }
            NodeFlavor::Declaration { location } => {
                *current_file = location.file_name.clone();
                let added = self
                    .program
                    .file_mut(&location.file_name)
                    .push_declaration(node.clone(), location.key());
                if !added {
                    return;
                }
                for child in child_nodes(node) {
                    self.route_node(child, current_file, false);
                }
            }
            NodeFlavor::Plain => {
                if is_root {
                    self.program.file_mut(current_file).push_node(node.clone());
                }
                for child in child_nodes(node) {
                    self.route_node(child, current_file, false);
                }
            }
        }
    }
}

fn child_nodes(node: &OutputNode) -> impl Iterator<Item = &OutputNode> {
    node.segments().iter().filter_map(|segment| match segment {
        Segment::Node(child) => Some(child),
        Segment::Text(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnumType, ObjectType, Type};

    /// Minimal backend: kind names for leaves, bare names for references.
    struct NameBackend;

    impl Backend for NameBackend {
        fn compile_type(
            &self,
            cx: &mut Compiler,
            args: CompileArgs<'_>,
        ) -> Result<OutputNode, CompileError> {
            let t = cx.graph().get(args.ty);
            Ok(OutputNode::text(t.kind_name()))
        }

        fn compile_reference(
            &self,
            _cx: &mut Compiler,
            args: ReferenceArgs<'_>,
        ) -> Result<OutputNode, CompileError> {
            Ok(OutputNode::text(args.to.name.clone()))
        }

        fn compile_file(
            &self,
            _cx: &mut Compiler,
            file: FileView<'_>,
        ) -> Result<OutputNode, CompileError> {
            Ok(OutputNode::group(file.nodes.to_vec()))
        }
    }

    fn compiler(graph: Rc<TypeGraph>) -> Compiler {
        Compiler::new(graph, Rc::new(NameBackend))
    }

    #[test]
    fn test_assignment_is_idempotent() {
        let graph = Rc::new(TypeGraph::new());
        let ty = graph.insert(Type::new(TypeKind::String));
        let mut cx = compiler(Rc::clone(&graph));
        let first =
            cx.assign_declaration_location(ty, Some(&Location::new("a.out")), Some("Foo"));
        let second =
            cx.assign_declaration_location(ty, Some(&Location::new("b.out")), Some("Bar"));
        assert_eq!(first, second);
        assert_eq!(first.name, "Foo");
    }

    #[test]
    fn test_colliding_names_get_counter_suffix() {
        let graph = Rc::new(TypeGraph::new());
        let a = graph.insert(Type::new(TypeKind::Object(ObjectType::default())));
        let b = graph.insert(Type::new(TypeKind::Object(ObjectType::default())));
        let c = graph.insert(Type::new(TypeKind::Object(ObjectType::default())));
        let mut cx = compiler(Rc::clone(&graph));
        let location = Location::new("a.out");
        assert_eq!(
            cx.assign_declaration_location(a, Some(&location), Some("Anonymous")).name,
            "Anonymous"
        );
        assert_eq!(
            cx.assign_declaration_location(b, Some(&location), Some("Anonymous")).name,
            "Anonymous1"
        );
        assert_eq!(
            cx.assign_declaration_location(c, Some(&location), Some("Anonymous")).name,
            "Anonymous2"
        );
    }

    #[test]
    fn test_enum_name_mismatch_is_a_warning() {
        let graph = Rc::new(TypeGraph::new());
        let taken = graph.insert(Type::new(TypeKind::String));
        let en = graph.insert(Type::new(TypeKind::Enum(EnumType {
            name: "Color".into(),
            members: vec![],
        })));
        let mut cx = compiler(Rc::clone(&graph));
        let location = Location::new("a.out");
        cx.assign_declaration_location(taken, Some(&location), Some("Color"));
        let assigned = cx.assign_declaration_location(en, Some(&location), Some("Color"));
        assert_eq!(assigned.name, "Color1");
        assert_eq!(cx.program().warnings().len(), 1);
        assert!(cx.program().warnings()[0].message.contains("Color"));
    }

    #[test]
    fn test_reference_without_location_errors() {
        let graph = Rc::new(TypeGraph::new());
        let mut cx = compiler(graph);
        let err = cx
            .compile_reference(&DeclarationLocation::new("a.out", "Foo"))
            .expect_err("no output location in scope");
        assert!(matches!(
            err.kind(),
            crate::errors::CompileErrorKind::ReferenceWithoutLocation
        ));
    }

    #[test]
    fn test_depth_guard_reports_circular_compilation() {
        let graph = Rc::new(TypeGraph::new());
        let node = graph.reserve();
        graph.fill(
            node,
            Type::new(TypeKind::Array(crate::model::ArrayType { element: node })),
        );

        /// Recurses forever without assigning a declaration location.
        struct RunawayBackend;
        impl Backend for RunawayBackend {
            fn compile_type(
                &self,
                cx: &mut Compiler,
                args: CompileArgs<'_>,
            ) -> Result<OutputNode, CompileError> {
                for edge in crate::traverse::any_edges(cx.graph(), args.ty) {
                    // discard the path so the cycle check never fires
                    cx.compile_type(edge.to, &Path::empty())?;
                }
                Ok(OutputNode::text("[]").do_not_cache())
            }

            fn compile_reference(
                &self,
                _cx: &mut Compiler,
                _args: ReferenceArgs<'_>,
            ) -> Result<OutputNode, CompileError> {
                Ok(OutputNode::empty())
            }

            fn compile_file(
                &self,
                _cx: &mut Compiler,
                _file: FileView<'_>,
            ) -> Result<OutputNode, CompileError> {
                Ok(OutputNode::empty())
            }
        }

        let mut cx = Compiler::new(Rc::clone(&graph), Rc::new(RunawayBackend)).with_max_depth(64);
        let err = cx
            .compile_type(node, &Path::empty())
            .expect_err("depth guard");
        assert!(matches!(
            err.kind(),
            crate::errors::CompileErrorKind::CircularCompilation { .. }
        ));
    }
}
