//! Full-pipeline tests: host source → adapter → compiler → text + maps.

use std::rc::Rc;

use typemill::adapt::{Adapter, AdaptOptions, HostClass, HostMember, HostTypeId, TypeSource};
use typemill::compile::{Backend, CompileArgs, Compiler, EntryPoint, FileView, ReferenceArgs};
use typemill::errors::CompileError;
use typemill::location::Location;
use typemill::model::{Modifiers, SourcePosition, TypeKind};
use typemill::output::OutputNode;
use typemill::traverse::steps::named_member_edges;

/// A tiny in-memory checker: one `Point` interface with two number fields,
/// declared in `point.ts`.
struct PointSource;

const POINT: HostTypeId = HostTypeId(1);
const NUMBER: HostTypeId = HostTypeId(2);
const POINT_TS: &str = "interface Point {\n  x: number;\n  y: number;\n}\n";

impl TypeSource for PointSource {
    fn classify(&self, handle: HostTypeId) -> HostClass {
        match handle {
            POINT => HostClass::Interface,
            _ => HostClass::Number,
        }
    }

    fn type_name(&self, handle: HostTypeId) -> Option<String> {
        (handle == POINT).then(|| "Point".to_string())
    }

    fn members(&self, handle: HostTypeId) -> Vec<HostMember> {
        if handle != POINT {
            return Vec::new();
        }
        ["x", "y"]
            .iter()
            .map(|name| HostMember {
                name: name.to_string(),
                ty: NUMBER,
                optional: false,
                modifiers: Modifiers::empty(),
                has_declaration: true,
            })
            .collect()
    }

    fn declaration_position(&self, handle: HostTypeId) -> Option<SourcePosition> {
        (handle == POINT).then(|| SourcePosition::new("point.ts", 0, 10))
    }

    fn documentation(&self, handle: HostTypeId) -> Option<String> {
        (handle == POINT).then(|| "A 2D point.".to_string())
    }

    fn source_text(&self, file_name: &str) -> Option<String> {
        (file_name == "point.ts").then(|| POINT_TS.to_string())
    }
}

/// Declares named object-likes as records, mapping each declaration back to
/// its original position.
struct MappedBackend;

impl Backend for MappedBackend {
    fn compile_type(
        &self,
        cx: &mut Compiler,
        args: CompileArgs<'_>,
    ) -> Result<OutputNode, CompileError> {
        let t = cx.graph().get(args.ty);
        match &t.kind {
            TypeKind::Number => Ok(OutputNode::text("number")),
            TypeKind::Interface(_) => {
                let location = cx.assign_declaration_location(args.ty, None, None);
                let mut node = OutputNode::declaration(location.clone());
                if let Some(position) = t.declared_at.clone() {
                    node = node.with_source(position);
                }
                node.push_text(format!("record {} {{\n", location.name));
                for edge in named_member_edges(cx.graph(), args.ty) {
                    let name = match &edge.step {
                        typemill::model::Step::NamedMember { member, .. } => member.name.clone(),
                        _ => unreachable!(),
                    };
                    node.push_text(format!("  {}: ", name));
                    node.push_child(cx.compile_edge(args.path, &edge)?);
                    node.push_text(";\n");
                }
                node.push_text("}");
                Ok(node)
            }
            _ => Err(CompileError::no_backend_for_kind(t.kind_name().to_string())),
        }
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

fn run_pipeline(options: AdaptOptions) {
    let adapter = Adapter::new(Rc::new(PointSource), options);
    let point = adapter.adapt(POINT);

    let mut compiler = Compiler::new(adapter.graph(), Rc::new(MappedBackend))
        .with_source_texts(Rc::clone(&adapter) as Rc<dyn typemill::SourceTextProvider>);
    let output = compiler
        .compile_program(&[EntryPoint::new(point, Location::new("point.out"))])
        .expect("compilation");

    let file = output.file("point.out").expect("point.out emitted");
    assert_eq!(file.text, "record Point {\n  x: number;\n  y: number;\n}");

    // the original file is registered once, with its content embedded
    assert_eq!(file.source_map.sources, vec!["point.ts".to_string()]);
    assert_eq!(
        file.source_map.sources_content,
        vec![Some(POINT_TS.to_string())]
    );
    assert_eq!(file.compiled_from, vec!["point.ts".to_string()]);
    assert!(!file.source_map.mappings.is_empty());
}

#[test]
fn test_eager_pipeline_with_source_maps() {
    run_pipeline(AdaptOptions::default());
}

#[test]
fn test_lazy_pipeline_matches_eager() {
    run_pipeline(AdaptOptions {
        eager: false,
        ..AdaptOptions::default()
    });
}

#[test]
fn test_documentation_reaches_the_model() {
    let adapter = Adapter::new(Rc::new(PointSource), AdaptOptions::default());
    let point = adapter.adapt(POINT);
    let graph = adapter.graph();
    assert_eq!(
        graph.get(point).documentation.as_deref(),
        Some("A 2D point.")
    );
    assert_eq!(graph.get(point).host, Some(POINT));
}
