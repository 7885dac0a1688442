//! Serialization and source maps.
//!
//! Serializing an output node concatenates its segments in tree order while
//! threading each node's recorded source position into a standard
//! source-map v3 document. Each original file is registered as a source
//! once; its text content is embedded when the provider has it (stdlib-ish
//! files typically have none).

use std::collections::HashMap;

use serde::Serialize;

use crate::output::{OutputNode, Segment};

/// Hands out the full text of original source files for embedding.
pub trait SourceTextProvider {
    fn source_text(&self, file_name: &str) -> Option<String>;
}

/// A source-map v3 document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub sources: Vec<String>,
    pub sources_content: Vec<Option<String>>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Serialize a node tree to text plus its source map.
pub fn serialize_node(
    node: &OutputNode,
    file_name: &str,
    provider: Option<&dyn SourceTextProvider>,
) -> (String, SourceMap) {
    let mut emitter = Emitter {
        text: String::new(),
        line: 0,
        column: 0,
        sources: Vec::new(),
        contents: Vec::new(),
        source_index: HashMap::new(),
        mappings: Vec::new(),
        provider,
    };
    emitter.emit(node);
    let mappings = encode_mappings(&emitter.mappings, emitter.line as usize);
    let map = SourceMap {
        version: 3,
        file: Some(file_name.to_string()),
        sources: emitter.sources,
        sources_content: emitter.contents,
        names: Vec::new(),
        mappings,
    };
    (emitter.text, map)
}

/// One raw mapping: generated column, source index, source line, source
/// column. Generated line is the outer vector index.
type RawMapping = [u32; 4];

struct Emitter<'p> {
    text: String,
    line: u32,
    column: u32,
    sources: Vec<String>,
    contents: Vec<Option<String>>,
    source_index: HashMap<String, usize>,
    mappings: Vec<Vec<RawMapping>>,
    provider: Option<&'p dyn SourceTextProvider>,
}

impl Emitter<'_> {
    fn emit(&mut self, node: &OutputNode) {
        if let Some(position) = node.source() {
            let source = self.register_source(&position.file_name);
            let line = self.line as usize;
            if self.mappings.len() <= line {
                self.mappings.resize(line + 1, Vec::new());
            }
            self.mappings[line].push([
                self.column,
                source as u32,
                position.line,
                position.column,
            ]);
        }
        for segment in node.segments() {
            match segment {
                Segment::Text(text) => self.push_text(text),
                Segment::Node(child) => self.emit(child),
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.text.push(ch);
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
    }

    fn register_source(&mut self, file_name: &str) -> usize {
        if let Some(&index) = self.source_index.get(file_name) {
            return index;
        }
        let index = self.sources.len();
        self.sources.push(file_name.to_string());
        self.contents
            .push(self.provider.and_then(|p| p.source_text(file_name)));
        self.source_index.insert(file_name.to_string(), index);
        index
    }
}

fn encode_mappings(lines: &[Vec<RawMapping>], line_count: usize) -> String {
    let mut out = String::new();
    let mut prev_source: i64 = 0;
    let mut prev_src_line: i64 = 0;
    let mut prev_src_column: i64 = 0;
    let total = lines.len().max(line_count.saturating_add(1)).max(1);
    for line in 0..total {
        if line > 0 {
            out.push(';');
        }
        let mut prev_column: i64 = 0;
        if let Some(segments) = lines.get(line) {
            for (i, segment) in segments.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let [column, source, src_line, src_column] = *segment;
                encode_vlq(column as i64 - prev_column, &mut out);
                encode_vlq(source as i64 - prev_source, &mut out);
                encode_vlq(src_line as i64 - prev_src_line, &mut out);
                encode_vlq(src_column as i64 - prev_src_column, &mut out);
                prev_column = column as i64;
                prev_source = source as i64;
                prev_src_line = src_line as i64;
                prev_src_column = src_column as i64;
            }
        }
    }
    out
}

const BASE64_CHARS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Base64-VLQ: sign bit in the lowest bit, then 5-bit digits, continuation
/// bit in the sixth.
fn encode_vlq(value: i64, out: &mut String) {
    let mut vlq: u64 = if value < 0 {
        (((-value) as u64) << 1) | 1
    } else {
        (value as u64) << 1
    };
    loop {
        let mut digit = (vlq & 0b11111) as usize;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b100000;
        }
        out.push(BASE64_CHARS[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}
