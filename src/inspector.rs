//! Tools for inspecting the structure of brcode streams.
//! Useful for debugging scope layouts and verifying writer output.

use std::fmt;
use std::io::Read;

use serde::Serialize;

use crate::error::Result;
use crate::reader::{BrcodeReader, FieldDescriptor, HunkVisitor};

/// A structural report of a brcode stream.
#[derive(Debug, Serialize)]
pub struct StreamReport {
    /// Total number of hunks seen (scope markers included, sentinels not).
    pub hunk_count: usize,
    /// Deepest scope nesting observed; 0 for a flat stream.
    pub max_depth: usize,
    /// Whether every scope closed and the stream ended at a hunk boundary
    /// with all payloads intact.
    pub complete: bool,
    /// The top-level hunks, with scope contents nested beneath them.
    pub tree: Vec<HunkInfo>,
}

/// Metadata for a single hunk in the stream.
#[derive(Debug, Serialize)]
pub struct HunkInfo {
    /// Addressing mode: `"field"`, `"array"`, `"map"`, or `"scope"`.
    pub kind: String,
    /// Hunk name.
    pub name: String,
    /// Map key, for map hunks.
    pub sub_name: Option<String>,
    /// Element index, for array hunks.
    pub index: Option<u16>,
    /// Declared payload size in bytes (0 for scopes).
    pub payload_len: usize,
    /// Nested hunks, for scopes.
    pub children: Vec<HunkInfo>,
}

/// The brcode stream inspector.
///
/// Walks a stream with the ordinary visitor recursion and reconstructs the
/// scope tree. A FIELD hunk with payload length 0 is taken as a scope
/// opener, the format's convention; see
/// [`FieldDescriptor::is_scope_marker`].
#[derive(Debug)]
pub struct BrcodeInspector;

impl BrcodeInspector {
    /// Analyzes a stream and returns a structural report.
    ///
    /// Payload bytes are consumed but not retained. Truncation does not
    /// fail the inspection; it is recorded in
    /// [`complete`](StreamReport::complete) so a partial stream can still
    /// be diagnosed.
    pub fn inspect<R: Read>(source: R) -> Result<StreamReport> {
        let mut reader = BrcodeReader::new(source)?;
        let mut collector = NodeCollector::at_depth(0);
        let clean = reader.deserialize(&mut collector)?;

        Ok(StreamReport {
            hunk_count: collector.count,
            max_depth: collector.max_depth,
            complete: clean && collector.intact,
            tree: collector.nodes,
        })
    }
}

/// Visitor that rebuilds one scope level, recursing with a child collector
/// for each nested scope.
struct NodeCollector {
    depth: usize,
    nodes: Vec<HunkInfo>,
    count: usize,
    max_depth: usize,
    intact: bool,
}

impl NodeCollector {
    fn at_depth(depth: usize) -> Self {
        Self {
            depth,
            nodes: Vec::new(),
            count: 0,
            max_depth: depth,
            intact: true,
        }
    }
}

impl<R: Read> HunkVisitor<R> for NodeCollector {
    fn visit(&mut self, reader: &mut BrcodeReader<R>, field: &FieldDescriptor) -> Result<bool> {
        self.count += 1;

        if field.is_scope_marker() {
            let mut inner = NodeCollector::at_depth(self.depth + 1);
            let closed = reader.deserialize(&mut inner)?;
            self.count += inner.count;
            self.max_depth = self.max_depth.max(inner.max_depth);
            self.intact &= closed && inner.intact;
            self.nodes.push(HunkInfo {
                kind: "scope".to_string(),
                name: field.name.clone(),
                sub_name: None,
                index: None,
                payload_len: 0,
                children: inner.nodes,
            });
        } else {
            let mut payload: Vec<u8> = Vec::new();
            self.intact &= reader.read_data(&mut payload)?;
            let kind = match field.kind {
                crate::format::HunkKind::Field => "field",
                crate::format::HunkKind::Array => "array",
                crate::format::HunkKind::Map => "map",
            };
            self.nodes.push(HunkInfo {
                kind: kind.to_string(),
                name: field.name.clone(),
                sub_name: field.sub_name.clone(),
                index: field.index,
                payload_len: field.size,
                children: Vec::new(),
            });
        }
        Ok(true)
    }
}

impl fmt::Display for StreamReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== BRCODE STREAM REPORT ===")?;
        writeln!(f, "Hunks:    {}", self.hunk_count)?;
        writeln!(f, "Depth:    {}", self.max_depth)?;
        writeln!(f, "Complete: {}", self.complete)?;
        writeln!(f, "\n[STREAM LAYOUT]")?;
        for (i, node) in self.tree.iter().enumerate() {
            node.fmt_recursive(f, "", i == self.tree.len() - 1)?;
        }
        Ok(())
    }
}

impl HunkInfo {
    fn fmt_recursive(
        &self,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let connector = if is_last { "└── " } else { "├── " };
        let child_prefix = if is_last { "    " } else { "│   " };

        let address = match (&self.sub_name, self.index) {
            (Some(key), _) => format!(" [{key}]"),
            (None, Some(index)) => format!(" [{index}]"),
            (None, None) => String::new(),
        };
        writeln!(
            f,
            "{}{}({}) {}{} | {}b | {} children",
            prefix,
            connector,
            self.kind,
            self.name,
            address,
            self.payload_len,
            self.children.len()
        )?;

        for (i, child) in self.children.iter().enumerate() {
            let is_last_child = i == self.children.len() - 1;
            child.fmt_recursive(f, &format!("{prefix}{child_prefix}"), is_last_child)?;
        }
        Ok(())
    }
}
