//! DOT format utilities for graph visualization.
//!
//! This module provides a small writer for DOT format output, which can be rendered
//! using Graphviz tools.

use std::fmt::Write;

/// Escapes a string for safe use in DOT format labels and identifiers.
///
/// This function handles all characters that have special meaning in DOT format,
/// including quotes, backslashes, newlines, and angle brackets.
#[must_use]
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
        .replace('<', "\\<")
        .replace('>', "\\>")
}

/// Incremental writer for a `digraph`.
///
/// Attribute strings are inserted verbatim after the label, so they must already be
/// valid DOT (for example `style=dashed`).
pub(crate) struct DotWriter {
    out: String,
}

impl DotWriter {
    /// Starts a new digraph with an optional title.
    pub(crate) fn new(name: &str, title: Option<&str>) -> Self {
        let mut out = String::new();
        let _ = writeln!(out, "digraph {name} {{");
        if let Some(title) = title {
            let _ = writeln!(out, "    label=\"{}\";", escape_dot(title));
        }
        out.push_str("    labelloc=t;\n");
        out.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n");
        out.push_str("    edge [fontname=\"Courier\", fontsize=9];\n\n");
        Self { out }
    }

    pub(crate) fn node(&mut self, id: &str, label: &str, attrs: &str) {
        let _ = write!(self.out, "    {id} [label=\"{}\"", escape_dot(label));
        if !attrs.is_empty() {
            let _ = write!(self.out, ", {attrs}");
        }
        self.out.push_str("];\n");
    }

    pub(crate) fn edge(&mut self, from: &str, to: &str, attrs: &str) {
        let _ = write!(self.out, "    {from} -> {to}");
        if !attrs.is_empty() {
            let _ = write!(self.out, " [{attrs}]");
        }
        self.out.push_str(";\n");
    }

    pub(crate) fn blank_line(&mut self) {
        self.out.push('\n');
    }

    pub(crate) fn finish(mut self) -> String {
        self.out.push_str("}\n");
        self.out
    }
}
