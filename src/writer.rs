// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt::Write;

use crate::tree::{Attribute, Document, Edge, Name, Node};
use crate::Options;

const INDENT: &str = "  ";

impl Document {
    /// Writes the `Document` back to SVG.
    pub fn to_string(&self, opt: &Options) -> String {
        write(self, opt)
    }
}

/// Writes the `Document` back to SVG.
///
/// Only the root element subtree is written. There is no XML declaration
/// and no trailing new line.
pub fn write(doc: &Document, opt: &Options) -> String {
    let mut xml = XmlWriter::new(opt.indent_output);

    for edge in doc.root_element().traverse() {
        match edge {
            Edge::Open(node) => {
                if node.is_element() {
                    xml.start_element(node);
                } else if node.is_text() {
                    xml.write_text(node.text());
                } else if node.is_comment() {
                    xml.write_comment(node.text());
                }
            }
            Edge::Close(node) => {
                if node.is_element() {
                    xml.end_element(node);
                }
            }
        }
    }

    xml.buf
}

struct Depth {
    /// Mixed content is written as is, without any indentation.
    inline: bool,
    /// Prefix bindings length before this element.
    scope_len: usize,
}

struct XmlWriter {
    buf: String,
    indent: bool,
    depth_stack: Vec<Depth>,
    /// Prefix bindings that are declared in the output so far.
    scope: Vec<(String, String)>,
}

impl XmlWriter {
    fn new(indent: bool) -> Self {
        XmlWriter {
            buf: String::new(),
            indent,
            depth_stack: Vec::new(),
            scope: Vec::new(),
        }
    }

    #[inline]
    fn is_inline(&self) -> bool {
        self.depth_stack.last().map(|d| d.inline).unwrap_or(false)
    }

    /// Starts a new line for a node inside the current element.
    fn write_node_indent(&mut self) {
        if !self.indent || self.is_inline() || self.depth_stack.is_empty() {
            return;
        }

        self.write_new_line();
    }

    fn write_new_line(&mut self) {
        self.buf.push('\n');
        for _ in 0..self.depth_stack.len() {
            self.buf.push_str(INDENT);
        }
    }

    fn start_element(&mut self, node: Node) {
        let name = match node.tag_name() {
            Some(v) => v,
            None => return,
        };

        self.write_node_indent();

        let scope_len = self.scope.len();
        let attributes = node.attributes();

        // Own declarations go first, because prefixes below can depend on them.
        for attr in attributes.iter().filter(|a| a.is_prefix_declaration()) {
            self.scope.push((attr.name.local.clone(), attr.value.clone()));
        }

        // Declarations that were removed, but are still in use.
        let mut missing = Vec::new();
        for used in std::iter::once(name).chain(attributes.iter().map(|a| &a.name)) {
            if let Some(binding) = self.resolve_missing_prefix(used) {
                self.scope.push(binding.clone());
                missing.push(binding);
            }
        }

        self.buf.push('<');
        write_name(name, &mut self.buf);

        for attr in attributes {
            self.write_attribute(attr);
        }

        for (prefix, uri) in &missing {
            log::debug!("Redeclaring the '{}' prefix on the '{}' element.", prefix, name);
            let _ = write!(self.buf, " xmlns:{}=\"", prefix);
            escape_attribute_value(uri, &mut self.buf);
            self.buf.push('"');
        }

        if node.has_children() {
            self.buf.push('>');
            let inline = self.is_inline() || node.children().any(|n| n.is_text());
            self.depth_stack.push(Depth { inline, scope_len });
        } else {
            self.buf.push_str(" />");
            self.scope.truncate(scope_len);
        }
    }

    fn end_element(&mut self, node: Node) {
        if !node.has_children() {
            return;
        }

        let depth = match self.depth_stack.pop() {
            Some(v) => v,
            None => return,
        };

        if self.indent && !depth.inline {
            self.write_new_line();
        }

        self.buf.push_str("</");
        if let Some(name) = node.tag_name() {
            write_name(name, &mut self.buf);
        }
        self.buf.push('>');

        self.scope.truncate(depth.scope_len);
    }

    fn write_attribute(&mut self, attr: &Attribute) {
        self.buf.push(' ');
        write_name(&attr.name, &mut self.buf);
        self.buf.push_str("=\"");
        escape_attribute_value(&attr.value, &mut self.buf);
        self.buf.push('"');
    }

    fn write_text(&mut self, text: &str) {
        escape_text(text, &mut self.buf);
    }

    fn write_comment(&mut self, text: &str) {
        self.write_node_indent();
        self.buf.push_str("<!--");
        self.buf.push_str(text);
        self.buf.push_str("-->");
    }

    /// Returns a binding that must be declared for the name to be valid,
    /// unless it's already present in the output.
    fn resolve_missing_prefix(&self, name: &Name) -> Option<(String, String)> {
        let prefix = name.prefix.as_deref()?;
        if prefix == "xml" || prefix == "xmlns" {
            return None;
        }

        let uri = name.namespace.as_deref()?;
        let bound = self
            .scope
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, u)| u.as_str());

        if bound == Some(uri) {
            None
        } else {
            Some((prefix.to_string(), uri.to_string()))
        }
    }
}

fn write_name(name: &Name, buf: &mut String) {
    if let Some(ref prefix) = name.prefix {
        buf.push_str(prefix);
        buf.push(':');
    }

    buf.push_str(&name.local);
}

fn escape_attribute_value(value: &str, buf: &mut String) {
    for c in value.chars() {
        match c {
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '"' => buf.push_str("&quot;"),
            // Otherwise, they will be normalized into spaces on the next parse.
            '\t' => buf.push_str("&#9;"),
            '\n' => buf.push_str("&#10;"),
            '\r' => buf.push_str("&#13;"),
            _ => buf.push(c),
        }
    }
}

fn escape_text(text: &str, buf: &mut String) {
    for c in text.chars() {
        match c {
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '\r' => buf.push_str("&#13;"),
            _ => buf.push(c),
        }
    }
}
