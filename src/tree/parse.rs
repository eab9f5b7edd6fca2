// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::HashMap;

use super::{Attribute, Document, Name, NodeData, NodeId, NodeKind, XML_NAMESPACE_NS};
use crate::{Error, Options};

impl Document {
    /// Parses a [`Document`] from a string.
    ///
    /// A DOCTYPE is allowed only without an internal subset,
    /// so entity declarations, and therefore entity expansion and external entities,
    /// cannot be used by an input. The external DTD itself is never loaded.
    pub fn parse_str(text: &str, opt: &Options) -> Result<Document, Error> {
        let xml_opt = roxmltree::ParsingOptions {
            allow_dtd: false,
            ..roxmltree::ParsingOptions::default()
        };

        let xml = match roxmltree::Document::parse_with_options(text, xml_opt) {
            Ok(v) => v,
            Err(roxmltree::Error::DtdDetected) if !has_internal_subset(text) => {
                // Like `<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "...">`,
                // which is present in many exported files. There is nothing to expand.
                let xml_opt = roxmltree::ParsingOptions {
                    allow_dtd: true,
                    ..roxmltree::ParsingOptions::default()
                };
                roxmltree::Document::parse_with_options(text, xml_opt)?
            }
            Err(e) => return Err(e.into()),
        };

        parse(&xml, opt)
    }

    /// Parses a [`Document`] from a [`roxmltree::Document`].
    ///
    /// The caller is responsible for the `roxmltree` parsing options.
    pub fn parse_tree(xml: &roxmltree::Document, opt: &Options) -> Result<Document, Error> {
        parse(xml, opt)
    }
}

/// Checks that the DOCTYPE declaration has an internal subset, i.e. `[...]`.
///
/// Returns `true` when the declaration cannot be found or is unterminated.
fn has_internal_subset(text: &str) -> bool {
    let start = match text.find("<!DOCTYPE") {
        Some(v) => v + "<!DOCTYPE".len(),
        None => return true,
    };

    let mut quote = None;
    for c in text[start..].chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '[' => return true,
                '>' => return false,
                _ => {}
            },
        }
    }

    true
}

fn parse(xml: &roxmltree::Document, opt: &Options) -> Result<Document, Error> {
    let root = xml.root_element();

    // Check that the root element is `svg`. The namespace doesn't matter.
    if root.tag_name().name() != "svg" {
        return Err(Error::InvalidRoot);
    }

    let mut doc = Document { nodes: Vec::new() };

    // Add a root node.
    doc.nodes.push(NodeData {
        parent: None,
        prev_sibling: None,
        next_sibling: None,
        children: None,
        kind: NodeKind::Root,
    });

    // `descendants()` is in document order, so a parent element
    // is always mapped before its children.
    let mut parents: HashMap<roxmltree::NodeId, NodeId> = HashMap::new();

    for node in root.descendants() {
        let parent_id = match node.parent() {
            Some(parent) if node != root => match parents.get(&parent.id()) {
                Some(id) => *id,
                None => continue,
            },
            _ => NodeId::new(0),
        };

        match node.node_type() {
            roxmltree::NodeType::Element => {
                let kind = NodeKind::Element {
                    name: parse_tag_name(node),
                    attributes: parse_attributes(node),
                };
                let id = doc.append(parent_id, kind);
                parents.insert(node.id(), id);
            }
            roxmltree::NodeType::Text => {
                let text = node.text().unwrap_or_default();
                // Whitespace-only nodes are insignificant.
                // The writer will produce its own indentation.
                if !is_whitespace(text) {
                    doc.append(parent_id, NodeKind::Text(text.to_string()));
                }
            }
            roxmltree::NodeType::Comment => {
                if !opt.remove_comments {
                    let text = node.text().unwrap_or_default();
                    doc.append(parent_id, NodeKind::Comment(text.to_string()));
                }
            }
            roxmltree::NodeType::PI | roxmltree::NodeType::Root => {}
        }
    }

    Ok(doc)
}

fn is_whitespace(text: &str) -> bool {
    text.bytes().all(|c| matches!(c, b' ' | b'\t' | b'\n' | b'\r'))
}

fn parse_tag_name(node: roxmltree::Node) -> Name {
    let tag_name = node.tag_name();
    let namespace = tag_name.namespace();

    // An element from the default namespace stays unprefixed,
    // even when the same namespace is bound to a prefix as well.
    let prefix = match namespace {
        Some(uri) if !is_default_namespace(node, uri) => lookup_prefix(node, uri),
        _ => None,
    };

    Name {
        prefix,
        local: tag_name.name().to_string(),
        namespace: namespace.map(str::to_string),
    }
}

fn parse_attributes(node: roxmltree::Node) -> Vec<Attribute> {
    let parent_namespaces: Vec<(Option<&str>, &str)> = match node.parent_element() {
        Some(parent) => parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect(),
        None => Vec::new(),
    };

    let mut attributes = Vec::new();

    // `roxmltree` doesn't store namespace declarations as attributes,
    // so we have to restore them from the difference with the parent scope.
    for ns in node.namespaces() {
        if ns.name() == Some("xml") {
            continue;
        }

        if parent_namespaces.contains(&(ns.name(), ns.uri())) {
            continue;
        }

        let name = match ns.name() {
            Some(prefix) => Name {
                prefix: Some("xmlns".to_string()),
                local: prefix.to_string(),
                namespace: None,
            },
            None => Name::new("xmlns"),
        };

        attributes.push(Attribute {
            name,
            value: ns.uri().to_string(),
        });
    }

    for attr in node.attributes() {
        let prefix = attr.namespace().and_then(|uri| lookup_prefix(node, uri));
        attributes.push(Attribute {
            name: Name {
                prefix,
                local: attr.name().to_string(),
                namespace: attr.namespace().map(str::to_string),
            },
            value: attr.value().to_string(),
        });
    }

    attributes
}

fn is_default_namespace(node: roxmltree::Node, uri: &str) -> bool {
    node.namespaces()
        .any(|ns| ns.name().is_none() && ns.uri() == uri)
}

fn lookup_prefix(node: roxmltree::Node, uri: &str) -> Option<String> {
    if uri == XML_NAMESPACE_NS {
        return Some("xml".to_string());
    }

    // The same namespace can be bound to multiple prefixes.
    // Pick the smallest one, so the result doesn't depend on the declarations order.
    node.namespaces()
        .filter(|ns| ns.uri() == uri)
        .filter_map(|ns| ns.name())
        .min()
        .map(str::to_string)
}
