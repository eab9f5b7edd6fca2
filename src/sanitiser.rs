// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::allowlist::{is_allowed_attribute, is_allowed_tag, is_style};
use crate::tree::{Attribute, Document, Node, NodeId, SVG_NS};
use crate::Options;

impl Document {
    /// Removes all elements and attributes that are not allowed.
    ///
    /// See [`sanitise`] for details.
    #[inline]
    pub fn sanitise(&mut self, opt: &Options) {
        sanitise(self, opt)
    }
}

/// Removes all elements and attributes that are not allowed.
///
/// Elements are visited in the document order, starting from the root one.
/// Disallowed children are removed together with their subtrees,
/// so they are never visited.
///
/// After that, namespace declarations on the root element are cleaned up
/// and the SVG namespace is added when requested.
pub fn sanitise(doc: &mut Document, opt: &Options) {
    let root_id = doc.root_element().id();

    let mut stack = vec![root_id];
    while let Some(id) = stack.pop() {
        sanitise_element(doc, id, root_id, opt);

        // Reversed, so the first child will be processed first.
        let children: Vec<NodeId> = doc
            .get(id)
            .children()
            .filter(|n| n.is_element())
            .map(|n| n.id())
            .collect();
        stack.extend(children.into_iter().rev());
    }

    sanitise_root_namespaces(doc, root_id);

    if opt.add_namespace
        && !doc
            .root_element()
            .attributes()
            .iter()
            .any(Attribute::is_default_namespace_declaration)
    {
        log::debug!("Adding the SVG namespace to the root element.");
        doc.prepend_attribute(root_id, Attribute::svg_namespace());
    }

    unprefix_svg_elements(doc, root_id);
}

fn sanitise_element(doc: &mut Document, id: NodeId, root_id: NodeId, opt: &Options) {
    let node = doc.get(id);

    let mut attributes = Vec::new();
    for (idx, attr) in node.attributes().iter().enumerate() {
        if attr.is_namespace_declaration() {
            // Root namespaces have their own rules.
            if id == root_id {
                continue;
            }

            // The writer will redeclare prefixes that are still in use.
            log::debug!(
                "Removing the '{}' namespace declaration from the '{}' element.",
                attr.name,
                node_name(node)
            );
            attributes.push(idx);
            continue;
        }

        if !is_attribute_allowed(&attr.name.local, opt) {
            log::debug!(
                "Removing the '{}' attribute from the '{}' element.",
                attr.name,
                node_name(node)
            );
            attributes.push(idx);
        }
    }

    let mut children = Vec::new();
    for child in node.children() {
        if let Some(name) = child.tag_name() {
            if !is_element_allowed(&name.local, opt) {
                log::debug!("Removing the '{}' element.", name);
                children.push(child.id());
            }
        }
    }

    doc.remove_attributes(id, &attributes);
    for child_id in children {
        doc.detach(child_id);
    }
}

fn sanitise_root_namespaces(doc: &mut Document, root_id: NodeId) {
    let root = doc.get(root_id);

    let mut attributes = Vec::new();
    for (idx, attr) in root.attributes().iter().enumerate() {
        if !attr.is_namespace_declaration() {
            continue;
        }

        // The SVG namespace is the only one we keep as is.
        if attr.is_default_namespace_declaration() && attr.value == SVG_NS {
            continue;
        }

        if (attr.is_prefix_declaration() && attr.value != SVG_NS)
            || !is_allowed_attribute(&attr.name.local)
        {
            log::debug!(
                "Removing the '{}=\"{}\"' namespace declaration.",
                attr.name,
                attr.value
            );
            attributes.push(idx);
        }
    }

    doc.remove_attributes(root_id, &attributes);
}

/// SVG elements are written unprefixed when the SVG namespace is the default one,
/// the same way the parser reads them.
fn unprefix_svg_elements(doc: &mut Document, root_id: NodeId) {
    let root = doc.get(root_id);
    let is_svg_default = root
        .attributes()
        .iter()
        .any(|a| a.is_default_namespace_declaration() && a.value == SVG_NS);
    if !is_svg_default {
        return;
    }

    let ids: Vec<NodeId> = root
        .descendants()
        .filter(|n| {
            n.tag_name()
                .map(|name| name.prefix.is_some() && name.namespace.as_deref() == Some(SVG_NS))
                .unwrap_or(false)
        })
        .map(|n| n.id())
        .collect();

    for id in ids {
        doc.unprefix_element(id);
    }
}

fn is_attribute_allowed(local: &str, opt: &Options) -> bool {
    is_allowed_attribute(local) && (opt.allow_style || !is_style(local))
}

fn is_element_allowed(local: &str, opt: &Options) -> bool {
    is_allowed_tag(local) && (opt.allow_style || !is_style(local))
}

fn node_name(node: Node) -> String {
    node.tag_name().map(|n| n.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitised(text: &str, opt: &Options) -> Document {
        let mut doc = Document::parse_str(text, opt).unwrap();
        doc.sanitise(opt);
        doc
    }

    fn attribute_names(node: Node) -> Vec<String> {
        node.attributes().iter().map(|a| a.name.to_string()).collect()
    }

    fn element_names(doc: &Document) -> Vec<String> {
        doc.descendants()
            .filter_map(|n| n.tag_name().map(|name| name.to_string()))
            .collect()
    }

    #[test]
    fn remove_disallowed_attributes() {
        let doc = sanitised(
            "<svg><path d='M0 0' onmouseover='alert(1)' fill='red'/></svg>",
            &Options::default(),
        );
        let path = doc.root_element().first_child().unwrap();
        assert_eq!(attribute_names(path), vec!["d", "fill"]);
    }

    #[test]
    fn remove_nested_elements() {
        let doc = sanitised(
            "<svg><g><g><g><script>alert(1)</script><rect/></g></g></g></svg>",
            &Options::default(),
        );
        assert_eq!(element_names(&doc), vec!["svg", "g", "g", "g", "rect"]);
    }

    #[test]
    fn remove_subtree() {
        let doc = sanitised(
            "<svg><foreignObject><g><path/></g></foreignObject><circle/></svg>",
            &Options::default(),
        );
        assert_eq!(element_names(&doc), vec!["svg", "circle"]);
    }

    #[test]
    fn text_nodes_are_untouched() {
        let doc = sanitised(
            "<svg><text>Hello<a>link</a> world</text></svg>",
            &Options::default(),
        );
        let text = doc.root_element().first_child().unwrap();
        let texts: Vec<_> = text.children().map(|n| n.text()).collect();
        assert_eq!(texts, vec!["Hello", " world"]);
    }

    #[test]
    fn prefixed_attributes_use_local_name() {
        let doc = sanitised(
            "<svg xmlns:xlink='http://www.w3.org/1999/xlink' xmlns:a='urn:a'>\
             <path xlink:href='#x' a:fill='red'/></svg>",
            &Options::default(),
        );
        let path = doc.root_element().first_child().unwrap();
        assert_eq!(attribute_names(path), vec!["a:fill"]);
    }

    #[test]
    fn style_is_allowed_by_default() {
        let doc = sanitised(
            "<svg style='fill:red'><style>rect{}</style><rect style='opacity:0'/></svg>",
            &Options::default(),
        );
        assert_eq!(element_names(&doc), vec!["svg", "style", "rect"]);
        assert_eq!(doc.root_element().attribute("style"), Some("fill:red"));
    }

    #[test]
    fn style_is_removed_when_disallowed() {
        let opt = Options {
            allow_style: false,
            ..Options::default()
        };
        let doc = sanitised(
            "<svg style='fill:red'><style>rect{}</style>\
             <g><style/><rect style='opacity:0' width='1'/></g></svg>",
            &opt,
        );
        assert_eq!(element_names(&doc), vec!["svg", "g", "rect"]);
        assert!(!doc.descendants().any(|n| n.has_attribute("style")));
        assert!(doc.descendants().any(|n| n.has_attribute("width")));
    }

    #[test]
    fn keep_svg_namespace() {
        let opt = Options {
            add_namespace: false,
            ..Options::default()
        };
        let doc = sanitised("<svg xmlns='http://www.w3.org/2000/svg'/>", &opt);
        assert_eq!(attribute_names(doc.root_element()), vec!["xmlns"]);
    }

    #[test]
    fn do_not_add_namespace() {
        let opt = Options {
            add_namespace: false,
            ..Options::default()
        };
        let doc = sanitised("<svg width='1'/>", &opt);
        assert_eq!(attribute_names(doc.root_element()), vec!["width"]);
    }

    #[test]
    fn add_namespace_first() {
        let doc = sanitised("<svg width='1' height='2'/>", &Options::default());
        assert_eq!(
            attribute_names(doc.root_element()),
            vec!["xmlns", "width", "height"]
        );
    }

    #[test]
    fn replace_foreign_default_namespace() {
        let doc = sanitised("<svg xmlns='http://www.w3.org/1999/xhtml'/>", &Options::default());
        let root = doc.root_element();
        assert_eq!(attribute_names(root), vec!["xmlns"]);
        assert_eq!(root.attribute("xmlns"), Some(SVG_NS));
    }

    #[test]
    fn remove_root_prefix_declarations() {
        let doc = sanitised(
            "<svg xmlns='http://www.w3.org/2000/svg' \
             xmlns:xhtml='http://www.w3.org/1999/xhtml' \
             xmlns:xlink='http://www.w3.org/1999/xlink' \
             xmlns:s='http://www.w3.org/2000/svg'/>",
            &Options::default(),
        );
        assert_eq!(attribute_names(doc.root_element()), vec!["xmlns"]);
    }

    #[test]
    fn keep_allowlisted_svg_prefix_declaration() {
        // A weird, but harmless case: the prefix name is an allowed attribute name.
        let doc = sanitised(
            "<svg xmlns:fill='http://www.w3.org/2000/svg' xmlns:id='urn:x'/>",
            &Options::default(),
        );
        assert_eq!(
            attribute_names(doc.root_element()),
            vec!["xmlns", "xmlns:fill"]
        );
    }

    #[test]
    fn unprefix_svg_elements_with_added_namespace() {
        let doc = sanitised(
            "<s:svg xmlns:s='http://www.w3.org/2000/svg'><s:g><s:rect/></s:g></s:svg>",
            &Options::default(),
        );
        assert_eq!(element_names(&doc), vec!["svg", "g", "rect"]);
        assert_eq!(attribute_names(doc.root_element()), vec!["xmlns"]);
    }

    #[test]
    fn keep_svg_prefixes_without_namespace() {
        let opt = Options {
            add_namespace: false,
            ..Options::default()
        };
        let doc = sanitised(
            "<s:svg xmlns:s='http://www.w3.org/2000/svg'><s:rect/></s:svg>",
            &opt,
        );
        assert_eq!(element_names(&doc), vec!["s:svg", "s:rect"]);
    }

    #[test]
    fn remove_nested_allowlisted_prefix_declarations() {
        let doc = sanitised(
            "<svg><g xmlns:fill='urn:x' fill:fill='red'/></svg>",
            &Options::default(),
        );
        let g = doc.root_element().first_child().unwrap();
        assert_eq!(attribute_names(g), vec!["fill:fill"]);
    }

    #[test]
    fn remove_nested_namespace_declarations() {
        let doc = sanitised(
            "<svg xmlns='http://www.w3.org/2000/svg'>\
             <g xmlns='urn:x' xmlns:xlink='http://www.w3.org/1999/xlink'/></svg>",
            &Options::default(),
        );
        let g = doc.root_element().first_child().unwrap();
        assert!(g.attributes().is_empty());
    }
}
