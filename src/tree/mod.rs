// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt;

mod parse;

pub(crate) const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub(crate) const XML_NAMESPACE_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// An SVG tree container.
///
/// Contains only element, text and comment nodes of the root element subtree.
/// Unlike `roxmltree::Document`, it can be modified in place,
/// which is what the sanitiser does.
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> Node {
        self.get(NodeId::new(0))
    }

    /// Returns the root element.
    #[inline]
    pub fn root_element(&self) -> Node {
        // The root element is always the first node after the root one,
        // because the parser starts from it and it cannot be detached.
        self.get(NodeId::new(1))
    }

    /// Returns an iterator over document's descendant nodes.
    ///
    /// Shorthand for `doc.root().descendants()`.
    #[inline]
    pub fn descendants(&self) -> Descendants {
        self.root().descendants()
    }

    /// Returns a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> Node {
        Node {
            id,
            d: &self.nodes[id.get_usize()],
            doc: self,
        }
    }

    /// Removes attributes at the specified positions from an element.
    ///
    /// `indices` must be sorted in ascending order.
    /// Does nothing for non-element nodes.
    pub fn remove_attributes(&mut self, id: NodeId, indices: &[usize]) {
        if let NodeKind::Element { ref mut attributes, .. } = self.nodes[id.get_usize()].kind {
            // Back to front, so the remaining indices stay valid.
            for idx in indices.iter().rev() {
                if *idx < attributes.len() {
                    attributes.remove(*idx);
                }
            }
        }
    }

    /// Inserts an attribute as the first one of an element.
    ///
    /// Does nothing for non-element nodes.
    pub fn prepend_attribute(&mut self, id: NodeId, attribute: Attribute) {
        if let NodeKind::Element { ref mut attributes, .. } = self.nodes[id.get_usize()].kind {
            attributes.insert(0, attribute);
        }
    }

    /// Removes the prefix from an element name.
    ///
    /// Does nothing for non-element nodes.
    pub fn unprefix_element(&mut self, id: NodeId) {
        if let NodeKind::Element { ref mut name, .. } = self.nodes[id.get_usize()].kind {
            name.prefix = None;
        }
    }

    /// Detaches a node, together with its subtree, from its parent.
    ///
    /// The node data stays in the arena, but is no longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        // The root node and the root element are never detached.
        if id.get_usize() <= 1 {
            return;
        }

        let (parent, prev, next) = {
            let d = &self.nodes[id.get_usize()];
            (d.parent, d.prev_sibling, d.next_sibling)
        };

        let parent = match parent {
            Some(v) => v,
            None => return,
        };

        if let Some(prev) = prev {
            self.nodes[prev.get_usize()].next_sibling = next;
        }

        if let Some(next) = next {
            self.nodes[next.get_usize()].prev_sibling = prev;
        }

        let parent_data = &mut self.nodes[parent.get_usize()];
        parent_data.children = match (prev, next) {
            (None, None) => None,
            (None, Some(next)) => parent_data.children.map(|(_, last)| (next, last)),
            (Some(prev), None) => parent_data.children.map(|(first, _)| (first, prev)),
            (Some(_), Some(_)) => parent_data.children,
        };

        let d = &mut self.nodes[id.get_usize()];
        d.parent = None;
        d.prev_sibling = None;
        d.next_sibling = None;
    }

    pub(crate) fn append(&mut self, parent_id: NodeId, kind: NodeKind) -> NodeId {
        let new_child_id = NodeId::from(self.nodes.len());
        let last_child_id = self.nodes[parent_id.get_usize()].children.map(|(_, id)| id);

        self.nodes.push(NodeData {
            parent: Some(parent_id),
            prev_sibling: last_child_id,
            next_sibling: None,
            children: None,
            kind,
        });

        if let Some(id) = last_child_id {
            self.nodes[id.get_usize()].next_sibling = Some(new_child_id);
        }

        self.nodes[parent_id.get_usize()].children = Some(
            if let Some((first_child_id, _)) = self.nodes[parent_id.get_usize()].children {
                (first_child_id, new_child_id)
            } else {
                (new_child_id, new_child_id)
            },
        );

        new_child_id
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        if !self.root().has_children() {
            return write!(f, "Document []");
        }

        macro_rules! writeln_indented {
            ($depth:expr, $f:expr, $fmt:expr) => {
                for _ in 0..$depth { write!($f, "    ")?; }
                writeln!($f, $fmt)?;
            };
            ($depth:expr, $f:expr, $fmt:expr, $($arg:tt)*) => {
                for _ in 0..$depth { write!($f, "    ")?; }
                writeln!($f, $fmt, $($arg)*)?;
            };
        }

        fn print_children(
            parent: Node,
            depth: usize,
            f: &mut fmt::Formatter,
        ) -> Result<(), fmt::Error> {
            for child in parent.children() {
                if child.is_element() {
                    writeln_indented!(depth, f, "Element {{");
                    if let Some(name) = child.tag_name() {
                        writeln_indented!(depth, f, "    tag_name: {}", name);
                    }

                    if !child.attributes().is_empty() {
                        writeln_indented!(depth + 1, f, "attributes: [");
                        for attr in child.attributes() {
                            writeln_indented!(depth + 2, f, "{:?}", attr);
                        }
                        writeln_indented!(depth + 1, f, "]");
                    }

                    if child.has_children() {
                        writeln_indented!(depth, f, "    children: [");
                        print_children(child, depth + 2, f)?;
                        writeln_indented!(depth, f, "    ]");
                    }

                    writeln_indented!(depth, f, "}}");
                } else {
                    writeln_indented!(depth, f, "{:?}", child);
                }
            }

            Ok(())
        }

        writeln!(f, "Document [")?;
        print_children(self.root(), 1, f)?;
        writeln!(f, "]")?;

        Ok(())
    }
}

/// A node ID inside a [`Document`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn new(id: u32) -> Self {
        NodeId(id)
    }

    #[inline]
    fn get_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(id: usize) -> Self {
        // `roxmltree` already limits the amount of nodes by u32::MAX.
        debug_assert!(id <= u32::MAX as usize);
        NodeId::new(id as u32)
    }
}

pub(crate) enum NodeKind {
    Root,
    Element {
        name: Name,
        attributes: Vec<Attribute>,
    },
    Text(String),
    Comment(String),
}

struct NodeData {
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    children: Option<(NodeId, NodeId)>,
    kind: NodeKind,
}

/// A qualified XML name.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Name {
    /// Name's prefix, as it will be written.
    ///
    /// `None` for unprefixed names.
    pub prefix: Option<String>,
    /// Local name. All allowlist checks are done against it.
    pub local: String,
    /// Resolved namespace URI.
    pub namespace: Option<String>,
}

impl Name {
    /// Creates a new name without a prefix and a namespace.
    pub fn new(local: impl Into<String>) -> Self {
        Name {
            prefix: None,
            local: local.into(),
            namespace: None,
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.prefix {
            Some(ref prefix) => write!(f, "{}:{}", prefix, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// An attribute.
///
/// Namespace declarations are stored as attributes too:
/// `xmlns` has no prefix and a local name `xmlns`,
/// while `xmlns:xlink` has an `xmlns` prefix and a local name `xlink`.
#[derive(Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute's name.
    pub name: Name,
    /// Attribute's value.
    pub value: String,
}

impl Attribute {
    /// Creates the `xmlns="http://www.w3.org/2000/svg"` declaration.
    pub fn svg_namespace() -> Self {
        Attribute {
            name: Name::new("xmlns"),
            value: SVG_NS.to_string(),
        }
    }

    /// Checks that the attribute is an `xmlns` or `xmlns:*` declaration.
    #[inline]
    pub fn is_namespace_declaration(&self) -> bool {
        self.is_default_namespace_declaration() || self.is_prefix_declaration()
    }

    /// Checks that the attribute is an `xmlns` declaration.
    #[inline]
    pub fn is_default_namespace_declaration(&self) -> bool {
        self.name.prefix.is_none() && self.name.local == "xmlns"
    }

    /// Checks that the attribute is an `xmlns:*` declaration.
    #[inline]
    pub fn is_prefix_declaration(&self) -> bool {
        self.name.prefix.as_deref() == Some("xmlns")
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "Attribute {{ name: {}, value: {} }}",
            self.name, self.value
        )
    }
}

/// An SVG node.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    id: NodeId,
    doc: &'a Document,
    d: &'a NodeData,
}

impl Eq for Node<'_> {}

impl PartialEq for Node<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.doc, other.doc) && std::ptr::eq(self.d, other.d)
    }
}

impl<'a> Node<'a> {
    /// Returns node's ID.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Checks if the current node is an element.
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.d.kind, NodeKind::Element { .. })
    }

    /// Checks if the current node is a text.
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.d.kind, NodeKind::Text(_))
    }

    /// Checks if the current node is a comment.
    #[inline]
    pub fn is_comment(&self) -> bool {
        matches!(self.d.kind, NodeKind::Comment(_))
    }

    /// Returns node's document.
    #[inline]
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Returns element's tag name, unless the current node is not an element.
    #[inline]
    pub fn tag_name(&self) -> Option<&'a Name> {
        match self.d.kind {
            NodeKind::Element { ref name, .. } => Some(name),
            _ => None,
        }
    }

    /// Checks that the current node is an element with the specified local name.
    #[inline]
    pub fn has_local_name(&self, local: &str) -> bool {
        self.tag_name().map(|n| n.local == local).unwrap_or(false)
    }

    /// Returns a list of all element's attributes.
    #[inline]
    pub fn attributes(&self) -> &'a [Attribute] {
        match self.d.kind {
            NodeKind::Element { ref attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Returns an unprefixed attribute value.
    #[inline]
    pub fn attribute(&self, local: &str) -> Option<&'a str> {
        self.attributes()
            .iter()
            .find(|a| a.name.prefix.is_none() && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// Checks if an unprefixed attribute is present.
    #[inline]
    pub fn has_attribute(&self, local: &str) -> bool {
        self.attribute(local).is_some()
    }

    /// Returns node's text data.
    ///
    /// For text and comment nodes returns its content.
    /// For elements returns the first child node text.
    #[inline]
    pub fn text(&self) -> &'a str {
        match self.d.kind {
            NodeKind::Element { .. } => match self.first_child() {
                Some(child) if child.is_text() => child.text(),
                _ => "",
            },
            NodeKind::Text(ref text) | NodeKind::Comment(ref text) => text,
            NodeKind::Root => "",
        }
    }

    /// Returns a parent node.
    #[inline]
    pub fn parent(&self) -> Option<Self> {
        self.d.parent.map(|id| self.doc.get(id))
    }

    /// Returns the parent element.
    #[inline]
    pub fn parent_element(&self) -> Option<Self> {
        self.ancestors().skip(1).find(|n| n.is_element())
    }

    /// Returns the previous sibling.
    #[inline]
    pub fn prev_sibling(&self) -> Option<Self> {
        self.d.prev_sibling.map(|id| self.doc.get(id))
    }

    /// Returns the next sibling.
    #[inline]
    pub fn next_sibling(&self) -> Option<Self> {
        self.d.next_sibling.map(|id| self.doc.get(id))
    }

    /// Returns the first child.
    #[inline]
    pub fn first_child(&self) -> Option<Self> {
        self.d.children.map(|(id, _)| self.doc.get(id))
    }

    /// Returns the first child element.
    #[inline]
    pub fn first_element_child(&self) -> Option<Self> {
        self.children().find(|n| n.is_element())
    }

    /// Returns the last child.
    #[inline]
    pub fn last_child(&self) -> Option<Self> {
        self.d.children.map(|(_, id)| self.doc.get(id))
    }

    /// Checks if the node has child nodes.
    #[inline]
    pub fn has_children(&self) -> bool {
        self.d.children.is_some()
    }

    /// Returns an iterator over ancestor nodes starting at this node.
    #[inline]
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors(Some(*self))
    }

    /// Returns an iterator over children nodes.
    #[inline]
    pub fn children(&self) -> Children<'a> {
        Children {
            front: self.first_child(),
            back: self.last_child(),
        }
    }

    /// Returns an iterator which traverses the subtree starting at this node.
    #[inline]
    pub(crate) fn traverse(&self) -> Traverse<'a> {
        Traverse {
            root: *self,
            edge: None,
        }
    }

    /// Returns an iterator over this node and its descendants.
    #[inline]
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants(self.traverse())
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self.d.kind {
            NodeKind::Root => write!(f, "Root"),
            NodeKind::Element { ref name, .. } => {
                write!(
                    f,
                    "Element {{ tag_name: {}, attributes: {:?} }}",
                    name,
                    self.attributes()
                )
            }
            NodeKind::Text(ref text) => write!(f, "Text({:?})", text),
            NodeKind::Comment(ref text) => write!(f, "Comment({:?})", text),
        }
    }
}

/// An iterator over ancestor nodes.
#[derive(Clone, Debug)]
pub struct Ancestors<'a>(Option<Node<'a>>);

impl<'a> Iterator for Ancestors<'a> {
    type Item = Node<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.0.take();
        self.0 = node.as_ref().and_then(Node::parent);
        node
    }
}

/// An iterator over children nodes.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    front: Option<Node<'a>>,
    back: Option<Node<'a>>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.front.take();
        if self.front == self.back {
            self.back = None;
        } else {
            self.front = node.as_ref().and_then(Node::next_sibling);
        }
        node
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) enum Edge<'a> {
    Open(Node<'a>),
    Close(Node<'a>),
}

#[derive(Clone, Debug)]
pub(crate) struct Traverse<'a> {
    root: Node<'a>,
    edge: Option<Edge<'a>>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = Edge<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.edge {
            Some(Edge::Open(node)) => {
                self.edge = Some(match node.first_child() {
                    Some(first_child) => Edge::Open(first_child),
                    None => Edge::Close(node),
                });
            }
            Some(Edge::Close(node)) => {
                if node == self.root {
                    self.edge = None;
                } else if let Some(next_sibling) = node.next_sibling() {
                    self.edge = Some(Edge::Open(next_sibling));
                } else {
                    self.edge = node.parent().map(Edge::Close);
                }
            }
            None => {
                self.edge = Some(Edge::Open(self.root));
            }
        }

        self.edge
    }
}

/// A descendants iterator.
#[derive(Clone, Debug)]
pub struct Descendants<'a>(Traverse<'a>);

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for edge in &mut self.0 {
            if let Edge::Open(node) = edge {
                return Some(node);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Options;

    fn parse(text: &str) -> Document {
        Document::parse_str(text, &Options::default()).unwrap()
    }

    fn local_names(node: Node) -> Vec<String> {
        node.children()
            .filter_map(|n| n.tag_name().map(|name| name.local.clone()))
            .collect()
    }

    #[test]
    fn detach_first_child() {
        let mut doc = parse("<svg><g/><rect/><circle/></svg>");
        let id = doc.root_element().first_child().unwrap().id();
        doc.detach(id);
        assert_eq!(local_names(doc.root_element()), vec!["rect", "circle"]);
    }

    #[test]
    fn detach_middle_child() {
        let mut doc = parse("<svg><g/><rect/><circle/></svg>");
        let id = doc.root_element().children().nth(1).unwrap().id();
        doc.detach(id);
        assert_eq!(local_names(doc.root_element()), vec!["g", "circle"]);
        let last = doc.root_element().last_child().unwrap();
        assert_eq!(last.prev_sibling().unwrap().tag_name().unwrap().local, "g");
    }

    #[test]
    fn detach_last_child() {
        let mut doc = parse("<svg><g/><rect/><circle/></svg>");
        let id = doc.root_element().last_child().unwrap().id();
        doc.detach(id);
        assert_eq!(local_names(doc.root_element()), vec!["g", "rect"]);
    }

    #[test]
    fn detach_only_child() {
        let mut doc = parse("<svg><g/></svg>");
        let id = doc.root_element().first_child().unwrap().id();
        doc.detach(id);
        assert!(!doc.root_element().has_children());
    }

    #[test]
    fn detached_subtree_is_unreachable() {
        let mut doc = parse("<svg><g><script/></g><rect/></svg>");
        let id = doc.root_element().first_child().unwrap().id();
        doc.detach(id);
        assert!(!doc.descendants().any(|n| n.has_local_name("script")));
        assert_eq!(doc.descendants().filter(|n| n.is_element()).count(), 2);
    }

    #[test]
    fn navigation() {
        let doc = parse("<svg><g>text<!--c--><rect/><circle/></g></svg>");
        let g = doc.root_element().first_element_child().unwrap();
        assert!(g.has_local_name("g"));

        let rect = g.first_element_child().unwrap();
        assert!(rect.has_local_name("rect"));
        assert!(rect.prev_sibling().unwrap().is_comment());
        assert_eq!(rect.parent_element(), Some(g));
        assert_eq!(doc.root_element().parent_element(), None);
        assert_eq!(doc.root_element().parent(), Some(doc.root()));

        let ancestors: Vec<_> = rect.ancestors().map(|n| n.id()).collect();
        assert_eq!(
            ancestors,
            vec![rect.id(), g.id(), doc.root_element().id(), doc.root().id()]
        );

        assert!(std::ptr::eq(rect.document(), &doc));
        assert_eq!(rect.document().get(rect.id()), rect);
    }

    #[test]
    fn remove_and_prepend_attributes() {
        let mut doc = parse("<svg a='1' b='2' c='3' d='4'/>");
        let id = doc.root_element().id();
        doc.remove_attributes(id, &[0, 2]);
        doc.prepend_attribute(id, Attribute::svg_namespace());

        let names: Vec<_> = doc
            .root_element()
            .attributes()
            .iter()
            .map(|a| a.name.to_string())
            .collect();
        assert_eq!(names, vec!["xmlns", "b", "d"]);
    }

    #[test]
    fn namespace_declarations() {
        let ns = Attribute::svg_namespace();
        assert!(ns.is_namespace_declaration());
        assert!(ns.is_default_namespace_declaration());
        assert!(!ns.is_prefix_declaration());

        let xlink = Attribute {
            name: Name {
                prefix: Some("xmlns".to_string()),
                local: "xlink".to_string(),
                namespace: None,
            },
            value: "http://www.w3.org/1999/xlink".to_string(),
        };
        assert!(xlink.is_prefix_declaration());
        assert_eq!(xlink.name.to_string(), "xmlns:xlink");
    }
}
