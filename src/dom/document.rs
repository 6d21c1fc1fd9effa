//! Arena-backed page tree
//!
//! Nodes live in one `Vec` and refer to each other by index. Elements parsed
//! from a page keep the exact text of their start and end tags, so serializing
//! an untouched page reproduces the input byte-for-byte. Elements created from
//! [`Markup`] serialize canonically.

use crate::dom::entities::{decode, escape_attr, escape_text};
use crate::dom::{Markup, PageDom};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Tag text exactly as it appeared in the page
#[derive(Debug, Clone)]
pub(crate) struct SourceTags {
    pub(crate) start: String,
    /// `None` when the element was closed implicitly
    pub(crate) end: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    /// Lowercase tag name
    pub(crate) name: String,
    /// Lowercase attribute names with decoded values, in source order
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) source: Option<SourceTags>,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Document,
    Element(Element),
    /// Text as written in markup, character references intact
    Text(String),
    Comment(String),
    /// Doctype, processing instructions and stray end tags, kept verbatim
    Raw(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn create_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Nodes strictly below `node`, in document order
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    /// Decoded text of every text node below `node`
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        for id in self.descendants(node) {
            if let NodeKind::Text(raw) = &self.nodes[id.0].kind {
                out.push_str(&decode(raw));
            }
        }
        out
    }

    /// Serialize the whole page
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in &self.nodes[self.root.0].children {
            self.serialize_into(*child, &mut out);
        }
        out
    }

    /// Serialize only the children of `node`
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in &self.nodes[node.0].children {
            self.serialize_into(*child, &mut out);
        }
        out
    }

    /// Serialize `node` and its subtree
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize_into(node, &mut out);
        out
    }

    fn serialize_into(&self, node: NodeId, out: &mut String) {
        enum Step {
            Enter(NodeId),
            Exit(NodeId),
        }

        let mut stack = vec![Step::Enter(node)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    let current = &self.nodes[id.0];
                    match &current.kind {
                        NodeKind::Document => {}
                        NodeKind::Text(raw) | NodeKind::Comment(raw) | NodeKind::Raw(raw) => {
                            out.push_str(raw);
                            continue;
                        }
                        NodeKind::Element(element) => match &element.source {
                            Some(source) => out.push_str(&source.start),
                            None => write_start_tag(element, out),
                        },
                    }
                    stack.push(Step::Exit(id));
                    stack.extend(current.children.iter().rev().map(|c| Step::Enter(*c)));
                }
                Step::Exit(id) => {
                    if let NodeKind::Element(element) = &self.nodes[id.0].kind {
                        match &element.source {
                            Some(source) => {
                                if let Some(end) = &source.end {
                                    out.push_str(end);
                                }
                            }
                            None if !is_void_tag(&element.name) => {
                                out.push_str("</");
                                out.push_str(&element.name);
                                out.push('>');
                            }
                            None => {}
                        }
                    }
                }
            }
        }
    }

    /// Build `markup` as a detached subtree and return its root
    fn build(&mut self, markup: &Markup) -> NodeId {
        match markup {
            Markup::Text(text) => self.create_node(None, NodeKind::Text(escape_text(text))),
            Markup::Element {
                tag,
                attrs,
                children,
            } => {
                let element = Element {
                    name: tag.to_ascii_lowercase(),
                    attrs: attrs
                        .iter()
                        .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
                        .collect(),
                    source: None,
                };
                let id = self.create_node(None, NodeKind::Element(element));
                for child in children {
                    let child_id = self.build(child);
                    self.attach(id, child_id, None);
                }
                id
            }
        }
    }

    /// Attach a detached node under `parent`, at `index` or at the end
    fn attach(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        match index {
            Some(i) if i <= children.len() => children.insert(i, child),
            _ => children.push(child),
        }
    }
}

fn write_start_tag(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');
}

/// Elements that never have children or an end tag
pub fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

impl PageDom for Document {
    type Node = NodeId;

    fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|e| e.has_class(class)))
            .collect()
    }

    fn descendants_with_tags(&self, scope: Option<NodeId>, tags: &[&str]) -> Vec<NodeId> {
        self.descendants(scope.unwrap_or(self.root))
            .into_iter()
            .filter(|id| {
                self.element(*id)
                    .is_some_and(|e| tags.iter().any(|t| e.name.eq_ignore_ascii_case(t)))
            })
            .collect()
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.name.as_str())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.attr(name))
    }

    fn has_child_with_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0]
            .children
            .iter()
            .any(|c| self.element(*c).is_some_and(|e| e.has_class(class)))
    }

    fn text_without(&self, node: NodeId, excluded_class: &str) -> String {
        let mut out = String::new();
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            match &self.nodes[current.0].kind {
                NodeKind::Text(raw) => out.push_str(&decode(raw)),
                NodeKind::Element(element) if element.has_class(excluded_class) => {}
                NodeKind::Element(_) => {
                    stack.extend(self.nodes[current.0].children.iter().rev().copied());
                }
                _ => {}
            }
        }
        out
    }

    fn replace_children(&mut self, node: NodeId, content: &[Markup]) {
        let old = std::mem::take(&mut self.nodes[node.0].children);
        for child in old {
            self.nodes[child.0].parent = None;
        }
        for markup in content {
            let id = self.build(markup);
            self.attach(node, id, None);
        }
    }

    fn prepend_child(&mut self, node: NodeId, content: &Markup) {
        let id = self.build(content);
        self.attach(node, id, Some(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    #[test]
    fn test_round_trip_untouched() {
        let html = "<!DOCTYPE html>\n<HTML><body class=x><h1 ID='a'>A &amp; B</h1><br/><p>one<p>two</body></HTML>";
        let doc = parse(html);
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn test_elements_with_class() {
        let doc = parse(r#"<div class="a docs-section b"></div><div class="docs-sectionx"></div>"#);
        let found = doc.elements_with_class("docs-section");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_descendants_with_tags_document_order() {
        let doc = parse(r#"<h2 id="x"></h2><section><H1 id="y"></H1><h2 id="z"></h2></section>"#);
        let ids: Vec<_> = doc
            .descendants_with_tags(None, &["h1", "h2"])
            .into_iter()
            .filter_map(|n| doc.attr(n, "id"))
            .collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_descendants_with_tags_scoped() {
        let doc = parse(r#"<h1 id="out"></h1><section class="s"><h1 id="in"></h1></section>"#);
        let section = doc.elements_with_class("s")[0];
        let found = doc.descendants_with_tags(Some(section), &["h1"]);
        assert_eq!(found.len(), 1);
        assert_eq!(doc.attr(found[0], "id"), Some("in"));
    }

    #[test]
    fn test_attr_is_decoded() {
        let doc = parse(r#"<h1 id="a&amp;b">x</h1>"#);
        let h1 = doc.descendants_with_tags(None, &["h1"])[0];
        assert_eq!(doc.attr(h1, "id"), Some("a&b"));
        assert_eq!(doc.attr(h1, "ID"), Some("a&b"));
        assert_eq!(doc.attr(h1, "class"), None);
    }

    #[test]
    fn test_text_without_skips_class() {
        let doc = parse(
            r##"<h1 id="a"><a class="anchor-link" href="#a">LINK</a>Hello <code>x &lt; y</code></h1>"##,
        );
        let h1 = doc.descendants_with_tags(None, &["h1"])[0];
        assert_eq!(doc.text_without(h1, "anchor-link"), "Hello x < y");
        assert_eq!(doc.text_content(h1), "LINKHello x < y");
    }

    #[test]
    fn test_has_child_with_class_direct_only() {
        let doc = parse(r#"<h1><span><a class="m"></a></span></h1><h2><a class="m"></a></h2>"#);
        let h1 = doc.descendants_with_tags(None, &["h1"])[0];
        let h2 = doc.descendants_with_tags(None, &["h2"])[0];
        assert!(!doc.has_child_with_class(h1, "m"));
        assert!(doc.has_child_with_class(h2, "m"));
    }

    #[test]
    fn test_replace_children() {
        let mut doc = parse(r#"<ul class="nav"><li>old</li></ul><p>after</p>"#);
        let nav = doc.elements_with_class("nav")[0];
        let item = Markup::element("li").child(
            Markup::element("a")
                .attr("href", "#a\"b")
                .child(Markup::text("A & B")),
        );
        doc.replace_children(nav, &[item]);
        assert_eq!(
            doc.to_html(),
            r##"<ul class="nav"><li><a href="#a&quot;b">A &amp; B</a></li></ul><p>after</p>"##
        );
    }

    #[test]
    fn test_replace_children_detaches_old() {
        let mut doc = parse(r#"<div class="nav"><h1 id="old"></h1></div>"#);
        let nav = doc.elements_with_class("nav")[0];
        doc.replace_children(nav, &[]);
        assert!(doc.descendants_with_tags(None, &["h1"]).is_empty());
        assert_eq!(doc.to_html(), r#"<div class="nav"></div>"#);
    }

    #[test]
    fn test_prepend_child() {
        let mut doc = parse("<h2 id=\"s\">Title</h2>");
        let h2 = doc.descendants_with_tags(None, &["h2"])[0];
        doc.prepend_child(h2, &Markup::element("a").attr("href", "#s"));
        assert_eq!(doc.to_html(), "<h2 id=\"s\"><a href=\"#s\"></a>Title</h2>");
        assert_eq!(doc.parent(doc.children(h2)[0]), Some(h2));
    }

    #[test]
    fn test_created_void_element_has_no_end_tag() {
        let mut doc = parse("<p></p>");
        let p = doc.descendants_with_tags(None, &["p"])[0];
        doc.prepend_child(p, &Markup::element("br"));
        assert_eq!(doc.to_html(), "<p><br></p>");
        assert_eq!(doc.inner_html(p), "<br>");
        assert_eq!(doc.outer_html(p), "<p><br></p>");
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let html = "<div>".repeat(100_000);
        let doc = parse(&html);
        assert_eq!(doc.to_html(), html);
    }
}
