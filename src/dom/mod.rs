//! DOM module - The page tree the enhancer reads and edits
//!
//! The enhancer never touches a concrete tree directly. It is written against
//! [`PageDom`], the small set of queries and edits it needs, and the caller
//! passes the tree in. [`Document`](document::Document) is the arena implementation built by
//! [`parse`].

pub mod document;
pub mod entities;
pub mod parse;

pub use parse::parse;

/// A detached element/text tree handed to the DOM for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<Markup>,
    },
    Text(String),
}

impl Markup {
    /// Start an element with no attributes or children
    pub fn element(tag: impl Into<String>) -> Self {
        Markup::Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Plain text; escaped when inserted
    pub fn text(text: impl Into<String>) -> Self {
        Markup::Text(text.into())
    }

    /// Add an attribute (no-op on text)
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Markup::Element { attrs, .. } = &mut self {
            attrs.push((name.into(), value.into()));
        }
        self
    }

    /// Append a child (no-op on text)
    pub fn child(mut self, child: Markup) -> Self {
        if let Markup::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// Attribute value, if this is an element carrying `name`
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        match self {
            Markup::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            Markup::Text(_) => None,
        }
    }
}

/// Queries and edits the enhancer performs on a page.
///
/// All queries return nodes in document order.
pub trait PageDom {
    type Node: Copy + Eq + std::fmt::Debug;

    /// Elements whose class list contains `class`
    fn elements_with_class(&self, class: &str) -> Vec<Self::Node>;

    /// Elements below `scope` (the whole page when `None`) whose tag is one of `tags`.
    /// Tags compare case-insensitively.
    fn descendants_with_tags(&self, scope: Option<Self::Node>, tags: &[&str]) -> Vec<Self::Node>;

    /// Lowercase tag name of an element node
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    /// Decoded attribute value
    fn attr(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Whether a direct child element of `node` carries `class`
    fn has_child_with_class(&self, node: Self::Node, class: &str) -> bool;

    /// Decoded text below `node`, skipping subtrees of elements carrying `excluded_class`
    fn text_without(&self, node: Self::Node, excluded_class: &str) -> String;

    /// Replace every child of `node` with `content`
    fn replace_children(&mut self, node: Self::Node, content: &[Markup]);

    /// Insert `content` as the first child of `node`
    fn prepend_child(&mut self, node: Self::Node, content: &Markup);
}
