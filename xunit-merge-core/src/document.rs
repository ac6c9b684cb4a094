// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! An ordered XML element tree.
//!
//! This is deliberately small: XUnit reports only need elements, attributes and text. Comments,
//! processing instructions and the document type are dropped while parsing.

use indexmap::IndexMap;
use std::{borrow::Cow, slice};

/// A single XML element.
///
/// Attributes are kept in insertion order, and children are kept in document order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Element {
    name: String,
    attributes: IndexMap<String, String>,
    children: Vec<Node>,
}

impl Element {
    /// Creates a new element with no attributes and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: vec![],
        }
    }

    /// Returns the tag name of this element.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this element has the given tag name.
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Returns the value of the given attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns all attributes, in insertion order.
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Sets an attribute.
    ///
    /// An attribute that already exists keeps its position; new attributes are appended.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Removes an attribute, returning its value.
    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.shift_remove(key)
    }

    /// Returns the child nodes of this element.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the direct child elements of this element, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Returns true if any direct child of this element is an element.
    pub fn has_child_elements(&self) -> bool {
        self.child_elements().next().is_some()
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: Element) -> &mut Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Appends text. Text directly following another text node is merged into it.
    pub fn push_text(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        match self.children.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(text),
            _ => self.children.push(Node::Text(text.to_owned())),
        }
        self
    }

    /// Appends a node.
    pub fn push_node(&mut self, node: Node) -> &mut Self {
        match node {
            Node::Element(element) => self.push_child(element),
            Node::Text(text) => self.push_text(text),
        }
    }

    /// Returns the text content of this element: its direct text children, concatenated.
    ///
    /// Returns `None` if this element has no text children.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        let mut texts = self.children.iter().filter_map(Node::as_text);
        let first = texts.next()?;
        match texts.next() {
            None => Some(Cow::Borrowed(first)),
            Some(second) => {
                let mut text = format!("{first}{second}");
                texts.for_each(|t| text.push_str(t));
                Some(Cow::Owned(text))
            }
        }
    }

    /// Iterates over all elements below this one in document (pre-)order.
    ///
    /// The element itself is not included.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// Returns true if any element below this one has the given tag name.
    pub fn has_descendant(&self, name: &str) -> bool {
        self.descendants().any(|element| element.is(name))
    }

    /// Removes and returns all children of this element.
    pub fn take_children(&mut self) -> Vec<Node> {
        std::mem::take(&mut self.children)
    }

    /// Drops whitespace-only text nodes if this element also contains elements.
    ///
    /// Such text is formatting between tags. Text in leaf elements is left alone.
    pub(crate) fn strip_formatting_whitespace(&mut self) {
        if self.has_child_elements() {
            self.children
                .retain(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()));
        }
    }
}

/// A child of an [`Element`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    /// A nested element.
    Element(Element),

    /// Text content, unescaped. CDATA sections are also represented as text.
    Text(String),
}

impl Node {
    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// Returns the text if this node is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Element(_) => None,
            Node::Text(text) => Some(text),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// Iterator returned by [`Element::descendants`].
#[derive(Clone, Debug)]
pub struct Descendants<'a> {
    stack: Vec<slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(Node::Element(element)) => {
                    self.stack.push(element.children.iter());
                    return Some(element);
                }
                Some(Node::Text(_)) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
