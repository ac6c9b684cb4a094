// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize an [`Element`] tree.
//!
//! How each element is written is decided by a [`SerializeStrategy`] passed in per call.
//! [`CdataStrategy`] writes the text of status and output elements literally, inside a CDATA
//! section, so that captured output survives unchanged.
//!
//! # Limitations
//!
//! Text written as CDATA is not checked for the `]]>` sequence. Such text ends the CDATA section
//! early and produces a corrupt document.
//!
//! Only the text before the first child element of a CDATA element is written. Text that follows
//! a child element is dropped along with the child.

use crate::{
    document::{Element, Node},
    errors::SerializeError,
};
use quick_xml::{
    Writer,
    escape::escape,
    events::{
        BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event, attributes::Attribute,
    },
    name::QName,
};
use std::{borrow::Cow, io};

/// The indentation width used unless configured otherwise.
pub const DEFAULT_INDENT: usize = 4;

/// The tags whose text [`CdataStrategy`] writes as CDATA by default.
pub static DEFAULT_CDATA_TAGS: [&str; 4] = ["system-out", "skipped", "error", "failure"];

/// How a single element is written out.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ElementStyle {
    /// Escaped text, attributes in document order, and all children.
    Standard,

    /// Attributes sorted by name, and the element's leading text written verbatim inside a single
    /// CDATA section. Child elements are not written.
    Cdata,
}

/// Decides how each element is written.
pub trait SerializeStrategy {
    /// Returns the style to use for `element`.
    fn element_style(&self, element: &Element) -> ElementStyle;
}

impl<S: SerializeStrategy + ?Sized> SerializeStrategy for &S {
    fn element_style(&self, element: &Element) -> ElementStyle {
        (**self).element_style(element)
    }
}

/// Writes every element in the standard style.
#[derive(Copy, Clone, Debug, Default)]
pub struct StandardStrategy;

impl SerializeStrategy for StandardStrategy {
    fn element_style(&self, _element: &Element) -> ElementStyle {
        ElementStyle::Standard
    }
}

/// Writes the text of a fixed set of tags as CDATA, and everything else in the standard style.
#[derive(Clone, Debug)]
pub struct CdataStrategy {
    tags: Vec<String>,
}

impl CdataStrategy {
    /// Creates a strategy that writes the given tags as CDATA.
    pub fn new(tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the tags written as CDATA.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl Default for CdataStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_CDATA_TAGS)
    }
}

impl SerializeStrategy for CdataStrategy {
    fn element_style(&self, element: &Element) -> ElementStyle {
        if self.tags.iter().any(|tag| element.is(tag)) {
            ElementStyle::Cdata
        } else {
            ElementStyle::Standard
        }
    }
}

/// Writes an element tree as a UTF-8 XML document, with a leading XML declaration.
#[derive(Clone, Debug)]
pub struct Serializer<S> {
    strategy: S,
    indent: Option<usize>,
}

impl<S: SerializeStrategy> Serializer<S> {
    /// Creates a new serializer using the given strategy, indenting by [`DEFAULT_INDENT`].
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            indent: Some(DEFAULT_INDENT),
        }
    }

    /// Sets the indentation width. `None` or `Some(0)` writes the document without line breaks.
    pub fn set_indent(&mut self, indent: Option<usize>) -> &mut Self {
        self.indent = indent.filter(|&width| width > 0);
        self
    }

    /// Serializes `root` to the given writer.
    pub fn serialize(&self, root: &Element, writer: impl io::Write) -> Result<(), SerializeError> {
        let mut writer = match self.indent {
            Some(width) => Writer::new_with_indent(writer, b' ', width),
            None => Writer::new(writer),
        };

        let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
        writer.write_event(Event::Decl(decl))?;

        self.serialize_element(root, &mut writer)?;

        // Add a trailing newline.
        writer.get_mut().write_all(b"\n")?;
        Ok(())
    }

    /// Serializes `root` to a string.
    pub fn to_string(&self, root: &Element) -> Result<String, SerializeError> {
        let mut buf: Vec<u8> = vec![];
        self.serialize(root, &mut buf)?;
        String::from_utf8(buf)
            .map_err(|err| SerializeError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
    }

    fn serialize_element<W: io::Write>(
        &self,
        element: &Element,
        writer: &mut Writer<W>,
    ) -> Result<(), SerializeError> {
        match self.strategy.element_style(element) {
            ElementStyle::Standard => self.serialize_standard(element, writer),
            ElementStyle::Cdata => serialize_cdata(element, writer),
        }
    }

    fn serialize_standard<W: io::Write>(
        &self,
        element: &Element,
        writer: &mut Writer<W>,
    ) -> Result<(), SerializeError> {
        let mut tag = BytesStart::new(element.name());
        push_attributes(&mut tag, element.attributes());

        if element.children().is_empty() {
            writer.write_event(Event::Empty(tag))?;
            return Ok(());
        }

        writer.write_event(Event::Start(tag))?;
        for child in element.children() {
            match child {
                Node::Element(child) => self.serialize_element(child, writer)?,
                Node::Text(text) => {
                    writer.write_event(Event::Text(BytesText::new(text.as_str())))?;
                }
            }
        }
        serialize_end_tag(element.name(), writer)
    }
}

impl Default for Serializer<CdataStrategy> {
    fn default() -> Self {
        Self::new(CdataStrategy::default())
    }
}

fn serialize_cdata<W: io::Write>(
    element: &Element,
    writer: &mut Writer<W>,
) -> Result<(), SerializeError> {
    let mut attributes: Vec<_> = element.attributes().iter().collect();
    attributes.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut tag = BytesStart::new(element.name());
    push_attributes(&mut tag, attributes);
    writer.write_event(Event::Start(tag))?;

    // The text is written as is, even if it contains `]]>`.
    let text: String = element
        .children()
        .iter()
        .map_while(Node::as_text)
        .collect();
    writer.write_event(Event::CData(BytesCData::new(text)))?;

    serialize_end_tag(element.name(), writer)
}

fn push_attributes<'a>(
    tag: &mut BytesStart<'_>,
    attributes: impl IntoIterator<Item = (&'a String, &'a String)>,
) {
    for (key, value) in attributes {
        let value = match escape_attribute(value) {
            Cow::Borrowed(value) => Cow::Borrowed(value.as_bytes()),
            Cow::Owned(value) => Cow::Owned(value.into_bytes()),
        };
        tag.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value,
        });
    }
}

/// Escapes an attribute value, including the whitespace that parsers would otherwise normalize
/// to spaces.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }

    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn serialize_end_tag<W: io::Write>(
    tag_name: &str,
    writer: &mut Writer<W>,
) -> Result<(), SerializeError> {
    let end_tag = BytesEnd::new(tag_name);
    writer.write_event(Event::End(end_tag))?;
    Ok(())
}
