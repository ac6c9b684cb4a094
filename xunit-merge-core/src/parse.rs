// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parse XML into an [`Element`] tree.

use crate::{document::Element, errors::ParseError};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::io::BufRead;

/// Parses an XML document from a buffered reader, returning its root element.
pub fn parse_document(input: impl BufRead) -> Result<Element, ParseError> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();

    // Open elements, innermost last.
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(err) => {
                return Err(ParseError::Xml {
                    position: position(&reader),
                    err,
                });
            }
        };

        match event {
            Event::Start(start) => {
                let element = element_from_start(&start, position(&reader))?;
                if root.is_some() {
                    return Err(ParseError::ContentOutsideRoot {
                        position: position(&reader),
                    });
                }
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start, position(&reader))?;
                attach(&mut stack, &mut root, element, position(&reader))?;
            }
            Event::End(_) => {
                // quick-xml checks that end tags match their start tags.
                let Some(mut element) = stack.pop() else {
                    return Err(ParseError::ContentOutsideRoot {
                        position: position(&reader),
                    });
                };
                element.strip_formatting_whitespace();
                attach(&mut stack, &mut root, element, position(&reader))?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|err| ParseError::Xml {
                    position: position(&reader),
                    err,
                })?;
                push_text(&mut stack, &text, position(&reader))?;
            }
            Event::CData(cdata) => {
                let bytes = cdata.into_inner();
                let text = std::str::from_utf8(&bytes).map_err(|err| ParseError::Utf8 {
                    position: position(&reader),
                    err,
                })?;
                push_text(&mut stack, text, position(&reader))?;
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }

        buf.clear();
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::UnclosedElement {
            name: open.name().to_owned(),
        });
    }

    root.ok_or(ParseError::MissingRoot)
}

/// Parses an XML document from a string, returning its root element.
pub fn parse_str(input: &str) -> Result<Element, ParseError> {
    parse_document(input.as_bytes())
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> Result<Element, ParseError> {
    let qname = start.name();
    let name = std::str::from_utf8(qname.as_ref())
        .map_err(|err| ParseError::Utf8 { position, err })?;
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|err| ParseError::Xml {
            position,
            err: err.into(),
        })?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| ParseError::Utf8 { position, err })?;
        let value = attr
            .unescape_value()
            .map_err(|err| ParseError::Xml { position, err })?;
        element.set_attribute(key, value);
    }

    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: u64,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_child(element);
        }
        None if root.is_none() => *root = Some(element),
        None => return Err(ParseError::ContentOutsideRoot { position }),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str, position: u64) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_text(text);
            Ok(())
        }
        // Whitespace between the declaration, comments and the root is fine.
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::ContentOutsideRoot { position }),
    }
}

#[allow(clippy::unnecessary_cast)]
fn position<R>(reader: &Reader<R>) -> u64 {
    reader.buffer_position() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_report() {
        let input = indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <!-- produced by a test runner -->
            <testsuite name="nosetests" tests="2" errors="0" failures="0" skip="1">
                <testcase classname="pkg.Foo" name="test_out" time="0.25">
                    <system-out>line &amp; more
            next line</system-out>
                </testcase>
                <testcase classname="pkg.Foo" name="test_skip" time="0">
                    <skipped type="SkipTest" message="&quot;not now&quot;"><![CDATA[<raw> & text]]></skipped>
                </testcase>
                <testcase classname="pkg.Foo" name="test_empty"/>
            </testsuite>
        "#};

        let suite = parse_str(input).expect("report parses");
        assert_eq!(suite.name(), "testsuite");
        assert_eq!(suite.attribute("skip"), Some("1"));
        assert_eq!(suite.children().len(), 3, "formatting whitespace is dropped");

        let cases: Vec<_> = suite.child_elements().collect();
        assert_eq!(cases[0].attribute("name"), Some("test_out"));
        let system_out = cases[0].child_elements().next().expect("system-out exists");
        assert_eq!(
            system_out.text().as_deref(),
            Some("line & more\nnext line"),
            "leaf text is unescaped and kept verbatim"
        );

        let skipped = cases[1].child_elements().next().expect("skipped exists");
        assert_eq!(skipped.attribute("message"), Some("\"not now\""));
        assert_eq!(skipped.text().as_deref(), Some("<raw> & text"));

        assert!(cases[2].children().is_empty());
    }

    #[test]
    fn leaf_whitespace_is_preserved() {
        let suite = parse_str("<testsuite><system-out>  padded  </system-out></testsuite>")
            .expect("parses");
        let out = suite.child_elements().next().expect("child exists");
        assert_eq!(out.text().as_deref(), Some("  padded  "));
    }

    #[test]
    fn malformed_documents() {
        let cases = [
            ("", "missing root"),
            ("<!-- nothing -->", "missing root"),
            ("<testsuite>", "unclosed"),
            ("<testsuite><testcase></testsuite>", "mismatched"),
            ("<testsuite/><testsuite/>", "two roots"),
            ("<testsuite/>trailing", "trailing text"),
            ("<testsuite name=\"a\" name=\"b\"/>", "duplicate attribute"),
        ];

        for (input, description) in cases {
            let result = parse_str(input);
            assert!(
                result.is_err(),
                "{description}: expected `{input}` to fail, got {result:?}"
            );
        }

        assert!(matches!(parse_str(""), Err(ParseError::MissingRoot)));
        assert!(matches!(
            parse_str("<testsuite><testcase>"),
            Err(ParseError::UnclosedElement { name }) if name == "testcase"
        ));
    }
}
