//! XML parse/serialize built on quick-xml
//!
//! Parsing produces an owned [`Element`] tree; serialization writes it back
//! out as indented XML with a declaration. Parse failures carry the
//! line/column of the offending byte so callers can report file positions.

use crate::element::{Attribute, Content, Element};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Errors produced by the XML front-end
#[derive(Debug, Error)]
pub enum XmlError {
    /// Malformed XML input
    #[error("syntax error at line {line}, column {col}: {message}")]
    Parse {
        line: usize,
        col: usize,
        message: String,
    },

    /// The document ended without a root element
    #[error("document contains no root element")]
    NoRoot,

    /// The element tree could not be serialized
    #[error("failed to serialize element tree: {0}")]
    Write(String),
}

/// Parse a complete XML document into an element tree
pub fn parse(input: &[u8]) -> Result<Element, XmlError> {
    let mut reader = Reader::from_reader(input);
    let config = reader.config_mut();
    config.trim_text_start = true;
    config.trim_text_end = true;
    config.check_end_names = true;

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(start)) => {
                let element = element_from_start(&start, input, &reader)?;
                stack.push(element);
            }
            Ok(Event::Empty(start)) => {
                let element = element_from_start(&start, input, &reader)?;
                attach(element, &mut stack, &mut root);
            }
            Ok(Event::End(_)) => {
                // check_end_names guarantees this matches the innermost start
                if let Some(element) = stack.pop() {
                    attach(element, &mut stack, &mut root);
                }
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| parse_error(input, reader.buffer_position(), &e))?;
                if !text.is_empty() {
                    if let Some(parent) = stack.last_mut() {
                        parent.contents.push(Content::Text(text.into_owned()));
                    }
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    parent.contents.push(Content::Text(text));
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions and doctypes
            // carry nothing the layout compiler cares about.
            Ok(_) => {}
            Err(e) => return Err(parse_error(input, reader.error_position(), &e)),
        }
        buf.clear();
    }

    root.ok_or(XmlError::NoRoot)
}

/// Serialize an element tree to indented XML text with a declaration
pub fn serialize(root: &Element) -> Result<String, XmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(|e| XmlError::Write(e.to_string()))?;
    write_element(&mut writer, root)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| XmlError::Write(e.to_string()))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.tag.as_str());
    for attr in &element.attrs {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }

    if element.contents.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| XmlError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmlError::Write(e.to_string()))?;
    for content in &element.contents {
        match content {
            Content::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| XmlError::Write(e.to_string()))?,
            Content::Element(child) => write_element(writer, child)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.tag.as_str())))
        .map_err(|e| XmlError::Write(e.to_string()))
}

fn element_from_start(
    start: &BytesStart<'_>,
    input: &[u8],
    reader: &Reader<&[u8]>,
) -> Result<Element, XmlError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| parse_error(input, reader.buffer_position(), &e))?;
        let value = attr
            .unescape_value()
            .map_err(|e| parse_error(input, reader.buffer_position(), &e))?;
        element.attrs.push(Attribute {
            name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value: value.into_owned(),
        });
    }
    Ok(element)
}

fn attach(element: Element, stack: &mut Vec<Element>, root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.contents.push(Content::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn parse_error(input: &[u8], offset: u64, err: &impl std::fmt::Display) -> XmlError {
    let (line, col) = position(input, offset);
    XmlError::Parse {
        line,
        col,
        message: err.to_string(),
    }
}

/// Translate a byte offset into a 1-based line/column pair
fn position(input: &[u8], offset: u64) -> (usize, usize) {
    let offset = (offset as usize).min(input.len());
    let mut line = 1;
    let mut col = 1;
    for &byte in &input[..offset] {
        if byte == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}
