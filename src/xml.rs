//! XML front-end
//!
//! The pipeline only ever sees [`GenericNode`] trees. [`DocumentParser`] is the
//! seam to whatever turns a file into such a tree; [`QuickXmlParser`] is the
//! production implementation built on quick-xml's pull reader.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use crate::error::{LoaderError, Result};
use crate::node::{GenericNode, SourceLocation};

/// Capability that parses one file into a generic element tree
pub trait DocumentParser: Send + Sync {
    fn parse_file(&self, path: &Path) -> Result<GenericNode>;
}

/// quick-xml backed parser producing located [`GenericNode`] trees
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickXmlParser;

impl QuickXmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an in-memory document; `origin` is only used for locations and diagnostics
    pub fn parse_str(&self, xml: &str, origin: &Path) -> Result<GenericNode> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut lines = LineTracker::new(xml);
        let mut stack: Vec<GenericNode> = Vec::new();
        let mut root: Option<GenericNode> = None;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let line = lines.line_at(reader.buffer_position());
                    return Err(parse_error(origin, line, err));
                }
            };
            let line = lines.line_at(reader.buffer_position());

            match event {
                Event::Start(start) => {
                    stack.push(open_element(&start, origin, line)?);
                }
                Event::Empty(start) => {
                    let node = open_element(&start, origin, line)?;
                    attach(node, &mut stack, &mut root, origin, line)?;
                }
                Event::End(_) => {
                    let node = stack.pop().ok_or_else(|| LoaderError::XmlParse {
                        path: origin.to_path_buf(),
                        details: format!("line {}: closing tag without an open element", line),
                    })?;
                    attach(node, &mut stack, &mut root, origin, line)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|err| parse_error(origin, line, err))?;
                    append_text(stack.last_mut(), &text);
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    append_text(stack.last_mut(), &text);
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and doctypes carry no content
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(LoaderError::XmlParse {
                path: origin.to_path_buf(),
                details: format!("unexpected end of document inside <{}>", open.tag),
            });
        }

        root.ok_or_else(|| LoaderError::XmlParse {
            path: origin.to_path_buf(),
            details: "document has no root element".to_string(),
        })
    }
}

impl DocumentParser for QuickXmlParser {
    fn parse_file(&self, path: &Path) -> Result<GenericNode> {
        let xml = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoaderError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => LoaderError::Io(e),
        })?;

        trace!(path = %path.display(), bytes = xml.len(), "parsing xml document");
        self.parse_str(&xml, path)
    }
}

fn open_element(start: &BytesStart<'_>, origin: &Path, line: usize) -> Result<GenericNode> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut node = GenericNode::new(tag).with_location(SourceLocation {
        file: origin.to_path_buf(),
        line,
    });

    for attr in start.attributes() {
        let attr = attr.map_err(|err| parse_error(origin, line, err))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| parse_error(origin, line, err))?
            .into_owned();
        node.set_attribute(key, value);
    }

    Ok(node)
}

fn attach(
    node: GenericNode,
    stack: &mut [GenericNode],
    root: &mut Option<GenericNode>,
    origin: &Path,
    line: usize,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => {
            return Err(LoaderError::XmlParse {
                path: origin.to_path_buf(),
                details: format!("line {}: second root element <{}>", line, node.tag),
            });
        }
    }
    Ok(())
}

fn append_text(node: Option<&mut GenericNode>, text: &str) {
    // Text outside the root element is ignored
    if let Some(node) = node {
        match node.value.as_mut() {
            Some(value) => value.push_str(text),
            None => node.value = Some(text.to_string()),
        }
    }
}

fn parse_error(origin: &Path, line: usize, err: impl std::fmt::Display) -> LoaderError {
    LoaderError::XmlParse {
        path: origin.to_path_buf(),
        details: format!("line {}: {}", line, err),
    }
}

/// Converts byte offsets into 1-based line numbers without rescanning the document
struct LineTracker<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineTracker<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            bytes: source.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, position: usize) -> usize {
        let position = position.min(self.bytes.len());
        if position > self.offset {
            self.line += self.bytes[self.offset..position]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.offset = position;
        }
        self.line
    }
}
