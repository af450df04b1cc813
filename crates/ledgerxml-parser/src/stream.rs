//! Incremental XML reading.
//!
//! The reader pulls events from the input one at a time and assembles the
//! element tree of the top-level `ledger` element on a stack of open
//! elements. Reading stops as soon as `</ledger>` is seen; the remainder of
//! the input is never consumed.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;
use tokio::io::AsyncBufRead;

use crate::{ParseError, XmlNode};

/// Name of the top-level element of a ledger export.
pub const ROOT_ELEMENT: &str = "ledger";

/// Read the `ledger` element tree from a buffered reader.
pub fn parse_document<R: BufRead>(input: R) -> Result<XmlNode, ParseError> {
    let mut reader = Reader::from_reader(input);
    let mut builder = TreeBuilder::default();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| xml_error(source, reader.buffer_position()))?;
        let position = reader.buffer_position();
        if let Some(root) = builder.handle(event, position)? {
            return Ok(root);
        }
        buf.clear();
    }
}

/// Read the `ledger` element tree from an asynchronous reader.
///
/// The returned future completes once, with either the tree or an error.
pub async fn parse_document_async<R: AsyncBufRead + Unpin>(
    input: R,
) -> Result<XmlNode, ParseError> {
    let mut reader = Reader::from_reader(input);
    let mut builder = TreeBuilder::default();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into_async(&mut buf)
            .await
            .map_err(|source| xml_error(source, reader.buffer_position()))?;
        let position = reader.buffer_position();
        if let Some(root) = builder.handle(event, position)? {
            return Ok(root);
        }
        buf.clear();
    }
}

fn xml_error(source: quick_xml::Error, position: usize) -> ParseError {
    ParseError::Xml { position, source }
}

/// Assembles elements into a tree as events arrive.
#[derive(Debug, Default)]
struct TreeBuilder {
    open: Vec<XmlNode>,
}

impl TreeBuilder {
    /// Feed one event. Returns the root once its end tag has been seen.
    fn handle(&mut self, event: Event<'_>, position: usize) -> Result<Option<XmlNode>, ParseError> {
        match event {
            Event::Start(start) => {
                let node = element(&start).map_err(|e| xml_error(e, position))?;
                self.check_root(&node)?;
                self.open.push(node);
                Ok(None)
            }
            Event::Empty(start) => {
                let node = element(&start).map_err(|e| xml_error(e, position))?;
                self.check_root(&node)?;
                Ok(self.close(node))
            }
            Event::End(_) => match self.open.pop() {
                Some(node) => Ok(self.close(node)),
                // The reader rejects unmatched end tags before we see them.
                None => Ok(None),
            },
            Event::Text(text) => {
                if let Some(current) = self.open.last_mut() {
                    let text = text.unescape().map_err(|e| xml_error(e, position))?;
                    current.text.push_str(&text);
                }
                Ok(None)
            }
            Event::CData(data) => {
                if let Some(current) = self.open.last_mut() {
                    let text = std::str::from_utf8(&data)
                        .map_err(|e| xml_error(quick_xml::Error::from(e), position))?;
                    current.text.push_str(&text);
                }
                Ok(None)
            }
            Event::Eof => Err(ParseError::UnexpectedEof),
            // Declarations, comments and processing instructions carry no data.
            _ => Ok(None),
        }
    }

    fn check_root(&self, node: &XmlNode) -> Result<(), ParseError> {
        if self.open.is_empty() && node.name != ROOT_ELEMENT {
            return Err(ParseError::UnexpectedRoot(node.name.clone()));
        }
        Ok(())
    }

    /// Attach a finished element to its parent, or hand back the finished root.
    fn close(&mut self, node: XmlNode) -> Option<XmlNode> {
        match self.open.last_mut() {
            Some(parent) => {
                parent.children.push(node);
                None
            }
            None => Some(node),
        }
    }
}

fn element(start: &BytesStart<'_>) -> Result<XmlNode, quick_xml::Error> {
    let mut node = XmlNode::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}
