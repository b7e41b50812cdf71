//! Text Cursor
//!
//! Pull cursor over one XML source. The source is read fully and decoded to
//! UTF-8 when the cursor is opened; tokens are then produced one `read` at a
//! time. Each read resumes the tokenizer at the saved position and converts
//! the token into owned node data, checking well-formedness as it goes.

use super::node::{split_name, NodeType, QName, ReadState, XmlAttribute};
use super::settings::ReaderSettings;
use super::source::{read_all, BoxedStream};
use super::XmlCursor;
use crate::core::attributes::parse_attributes;
use crate::core::encoding::{decode_source, XmlEncoding};
use crate::core::scanner::{is_whitespace, Scanner};
use crate::core::tokenizer::{TokenKind, Tokenizer};
use crate::error::{Error, Result};
use crate::names::{Name, NameTable};
use crate::namespace::NamespaceResolver;
use log::{trace, warn};
use std::io::Cursor;

/// Token converted to owned data, detached from the source text
enum Markup {
    Start {
        name: String,
        attributes: Vec<(String, String)>,
        empty: bool,
    },
    End(String),
    Text(String),
    CData(String),
    Comment(String),
    Pi { target: String, data: String },
    Declaration(String),
    DocType { name: String, body: String },
    Eof,
}

fn utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// The node a cursor is positioned on
#[derive(Debug, Clone)]
struct Node {
    node_type: NodeType,
    depth: usize,
    qname: QName,
    value: String,
    attributes: Vec<XmlAttribute>,
    is_empty: bool,
}

impl Node {
    fn none(names: &NameTable) -> Self {
        Node {
            node_type: NodeType::None,
            depth: 0,
            qname: QName::empty(names),
            value: String::new(),
            attributes: Vec::new(),
            is_empty: false,
        }
    }

    fn leaf(node_type: NodeType, depth: usize, qname: QName, value: String) -> Self {
        Node {
            node_type,
            depth,
            qname,
            value,
            attributes: Vec::new(),
            is_empty: false,
        }
    }
}

/// Cursor over one decoded XML source
pub struct TextCursor {
    text: String,
    /// Byte offset of the next token in `text`
    position: usize,
    encoding: XmlEncoding,
    source: Option<BoxedStream>,
    close_input: bool,
    ignore_whitespace: bool,
    ignore_comments: bool,
    ignore_processing_instructions: bool,
    names: NameTable,
    namespaces: NamespaceResolver,
    /// Open elements, innermost last
    open: Vec<QName>,
    /// The current node closed a namespace scope that is left on the next read
    pending_pop: bool,
    seen_root: bool,
    state: ReadState,
    node: Node,
}

impl TextCursor {
    /// Open a cursor over a byte source, detecting its encoding
    ///
    /// When `close_input` is set the source is closed on failure too.
    pub fn open(mut source: BoxedStream, settings: &ReaderSettings) -> Result<Self> {
        let loaded = read_all(&mut source)
            .map_err(Error::from_io)
            .and_then(decode_source);

        match loaded {
            Ok((text, encoding)) => {
                trace!("opened text cursor: {} bytes of {}", text.len(), encoding.name());
                Ok(Self::build(text, encoding, Some(source), settings))
            }
            Err(err) => {
                if settings.close_input {
                    if let Err(close_err) = source.close() {
                        warn!("failed to close source after open error: {}", close_err);
                    }
                }
                Err(err)
            }
        }
    }

    /// Open a cursor over an in-memory byte buffer
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, settings: &ReaderSettings) -> Result<Self> {
        Self::open(Box::new(Cursor::new(bytes.into())), settings)
    }

    /// Open a cursor over already decoded text
    pub fn from_text(text: impl Into<String>, settings: &ReaderSettings) -> Self {
        Self::build(text.into(), XmlEncoding::Utf8, None, settings)
    }

    fn build(
        text: String,
        encoding: XmlEncoding,
        source: Option<BoxedStream>,
        settings: &ReaderSettings,
    ) -> Self {
        let names = settings.resolve_name_table();
        TextCursor {
            text,
            position: 0,
            encoding,
            source,
            close_input: settings.close_input,
            ignore_whitespace: settings.ignore_whitespace,
            ignore_comments: settings.ignore_comments,
            ignore_processing_instructions: settings.ignore_processing_instructions,
            namespaces: NamespaceResolver::new(&names),
            node: Node::none(&names),
            names,
            open: Vec::new(),
            pending_pop: false,
            seen_root: false,
            state: ReadState::Initial,
        }
    }

    /// Encoding the source was decoded from
    pub fn encoding(&self) -> XmlEncoding {
        self.encoding
    }

    fn syntax(&self, message: impl Into<String>, position: usize) -> Error {
        let (line, column) = Scanner::new(self.text.as_bytes()).line_col(position);
        Error::Syntax {
            message: message.into(),
            line,
            column,
        }
    }

    /// Tokenize the next construct; returns it with its start offset and
    /// the offset following it
    fn next_markup(&self) -> Result<(Markup, usize, usize)> {
        let input = self.text.as_bytes();
        let mut tokenizer = if self.position == 0 {
            Tokenizer::new(input)
        } else {
            Tokenizer::resume(input, self.position)
        };

        let token = tokenizer
            .next_token()
            .map_err(|e| self.syntax(e.message, e.position))?;
        let start = token.span.0;
        let name = token.name.unwrap_or_default();
        let content = token.content.as_deref().unwrap_or_default();

        let markup = match token.kind {
            TokenKind::StartTag | TokenKind::EmptyTag => {
                let attributes = parse_attributes(content)
                    .map_err(|(offset, message)| self.syntax(message, start + 1 + name.len() + offset))?
                    .into_iter()
                    .map(|a| (utf8(a.name), utf8(&a.value)))
                    .collect();
                Markup::Start {
                    name: utf8(name),
                    attributes,
                    empty: token.kind == TokenKind::EmptyTag,
                }
            }
            TokenKind::EndTag => Markup::End(utf8(name)),
            TokenKind::Text => Markup::Text(utf8(content)),
            TokenKind::CData => Markup::CData(utf8(content)),
            TokenKind::Comment => Markup::Comment(utf8(content)),
            TokenKind::ProcessingInstruction => Markup::Pi {
                target: utf8(name),
                data: utf8(content),
            },
            TokenKind::XmlDeclaration => Markup::Declaration(utf8(content)),
            TokenKind::DocType => {
                let body = content.get(name.len()..).unwrap_or_default();
                Markup::DocType {
                    name: utf8(name),
                    body: utf8(body).trim().to_string(),
                }
            }
            TokenKind::Eof => Markup::Eof,
        };

        Ok((markup, start, tokenizer.position()))
    }

    fn advance(&mut self) -> Result<bool> {
        loop {
            if self.pending_pop {
                self.namespaces.pop_scope();
                self.pending_pop = false;
            }

            let (markup, start, next) = self.next_markup()?;
            self.position = next;
            let depth = self.open.len();

            let node = match markup {
                Markup::Eof => return self.finish(start),
                Markup::Start {
                    name,
                    attributes,
                    empty,
                } => self.start_element(&name, attributes, empty, start)?,
                Markup::End(name) => self.end_element(&name, start)?,
                Markup::Text(text) => {
                    if text.bytes().all(is_whitespace) {
                        if self.ignore_whitespace {
                            continue;
                        }
                        Node::leaf(NodeType::Whitespace, depth, QName::empty(&self.names), text)
                    } else if depth == 0 {
                        return Err(self.syntax("Text content outside of the root element", start));
                    } else {
                        Node::leaf(NodeType::Text, depth, QName::empty(&self.names), text)
                    }
                }
                Markup::CData(text) => {
                    if depth == 0 {
                        return Err(self.syntax("CDATA section outside of the root element", start));
                    }
                    Node::leaf(NodeType::CData, depth, QName::empty(&self.names), text)
                }
                Markup::Comment(text) => {
                    if self.ignore_comments {
                        continue;
                    }
                    Node::leaf(NodeType::Comment, depth, QName::empty(&self.names), text)
                }
                Markup::Pi { target, data } => {
                    if self.ignore_processing_instructions {
                        continue;
                    }
                    let qname = QName::plain(&self.names, &target);
                    Node::leaf(NodeType::ProcessingInstruction, depth, qname, data)
                }
                Markup::Declaration(text) => {
                    if start != 0 {
                        return Err(self.syntax(
                            "XML declaration allowed only at the start of the document",
                            start,
                        ));
                    }
                    Node::leaf(NodeType::XmlDeclaration, 0, QName::plain(&self.names, "xml"), text)
                }
                Markup::DocType { name, body } => {
                    if self.seen_root {
                        return Err(self.syntax("DOCTYPE must precede the root element", start));
                    }
                    Node::leaf(NodeType::DocumentType, 0, QName::plain(&self.names, &name), body)
                }
            };

            self.node = node;
            return Ok(true);
        }
    }

    fn finish(&mut self, position: usize) -> Result<bool> {
        if let Some(unclosed) = self.open.last() {
            let message = format!("Unexpected end of input: element '{}' is not closed", unclosed.name);
            return Err(self.syntax(message, position));
        }
        if !self.seen_root {
            return Err(self.syntax("Missing root element", position));
        }
        self.state = ReadState::EndOfFile;
        self.node = Node::none(&self.names);
        Ok(false)
    }

    fn start_element(
        &mut self,
        name: &str,
        raw_attributes: Vec<(String, String)>,
        empty: bool,
        start: usize,
    ) -> Result<Node> {
        if self.open.is_empty() && self.seen_root {
            return Err(self.syntax("Multiple root elements", start));
        }
        self.seen_root = true;
        self.namespaces.push_scope();

        for (attr_name, value) in &raw_attributes {
            let (prefix, local) = split_name(attr_name);
            if attr_name == "xmlns" {
                self.namespaces.declare(self.names.empty(), self.names.add(value));
            } else if self.namespaces.is_xmlns(prefix) {
                self.namespaces.declare(self.names.add(local), self.names.add(value));
            }
        }

        let mut attributes = Vec::with_capacity(raw_attributes.len());
        for (attr_name, value) in raw_attributes {
            let (prefix, local) = split_name(&attr_name);
            let namespace = if attr_name == "xmlns" {
                self.namespaces.xmlns_uri().clone()
            } else if prefix.is_empty() {
                self.names.empty()
            } else {
                self.resolve(prefix, start)?
            };
            attributes.push(XmlAttribute {
                qname: QName {
                    name: self.names.add(&attr_name),
                    prefix: self.names.add(prefix),
                    local_name: self.names.add(local),
                    namespace,
                },
                value,
            });
        }

        let qname = self.qualify(name, start)?;
        let depth = self.open.len();
        if empty {
            self.pending_pop = true;
        } else {
            self.open.push(qname.clone());
        }

        Ok(Node {
            node_type: NodeType::Element,
            depth,
            qname,
            value: String::new(),
            attributes,
            is_empty: empty,
        })
    }

    fn end_element(&mut self, name: &str, start: usize) -> Result<Node> {
        let Some(qname) = self.open.pop() else {
            return Err(self.syntax(format!("Unexpected end tag </{}>", name), start));
        };
        if qname.name != *name {
            let message = format!("Mismatched end tag: expected </{}>, found </{}>", qname.name, name);
            return Err(self.syntax(message, start));
        }
        self.pending_pop = true;
        Ok(Node::leaf(NodeType::EndElement, self.open.len(), qname, String::new()))
    }

    fn qualify(&self, name: &str, start: usize) -> Result<QName> {
        let (prefix, local) = split_name(name);
        Ok(QName {
            name: self.names.add(name),
            prefix: self.names.add(prefix),
            local_name: self.names.add(local),
            namespace: self.resolve(prefix, start)?,
        })
    }

    fn resolve(&self, prefix: &str, start: usize) -> Result<Name> {
        match self.namespaces.resolve(prefix) {
            Some(uri) => Ok(uri.clone()),
            None => Err(self.syntax(format!("Undeclared namespace prefix '{}'", prefix), start)),
        }
    }
}

impl XmlCursor for TextCursor {
    fn read(&mut self) -> Result<bool> {
        match self.state {
            ReadState::Closed | ReadState::EndOfFile | ReadState::Error => return Ok(false),
            ReadState::Initial => self.state = ReadState::Interactive,
            ReadState::Interactive => {}
        }

        self.advance().inspect_err(|_| {
            self.state = ReadState::Error;
            self.node = Node::none(&self.names);
        })
    }

    fn read_state(&self) -> ReadState {
        self.state
    }

    fn node_type(&self) -> NodeType {
        self.node.node_type
    }

    fn depth(&self) -> usize {
        self.node.depth
    }

    fn name(&self) -> &Name {
        &self.node.qname.name
    }

    fn local_name(&self) -> &Name {
        &self.node.qname.local_name
    }

    fn prefix(&self) -> &Name {
        &self.node.qname.prefix
    }

    fn namespace_uri(&self) -> &Name {
        &self.node.qname.namespace
    }

    fn value(&self) -> &str {
        &self.node.value
    }

    fn is_empty_element(&self) -> bool {
        self.node.is_empty
    }

    fn attributes(&self) -> &[XmlAttribute] {
        &self.node.attributes
    }

    fn name_table(&self) -> &NameTable {
        &self.names
    }

    fn close(&mut self) -> Result<()> {
        if self.state == ReadState::Closed {
            return Ok(());
        }
        self.state = ReadState::Closed;
        self.node = Node::none(&self.names);
        self.open.clear();

        let source = self.source.take();
        if let (true, Some(mut source)) = (self.close_input, source) {
            trace!("closing text cursor source");
            source.close().map_err(Error::from_io)?;
        }
        Ok(())
    }

    fn namespaces_in_scope(&self) -> Vec<(Name, Name)> {
        if self.state == ReadState::Interactive {
            self.namespaces.in_scope()
        } else {
            Vec::new()
        }
    }
}

impl Drop for TextCursor {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("error closing dropped text cursor: {}", err);
        }
    }
}
