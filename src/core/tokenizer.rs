//! XML Tokenizer - State machine for XML token extraction
//!
//! Implements a pull-parser style tokenizer that extracts XML tokens:
//! - Element start/end tags
//! - Text content
//! - CDATA sections
//! - Comments
//! - Processing instructions and the XML declaration
//! - DOCTYPE declarations
//!
//! The tokenizer keeps no state beyond its position, so a cursor can drop it
//! between tokens and resume later with [`Tokenizer::resume`].

use super::entities::decode_text;
use super::scanner::{is_whitespace, Scanner};
use std::borrow::Cow;

/// Current parsing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Initial state before parsing starts
    Init,
    /// Inside text content between tags
    InsideText,
    /// Inside a markup construct (<...>)
    InsideMarkup,
    /// End of input reached
    Done,
}

/// Type of XML token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Element start tag: <element>
    StartTag,
    /// Element end tag: </element>
    EndTag,
    /// Empty element: <element/>
    EmptyTag,
    /// Text content
    Text,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Comment: <!--...-->
    Comment,
    /// Processing instruction: <?target ...?>
    ProcessingInstruction,
    /// XML declaration: <?xml ...?>
    XmlDeclaration,
    /// DOCTYPE declaration
    DocType,
    /// End of file
    Eof,
}

/// A parsed XML token
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw span in input (start, end)
    pub span: (usize, usize),
    /// Element name, PI target or DOCTYPE name
    pub name: Option<&'a [u8]>,
    /// Text/CDATA/comment content (entity-decoded text), PI data,
    /// DOCTYPE body, or the raw attribute list of a start tag
    pub content: Option<Cow<'a, [u8]>>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, span: (usize, usize)) -> Self {
        Token {
            kind,
            span,
            name: None,
            content: None,
        }
    }

    fn with_name(mut self, name: &'a [u8]) -> Self {
        self.name = Some(name);
        self
    }

    fn with_content(mut self, content: Cow<'a, [u8]>) -> Self {
        self.content = Some(content);
        self
    }
}

/// Malformed markup, with the byte offset where it was detected
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

/// XML tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    state: ParseState,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer at the start of a document
    pub fn new(input: &'a [u8]) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            state: ParseState::Init,
        }
    }

    /// Continue tokenizing a document from a position returned by [`Tokenizer::position`]
    pub fn resume(input: &'a [u8], position: usize) -> Self {
        Tokenizer {
            scanner: Scanner::at(input, position),
            state: ParseState::InsideText,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Get the current position in the input
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// 1-based line and column of a byte offset
    pub fn line_col(&self, position: usize) -> (usize, usize) {
        self.scanner.line_col(position)
    }

    /// Get the next token; `Eof` once the input is exhausted
    pub fn next_token(&mut self) -> Result<Token<'a>, ParseError> {
        if self.state == ParseState::Init {
            // Leading whitespace before the prolog carries no information
            self.scanner.skip_whitespace();
            self.state = ParseState::InsideText;
        }

        if self.state == ParseState::Done || self.scanner.is_eof() {
            self.state = ParseState::Done;
            let pos = self.scanner.position();
            return Ok(Token::new(TokenKind::Eof, (pos, pos)));
        }

        match self.scanner.peek() {
            Some(b'<') => self.parse_markup(),
            _ => self.parse_text(),
        }
    }

    fn error<T>(&mut self, message: &str, position: usize) -> Result<T, ParseError> {
        self.state = ParseState::Done;
        Err(ParseError::new(message, position))
    }

    /// Parse markup starting with '<'
    fn parse_markup(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.scanner.position();
        self.scanner.advance(1); // Skip '<'
        self.state = ParseState::InsideMarkup;

        match self.scanner.peek() {
            Some(b'/') => self.parse_end_tag(start),
            Some(b'!') => self.parse_bang_markup(start),
            Some(b'?') => self.parse_pi(start),
            Some(_) => self.parse_start_tag(start),
            None => self.error("Unexpected end of input after '<'", start),
        }
    }

    /// Parse a start tag or empty element tag
    fn parse_start_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        let Some(name) = self.scanner.read_name() else {
            let pos = self.scanner.position();
            return self.error("Invalid element name: must start with letter, underscore, or colon", pos);
        };
        let attrs_start = self.scanner.position();

        // Find the end of the tag, handling quoted attributes
        let Some(end) = self.scanner.find_tag_end_quoted() else {
            return self.error("Unterminated start tag", start);
        };

        let is_empty = end > attrs_start && self.scanner.slice(end - 1, end) == b"/";
        let attrs_end = if is_empty { end - 1 } else { end };
        let attrs = self.scanner.slice(attrs_start, attrs_end);
        if attrs.first().is_some_and(|&b| !is_whitespace(b)) {
            return self.error("Invalid character in element name", attrs_start);
        }

        self.scanner.set_position(end + 1);
        self.state = ParseState::InsideText;

        let kind = if is_empty { TokenKind::EmptyTag } else { TokenKind::StartTag };
        Ok(Token::new(kind, (start, end + 1))
            .with_name(name)
            .with_content(Cow::Borrowed(attrs)))
    }

    /// Parse an end tag
    fn parse_end_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '/'

        let Some(name) = self.scanner.read_name() else {
            let pos = self.scanner.position();
            return self.error("Invalid element name in end tag", pos);
        };

        // Only whitespace may follow the name
        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(b'>') {
            let pos = self.scanner.position();
            return match self.scanner.find_tag_end() {
                Some(_) => self.error("End tag cannot have attributes or other content", pos),
                None => self.error("Unterminated end tag", start),
            };
        }

        self.scanner.advance(1);
        self.state = ParseState::InsideText;

        Ok(Token::new(TokenKind::EndTag, (start, self.scanner.position())).with_name(name))
    }

    /// Parse markup starting with '!' (comment, CDATA, DOCTYPE)
    fn parse_bang_markup(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '!'

        if self.scanner.starts_with(b"--") {
            self.scanner.advance(2);
            self.parse_delimited(start, b"-->", TokenKind::Comment, "Unterminated comment")
        } else if self.scanner.starts_with(b"[CDATA[") {
            self.scanner.advance(7);
            self.parse_delimited(start, b"]]>", TokenKind::CData, "Unterminated CDATA section")
        } else if self.scanner.starts_with(b"DOCTYPE") {
            self.parse_doctype(start)
        } else {
            self.error("Invalid declaration - expected comment, CDATA, or DOCTYPE", start)
        }
    }

    /// Parse the body of a comment or CDATA section up to its terminator
    fn parse_delimited(
        &mut self,
        start: usize,
        terminator: &[u8],
        kind: TokenKind,
        unterminated: &str,
    ) -> Result<Token<'a>, ParseError> {
        let content_start = self.scanner.position();
        let Some(end) = self.scanner.find_sequence(terminator) else {
            return self.error(unterminated, start);
        };

        let content = self.scanner.slice(content_start, end);
        self.scanner.set_position(end + terminator.len());
        self.state = ParseState::InsideText;

        Ok(Token::new(kind, (start, self.scanner.position())).with_content(Cow::Borrowed(content)))
    }

    /// Parse a DOCTYPE declaration, skipping over any internal subset
    fn parse_doctype(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(7); // Skip "DOCTYPE"
        self.scanner.skip_whitespace();

        let body_start = self.scanner.position();
        let Some(name) = self.scanner.read_name() else {
            let pos = self.scanner.position();
            return self.error("DOCTYPE name expected", pos);
        };

        let mut subset_depth = 0usize;
        let mut quote: Option<u8> = None;
        let mut end = None;
        for (offset, &b) in self.scanner.remaining().iter().enumerate() {
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => subset_depth += 1,
                (None, b']') => subset_depth = subset_depth.saturating_sub(1),
                (None, b'>') if subset_depth == 0 => {
                    end = Some(self.scanner.position() + offset);
                    break;
                }
                _ => {}
            }
        }

        let Some(end) = end else {
            return self.error("Unterminated DOCTYPE declaration", start);
        };

        let body = self.scanner.slice(body_start, end);
        self.scanner.set_position(end + 1);
        self.state = ParseState::InsideText;

        Ok(Token::new(TokenKind::DocType, (start, end + 1))
            .with_name(name)
            .with_content(Cow::Borrowed(body)))
    }

    /// Parse a processing instruction or the XML declaration
    fn parse_pi(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '?'

        let Some(name) = self.scanner.read_name() else {
            let pos = self.scanner.position();
            return self.error("Invalid processing instruction target", pos);
        };

        match self.scanner.peek() {
            Some(b) if is_whitespace(b) => self.scanner.skip_whitespace(),
            Some(b'?') => {}
            _ => {
                let pos = self.scanner.position();
                return self.error("Invalid character after PI target name", pos);
            }
        }

        let is_xml_decl = name == b"xml";
        if !is_xml_decl && name.eq_ignore_ascii_case(b"xml") {
            return self.error("Processing instruction target cannot be 'xml' (case-insensitive reserved name)", start);
        }

        let content_start = self.scanner.position();
        let Some(end) = self.scanner.find_sequence(b"?>") else {
            return self.error("Unterminated processing instruction", start);
        };

        let mut content = self.scanner.slice(content_start, end);
        while let Some((&last, rest)) = content.split_last() {
            if !is_whitespace(last) {
                break;
            }
            content = rest;
        }

        self.scanner.set_position(end + 2);
        self.state = ParseState::InsideText;

        let kind = if is_xml_decl { TokenKind::XmlDeclaration } else { TokenKind::ProcessingInstruction };
        Ok(Token::new(kind, (start, self.scanner.position()))
            .with_name(name)
            .with_content(Cow::Borrowed(content)))
    }

    /// Parse text content up to the next '<' or end of input
    fn parse_text(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.scanner.position();
        self.state = ParseState::InsideText;

        let end = self.scanner.find_tag_start().unwrap_or(start + self.scanner.remaining().len());
        let content = self.scanner.slice(start, end);
        let decoded = match decode_text(content) {
            Ok(decoded) => decoded,
            Err((offset, message)) => return self.error(message, start + offset),
        };
        self.scanner.set_position(end);

        Ok(Token::new(TokenKind::Text, (start, end)).with_content(decoded))
    }
}
