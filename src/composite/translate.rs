//! Translating Stream
//!
//! Turns a cursor back into a byte source: each node of the cursor is
//! written as UTF-8 markup when the stream is read. Reopening that stream
//! with a [`TextCursor`](crate::reader::TextCursor) gives a cursor whose names
//! are interned in whatever table the reopening settings carry.

use crate::error::{Error, Result};
use crate::reader::{BoxedCursor, InputStream, NodeType, ReadState, SubtreeCursor, XmlCursor};
use crate::writer::XmlWriter;
use log::trace;
use std::io::{self, Read};

pub struct TranslatingStream {
    cursor: BoxedCursor,
    writer: XmlWriter<Vec<u8>>,
    /// Read offset into the writer's buffer
    offset: usize,
    done: bool,
}

impl TranslatingStream {
    /// Translate the remaining content of `cursor`
    ///
    /// An unread cursor is translated whole; one that has been advanced is
    /// moved to content and translated from that node to the end of its
    /// sub-tree.
    pub fn new(mut cursor: BoxedCursor) -> Result<Self> {
        if cursor.read_state() != ReadState::Initial {
            cursor.move_to_content()?;
            trace!("translating sub-tree of '{}'", cursor.name());
            cursor = Box::new(SubtreeCursor::new(cursor));
        }
        Ok(TranslatingStream {
            cursor,
            writer: XmlWriter::new(Vec::with_capacity(4096)),
            offset: 0,
            done: false,
        })
    }

    /// Refill the buffer with at least one node, unless the cursor is exhausted
    fn fill(&mut self) -> Result<()> {
        if self.offset < self.writer.get_ref().len() || self.done {
            return Ok(());
        }
        self.offset = 0;
        self.writer.get_mut().clear();

        while self.writer.get_ref().is_empty() {
            if !self.cursor.read()? {
                self.done = true;
                return Ok(());
            }
            // The reopened text is always UTF-8; a declaration would contradict it
            if self.cursor.node_type() != NodeType::XmlDeclaration {
                self.writer.write_node(&self.cursor)?;
            }
        }
        Ok(())
    }
}

impl Read for TranslatingStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.fill().map_err(Error::into_io)?;
        let pending = &self.writer.get_ref()[self.offset..];
        let len = pending.len().min(buf.len());
        buf[..len].copy_from_slice(&pending[..len]);
        self.offset += len;
        Ok(len)
    }
}

impl InputStream for TranslatingStream {
    fn close(&mut self) -> io::Result<()> {
        self.cursor.close().map_err(Error::into_io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::source::read_all;
    use crate::reader::{ReaderSettings, TextCursor};

    fn boxed(xml: &str) -> BoxedCursor {
        Box::new(TextCursor::from_text(xml, &ReaderSettings::default()))
    }

    fn translate(cursor: BoxedCursor) -> String {
        let mut stream = TranslatingStream::new(cursor).unwrap();
        String::from_utf8(read_all(&mut stream).unwrap()).unwrap()
    }

    #[test]
    fn test_unread_cursor_translated_whole() {
        let xml = "<?xml version=\"1.0\" encoding=\"utf-16\"?><!--c--><a x=\"&amp;\"><b>t</b></a>";
        assert_eq!(translate(boxed(xml)), "<!--c--><a x=\"&amp;\"><b>t</b></a>");
    }

    #[test]
    fn test_advanced_cursor_translates_subtree() {
        let mut cursor = boxed("<?xml version=\"1.0\"?><a><b/></a>");
        cursor.read().unwrap();
        assert_eq!(translate(cursor), "<a><b/></a>");
    }

    #[test]
    fn test_subtree_keeps_inherited_default_namespace() {
        let mut cursor = boxed("<r xmlns=\"urn:r\"><a/></r>");
        cursor.read().unwrap();
        cursor.read().unwrap();
        assert_eq!(translate(cursor), "<a xmlns=\"urn:r\"/>");
    }

    #[test]
    fn test_subtree_keeps_inherited_prefixes() {
        let mut cursor = boxed("<r xmlns:p=\"urn:p\" xmlns:q=\"urn:q\"><p:a><b q:k=\"v\"/></p:a></r>");
        cursor.read().unwrap();
        cursor.read().unwrap();
        assert_eq!(
            translate(cursor),
            "<p:a xmlns:p=\"urn:p\" xmlns:q=\"urn:q\"><b q:k=\"v\"/></p:a>"
        );
    }

    #[test]
    fn test_small_reads() {
        let mut stream = TranslatingStream::new(boxed("<a>text</a>")).unwrap();
        let mut out = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, b"<a>text</a>");
    }

    #[test]
    fn test_reopened_cursor_uses_new_table() {
        let names = crate::names::NameTable::new();
        let settings = ReaderSettings::new().with_name_table(names.clone());
        let stream = TranslatingStream::new(boxed("<a><b/></a>")).unwrap();
        let mut reopened = TextCursor::open(Box::new(stream), &settings).unwrap();
        reopened.read().unwrap();
        assert!(reopened.name_table().same_as(&names));
        assert!(reopened.name().same_as(&names.add("a")));
    }

    #[test]
    fn test_cursor_error_survives_io() {
        let stream = TranslatingStream::new(boxed("<a></b>")).unwrap();
        match TextCursor::open(Box::new(stream), &ReaderSettings::default()) {
            Err(Error::Syntax { message, .. }) => assert!(message.starts_with("Mismatched end tag")),
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_close_closes_cursor() {
        let mut stream = TranslatingStream::new(boxed("<a/>")).unwrap();
        stream.close().unwrap();
        assert_eq!(stream.cursor.read_state(), ReadState::Closed);
    }
}
