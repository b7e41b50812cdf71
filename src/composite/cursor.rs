//! Composite Cursor
//!
//! Reads the outline and every part in turn, so that the parts appear as
//! the content of their wrapper elements inside one aggregate document.
//! All cursors involved share one name table, created for the composite.

use super::outline::open_outline;
use super::part::PartCursor;
use super::state::{Source, State};
use super::translate::TranslatingStream;
use crate::error::{Error, Result};
use crate::names::{Name, NameTable};
use crate::reader::{
    BoxedCursor, BoxedStream, NodeType, ReadState, ReaderSettings, TextCursor, XmlAttribute,
    XmlCursor,
};
use log::{debug, trace, warn};
use std::io::Cursor;

pub struct CompositeCursor {
    outline: TextCursor,
    parts: Vec<PartCursor<TextCursor>>,
    names: NameTable,
    state: State,
    /// Part read by the content phases
    part_index: usize,
    /// Cursor positioned on the current node
    active: Source,
    read_state: ReadState,
}

impl CompositeCursor {
    /// Composite over byte sources, each possibly in its own encoding
    ///
    /// Parts are opened immediately. If one fails to open, every part opened
    /// so far is closed, as are the remaining sources when the settings ask
    /// for inputs to be closed.
    pub fn from_streams<I>(streams: I, settings: Option<&ReaderSettings>) -> Result<Self>
    where
        I: IntoIterator<Item = BoxedStream>,
    {
        let streams: Vec<BoxedStream> = streams.into_iter().collect();
        if streams.is_empty() {
            return Err(Error::EmptyParts { what: "streams" });
        }

        let settings = shared_settings(settings);
        let names = settings.resolve_name_table();
        let count = streams.len();

        let mut parts = Vec::with_capacity(count);
        let mut remaining = streams.into_iter();
        while let Some(stream) = remaining.next() {
            match TextCursor::open(stream, &settings) {
                Ok(cursor) => {
                    trace!("opened part {}", parts.len());
                    parts.push(PartCursor::new(cursor));
                }
                Err(err) => {
                    debug!("failed to open part {}: {}", parts.len(), err);
                    release(parts, remaining, settings.close_input);
                    return Err(err);
                }
            }
        }

        let outline = match open_outline(count, &settings) {
            Ok(outline) => outline,
            Err(err) => {
                release(parts, std::iter::empty(), settings.close_input);
                return Err(err);
            }
        };

        debug!("created composite of {} parts", count);
        Ok(CompositeCursor {
            outline,
            parts,
            names,
            state: State::INITIAL,
            part_index: 0,
            active: Source::Outline,
            read_state: ReadState::Initial,
        })
    }

    /// Composite over cursors built elsewhere
    ///
    /// Each cursor is re-serialized and reopened so that its names are
    /// interned in the composite's table. Unread cursors contribute their
    /// whole document, advanced ones the sub-tree at their current content.
    pub fn from_cursors<I>(cursors: I, settings: Option<&ReaderSettings>) -> Result<Self>
    where
        I: IntoIterator<Item = BoxedCursor>,
    {
        let cursors: Vec<BoxedCursor> = cursors.into_iter().collect();
        if cursors.is_empty() {
            return Err(Error::EmptyParts { what: "cursors" });
        }
        let close_input = settings.is_some_and(|s| s.close_input);

        let mut streams: Vec<BoxedStream> = Vec::with_capacity(cursors.len());
        let mut remaining = cursors.into_iter();
        while let Some(cursor) = remaining.next() {
            match TranslatingStream::new(cursor) {
                Ok(stream) => streams.push(Box::new(stream)),
                Err(err) => {
                    debug!("failed to translate cursor {}: {}", streams.len(), err);
                    if close_input {
                        for mut stream in streams {
                            if let Err(close_err) = stream.close() {
                                warn!("failed to close translated cursor: {}", close_err);
                            }
                        }
                        for mut cursor in remaining {
                            if let Err(close_err) = cursor.close() {
                                warn!("failed to close cursor: {}", close_err);
                            }
                        }
                    }
                    return Err(err);
                }
            }
        }

        Self::from_streams(streams, settings)
    }

    /// Composite over in-memory documents
    pub fn from_bytes<I, B>(parts: I, settings: Option<&ReaderSettings>) -> Result<Self>
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        let streams = parts
            .into_iter()
            .map(|bytes| Box::new(Cursor::new(bytes.into())) as BoxedStream);
        Self::from_streams(streams, settings)
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Index of the part being read, or last read
    pub fn part_index(&self) -> usize {
        self.part_index
    }

    pub fn outline(&self) -> &TextCursor {
        &self.outline
    }

    pub fn parts(&self) -> &[PartCursor<TextCursor>] {
        &self.parts
    }

    fn current(&self) -> &dyn XmlCursor {
        if self.active == Source::Part {
            if let Some(part) = self.parts.get(self.part_index) {
                return part;
            }
        }
        &self.outline
    }

    /// Advance through the phases until one produces a node or the outline ends
    fn advance(&mut self) -> Result<bool> {
        loop {
            let state = self.state;
            let source = state.source();
            let produced = match source {
                Source::Outline => {
                    self.active = Source::Outline;
                    self.outline.read()?
                }
                Source::Part => {
                    let index = self.part_index;
                    let part = self.parts.get_mut(index).ok_or_else(|| {
                        Error::InvalidState(format!("part index {} out of range in {:?}", index, state))
                    })?;
                    self.active = Source::Part;
                    if state == State::MessagePartDocumentElement {
                        read_document_element(part, index)?
                    } else {
                        part.read()?
                    }
                }
            };

            let more_parts = self.part_index + 1 < self.parts.len();
            let next = state.next(produced, more_parts);
            if state.advances_part(next) {
                self.part_index += 1;
            }
            if next != state {
                trace!("composite {:?} -> {:?} (part {})", state, next, self.part_index);
            }
            self.state = next;

            if produced {
                return Ok(true);
            }
            if source == Source::Outline {
                if state != State::RootAggregateClosingTag {
                    return Err(Error::InvalidState(format!("outline ended in {:?}", state)));
                }
                self.read_state = ReadState::EndOfFile;
                debug!("composite of {} parts reached end of document", self.parts.len());
                return Ok(false);
            }
        }
    }
}

/// Settings for every cursor of one composite: the caller's options with a
/// fresh name table of the composite's own
fn shared_settings(settings: Option<&ReaderSettings>) -> ReaderSettings {
    settings
        .cloned()
        .unwrap_or_default()
        .with_name_table(NameTable::new())
}

/// Move a part to its document element, skipping its prolog
fn read_document_element(part: &mut PartCursor<TextCursor>, index: usize) -> Result<bool> {
    while part.read()? {
        if part.node_type() == NodeType::Element {
            return Ok(true);
        }
        trace!("skipping {} before document element of part {}", part.node_type().as_str(), index);
    }
    Ok(false)
}

/// Close what a failed construction already opened
fn release<I>(parts: Vec<PartCursor<TextCursor>>, unopened: I, close_input: bool)
where
    I: IntoIterator<Item = BoxedStream>,
{
    for (i, mut part) in parts.into_iter().enumerate() {
        if let Err(err) = part.close() {
            warn!("failed to close part {}: {}", i, err);
        }
    }
    if close_input {
        for mut stream in unopened {
            if let Err(err) = stream.close() {
                warn!("failed to close unopened part: {}", err);
            }
        }
    }
}

impl XmlCursor for CompositeCursor {
    fn read(&mut self) -> Result<bool> {
        match self.read_state {
            ReadState::Initial => self.read_state = ReadState::Interactive,
            ReadState::Interactive => {}
            ReadState::EndOfFile | ReadState::Error | ReadState::Closed => return Ok(false),
        }

        self.advance().inspect_err(|err| {
            debug!("composite read failed in {:?} (part {}): {}", self.state, self.part_index, err);
            self.read_state = ReadState::Error;
        })
    }

    fn read_state(&self) -> ReadState {
        self.read_state
    }

    fn node_type(&self) -> NodeType {
        self.current().node_type()
    }

    fn depth(&self) -> usize {
        self.current().depth()
    }

    fn name(&self) -> &Name {
        self.current().name()
    }

    fn local_name(&self) -> &Name {
        self.current().local_name()
    }

    fn prefix(&self) -> &Name {
        self.current().prefix()
    }

    fn namespace_uri(&self) -> &Name {
        self.current().namespace_uri()
    }

    fn value(&self) -> &str {
        self.current().value()
    }

    fn is_empty_element(&self) -> bool {
        self.current().is_empty_element()
    }

    fn attributes(&self) -> &[XmlAttribute] {
        self.current().attributes()
    }

    fn name_table(&self) -> &NameTable {
        &self.names
    }

    /// The outline's bindings, overridden by those of the active part
    fn namespaces_in_scope(&self) -> Vec<(Name, Name)> {
        let mut bindings = self.outline.namespaces_in_scope();
        if self.active == Source::Part {
            if let Some(part) = self.parts.get(self.part_index) {
                for (prefix, uri) in part.namespaces_in_scope() {
                    bindings.retain(|(outer, _)| *outer != prefix);
                    bindings.push((prefix, uri));
                }
            }
        }
        bindings
    }

    /// Close the outline and every part, whichever phase is active
    fn close(&mut self) -> Result<()> {
        if self.read_state == ReadState::Closed {
            return Ok(());
        }
        self.read_state = ReadState::Closed;
        self.active = Source::Outline;
        trace!("closing composite of {} parts", self.parts.len());

        let mut failure: Option<Error> = None;
        let mut record = |what: &str, result: Result<()>| {
            if let Err(err) = result {
                match failure {
                    None => failure = Some(err),
                    Some(_) => warn!("failed to close {}: {}", what, err),
                }
            }
        };

        record("outline", self.outline.close());
        for (i, part) in self.parts.iter_mut().enumerate() {
            record(&format!("part {}", i), part.close());
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for CompositeCursor {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("error closing dropped composite: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoding::XmlEncoding;
    use crate::reader::source::testing::{count, CountingStream};
    use crate::writer::XmlWriter;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    const PART_ONE: &str = "<part-one xmlns=\"part-one\"><child-one>one</child-one></part-one>";
    const PART_TWO: &str = "<part-two xmlns=\"part-two\"><child-two>two</child-two></part-two>";
    const PART_SIX: &str = "<part-six xmlns=\"part-six\"><child-six>six</child-six></part-six>";

    const EXPECTED: &str = "<agg:Root xmlns:agg=\"http://schemas.microsoft.com/BizTalk/2003/aggschema\">\
        <agg:InputMessagePart_0><part-one xmlns=\"part-one\"><child-one>one</child-one></part-one></agg:InputMessagePart_0>\
        <agg:InputMessagePart_1><part-two xmlns=\"part-two\"><child-two>two</child-two></part-two></agg:InputMessagePart_1>\
        <agg:InputMessagePart_2><part-six xmlns=\"part-six\"><child-six>six</child-six></part-six></agg:InputMessagePart_2>\
        </agg:Root>";

    fn declared(encoding: &str, body: &str) -> String {
        format!("<?xml version=\"1.0\" encoding=\"{}\"?>{}", encoding, body)
    }

    /// The three parts in UTF-8, UTF-16 (little endian, no BOM) and ISO-8859-1
    fn encoded_parts() -> Vec<Vec<u8>> {
        vec![
            XmlEncoding::Utf8.encode(&declared("utf-8", PART_ONE)).unwrap(),
            XmlEncoding::Utf16Le.encode(&declared("utf-16", PART_TWO)).unwrap(),
            XmlEncoding::Latin1.encode(&declared("iso-8859-1", PART_SIX)).unwrap(),
        ]
    }

    fn streams(parts: Vec<Vec<u8>>) -> Vec<BoxedStream> {
        parts
            .into_iter()
            .map(|bytes| Box::new(Cursor::new(bytes)) as BoxedStream)
            .collect()
    }

    fn counting(parts: &[&str]) -> (Vec<BoxedStream>, Vec<Arc<AtomicUsize>>) {
        parts.iter().map(|xml| CountingStream::boxed(xml.as_bytes())).unzip()
    }

    fn closing() -> ReaderSettings {
        ReaderSettings::new().with_close_input(true)
    }

    fn serialize<C: XmlCursor>(cursor: &mut C) -> String {
        let mut writer = XmlWriter::new(Vec::new());
        while cursor.read().unwrap() {
            writer.write_node(&*cursor).unwrap();
        }
        String::from_utf8(writer.into_inner()).unwrap()
    }

    fn closes(counters: &[Arc<AtomicUsize>]) -> Vec<usize> {
        counters.iter().map(count).collect()
    }

    #[test]
    fn test_streams_in_three_encodings() {
        let mut composite = CompositeCursor::from_streams(streams(encoded_parts()), None).unwrap();
        assert_eq!(serialize(&mut composite), EXPECTED);
        assert!(composite.eof());
    }

    #[test]
    fn test_read_outer_xml_of_root() {
        let mut composite = CompositeCursor::from_bytes(encoded_parts(), None).unwrap();
        assert_eq!(composite.move_to_content().unwrap(), NodeType::Element);
        assert_eq!(composite.read_outer_xml().unwrap(), EXPECTED);
    }

    #[test]
    fn test_uninitialized_cursors() {
        let cursors: Vec<BoxedCursor> = encoded_parts()
            .into_iter()
            .map(|bytes| Box::new(TextCursor::from_bytes(bytes, &ReaderSettings::default()).unwrap()) as BoxedCursor)
            .collect();
        let mut composite = CompositeCursor::from_cursors(cursors, None).unwrap();
        assert_eq!(serialize(&mut composite), EXPECTED);
    }

    #[test]
    fn test_initialized_cursors() {
        let cursors: Vec<BoxedCursor> = encoded_parts()
            .into_iter()
            .map(|bytes| {
                let mut cursor = TextCursor::from_bytes(bytes, &ReaderSettings::default()).unwrap();
                assert_eq!(cursor.move_to_content().unwrap(), NodeType::Element);
                Box::new(cursor) as BoxedCursor
            })
            .collect();
        let mut composite = CompositeCursor::from_cursors(cursors, None).unwrap();
        assert_eq!(serialize(&mut composite), EXPECTED);
    }

    #[test]
    fn test_non_ascii_content_survives_every_encoding() {
        let parts = vec![
            XmlEncoding::Utf8.encode(&declared("utf-8", "<a>\u{20ac}uro</a>")).unwrap(),
            XmlEncoding::Utf16Be.encode(&format!("\u{feff}{}", declared("utf-16", "<b>\u{3b1}\u{3b2}</b>"))).unwrap(),
            XmlEncoding::Latin1.encode(&declared("ISO-8859-1", "<c>caf\u{e9}</c>")).unwrap(),
        ];
        let xml = crate::composite::aggregate(parts).unwrap();
        assert!(xml.contains("<a>\u{20ac}uro</a>"));
        assert!(xml.contains("<b>\u{3b1}\u{3b2}</b>"));
        assert!(xml.contains("<c>caf\u{e9}</c>"));
        assert!(!xml.contains("<?xml"));
    }

    #[test]
    fn test_name_table_shared_by_every_cursor() {
        let caller_table = NameTable::new();
        let settings = ReaderSettings::new().with_name_table(caller_table.clone());
        let composite = CompositeCursor::from_bytes(encoded_parts(), Some(&settings)).unwrap();

        assert!(!composite.name_table().same_as(&caller_table));
        assert!(composite.outline().name_table().same_as(composite.name_table()));
        for part in composite.parts() {
            assert!(part.name_table().same_as(composite.name_table()));
        }
    }

    #[test]
    fn test_names_identical_across_parts() {
        let mut composite = CompositeCursor::from_bytes(vec!["<doc><x/></doc>", "<doc><x/></doc>"], None).unwrap();
        let mut docs: Vec<Name> = Vec::new();
        while composite.read().unwrap() {
            if composite.node_type() == NodeType::Element && composite.name() == "doc" {
                docs.push(composite.name().clone());
            }
        }
        assert_eq!(docs.len(), 2);
        assert!(docs[0].same_as(&docs[1]));
        assert!(docs[0].same_as(&composite.name_table().add("doc")));
    }

    #[test]
    fn test_advanced_cursors_keep_inherited_namespaces() {
        let advanced = |xml: &str| {
            let mut cursor = TextCursor::from_text(xml, &ReaderSettings::default());
            cursor.read().unwrap();
            cursor.read().unwrap();
            cursor
        };
        let default_ns = advanced("<r xmlns=\"urn:r\"><a/></r>");
        assert_eq!(default_ns.namespace_uri(), "urn:r");
        let prefixed = advanced("<r xmlns:p=\"urn:p\"><p:a><p:b/></p:a></r>");
        assert_eq!(prefixed.namespace_uri(), "urn:p");

        let cursors = vec![Box::new(default_ns) as BoxedCursor, Box::new(prefixed) as BoxedCursor];
        let mut composite = CompositeCursor::from_cursors(cursors, None).unwrap();
        let mut elements = Vec::new();
        while composite.read().unwrap() {
            if composite.node_type() == NodeType::Element && composite.depth() >= 2 {
                elements.push(format!("{} {}", composite.name(), composite.namespace_uri()));
            }
        }
        assert_eq!(elements, vec!["a urn:r", "p:a urn:p", "p:b urn:p"]);
    }

    #[test]
    fn test_ignore_options_reach_parts() {
        let settings = ReaderSettings::new()
            .with_ignore_whitespace(true)
            .with_ignore_comments(true);
        let part = "<a>\n  <!--note-->\n  <b>x</b>\n</a>";
        let mut composite = CompositeCursor::from_bytes(vec![part], Some(&settings)).unwrap();

        let mut kinds = Vec::new();
        let mut writer = XmlWriter::new(Vec::new());
        while composite.read().unwrap() {
            kinds.push(composite.node_type());
            writer.write_node(&composite).unwrap();
        }
        assert!(!kinds.contains(&NodeType::Whitespace));
        assert!(!kinds.contains(&NodeType::Comment));
        let xml = String::from_utf8(writer.into_inner()).unwrap();
        assert!(xml.contains("<agg:InputMessagePart_0><a><b>x</b></a></agg:InputMessagePart_0>"));

        let mut plain = CompositeCursor::from_bytes(vec![part], None).unwrap();
        let mut plain_kinds = Vec::new();
        while plain.read().unwrap() {
            plain_kinds.push(plain.node_type());
        }
        assert!(plain_kinds.contains(&NodeType::Whitespace));
        assert!(plain_kinds.contains(&NodeType::Comment));
    }

    #[test]
    fn test_depths() {
        let mut composite = CompositeCursor::from_bytes(vec![PART_ONE, PART_TWO], None).unwrap();
        let mut seen = Vec::new();
        while composite.read().unwrap() {
            seen.push((composite.node_type(), composite.depth(), composite.local_name().to_string()));
        }

        let mut expected = vec![
            (NodeType::Element, 0, "Root".to_string()),
        ];
        for (i, part) in [PART_ONE, PART_TWO].iter().enumerate() {
            let wrapper = format!("InputMessagePart_{}", i);
            expected.push((NodeType::Element, 1, wrapper.clone()));
            let mut standalone = TextCursor::from_text(*part, &ReaderSettings::default());
            while standalone.read().unwrap() {
                expected.push((standalone.node_type(), standalone.depth() + 2, standalone.local_name().to_string()));
            }
            expected.push((NodeType::EndElement, 1, wrapper));
        }
        expected.push((NodeType::EndElement, 0, "Root".to_string()));

        assert_eq!(seen, expected);
    }

    #[test]
    fn test_state_progression() {
        let mut composite = CompositeCursor::from_bytes(vec!["<a/>", "<b/>"], None).unwrap();
        assert_eq!(composite.read_state(), ReadState::Initial);
        assert_eq!(composite.node_type(), NodeType::None);

        let mut trace = Vec::new();
        while composite.read().unwrap() {
            trace.push((composite.name().to_string(), composite.part_index()));
        }
        assert_eq!(
            trace,
            vec![
                ("agg:Root".to_string(), 0),
                ("agg:InputMessagePart_0".to_string(), 0),
                ("a".to_string(), 0),
                ("agg:InputMessagePart_0".to_string(), 1),
                ("agg:InputMessagePart_1".to_string(), 1),
                ("b".to_string(), 1),
                ("agg:InputMessagePart_1".to_string(), 1),
                ("agg:Root".to_string(), 1),
            ]
        );
        assert_eq!(composite.state(), State::RootAggregateClosingTag);
        assert_eq!(composite.read_state(), ReadState::EndOfFile);
        assert_eq!(composite.node_type(), NodeType::None);
        assert!(!composite.read().unwrap());
    }

    #[test]
    fn test_prolog_skipped_epilog_kept() {
        let part = "<?xml version=\"1.0\"?>\n<!DOCTYPE a>\n<?pi x?>\n<!--before-->\n<a/><!--after-->";
        let xml = crate::composite::aggregate(vec![part]).unwrap();
        assert!(xml.contains("<agg:InputMessagePart_0><a/><!--after--></agg:InputMessagePart_0>"));
        assert!(!xml.contains("before"));
        assert!(!xml.contains("DOCTYPE"));
        assert!(!xml.contains("pi x"));
    }

    #[test]
    fn test_part_error_propagates() {
        let mut composite = CompositeCursor::from_bytes(vec!["<a/>", "<b></c>"], None).unwrap();
        let err = loop {
            match composite.read() {
                Ok(true) => continue,
                Ok(false) => panic!("expected a read error"),
                Err(err) => break err,
            }
        };
        assert!(matches!(err, Error::Syntax { .. }));
        assert_eq!(composite.read_state(), ReadState::Error);
        assert!(!composite.read().unwrap());
        composite.close().unwrap();
    }

    #[test]
    fn test_empty_parts_rejected() {
        let err = CompositeCursor::from_streams(Vec::new(), None).err().unwrap();
        assert_eq!(err.to_string(), "List of compound streams is empty");

        let err = CompositeCursor::from_cursors(Vec::new(), None).err().unwrap();
        assert_eq!(err.to_string(), "List of compound cursors is empty");
    }

    #[test]
    fn test_close_immediately() {
        let (streams, counters) = counting(&[PART_ONE, PART_TWO, PART_SIX]);
        let mut composite = CompositeCursor::from_streams(streams, Some(&closing())).unwrap();
        composite.close().unwrap();
        assert_eq!(closes(&counters), vec![1, 1, 1]);
        assert_eq!(composite.read_state(), ReadState::Closed);
        assert!(!composite.read().unwrap());
    }

    #[test]
    fn test_close_mid_read() {
        for reads in 1..12 {
            let (streams, counters) = counting(&[PART_ONE, PART_TWO, PART_SIX]);
            let mut composite = CompositeCursor::from_streams(streams, Some(&closing())).unwrap();
            for _ in 0..reads {
                composite.read().unwrap();
            }
            composite.close().unwrap();
            assert_eq!(closes(&counters), vec![1, 1, 1], "after {} reads", reads);
        }
    }

    #[test]
    fn test_close_after_eof_and_twice() {
        let (streams, counters) = counting(&[PART_ONE, PART_TWO]);
        let mut composite = CompositeCursor::from_streams(streams, Some(&closing())).unwrap();
        while composite.read().unwrap() {}
        composite.close().unwrap();
        composite.close().unwrap();
        drop(composite);
        assert_eq!(closes(&counters), vec![1, 1]);
    }

    #[test]
    fn test_drop_closes_parts() {
        let (streams, counters) = counting(&[PART_ONE, PART_TWO]);
        let mut composite = CompositeCursor::from_streams(streams, Some(&closing())).unwrap();
        composite.read().unwrap();
        drop(composite);
        assert_eq!(closes(&counters), vec![1, 1]);
    }

    #[test]
    fn test_failed_part_close_still_closes_the_rest() {
        let (first, first_closes) = CountingStream::boxed(PART_ONE);
        let (second, second_closes) = CountingStream::failing(PART_TWO);
        let (third, third_closes) = CountingStream::boxed(PART_SIX);
        let counters = [first_closes, second_closes, third_closes];

        let mut composite = CompositeCursor::from_streams(vec![first, second, third], Some(&closing())).unwrap();
        composite.read().unwrap();
        assert!(matches!(composite.close(), Err(Error::Io(_))));
        assert_eq!(closes(&counters), vec![1, 1, 1]);
        assert_eq!(composite.read_state(), ReadState::Closed);

        composite.close().unwrap();
        drop(composite);
        assert_eq!(closes(&counters), vec![1, 1, 1]);
    }

    #[test]
    fn test_first_close_failure_is_returned() {
        let (first, first_closes) = CountingStream::failing(PART_ONE);
        let (second, second_closes) = CountingStream::failing(PART_TWO);
        let counters = [first_closes, second_closes];

        let mut composite = CompositeCursor::from_streams(vec![first, second], Some(&closing())).unwrap();
        match composite.close() {
            Err(Error::Io(err)) => assert_eq!(err.to_string(), "close failed"),
            other => panic!("unexpected close result {:?}", other),
        }
        assert_eq!(closes(&counters), vec![1, 1]);
    }

    #[test]
    fn test_inputs_left_open_by_default() {
        let (streams, counters) = counting(&[PART_ONE, PART_TWO]);
        let mut composite = CompositeCursor::from_streams(streams, None).unwrap();
        composite.close().unwrap();
        assert_eq!(closes(&counters), vec![0, 0]);
    }

    #[test]
    fn test_failed_construction_releases_everything() {
        let unsupported = "<?xml version=\"1.0\" encoding=\"shift_jis\"?><b/>";
        let (streams, counters) = counting(&[PART_ONE, unsupported, PART_SIX]);
        let result = CompositeCursor::from_streams(streams, Some(&closing()));
        assert!(matches!(result, Err(Error::UnsupportedEncoding(_))));
        assert_eq!(closes(&counters), vec![1, 1, 1]);
    }
}
