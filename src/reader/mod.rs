//! XML Reader Module
//!
//! Forward-only pull cursors:
//! - XmlCursor: the cursor contract every reader implements
//! - TextCursor: parses one encoded source
//! - SubtreeCursor: view over one element of another cursor
//! - Node types, read states and configuration shared by all of them

pub mod node;
pub mod settings;
pub mod source;
pub mod subtree;
pub mod text;

pub use node::{NodeType, QName, ReadState, XmlAttribute};
pub use settings::ReaderSettings;
pub use source::{BoxedStream, InputStream};
pub use subtree::SubtreeCursor;
pub use text::TextCursor;

use crate::error::Result;
use crate::names::{Name, NameTable};

/// Forward-only cursor over an XML token stream
///
/// Every name a cursor reports is interned in the table returned by
/// [`XmlCursor::name_table`].
pub trait XmlCursor {
    /// Advance to the next node; `false` once the input is exhausted
    fn read(&mut self) -> Result<bool>;

    fn read_state(&self) -> ReadState;

    fn node_type(&self) -> NodeType;

    /// Nesting depth: 0 for the document element, 1 for its content
    fn depth(&self) -> usize;

    /// Qualified name; the target for PIs, empty for text nodes
    fn name(&self) -> &Name;

    fn local_name(&self) -> &Name;

    fn prefix(&self) -> &Name;

    fn namespace_uri(&self) -> &Name;

    /// Text of character data, comments, PI data, declarations
    fn value(&self) -> &str;

    fn is_empty_element(&self) -> bool;

    /// Attributes of the current element, in source order
    fn attributes(&self) -> &[XmlAttribute];

    fn name_table(&self) -> &NameTable;

    /// Release the cursor; calling it again is a no-op
    fn close(&mut self) -> Result<()>;

    /// Namespace declarations in effect at the current node, as
    /// `(prefix, uri)` pairs outermost first; the empty prefix is the
    /// default namespace
    fn namespaces_in_scope(&self) -> Vec<(Name, Name)> {
        Vec::new()
    }

    fn eof(&self) -> bool {
        self.read_state() == ReadState::EndOfFile
    }

    /// Value of the attribute with the given qualified name
    fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .iter()
            .find(|a| a.qname.name == *name)
            .map(|a| a.value.as_str())
    }

    /// Skip declarations, PIs, comments, DOCTYPE and whitespace
    fn move_to_content(&mut self) -> Result<NodeType> {
        loop {
            let node_type = self.node_type();
            if node_type.is_content() {
                return Ok(node_type);
            }
            if !self.read()? {
                return Ok(NodeType::None);
            }
        }
    }

    /// Markup of the current node and its descendants; leaves the cursor
    /// on the node following it
    fn read_outer_xml(&mut self) -> Result<String> {
        crate::writer::read_outer_xml(self)
    }
}

impl<C: XmlCursor + ?Sized> XmlCursor for Box<C> {
    fn read(&mut self) -> Result<bool> {
        (**self).read()
    }

    fn read_state(&self) -> ReadState {
        (**self).read_state()
    }

    fn node_type(&self) -> NodeType {
        (**self).node_type()
    }

    fn depth(&self) -> usize {
        (**self).depth()
    }

    fn name(&self) -> &Name {
        (**self).name()
    }

    fn local_name(&self) -> &Name {
        (**self).local_name()
    }

    fn prefix(&self) -> &Name {
        (**self).prefix()
    }

    fn namespace_uri(&self) -> &Name {
        (**self).namespace_uri()
    }

    fn value(&self) -> &str {
        (**self).value()
    }

    fn is_empty_element(&self) -> bool {
        (**self).is_empty_element()
    }

    fn attributes(&self) -> &[XmlAttribute] {
        (**self).attributes()
    }

    fn name_table(&self) -> &NameTable {
        (**self).name_table()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn namespaces_in_scope(&self) -> Vec<(Name, Name)> {
        (**self).namespaces_in_scope()
    }
}

/// Owned cursor of any kind, as accepted by the composite factory
pub type BoxedCursor = Box<dyn XmlCursor + Send>;
