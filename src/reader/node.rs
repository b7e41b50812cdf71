//! XML Node Types
//!
//! Node, read-state and attribute types reported by pull cursors.

use crate::names::{Name, NameTable};
use memchr::memchr;

/// Kind of node a cursor is positioned on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Not positioned on a node (before the first read, at end of file, closed)
    None,
    /// Start tag or empty element: `<name attrs...>`, `<name/>`
    Element,
    /// End tag: `</name>`
    EndElement,
    /// Character data, entities decoded
    Text,
    /// Character data made only of XML whitespace
    Whitespace,
    /// CDATA section content
    CData,
    Comment,
    /// Processing instruction: `<?target data?>`
    ProcessingInstruction,
    /// XML declaration: `<?xml version="1.0"?>`
    XmlDeclaration,
    /// DOCTYPE declaration
    DocumentType,
}

impl NodeType {
    /// Nodes `move_to_content` stops on
    pub fn is_content(&self) -> bool {
        matches!(
            self,
            NodeType::Element | NodeType::EndElement | NodeType::Text | NodeType::CData
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::None => "none",
            NodeType::Element => "element",
            NodeType::EndElement => "end_element",
            NodeType::Text => "text",
            NodeType::Whitespace => "whitespace",
            NodeType::CData => "cdata",
            NodeType::Comment => "comment",
            NodeType::ProcessingInstruction => "processing_instruction",
            NodeType::XmlDeclaration => "xml_declaration",
            NodeType::DocumentType => "document_type",
        }
    }
}

/// Lifecycle of a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadState {
    /// Created, `read` not called yet
    Initial,
    /// Positioned on a node
    Interactive,
    /// All input consumed
    EndOfFile,
    /// A read failed; no further reads succeed
    Error,
    Closed,
}

/// Qualified name with its namespace resolved, every part interned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    /// Full name as written (`prefix:local` or `local`)
    pub name: Name,
    pub prefix: Name,
    pub local_name: Name,
    pub namespace: Name,
}

impl QName {
    /// Name without prefix or namespace (PI targets, DOCTYPE names)
    pub fn plain(names: &NameTable, name: &str) -> Self {
        let name = names.add(name);
        QName {
            local_name: name.clone(),
            name,
            prefix: names.empty(),
            namespace: names.empty(),
        }
    }

    /// The name reported for nodes without one
    pub fn empty(names: &NameTable) -> Self {
        let empty = names.empty();
        QName {
            name: empty.clone(),
            prefix: empty.clone(),
            local_name: empty.clone(),
            namespace: empty,
        }
    }
}

/// Split `prefix:local` into its parts; the prefix is empty when absent
pub fn split_name(name: &str) -> (&str, &str) {
    match memchr(b':', name.as_bytes()) {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("", name),
    }
}

/// An attribute of the current element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub qname: QName,
    /// Value with entities decoded
    pub value: String,
}

impl XmlAttribute {
    pub fn name(&self) -> &Name {
        &self.qname.name
    }

    /// True for `xmlns` and `xmlns:p` declarations
    pub fn is_namespace_declaration(&self) -> bool {
        self.qname.name == "xmlns" || self.qname.prefix == "xmlns"
    }
}
