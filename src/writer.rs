//! XML Writer
//!
//! Serializes cursor nodes back into UTF-8 markup.
//!
//! The writer keeps track of the namespace declarations it has emitted.
//! An element whose prefix, or one of whose attributes' prefixes, is not
//! bound to the cursor's namespace URI in the output gets the missing
//! declaration added. The outermost element written also carries the
//! bindings the cursor has in scope there, so that a fragment copied out of
//! a larger document keeps the namespaces inherited from its ancestors.

use crate::core::entities::{escape_attribute, escape_text};
use crate::error::{Error, Result};
use crate::reader::{NodeType, XmlCursor};
use std::io::Write;

/// A namespace declaration present in the output
struct Binding {
    prefix: String,
    uri: String,
}

/// Writes the node a cursor is positioned on
pub struct XmlWriter<W: Write> {
    out: W,
    /// Declarations in effect in the output, innermost last
    bindings: Vec<Binding>,
    /// Length of `bindings` when each open element was started
    scopes: Vec<usize>,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        XmlWriter {
            out,
            bindings: Vec::new(),
            scopes: Vec::new(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write the current node; nothing for `NodeType::None`
    pub fn write_node<C: XmlCursor + ?Sized>(&mut self, cursor: &C) -> Result<()> {
        match cursor.node_type() {
            NodeType::Element => return self.write_start(cursor),
            NodeType::EndElement => {
                if let Some(mark) = self.scopes.pop() {
                    self.bindings.truncate(mark);
                }
            }
            _ => {}
        }

        let out = &mut self.out;
        match cursor.node_type() {
            NodeType::None | NodeType::Element => {}
            NodeType::EndElement => write!(out, "</{}>", cursor.name())?,
            NodeType::Text => out.write_all(escape_text(cursor.value()).as_bytes())?,
            NodeType::Whitespace => out.write_all(cursor.value().as_bytes())?,
            NodeType::CData => write!(out, "<![CDATA[{}]]>", cursor.value())?,
            NodeType::Comment => write!(out, "<!--{}-->", cursor.value())?,
            NodeType::ProcessingInstruction | NodeType::XmlDeclaration => {
                if cursor.value().is_empty() {
                    write!(out, "<?{}?>", cursor.name())?;
                } else {
                    write!(out, "<?{} {}?>", cursor.name(), cursor.value())?;
                }
            }
            NodeType::DocumentType => {
                if cursor.value().is_empty() {
                    write!(out, "<!DOCTYPE {}>", cursor.name())?;
                } else {
                    write!(out, "<!DOCTYPE {} {}>", cursor.name(), cursor.value())?;
                }
            }
        }
        Ok(())
    }

    fn write_start<C: XmlCursor + ?Sized>(&mut self, cursor: &C) -> Result<()> {
        let mark = self.bindings.len();
        let inherited = if self.scopes.is_empty() {
            cursor.namespaces_in_scope()
        } else {
            Vec::new()
        };

        write!(self.out, "<{}", cursor.name())?;
        for attr in cursor.attributes() {
            write!(self.out, " {}=\"{}\"", attr.qname.name, escape_attribute(&attr.value))?;
            if attr.is_namespace_declaration() {
                let prefix = if attr.qname.prefix.is_empty() { "" } else { attr.qname.local_name.as_str() };
                self.bindings.push(Binding {
                    prefix: prefix.to_string(),
                    uri: attr.value.clone(),
                });
            }
        }

        for (prefix, uri) in &inherited {
            let redeclared = self.bindings[mark..].iter().any(|b| b.prefix == prefix.as_str());
            if !redeclared {
                self.declare(prefix, uri)?;
            }
        }
        self.declare(cursor.prefix(), cursor.namespace_uri())?;
        for attr in cursor.attributes() {
            if !attr.qname.prefix.is_empty() && !attr.is_namespace_declaration() {
                self.declare(&attr.qname.prefix, &attr.qname.namespace)?;
            }
        }

        if cursor.is_empty_element() {
            self.out.write_all(b"/>")?;
            self.bindings.truncate(mark);
        } else {
            self.out.write_all(b">")?;
            self.scopes.push(mark);
        }
        Ok(())
    }

    /// URI bound to `prefix` in the output so far
    fn lookup(&self, prefix: &str) -> Option<&str> {
        match self.bindings.iter().rev().find(|b| b.prefix == prefix) {
            Some(binding) => Some(binding.uri.as_str()),
            None if prefix.is_empty() => Some(""),
            None => None,
        }
    }

    /// Emit a declaration unless the output already binds `prefix` to `uri`
    fn declare(&mut self, prefix: &str, uri: &str) -> Result<()> {
        if prefix == "xml" || self.lookup(prefix) == Some(uri) {
            return Ok(());
        }
        if prefix.is_empty() {
            write!(self.out, " xmlns=\"{}\"", escape_attribute(uri))?;
        } else {
            write!(self.out, " xmlns:{}=\"{}\"", prefix, escape_attribute(uri))?;
        }
        self.bindings.push(Binding {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
        });
        Ok(())
    }
}

/// Markup of the current node, including descendants for an element.
/// The cursor is left on the node after it.
pub fn read_outer_xml<C: XmlCursor + ?Sized>(cursor: &mut C) -> Result<String> {
    let mut writer = XmlWriter::new(Vec::new());

    match cursor.node_type() {
        NodeType::None | NodeType::EndElement => return Ok(String::new()),
        NodeType::Element if !cursor.is_empty_element() => {
            let depth = cursor.depth();
            writer.write_node(cursor)?;
            loop {
                if !cursor.read()? {
                    return Err(Error::InvalidState(
                        "cursor ended inside an element".to_string(),
                    ));
                }
                writer.write_node(cursor)?;
                if cursor.node_type() == NodeType::EndElement && cursor.depth() == depth {
                    break;
                }
            }
        }
        _ => writer.write_node(cursor)?,
    }
    cursor.read()?;

    String::from_utf8(writer.into_inner()).map_err(|e| Error::InvalidState(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{ReaderSettings, TextCursor};

    fn cursor(xml: &str) -> TextCursor {
        TextCursor::from_text(xml, &ReaderSettings::default())
    }

    fn copy_all(xml: &str) -> String {
        let mut cursor = cursor(xml);
        let mut writer = XmlWriter::new(Vec::new());
        while cursor.read().unwrap() {
            writer.write_node(&cursor).unwrap();
        }
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_copy_preserves_markup() {
        let xml = "<?xml version=\"1.0\"?><!DOCTYPE a><a xmlns=\"urn:a\" k=\"v\"><!--c--><?pi d?><b/> <![CDATA[<x>]]></a>";
        assert_eq!(copy_all(xml), xml);
    }

    #[test]
    fn test_escaping() {
        assert_eq!(
            copy_all("<a t=\"&quot;&lt;&amp;'\">1 &lt; 2 &amp;&amp; 3 &gt; 2</a>"),
            "<a t=\"&quot;&lt;&amp;'\">1 &lt; 2 &amp;&amp; 3 &gt; 2</a>"
        );
    }

    #[test]
    fn test_nested_fragment_declares_used_namespaces() {
        let mut outer = cursor("<wrap></wrap>");
        let mut inner = cursor("<r xmlns:p=\"urn:p\" xmlns=\"urn:d\"><p:a k=\"1\"><p:b/><c/></p:a></r>");
        let mut writer = XmlWriter::new(Vec::new());

        outer.read().unwrap();
        writer.write_node(&outer).unwrap();
        inner.read().unwrap();
        while inner.read().unwrap() && inner.depth() > 0 {
            writer.write_node(&inner).unwrap();
        }
        outer.read().unwrap();
        writer.write_node(&outer).unwrap();

        assert_eq!(
            String::from_utf8(writer.into_inner()).unwrap(),
            "<wrap><p:a k=\"1\" xmlns:p=\"urn:p\"><p:b/><c xmlns=\"urn:d\"/></p:a></wrap>"
        );
    }

    #[test]
    fn test_read_outer_xml_keeps_inherited_namespaces() {
        let mut cursor = cursor("<r xmlns=\"urn:r\" xmlns:x=\"urn:x\"><a><x:b/></a></r>");
        cursor.read().unwrap();
        cursor.read().unwrap();
        assert_eq!(
            cursor.read_outer_xml().unwrap(),
            "<a xmlns=\"urn:r\" xmlns:x=\"urn:x\"><x:b/></a>"
        );
    }

    #[test]
    fn test_read_outer_xml_element() {
        let mut cursor = cursor("<r><a x=\"1\"><b>t</b></a><c/></r>");
        cursor.read().unwrap();
        cursor.read().unwrap();
        assert_eq!(cursor.read_outer_xml().unwrap(), "<a x=\"1\"><b>t</b></a>");
        assert_eq!(cursor.name(), "c");
        assert_eq!(cursor.read_outer_xml().unwrap(), "<c/>");
        assert_eq!(cursor.node_type(), NodeType::EndElement);
        assert_eq!(cursor.read_outer_xml().unwrap(), "");
    }

    #[test]
    fn test_read_outer_xml_text() {
        let mut cursor = cursor("<r>a &amp; b<c/></r>");
        cursor.read().unwrap();
        cursor.read().unwrap();
        assert_eq!(cursor.read_outer_xml().unwrap(), "a &amp; b");
        assert_eq!(cursor.name(), "c");
    }

    #[test]
    fn test_read_outer_xml_before_first_read() {
        let mut cursor = cursor("<r/>");
        assert_eq!(cursor.read_outer_xml().unwrap(), "");
    }
}
