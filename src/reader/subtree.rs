//! Sub-tree View
//!
//! Restricts a cursor to one element and its descendants. Depths are
//! reported relative to that element, and the view ends after its end tag.

use super::node::{NodeType, ReadState, XmlAttribute};
use super::XmlCursor;
use crate::error::Result;
use crate::names::{Name, NameTable};

pub struct SubtreeCursor<C: XmlCursor> {
    inner: C,
    root_depth: usize,
    state: ReadState,
    empty: Name,
}

impl<C: XmlCursor> SubtreeCursor<C> {
    /// Wrap a cursor positioned on an element, or one that will reach an
    /// element through `move_to_content`
    pub fn new(inner: C) -> Self {
        let empty = inner.name_table().empty();
        SubtreeCursor {
            root_depth: inner.depth(),
            inner,
            state: ReadState::Initial,
            empty,
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn positioned(&self) -> bool {
        self.state == ReadState::Interactive
    }

    /// True when the inner cursor sits on the last node of the sub-tree
    fn at_subtree_end(&self) -> bool {
        if self.inner.depth() != self.root_depth {
            return false;
        }
        match self.inner.node_type() {
            NodeType::EndElement => true,
            NodeType::Element => self.inner.is_empty_element(),
            _ => false,
        }
    }

    fn start(&mut self) -> Result<bool> {
        if self.inner.move_to_content()? != NodeType::Element {
            self.state = ReadState::EndOfFile;
            return Ok(false);
        }
        self.root_depth = self.inner.depth();
        self.state = ReadState::Interactive;
        Ok(true)
    }
}

impl<C: XmlCursor> XmlCursor for SubtreeCursor<C> {
    fn read(&mut self) -> Result<bool> {
        let result = match self.state {
            ReadState::Initial => self.start(),
            ReadState::Interactive if self.at_subtree_end() => {
                self.state = ReadState::EndOfFile;
                Ok(false)
            }
            ReadState::Interactive => match self.inner.read() {
                Ok(true) => Ok(true),
                Ok(false) => {
                    self.state = ReadState::EndOfFile;
                    Ok(false)
                }
                Err(err) => Err(err),
            },
            _ => Ok(false),
        };
        if result.is_err() {
            self.state = ReadState::Error;
        }
        result
    }

    fn read_state(&self) -> ReadState {
        self.state
    }

    fn node_type(&self) -> NodeType {
        if self.positioned() {
            self.inner.node_type()
        } else {
            NodeType::None
        }
    }

    fn depth(&self) -> usize {
        if self.positioned() {
            self.inner.depth().saturating_sub(self.root_depth)
        } else {
            0
        }
    }

    fn name(&self) -> &Name {
        if self.positioned() {
            self.inner.name()
        } else {
            &self.empty
        }
    }

    fn local_name(&self) -> &Name {
        if self.positioned() {
            self.inner.local_name()
        } else {
            &self.empty
        }
    }

    fn prefix(&self) -> &Name {
        if self.positioned() {
            self.inner.prefix()
        } else {
            &self.empty
        }
    }

    fn namespace_uri(&self) -> &Name {
        if self.positioned() {
            self.inner.namespace_uri()
        } else {
            &self.empty
        }
    }

    fn value(&self) -> &str {
        if self.positioned() {
            self.inner.value()
        } else {
            ""
        }
    }

    fn is_empty_element(&self) -> bool {
        self.positioned() && self.inner.is_empty_element()
    }

    fn attributes(&self) -> &[XmlAttribute] {
        if self.positioned() {
            self.inner.attributes()
        } else {
            &[]
        }
    }

    fn name_table(&self) -> &NameTable {
        self.inner.name_table()
    }

    fn close(&mut self) -> Result<()> {
        if self.state == ReadState::Closed {
            return Ok(());
        }
        self.state = ReadState::Closed;
        self.inner.close()
    }

    fn namespaces_in_scope(&self) -> Vec<(Name, Name)> {
        if self.positioned() {
            self.inner.namespaces_in_scope()
        } else {
            Vec::new()
        }
    }
}
