//! Part Cursor
//!
//! Wraps the cursor of one part. Everything is delegated, except that depths
//! are shifted by the two framing levels (root and part wrapper) enclosing
//! the part in the composite document.

use crate::error::Result;
use crate::names::{Name, NameTable};
use crate::reader::{NodeType, ReadState, XmlAttribute, XmlCursor};

/// Levels of framing elements above a part's document element
pub const PART_DEPTH_OFFSET: usize = 2;

pub struct PartCursor<C: XmlCursor> {
    inner: C,
}

impl<C: XmlCursor> PartCursor<C> {
    pub fn new(inner: C) -> Self {
        PartCursor { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: XmlCursor> XmlCursor for PartCursor<C> {
    fn read(&mut self) -> Result<bool> {
        self.inner.read()
    }

    fn read_state(&self) -> ReadState {
        self.inner.read_state()
    }

    fn node_type(&self) -> NodeType {
        self.inner.node_type()
    }

    fn depth(&self) -> usize {
        self.inner.depth() + PART_DEPTH_OFFSET
    }

    fn name(&self) -> &Name {
        self.inner.name()
    }

    fn local_name(&self) -> &Name {
        self.inner.local_name()
    }

    fn prefix(&self) -> &Name {
        self.inner.prefix()
    }

    fn namespace_uri(&self) -> &Name {
        self.inner.namespace_uri()
    }

    fn value(&self) -> &str {
        self.inner.value()
    }

    fn is_empty_element(&self) -> bool {
        self.inner.is_empty_element()
    }

    fn attributes(&self) -> &[XmlAttribute] {
        self.inner.attributes()
    }

    fn name_table(&self) -> &NameTable {
        self.inner.name_table()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn namespaces_in_scope(&self) -> Vec<(Name, Name)> {
        self.inner.namespaces_in_scope()
    }
}
