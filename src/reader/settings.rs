//! Reader Configuration

use crate::names::NameTable;

/// Options applied when opening a cursor
#[derive(Debug, Clone, Default)]
pub struct ReaderSettings {
    /// Close the underlying input when the cursor is closed
    pub close_input: bool,
    /// Skip whitespace-only text nodes
    pub ignore_whitespace: bool,
    pub ignore_comments: bool,
    pub ignore_processing_instructions: bool,
    /// Interning table for names; `None` gives the cursor a table of its own
    pub name_table: Option<NameTable>,
}

impl ReaderSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_close_input(mut self, close_input: bool) -> Self {
        self.close_input = close_input;
        self
    }

    pub fn with_ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }

    pub fn with_ignore_comments(mut self, ignore: bool) -> Self {
        self.ignore_comments = ignore;
        self
    }

    pub fn with_ignore_processing_instructions(mut self, ignore: bool) -> Self {
        self.ignore_processing_instructions = ignore;
        self
    }

    pub fn with_name_table(mut self, names: NameTable) -> Self {
        self.name_table = Some(names);
        self
    }

    /// The configured table, or a fresh one
    pub fn resolve_name_table(&self) -> NameTable {
        self.name_table.clone().unwrap_or_default()
    }
}
