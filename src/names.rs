//! Shared Name Table
//!
//! Interning table for element names, attribute names, prefixes and
//! namespace URIs. Every string added to a table comes back as a [`Name`]
//! that shares one allocation with all other additions of the same content,
//! so two names from the same table can be compared by identity.
//!
//! A table is a cheap handle: cloning it shares the underlying storage. One
//! table is created per composite and handed to every cursor it drives.

use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard};

/// An interned name
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Arc<str>);

impl Name {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identity comparison: true only for names interned in the same table
    #[inline]
    pub fn same_as(&self, other: &Name) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Name {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
struct Entries {
    names: HashSet<Arc<str>>,
    empty: Arc<str>,
}

/// String interning table shared by every cursor of one composite
#[derive(Clone)]
pub struct NameTable {
    entries: Arc<Mutex<Entries>>,
}

impl NameTable {
    pub fn new() -> Self {
        let empty: Arc<str> = Arc::from("");
        let mut names = HashSet::with_capacity(64);
        names.insert(empty.clone());
        NameTable {
            entries: Arc::new(Mutex::new(Entries { names, empty })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // Interning never leaves the set half-updated, a poisoned lock is still usable
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Intern a string, returning the canonical instance for its content
    pub fn add(&self, s: &str) -> Name {
        let mut entries = self.lock();
        if let Some(existing) = entries.names.get(s) {
            return Name(existing.clone());
        }
        let name: Arc<str> = Arc::from(s);
        entries.names.insert(name.clone());
        Name(name)
    }

    /// Look up a string without adding it
    pub fn get(&self, s: &str) -> Option<Name> {
        self.lock().names.get(s).map(|n| Name(n.clone()))
    }

    /// The interned empty string
    pub fn empty(&self) -> Name {
        Name(self.lock().empty.clone())
    }

    /// Number of distinct strings, the empty string included
    pub fn len(&self) -> usize {
        self.lock().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Identity comparison: true when both handles share the same table
    pub fn same_as(&self, other: &NameTable) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NameTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameTable").field("len", &self.len()).finish()
    }
}
