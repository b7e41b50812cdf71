//! Namespace Resolution
//!
//! Stack-based namespace resolver for XML namespace handling, working on
//! interned names so resolved URIs keep their identity.

use crate::names::{Name, NameTable};

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

/// Bindings every resolver starts with: default, `xml`, `xmlns`
const PREDECLARED: usize = 3;

/// Namespace binding (prefix -> URI)
#[derive(Debug, Clone)]
struct NsBinding {
    prefix: Name,
    uri: Name,
    depth: usize,
}

/// Stack-based namespace resolver
#[derive(Debug)]
pub struct NamespaceResolver {
    /// Stack of namespace bindings
    bindings: Vec<NsBinding>,
    /// Current element depth
    depth: usize,
    xml_prefix: Name,
    xmlns_prefix: Name,
    xmlns_uri: Name,
}

impl NamespaceResolver {
    /// Create a new namespace resolver with pre-declared xml and xmlns namespaces
    pub fn new(names: &NameTable) -> Self {
        let xml_prefix = names.add("xml");
        let xmlns_prefix = names.add("xmlns");
        let xmlns_uri = names.add(ns::XMLNS);

        let bindings = vec![
            NsBinding {
                prefix: names.empty(),
                uri: names.empty(),
                depth: 0,
            },
            NsBinding {
                prefix: xml_prefix.clone(),
                uri: names.add(ns::XML),
                depth: 0,
            },
            NsBinding {
                prefix: xmlns_prefix.clone(),
                uri: xmlns_uri.clone(),
                depth: 0,
            },
        ];

        NamespaceResolver {
            bindings,
            depth: 0,
            xml_prefix,
            xmlns_prefix,
            xmlns_uri,
        }
    }

    /// Enter a new element scope
    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave an element scope, removing any bindings declared in it
    pub fn pop_scope(&mut self) {
        while let Some(binding) = self.bindings.last() {
            if binding.depth < self.depth {
                break;
            }
            self.bindings.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Declare a namespace binding for the current scope; the empty prefix
    /// declares the default namespace
    pub fn declare(&mut self, prefix: Name, uri: Name) {
        // Don't allow redeclaring xml or xmlns
        if prefix == self.xml_prefix || prefix == self.xmlns_prefix {
            return;
        }

        self.bindings.push(NsBinding {
            prefix,
            uri,
            depth: self.depth,
        });
    }

    /// Resolve a prefix to a namespace URI
    pub fn resolve(&self, prefix: &str) -> Option<&Name> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix == *prefix)
            .map(|b| &b.uri)
    }

    /// Declared bindings currently in effect, outermost first
    ///
    /// Shadowed declarations and the predeclared bindings are left out.
    pub fn in_scope(&self) -> Vec<(Name, Name)> {
        let declared = &self.bindings[PREDECLARED.min(self.bindings.len())..];
        declared
            .iter()
            .enumerate()
            .filter(|(i, binding)| !declared[i + 1..].iter().any(|later| later.prefix == binding.prefix))
            .map(|(_, binding)| (binding.prefix.clone(), binding.uri.clone()))
            .collect()
    }

    /// True for the `xmlns` prefix itself
    pub fn is_xmlns(&self, prefix: &str) -> bool {
        self.xmlns_prefix == *prefix
    }

    /// URI reported for namespace declaration attributes
    pub fn xmlns_uri(&self) -> &Name {
        &self.xmlns_uri
    }

    /// Get current depth
    pub fn depth(&self) -> usize {
        self.depth
    }
}
