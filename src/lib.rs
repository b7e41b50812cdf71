//! CompositeXml - Several XML documents read as one
//!
//! Parts in any supported encoding are presented through one forward-only
//! cursor as the content of wrapper elements inside a synthetic aggregate
//! root, every cursor sharing one name table.
//!
//! Layers:
//! - core: scanning, tokenizing, entities, attributes, encodings
//! - reader: the cursor contract and the text cursor
//! - composite: outline, part cursors, the composite state machine
//! - NIFs: composite cursors and aggregation for BEAM callers

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

pub mod composite;
pub mod core;
pub mod error;
pub mod names;
pub mod namespace;
pub mod reader;
pub mod resource;
pub mod term;
pub mod writer;

pub use composite::{aggregate, CompositeCursor};
pub use error::{Error, Result};
pub use names::{Name, NameTable};
pub use reader::{
    BoxedCursor, BoxedStream, InputStream, NodeType, ReadState, ReaderSettings, SubtreeCursor,
    TextCursor, XmlAttribute, XmlCursor,
};
pub use writer::XmlWriter;

use resource::{CompositeRef, CompositeResource};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Composite Cursor NIFs
// ============================================================================

fn part_bytes(parts: &[Binary]) -> Vec<Vec<u8>> {
    parts.iter().map(|b| b.as_slice().to_vec()).collect()
}

/// Open a composite over the given documents
/// Returns {:ok, ref} or {:error, reason}
#[rustler::nif]
fn composite_open<'a>(env: Env<'a>, parts: Vec<Binary<'a>>) -> NifResult<Term<'a>> {
    match CompositeCursor::from_bytes(part_bytes(&parts), None) {
        Ok(cursor) => {
            let arc = ResourceArc::new(CompositeResource::new(cursor));
            Ok(term::ok_to_term(env, arc.encode(env)))
        }
        Err(err) => Ok(term::crate_error_to_term(env, &err)),
    }
}

/// Read up to `max` nodes
/// Returns {:ok, nodes}, an empty list once the document is exhausted
#[rustler::nif]
fn composite_read<'a>(env: Env<'a>, composite: CompositeRef, max: usize) -> NifResult<Term<'a>> {
    let result = composite.with_cursor(|cursor| -> Result<Vec<Term<'a>>> {
        let mut nodes = Vec::with_capacity(max.min(1024));
        while nodes.len() < max && cursor.read()? {
            nodes.push(term::node_to_term(env, &*cursor));
        }
        Ok(nodes)
    });

    Ok(match result {
        Ok(Ok(nodes)) => term::ok_to_term(env, term::list_to_term(env, nodes)),
        Ok(Err(err)) => term::crate_error_to_term(env, &err),
        Err(reason) => term::error_to_term(env, reason),
    })
}

/// Close the composite and every part
#[rustler::nif]
fn composite_close<'a>(env: Env<'a>, composite: CompositeRef) -> NifResult<Term<'a>> {
    match composite.close() {
        Ok(()) => Ok(term::atoms::ok().encode(env)),
        Err(reason) => Ok(term::error_to_term(env, &reason)),
    }
}

/// Aggregate documents into the markup of one composite document
#[rustler::nif(name = "aggregate", schedule = "DirtyCpu")]
fn aggregate_nif<'a>(env: Env<'a>, parts: Vec<Binary<'a>>) -> NifResult<Term<'a>> {
    match aggregate(part_bytes(&parts)) {
        Ok(xml) => Ok(term::ok_to_term(env, term::str_to_binary(env, &xml))),
        Err(err) => Ok(term::crate_error_to_term(env, &err)),
    }
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.CompositeXml.Native");
