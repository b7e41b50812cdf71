//! Elixir Term Conversion Utilities
//!
//! Converts cursor nodes and crate errors to Elixir terms.

use crate::error::Error;
use crate::reader::{NodeType, XmlCursor};
use rustler::types::tuple::make_tuple;
use rustler::{Atom, Encoder, Env, NewBinary, Term};

pub mod atoms {
    // Pre-defined atoms for efficiency - created once at compile time
    rustler::atoms! {
        ok,
        error,
        none,
        element,
        end_element,
        text,
        whitespace,
        cdata,
        comment,
        processing_instruction,
        xml_declaration,
        document_type,
    }
}

fn kind_atom(node_type: NodeType) -> Atom {
    match node_type {
        NodeType::None => atoms::none(),
        NodeType::Element => atoms::element(),
        NodeType::EndElement => atoms::end_element(),
        NodeType::Text => atoms::text(),
        NodeType::Whitespace => atoms::whitespace(),
        NodeType::CData => atoms::cdata(),
        NodeType::Comment => atoms::comment(),
        NodeType::ProcessingInstruction => atoms::processing_instruction(),
        NodeType::XmlDeclaration => atoms::xml_declaration(),
        NodeType::DocumentType => atoms::document_type(),
    }
}

/// Convert the current node to `{kind, depth, name, namespace_uri, value, attributes}`
///
/// Attributes are a list of `{name, value}` binaries in source order.
pub fn node_to_term<'a, C: XmlCursor + ?Sized>(env: Env<'a>, cursor: &C) -> Term<'a> {
    // Build attributes in reverse order
    let mut attrs = Term::list_new_empty(env);
    for attr in cursor.attributes().iter().rev() {
        let tuple = (str_to_binary(env, &attr.qname.name), str_to_binary(env, &attr.value));
        attrs = attrs.list_prepend(tuple.encode(env));
    }

    make_tuple(
        env,
        &[
            kind_atom(cursor.node_type()).encode(env),
            cursor.depth().encode(env),
            str_to_binary(env, cursor.name()),
            str_to_binary(env, cursor.namespace_uri()),
            str_to_binary(env, cursor.value()),
            attrs,
        ],
    )
}

/// Convert a list of terms, keeping their order
pub fn list_to_term<'a>(env: Env<'a>, terms: Vec<Term<'a>>) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for term in terms.into_iter().rev() {
        list = list.list_prepend(term);
    }
    list
}

/// `{:ok, value}`
pub fn ok_to_term<'a>(env: Env<'a>, value: Term<'a>) -> Term<'a> {
    (atoms::ok(), value).encode(env)
}

/// `{:error, message}`
pub fn error_to_term<'a>(env: Env<'a>, message: &str) -> Term<'a> {
    (atoms::error(), str_to_binary(env, message)).encode(env)
}

pub fn crate_error_to_term<'a>(env: Env<'a>, err: &Error) -> Term<'a> {
    error_to_term(env, &err.to_string())
}

/// Helper to convert string to binary term
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
