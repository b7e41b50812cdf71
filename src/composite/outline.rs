//! Outline Document
//!
//! The synthetic document supplying the framing tokens of a composite: a
//! root aggregate element holding one empty wrapper element per part.

use crate::error::{Error, Result};
use crate::reader::{ReaderSettings, TextCursor};
use log::trace;
use std::fmt::Write;

/// Namespace of the aggregate envelope
pub const AGGREGATE_NAMESPACE: &str = "http://schemas.microsoft.com/BizTalk/2003/aggschema";

pub const AGGREGATE_PREFIX: &str = "agg";

pub const ROOT_NAME: &str = "Root";

/// Wrapper element names are this prefix followed by the 0-based part index
pub const PART_WRAPPER_PREFIX: &str = "InputMessagePart_";

/// Build the outline text for `parts` parts
pub fn outline_document(parts: usize) -> Result<String> {
    if parts == 0 {
        return Err(Error::EmptyParts { what: "parts" });
    }

    let mut outline = String::with_capacity(128 + parts * 64);
    // Writing to a String cannot fail
    let _ = write!(
        outline,
        "<{p}:{r} xmlns:{p}=\"{ns}\">",
        p = AGGREGATE_PREFIX,
        r = ROOT_NAME,
        ns = AGGREGATE_NAMESPACE
    );
    for i in 0..parts {
        let _ = write!(
            outline,
            "<{p}:{w}{i}></{p}:{w}{i}>",
            p = AGGREGATE_PREFIX,
            w = PART_WRAPPER_PREFIX,
            i = i
        );
    }
    let _ = write!(outline, "</{}:{}>", AGGREGATE_PREFIX, ROOT_NAME);
    Ok(outline)
}

/// Open a cursor over the outline for `parts` parts
///
/// The outline always owns its text, so it is opened with `close_input` set
/// regardless of the caller's settings.
pub fn open_outline(parts: usize, settings: &ReaderSettings) -> Result<TextCursor> {
    let text = outline_document(parts)?;
    trace!("opening outline for {} parts", parts);
    let settings = settings.clone().with_close_input(true);
    Ok(TextCursor::from_text(text, &settings))
}
