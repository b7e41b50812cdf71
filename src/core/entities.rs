//! XML Entity Decoding and Escaping
//!
//! Handles decoding of XML entities:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//!
//! and the reverse escaping used when nodes are written back out.
//! Uses Cow for zero-copy when nothing needs to change.
//!
//! Documents are not read with a DTD, so any other entity reference is
//! undeclared and rejected, as is an `&` that does not start a reference.

use super::scanner::{is_name_char, is_name_start_char};
use memchr::{memchr, memchr3};
use std::borrow::Cow;

/// Offset within the decoded input and description of a bad reference
pub type EntityError = (usize, &'static str);

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities present (zero-copy),
/// returns Owned if entities were decoded.
#[inline]
pub fn decode_text(input: &[u8]) -> Result<Cow<'_, [u8]>, EntityError> {
    if memchr(b'&', input).is_none() {
        return Ok(Cow::Borrowed(input));
    }
    decode_entities(input).map(Cow::Owned)
}

/// Decode all entity references in the input
pub fn decode_entities(input: &[u8]) -> Result<Vec<u8>, EntityError> {
    let mut result = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        let Some(amp_pos) = memchr(b'&', &input[pos..]) else {
            result.extend_from_slice(&input[pos..]);
            break;
        };

        result.extend_from_slice(&input[pos..pos + amp_pos]);
        pos += amp_pos;

        let Some(semi_offset) = memchr(b';', &input[pos..]) else {
            return Err((pos, "Unescaped '&' must start an entity reference"));
        };
        let decoded = decode_entity(&input[pos + 1..pos + semi_offset]).map_err(|message| (pos, message))?;
        let mut buf = [0u8; 4];
        result.extend_from_slice(decoded.encode_utf8(&mut buf).as_bytes());
        pos += semi_offset + 1;
    }

    Ok(result)
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &[u8]) -> Result<char, &'static str> {
    match entity {
        [b'#', rest @ ..] => decode_numeric_entity(rest).ok_or("Invalid character reference"),
        b"lt" => Ok('<'),
        b"gt" => Ok('>'),
        b"amp" => Ok('&'),
        b"quot" => Ok('"'),
        b"apos" => Ok('\''),
        [first, rest @ ..] if is_name_start_char(*first) && rest.iter().all(|&b| is_name_char(b)) => {
            Err("Reference to undeclared entity")
        }
        _ => Err("Unescaped '&' must start an entity reference"),
    }
}

/// Decode a numeric character reference
fn decode_numeric_entity(entity: &[u8]) -> Option<char> {
    let codepoint = match entity {
        [b'x' | b'X', hex @ ..] if !hex.is_empty() && hex.iter().all(u8::is_ascii_hexdigit) => {
            u32::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?
        }
        dec if !dec.is_empty() && dec.iter().all(u8::is_ascii_digit) => {
            std::str::from_utf8(dec).ok()?.parse::<u32>().ok()?
        }
        _ => return None,
    };

    if !is_valid_xml_char(codepoint) {
        return None;
    }
    char::from_u32(codepoint)
}

/// Check if a code point is a valid XML 1.0 Char
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}

/// Escape character data: `&`, `<` and `>`
pub fn escape_text(input: &str) -> Cow<'_, str> {
    if memchr3(b'&', b'<', b'>', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape a double-quoted attribute value: `&`, `<` and `"`
pub fn escape_attribute(input: &str) -> Cow<'_, str> {
    if memchr3(b'&', b'<', b'"', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
