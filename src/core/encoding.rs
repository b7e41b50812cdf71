//! XML Encoding Detection and Conversion
//!
//! Detects the encoding of a source from its byte order mark, the UTF-16
//! byte pattern of a leading '<', or the `encoding` pseudo-attribute of its
//! XML declaration, and converts the content to UTF-8 for parsing.

use super::attributes::find_attribute;
use crate::error::{Error, Result};
use memchr::memmem;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Character encodings a source may be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    /// ISO-8859-1: every byte is the code point of the same value
    Latin1,
    Ascii,
}

impl XmlEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        if input.len() < 2 {
            return XmlEncoding::Utf8;
        }

        match (input[0], input[1]) {
            (0xFF, 0xFE) => XmlEncoding::Utf16Le,
            (0xFE, 0xFF) => XmlEncoding::Utf16Be,
            // No BOM - check for UTF-16 pattern (< followed by null or null followed by <)
            (0x00, b'<') => XmlEncoding::Utf16Be,
            (b'<', 0x00) => XmlEncoding::Utf16Le,
            _ => XmlEncoding::Utf8,
        }
    }

    /// Resolve the encoding of a whole source: a byte order mark or UTF-16
    /// pattern wins, otherwise the declared encoding of an ASCII-compatible
    /// XML declaration, otherwise UTF-8.
    ///
    /// A declaration read as single-byte text cannot switch to UTF-16.
    pub fn resolve(input: &[u8]) -> Result<Self> {
        let detected = Self::detect(input);
        if detected != XmlEncoding::Utf8 || input.starts_with(UTF8_BOM) {
            return Ok(detected);
        }

        let Some(label) = declared_encoding(input) else {
            return Ok(XmlEncoding::Utf8);
        };
        match Self::from_label(&label) {
            Some(encoding @ (XmlEncoding::Utf16Le | XmlEncoding::Utf16Be)) => Err(encoding.invalid(format!(
                "declared as '{}' but there is no byte order mark or UTF-16 byte pattern; cannot switch to UTF-16",
                label
            ))),
            Some(encoding) => Ok(encoding),
            None => Err(Error::UnsupportedEncoding(label)),
        }
    }

    /// Map an encoding name, as found in an XML declaration, to an encoding
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(XmlEncoding::Utf8),
            "utf-16" | "utf-16le" | "unicode" => Some(XmlEncoding::Utf16Le),
            "utf-16be" | "unicodefffe" => Some(XmlEncoding::Utf16Be),
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "l1" | "cp819" => Some(XmlEncoding::Latin1),
            "us-ascii" | "ascii" => Some(XmlEncoding::Ascii),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            XmlEncoding::Utf8 => "utf-8",
            XmlEncoding::Utf16Le => "utf-16le",
            XmlEncoding::Utf16Be => "utf-16be",
            XmlEncoding::Latin1 => "iso-8859-1",
            XmlEncoding::Ascii => "us-ascii",
        }
    }

    /// Decode raw source bytes into UTF-8 text, dropping any byte order mark
    pub fn decode(&self, input: Vec<u8>) -> Result<String> {
        match self {
            XmlEncoding::Utf8 => {
                let bytes = match input.strip_prefix(UTF8_BOM) {
                    Some(rest) => rest.to_vec(),
                    None => input,
                };
                String::from_utf8(bytes).map_err(|e| self.invalid(e.to_string()))
            }
            XmlEncoding::Utf16Le => {
                let bytes = input.strip_prefix(UTF16_LE_BOM).unwrap_or(&input[..]);
                self.decode_utf16(bytes, u16::from_le_bytes)
            }
            XmlEncoding::Utf16Be => {
                let bytes = input.strip_prefix(UTF16_BE_BOM).unwrap_or(&input[..]);
                self.decode_utf16(bytes, u16::from_be_bytes)
            }
            XmlEncoding::Latin1 => Ok(input.iter().map(|&b| char::from(b)).collect()),
            XmlEncoding::Ascii => match input.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(self.invalid(format!("non-ASCII byte at offset {}", pos))),
                None => String::from_utf8(input).map_err(|e| self.invalid(e.to_string())),
            },
        }
    }

    /// Encode UTF-8 text in this encoding, without byte order mark
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        match self {
            XmlEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            XmlEncoding::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            XmlEncoding::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            XmlEncoding::Latin1 | XmlEncoding::Ascii => {
                let limit = if *self == XmlEncoding::Latin1 { 0xFF } else { 0x7F };
                text.chars()
                    .map(|c| match u8::try_from(u32::from(c)) {
                        Ok(b) if u32::from(b) <= limit => Ok(b),
                        _ => Err(self.invalid(format!("character {:?} is not representable", c))),
                    })
                    .collect()
            }
        }
    }

    fn decode_utf16(&self, bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
        if bytes.len() % 2 != 0 {
            return Err(self.invalid("odd number of bytes".to_string()));
        }

        let code_units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|chunk| unit([chunk[0], chunk[1]]))
            .collect();

        String::from_utf16(&code_units).map_err(|e| self.invalid(e.to_string()))
    }

    fn invalid(&self, message: String) -> Error {
        Error::Decode {
            encoding: self.name(),
            message,
        }
    }
}

/// Read the `encoding` pseudo-attribute of an ASCII-compatible XML declaration
fn declared_encoding(input: &[u8]) -> Option<String> {
    let rest = input.strip_prefix(b"<?xml")?;
    if !rest.first().is_some_and(|b| b.is_ascii_whitespace()) {
        return None;
    }
    let end = memmem::find(rest, b"?>")?;
    let value = find_attribute(&rest[..end], b"encoding")?;
    String::from_utf8(value.into_owned()).ok()
}

/// Decode a whole source, returning its text and the encoding it was read with
pub fn decode_source(input: Vec<u8>) -> Result<(String, XmlEncoding)> {
    let encoding = XmlEncoding::resolve(&input)?;
    let text = encoding.decode(input)?;
    Ok((text, encoding))
}
