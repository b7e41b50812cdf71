//! XML Attribute Parsing
//!
//! Parses XML attributes from tag content.

use super::entities::decode_text;
use super::scanner::{is_name_char, is_name_start_char, is_whitespace};
use memchr::memchr;
use std::borrow::Cow;

/// A parsed XML attribute
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    /// Attribute name (may include namespace prefix)
    pub name: &'a [u8],
    /// Attribute value (entities decoded)
    pub value: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    pub fn new(name: &'a [u8], value: Cow<'a, [u8]>) -> Self {
        Attribute { name, value }
    }

    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<&'a [u8]> {
        memchr(b':', self.name).map(|pos| &self.name[..pos])
    }

    /// Local name (after colon, if namespaced)
    pub fn local_name(&self) -> &'a [u8] {
        match memchr(b':', self.name) {
            Some(pos) => &self.name[pos + 1..],
            None => self.name,
        }
    }

    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(self.name).ok()
    }

    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(self.value.as_ref()).ok()
    }
}

/// Parse attributes from raw tag content (after the element name)
///
/// Input should be the content between element name and '>' or '/>'.
/// Returns the offset of the first malformed attribute on failure.
pub fn parse_attributes(input: &[u8]) -> Result<Vec<Attribute<'_>>, (usize, &'static str)> {
    let mut attrs = Vec::new();
    let mut pos = 0;

    loop {
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        if pos >= input.len() {
            break;
        }

        let name_start = pos;
        if !is_name_start_char(input[pos]) {
            return Err((pos, "Attribute name must start with letter, underscore, or colon"));
        }
        while pos < input.len() && is_name_char(input[pos]) {
            pos += 1;
        }
        let name = &input[name_start..pos];

        // Skip whitespace around '='
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }
        if input.get(pos) != Some(&b'=') {
            return Err((pos, "Attribute value required"));
        }
        pos += 1;
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        let quote = match input.get(pos) {
            Some(&q) if q == b'"' || q == b'\'' => q,
            _ => return Err((pos, "Attribute value must be quoted")),
        };
        pos += 1;

        let value_start = pos;
        let Some(len) = memchr(quote, &input[value_start..]) else {
            return Err((value_start, "Attribute value has mismatched quotes"));
        };
        pos = value_start + len;

        let value_bytes = &input[value_start..pos];
        if memchr(b'<', value_bytes).is_some() {
            return Err((value_start, "Attribute value cannot contain '<'"));
        }

        if attrs.iter().any(|a: &Attribute<'_>| a.name == name) {
            return Err((name_start, "Duplicate attribute"));
        }
        let value = decode_text(value_bytes).map_err(|(offset, message)| (value_start + offset, message))?;
        attrs.push(Attribute::new(name, value));

        pos += 1; // Skip closing quote
    }

    Ok(attrs)
}

/// Find the value of one attribute without building the whole list
pub fn find_attribute<'a>(input: &'a [u8], name: &[u8]) -> Option<Cow<'a, [u8]>> {
    parse_attributes(input)
        .ok()?
        .into_iter()
        .find(|a| a.name == name)
        .map(|a| a.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_attributes() {
        let attrs = parse_attributes(b" id=\"test\" class=\"foo\"").unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name_str(), Some("id"));
        assert_eq!(attrs[0].value_str(), Some("test"));
        assert_eq!(attrs[1].name_str(), Some("class"));
        assert_eq!(attrs[1].value_str(), Some("foo"));
    }

    #[test]
    fn test_single_quoted() {
        let attrs = parse_attributes(b" id='te\"st'").unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value_str(), Some("te\"st"));
    }

    #[test]
    fn test_namespaced_attribute() {
        let attrs = parse_attributes(b" xmlns:agg=\"http://schemas.microsoft.com/BizTalk/2003/aggschema\"").unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].prefix(), Some(b"xmlns" as &[u8]));
        assert_eq!(attrs[0].local_name(), b"agg");
    }

    #[test]
    fn test_entity_in_value() {
        let attrs = parse_attributes(b" title=\"&lt;hello&gt;\"").unwrap();
        assert_eq!(attrs[0].value_str(), Some("<hello>"));
    }

    #[test]
    fn test_bad_reference_in_value() {
        assert_eq!(
            parse_attributes(b" a=\"x\" b=\"1 &nbsp; 2\"").err(),
            Some((12, "Reference to undeclared entity"))
        );
        assert!(parse_attributes(b" a=\"fish & chips\"").is_err());
    }

    #[test]
    fn test_whitespace_handling() {
        let attrs = parse_attributes(b"  id  =  \"test\"  ").unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name_str(), Some("id"));
        assert_eq!(attrs[0].value_str(), Some("test"));
    }

    #[test]
    fn test_malformed_attributes() {
        assert!(parse_attributes(b" id").is_err());
        assert!(parse_attributes(b" id=test").is_err());
        assert!(parse_attributes(b" id=\"test").is_err());
        assert!(parse_attributes(b" id=\"a\" id=\"b\"").is_err());
    }

    #[test]
    fn test_find_attribute() {
        let value = find_attribute(b" version=\"1.0\" encoding=\"utf-16\"", b"encoding");
        assert_eq!(value.as_deref(), Some(b"utf-16" as &[u8]));
    }
}
