//! Composite Module - Several documents read as one
//!
//! Presents independently encoded XML documents as a single document:
//! - Outline: synthetic root and per-part wrapper elements
//! - PartCursor: a part's cursor, depths shifted under the wrappers
//! - State: phases of a composite read and their transitions
//! - CompositeCursor: drives the outline and the parts in turn
//! - TranslatingStream: re-serializes a pre-built cursor so it can be
//!   reopened with the composite's name table

pub mod cursor;
pub mod outline;
pub mod part;
pub mod state;
pub mod translate;

pub use cursor::CompositeCursor;
pub use outline::{AGGREGATE_NAMESPACE, AGGREGATE_PREFIX, PART_WRAPPER_PREFIX, ROOT_NAME};
pub use part::PartCursor;
pub use state::State;
pub use translate::TranslatingStream;

use crate::error::Result;
use crate::reader::XmlCursor;

/// Aggregate in-memory documents into the markup of one composite document
pub fn aggregate<I, B>(parts: I) -> Result<String>
where
    I: IntoIterator<Item = B>,
    B: Into<Vec<u8>>,
{
    let mut composite = CompositeCursor::from_bytes(parts, None)?;
    composite.read()?;
    let xml = composite.read_outer_xml()?;
    composite.close()?;
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_aggregate() {
        let xml = aggregate(vec!["<a>1</a>", "<?xml version=\"1.0\"?><b/>"]).unwrap();
        assert_eq!(
            xml,
            "<agg:Root xmlns:agg=\"http://schemas.microsoft.com/BizTalk/2003/aggschema\">\
             <agg:InputMessagePart_0><a>1</a></agg:InputMessagePart_0>\
             <agg:InputMessagePart_1><b/></agg:InputMessagePart_1>\
             </agg:Root>"
        );
    }

    #[test]
    fn test_aggregate_nothing() {
        let parts: Vec<Vec<u8>> = Vec::new();
        assert!(matches!(aggregate(parts), Err(Error::EmptyParts { .. })));
    }

    #[test]
    fn test_aggregate_malformed_part() {
        assert!(matches!(aggregate(vec!["<a>", "<b/>"]), Err(Error::Syntax { .. })));
    }

    #[test]
    fn test_aggregate_undeclared_entity() {
        match aggregate(vec!["<a>&amp;</a>", "<b>&unknown;</b>"]) {
            Err(Error::Syntax { message, line, column }) => {
                assert_eq!(message, "Reference to undeclared entity");
                assert_eq!((line, column), (1, 4));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
