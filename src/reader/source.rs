//! Byte Sources
//!
//! Inputs a cursor reads from. Unlike a plain `Read`, a source can be
//! closed explicitly so that file handles and similar resources are released
//! at a well-defined point.

use std::fs::File;
use std::io::{self, Cursor, Read};

/// Initial capacity when slurping a source
const DEFAULT_BUFFER_SIZE: usize = 8192;

/// A readable, closable byte source
pub trait InputStream: Read + Send {
    /// Release the underlying resource
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: AsRef<[u8]> + Send> InputStream for Cursor<T> {}

/// The handle itself is released when the cursor drops the source on close
impl InputStream for File {}

impl<S: InputStream + ?Sized> InputStream for Box<S> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Owned source handed to cursors
pub type BoxedStream = Box<dyn InputStream>;

/// Read a whole source into memory
pub fn read_all<R: Read + ?Sized>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(DEFAULT_BUFFER_SIZE);
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_all() {
        let data = b"<root>content</root>";
        let mut stream: BoxedStream = Box::new(Cursor::new(data.to_vec()));
        assert_eq!(read_all(&mut stream).unwrap(), data);
        assert!(stream.close().is_ok());
    }

    #[test]
    fn test_failing_close_is_counted() {
        let (mut stream, closes) = testing::CountingStream::failing("<a/>");
        assert!(stream.close().is_err());
        assert_eq!(testing::count(&closes), 1);
    }
}
