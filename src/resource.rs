//! ResourceArc Wrappers
//!
//! Persistent composite cursors handed to the BEAM between NIF calls.

use crate::composite::CompositeCursor;
use crate::reader::XmlCursor;
use rustler::ResourceArc;
use std::sync::Mutex;

/// Wrapper for a CompositeCursor that can be stored in a ResourceArc
///
/// The cursor is taken out on close; later calls see `"closed"`.
pub struct CompositeResource {
    pub inner: Mutex<Option<CompositeCursor>>,
}

impl CompositeResource {
    pub fn new(cursor: CompositeCursor) -> Self {
        CompositeResource {
            inner: Mutex::new(Some(cursor)),
        }
    }

    /// Run `f` on the open cursor
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if the cursor mutex is poisoned,
    /// or `"closed"` once the cursor has been closed.
    pub fn with_cursor<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&mut CompositeCursor) -> R,
    {
        let mut guard = self.inner.lock().map_err(|_| "mutex_poisoned")?;
        let cursor = guard.as_mut().ok_or("closed")?;
        Ok(f(cursor))
    }

    /// Close and release the cursor; closing twice is not an error
    pub fn close(&self) -> Result<(), String> {
        let mut guard = self.inner.lock().map_err(|_| "mutex_poisoned".to_string())?;
        match guard.take() {
            Some(mut cursor) => cursor.close().map_err(|e| e.to_string()),
            None => Ok(()),
        }
    }
}

#[rustler::resource_impl]
impl rustler::Resource for CompositeResource {}

/// Type alias for the ResourceArc
pub type CompositeRef = ResourceArc<CompositeResource>;

#[cfg(test)]
mod tests {
    use super::*;

    fn resource() -> CompositeResource {
        CompositeResource::new(CompositeCursor::from_bytes(vec!["<a/>"], None).unwrap())
    }

    #[test]
    fn test_with_cursor() {
        let resource = resource();
        let read = resource.with_cursor(|cursor| cursor.read().unwrap()).unwrap();
        assert!(read);
        let name = resource.with_cursor(|cursor| cursor.name().to_string()).unwrap();
        assert_eq!(name, "agg:Root");
    }

    #[test]
    fn test_closed_resource() {
        let resource = resource();
        resource.close().unwrap();
        resource.close().unwrap();
        assert_eq!(resource.with_cursor(|_| ()).err(), Some("closed"));
    }
}
