//! Access to platform objects: descriptions, file bytes and table rows.
//!
//! Validation never talks to the hosting platform directly. Everything it
//! needs goes through the [`ObjectStore`] trait:
//!
//! - [`ObjectStore::describe`]: class, types, columns, indices and details of an object
//! - [`ObjectStore::read_range`]: bytes of a file object at an arbitrary offset
//! - [`ObjectStore::rows`]: a lazy, single-pass iterator over the rows of a gtable
//!
//! Two implementations are provided: [`MemoryStore`] for embedding and tests,
//! and [`LocalStore`], which keeps objects as files in a directory.

use serde_json::Value;
use thiserror::Error;

use crate::core::object::ObjectDescription;
use crate::core::types::{ObjectClass, ObjectId};
use crate::parsing::ParseError;

pub mod local;
pub mod memory;

pub use local::LocalStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid object description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Object {0} not found")]
    NotFound(ObjectId),

    #[error("Object {id} is a {actual}, expected a {expected}")]
    WrongClass {
        id: ObjectId,
        actual: ObjectClass,
        expected: ObjectClass,
    },

    #[error("Read of {len} bytes at offset {offset} is past the end of {id}")]
    OutOfRange { id: ObjectId, offset: u64, len: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A single table row, one JSON value per column
pub type Row = Vec<Value>;

/// Lazy, finite, non-restartable sequence of rows
pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row, StoreError>> + 'a>;

/// Source of object metadata and content
pub trait ObjectStore {
    /// Describe an object
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the object does not exist, or another
    /// `StoreError` if its description cannot be read.
    fn describe(&self, id: &ObjectId) -> Result<ObjectDescription, StoreError>;

    /// Read `len` bytes of a file object starting at `offset`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OutOfRange` if the read extends past the end of the
    /// file, or another `StoreError` if the bytes cannot be fetched.
    fn read_range(&self, id: &ObjectId, offset: u64, len: usize) -> Result<Vec<u8>, StoreError>;

    /// Stream the rows of a gtable in order
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the rows cannot be opened. Errors on
    /// individual rows are yielded by the iterator.
    fn rows(&self, id: &ObjectId) -> Result<RowIter<'_>, StoreError>;
}

/// Fail with `StoreError::WrongClass` unless the description has the expected class
///
/// # Errors
///
/// Returns `StoreError::WrongClass` on a mismatch.
pub fn expect_class(desc: &ObjectDescription, expected: ObjectClass) -> Result<(), StoreError> {
    if desc.class == expected {
        Ok(())
    } else {
        Err(StoreError::WrongClass {
            id: desc.id.clone(),
            actual: desc.class,
            expected,
        })
    }
}
