use std::collections::HashMap;

use crate::core::object::ObjectDescription;
use crate::core::types::{ObjectClass, ObjectId};
use crate::store::{expect_class, ObjectStore, Row, RowIter, StoreError};

/// An object store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: HashMap<ObjectId, ObjectDescription>,
    files: HashMap<ObjectId, Vec<u8>>,
    tables: HashMap<ObjectId, Vec<Row>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object with no content (e.g. a record)
    pub fn insert(&mut self, desc: ObjectDescription) {
        self.objects.insert(desc.id.clone(), desc);
    }

    /// Add a file object; its `size` is set from the content
    pub fn insert_file(&mut self, desc: ObjectDescription, content: Vec<u8>) {
        let desc = desc.with_size(content.len() as u64);
        self.files.insert(desc.id.clone(), content);
        self.insert(desc);
    }

    /// Add a gtable object together with its rows
    pub fn insert_table(&mut self, mut desc: ObjectDescription, rows: Vec<Row>) {
        desc.length = Some(rows.len() as u64);
        self.tables.insert(desc.id.clone(), rows);
        self.insert(desc);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for MemoryStore {
    fn describe(&self, id: &ObjectId) -> Result<ObjectDescription, StoreError> {
        self.objects
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn read_range(&self, id: &ObjectId, offset: u64, len: usize) -> Result<Vec<u8>, StoreError> {
        expect_class(&self.describe(id)?, ObjectClass::File)?;
        let content = self
            .files
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let out_of_range = || StoreError::OutOfRange {
            id: id.clone(),
            offset,
            len,
        };
        let start = usize::try_from(offset).map_err(|_| out_of_range())?;
        let end = start.checked_add(len).ok_or_else(out_of_range)?;

        content
            .get(start..end)
            .map(<[u8]>::to_vec)
            .ok_or_else(out_of_range)
    }

    fn rows(&self, id: &ObjectId) -> Result<RowIter<'_>, StoreError> {
        expect_class(&self.describe(id)?, ObjectClass::Gtable)?;
        let rows = self
            .tables
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        Ok(Box::new(rows.iter().cloned().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file_id() -> ObjectId {
        ObjectId::new("file-000000000000000000000002")
    }

    #[test]
    fn test_describe_missing() {
        let store = MemoryStore::new();
        let err = store.describe(&file_id()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_read_range() {
        let mut store = MemoryStore::new();
        store.insert_file(
            ObjectDescription::new(file_id(), ObjectClass::File),
            b"ACGTACGT".to_vec(),
        );

        assert_eq!(store.describe(&file_id()).unwrap().size, Some(8));
        assert_eq!(store.read_range(&file_id(), 2, 3).unwrap(), b"GTA");
        assert_eq!(store.read_range(&file_id(), 8, 0).unwrap(), b"");
        assert!(matches!(
            store.read_range(&file_id(), 6, 3),
            Err(StoreError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_rows_requires_gtable() {
        let mut store = MemoryStore::new();
        store.insert_file(ObjectDescription::new(file_id(), ObjectClass::File), vec![]);
        assert!(matches!(
            store.rows(&file_id()),
            Err(StoreError::WrongClass { .. })
        ));
    }

    #[test]
    fn test_rows_in_order() {
        let id = ObjectId::new("gtable-000000000000000000000001");
        let mut store = MemoryStore::new();
        store.insert_table(
            ObjectDescription::new(id.clone(), ObjectClass::Gtable),
            vec![vec![json!("chr1"), json!(1)], vec![json!("chr2"), json!(2)]],
        );

        assert_eq!(store.describe(&id).unwrap().length, Some(2));
        let rows: Vec<Row> = store.rows(&id).unwrap().map(Result::unwrap).collect();
        assert_eq!(rows[1][0], json!("chr2"));
    }
}
