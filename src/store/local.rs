use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::core::object::ObjectDescription;
use crate::core::types::{ObjectClass, ObjectId};
use crate::parsing::rows::{open_tsv, TsvRows};
use crate::store::{expect_class, ObjectStore, RowIter, StoreError};
use crate::utils::validation::is_valid_object_id;

/// An object store backed by a directory.
///
/// Layout, for an object with ID `<id>`:
///
/// | File | Content |
/// |------|---------|
/// | `<id>.json` | The [`ObjectDescription`] |
/// | `<id>.data` | Bytes of a file object |
/// | `<id>.tsv` or `<id>.tsv.gz` | Rows of a gtable, one tab-separated line per row |
///
/// Data files opened by [`ObjectStore::read_range`] stay open for the life of
/// the store, so repeated reads of one file skip the description lookup.
#[derive(Debug)]
pub struct LocalStore {
    root: PathBuf,
    /// Open data files of file objects, keyed by object ID
    open_files: Mutex<HashMap<ObjectId, File>>,
}

impl LocalStore {
    /// Open an existing store directory
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::Io(std::io::Error::new(
                ErrorKind::NotFound,
                format!("store directory {} does not exist", root.display()),
            )));
        }
        Ok(Self::at(root))
    }

    /// Open a store directory, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self::at(root))
    }

    fn at(root: PathBuf) -> Self {
        Self {
            root,
            open_files: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, id: &ObjectId, extension: &str) -> Result<PathBuf, StoreError> {
        // Only well-formed IDs map to paths, so an ID can never escape the root
        if !is_valid_object_id(id.as_str()) {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(self.root.join(format!("{id}.{extension}")))
    }

    fn table_path(&self, id: &ObjectId) -> Result<PathBuf, StoreError> {
        for extension in ["tsv", "tsv.gz"] {
            let path = self.object_path(id, extension)?;
            if path.is_file() {
                return Ok(path);
            }
        }
        Err(StoreError::NotFound(id.clone()))
    }

    /// Write an object description
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the description cannot be serialized or written.
    pub fn put(&self, desc: &ObjectDescription) -> Result<(), StoreError> {
        let path = self.object_path(&desc.id, "json")?;
        let json = serde_json::to_string_pretty(desc)?;
        std::fs::write(&path, json)?;
        debug!("Wrote {} to {}", desc.id, path.display());
        Ok(())
    }

    /// A temporary file inside the store, to be filled and then handed to [`Self::put_file`]
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be created.
    pub fn temp_file(&self) -> Result<NamedTempFile, StoreError> {
        Ok(NamedTempFile::new_in(&self.root)?)
    }

    /// Store the content of `content` as the data of a file object.
    ///
    /// The description's `size` is set from the content before it is written.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the content cannot be moved into place or the
    /// description cannot be written.
    pub fn put_file(
        &self,
        desc: ObjectDescription,
        content: NamedTempFile,
    ) -> Result<ObjectDescription, StoreError> {
        expect_class(&desc, ObjectClass::File)?;
        let size = content.as_file().metadata()?.len();
        let path = self.object_path(&desc.id, "data")?;
        self.open_files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&desc.id);
        content.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        let desc = desc.with_size(size);
        self.put(&desc)?;
        Ok(desc)
    }

    /// Copy a TSV file (plain or gzipped) in as the rows of a gtable
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the rows cannot be copied or the description
    /// cannot be written.
    pub fn put_table(&self, desc: &ObjectDescription, rows: &Path) -> Result<(), StoreError> {
        expect_class(desc, ObjectClass::Gtable)?;
        let gzipped = rows
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
        let path = self.object_path(&desc.id, if gzipped { "tsv.gz" } else { "tsv" })?;
        let stale = self.object_path(&desc.id, if gzipped { "tsv" } else { "tsv.gz" })?;
        if stale.is_file() {
            std::fs::remove_file(&stale)?;
        }

        std::fs::copy(rows, &path)?;
        debug!("Copied rows of {} from {}", desc.id, rows.display());
        self.put(desc)
    }
}

impl ObjectStore for LocalStore {
    fn describe(&self, id: &ObjectId) -> Result<ObjectDescription, StoreError> {
        let path = self.object_path(id, "json")?;
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn read_range(&self, id: &ObjectId, offset: u64, len: usize) -> Result<Vec<u8>, StoreError> {
        let mut open_files = self.open_files.lock().unwrap_or_else(PoisonError::into_inner);
        let file = match open_files.entry(id.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                expect_class(&self.describe(id)?, ObjectClass::File)?;
                let file = File::open(self.object_path(id, "data")?)?;
                debug!("Opened data of {id}");
                entry.insert(file)
            }
        };

        file.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; len];
        match file.read_exact(&mut buffer) {
            Ok(()) => Ok(buffer),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(StoreError::OutOfRange {
                id: id.clone(),
                offset,
                len,
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn rows(&self, id: &ObjectId) -> Result<RowIter<'_>, StoreError> {
        let desc = self.describe(id)?;
        expect_class(&desc, ObjectClass::Gtable)?;

        let reader = open_tsv(&self.table_path(id)?)?;
        let rows = TsvRows::new(reader, desc.columns);
        Ok(Box::new(rows.map(|row| row.map_err(StoreError::from))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::ColumnSpec;
    use serde_json::json;
    use std::io::Write;

    fn table_id() -> ObjectId {
        ObjectId::new("gtable-000000000000000000000001")
    }

    fn file_id() -> ObjectId {
        ObjectId::new("file-000000000000000000000002")
    }

    #[test]
    fn test_open_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LocalStore::open(dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_put_and_describe() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        let desc = ObjectDescription::new(table_id(), ObjectClass::Gtable).with_types(["gri"]);
        store.put(&desc).unwrap();

        let described = store.describe(&table_id()).unwrap();
        assert_eq!(described.class, ObjectClass::Gtable);
        assert!(described.has_type("gri"));
    }

    #[test]
    fn test_describe_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        let err = store.describe(&ObjectId::new("../etc/passwd")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_put_file_and_read_range() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        let mut temp = store.temp_file().unwrap();
        temp.write_all(b"ACGTTTGA").unwrap();
        temp.flush().unwrap();

        let desc = store
            .put_file(ObjectDescription::new(file_id(), ObjectClass::File), temp)
            .unwrap();
        assert_eq!(desc.size, Some(8));

        assert_eq!(store.read_range(&file_id(), 4, 2).unwrap(), b"TT");
        assert!(matches!(
            store.read_range(&file_id(), 7, 4),
            Err(StoreError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_read_range_keeps_file_open() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        let mut temp = store.temp_file().unwrap();
        temp.write_all(b"ACGTTTGA").unwrap();
        temp.flush().unwrap();
        store
            .put_file(ObjectDescription::new(file_id(), ObjectClass::File), temp)
            .unwrap();

        assert_eq!(store.read_range(&file_id(), 0, 2).unwrap(), b"AC");

        // Later reads go straight to the open file
        std::fs::remove_file(dir.path().join(format!("{}.json", file_id()))).unwrap();
        assert_eq!(store.read_range(&file_id(), 6, 2).unwrap(), b"GA");
        assert_eq!(store.read_range(&file_id(), 2, 2).unwrap(), b"GT");
    }

    #[test]
    fn test_put_file_replaces_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        for content in [b"AAAA", b"CCCC"] {
            let mut temp = store.temp_file().unwrap();
            temp.write_all(content).unwrap();
            temp.flush().unwrap();
            store
                .put_file(ObjectDescription::new(file_id(), ObjectClass::File), temp)
                .unwrap();
            assert_eq!(store.read_range(&file_id(), 1, 2).unwrap(), &content[1..3]);
        }
    }

    #[test]
    fn test_read_range_of_table_is_wrong_class() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store
            .put(&ObjectDescription::new(table_id(), ObjectClass::Gtable))
            .unwrap();

        assert!(matches!(
            store.read_range(&table_id(), 0, 1),
            Err(StoreError::WrongClass { .. })
        ));
    }

    #[test]
    fn test_rows_from_gzipped_tsv() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let desc = ObjectDescription::new(table_id(), ObjectClass::Gtable).with_columns(vec![
            ColumnSpec::new("chr", "string"),
            ColumnSpec::new("lo", "int32"),
            ColumnSpec::new("hi", "int32"),
        ]);
        store.put(&desc).unwrap();

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"chr1\t1\t5\nchr2\t3\t9\n").unwrap();
        std::fs::write(
            dir.path().join(format!("{}.tsv.gz", table_id())),
            encoder.finish().unwrap(),
        )
        .unwrap();

        let rows: Vec<_> = store
            .rows(&table_id())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows, vec![
            vec![json!("chr1"), json!(1), json!(5)],
            vec![json!("chr2"), json!(3), json!(9)],
        ]);
    }

    #[test]
    fn test_put_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::create(dir.path().join("store")).unwrap();
        let source = dir.path().join("spans.tsv");
        std::fs::write(&source, "# chr\tlo\thi\nchr1\t0\t10\n").unwrap();

        let desc = ObjectDescription::new(table_id(), ObjectClass::Gtable).with_columns(vec![
            ColumnSpec::new("chr", "string"),
            ColumnSpec::new("lo", "int64"),
            ColumnSpec::new("hi", "int64"),
        ]);
        store.put_table(&desc, &source).unwrap();

        let rows: Vec<_> = store.rows(&table_id()).unwrap().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].as_ref().unwrap()[2], json!(10));
    }

    #[test]
    fn test_rows_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store
            .put(&ObjectDescription::new(table_id(), ObjectClass::Gtable))
            .unwrap();

        assert!(matches!(
            store.rows(&table_id()),
            Err(StoreError::NotFound(_))
        ));
    }
}
