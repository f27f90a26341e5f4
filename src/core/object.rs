use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::types::{ObjectClass, ObjectId};

/// Key of the single-entry JSON object used to link to another platform object
pub const LINK_KEY: &str = "$dnanexus_link";

/// A column of a gtable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,

    /// Declared column type (`string`, `int64`, `double`, ...)
    #[serde(rename = "type")]
    pub column_type: String,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
}

/// An index declared over the columns of a gtable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,

    /// Index kind; genomic range indices use `genomic`
    #[serde(rename = "type")]
    pub index_type: String,

    /// Chromosome column of a genomic index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chr: Option<String>,

    /// Low coordinate column of a genomic index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lo: Option<String>,

    /// High coordinate column of a genomic index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hi: Option<String>,
}

impl IndexSpec {
    /// A genomic range index over the given columns
    pub fn genomic(
        name: impl Into<String>,
        chr: impl Into<String>,
        lo: impl Into<String>,
        hi: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            index_type: "genomic".to_string(),
            chr: Some(chr.into()),
            lo: Some(lo.into()),
            hi: Some(hi.into()),
        }
    }
}

/// Metadata describing a platform object, as returned by the object store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDescription {
    pub id: ObjectId,

    pub class: ObjectClass,

    /// Semantic types attached to the object (e.g. `gri`, `ContigSet`)
    #[serde(default)]
    pub types: Vec<String>,

    /// Column schema (gtables only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnSpec>,

    /// Declared indices (gtables only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indices: Vec<IndexSpec>,

    /// Free-form details document
    #[serde(default)]
    pub details: Value,

    /// Size in bytes (files only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Number of rows (gtables only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

impl ObjectDescription {
    pub fn new(id: ObjectId, class: ObjectClass) -> Self {
        Self {
            id,
            class,
            types: Vec::new(),
            columns: Vec::new(),
            indices: Vec::new(),
            details: Value::Null,
            size: None,
            length: None,
        }
    }

    #[must_use]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.columns = columns;
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: IndexSpec) -> Self {
        self.indices.push(index);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn has_type(&self, object_type: &str) -> bool {
        self.types.iter().any(|t| t == object_type)
    }

    /// Find a column by name, returning its position and spec
    #[must_use]
    pub fn column(&self, name: &str) -> Option<(usize, &ColumnSpec)> {
        self.columns.iter().enumerate().find(|(_, c)| c.name == name)
    }

    /// Find an index by name
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexSpec> {
        self.indices.iter().find(|i| i.name == name)
    }
}

/// Parse a link value into the ID it points to.
///
/// Accepts both `{"$dnanexus_link": "<id>"}` and
/// `{"$dnanexus_link": {"id": "<id>", "project": ...}}`. Returns None for
/// anything else, including links whose ID is malformed.
#[must_use]
pub fn parse_link(value: &Value) -> Option<ObjectId> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }

    let id = match map.get(LINK_KEY)? {
        Value::String(id) => id.as_str(),
        Value::Object(inner) => inner.get("id")?.as_str()?,
        _ => return None,
    };

    ObjectId::parse(id)
}

/// Build a link value pointing at an object
#[must_use]
pub fn make_link(id: &ObjectId) -> Value {
    serde_json::json!({ LINK_KEY: id.as_str() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_link_simple() {
        let link = json!({"$dnanexus_link": "record-000000000000000000000001"});
        let id = parse_link(&link).unwrap();
        assert_eq!(id.as_str(), "record-000000000000000000000001");
    }

    #[test]
    fn test_parse_link_with_project() {
        let link = json!({"$dnanexus_link": {
            "project": "project-000000000000000000000009",
            "id": "record-000000000000000000000001"
        }});
        assert!(parse_link(&link).is_some());
    }

    #[test]
    fn test_parse_link_invalid() {
        assert!(parse_link(&json!("record-000000000000000000000001")).is_none());
        assert!(parse_link(&json!({"$dnanexus_link": 42})).is_none());
        assert!(parse_link(&json!({"$dnanexus_link": "record-bad"})).is_none());
        assert!(parse_link(&json!({
            "$dnanexus_link": "record-000000000000000000000001",
            "extra": true
        }))
        .is_none());
    }

    #[test]
    fn test_make_link_round_trip() {
        let id = ObjectId::new("file-000000000000000000000002");
        assert_eq!(parse_link(&make_link(&id)), Some(id));
    }

    #[test]
    fn test_description_from_json() {
        let desc: ObjectDescription = serde_json::from_value(json!({
            "id": "gtable-000000000000000000000001",
            "class": "gtable",
            "types": ["gri", "Spans"],
            "columns": [
                {"name": "chr", "type": "string"},
                {"name": "lo", "type": "int32"},
                {"name": "hi", "type": "int32"}
            ],
            "indices": [{"name": "gri", "type": "genomic", "chr": "chr", "lo": "lo", "hi": "hi"}],
            "details": {}
        }))
        .unwrap();

        assert!(desc.has_type("gri"));
        assert_eq!(desc.column("lo").map(|(i, _)| i), Some(1));
        assert_eq!(desc.index("gri").unwrap().index_type, "genomic");
        assert!(desc.size.is_none());
    }
}
