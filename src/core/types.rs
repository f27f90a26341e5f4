use serde::{Deserialize, Serialize};

use crate::utils::validation::is_valid_object_id;

/// Identifier of an object on the hosting platform (e.g. `gtable-…`, `record-…`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Parse a string into an ID, returning None unless it is well-formed
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        is_valid_object_id(s).then(|| Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The class prefix of the ID (`gtable`, `record`, `file`)
    #[must_use]
    pub fn class_prefix(&self) -> &str {
        self.0.split_once('-').map_or("", |(class, _)| class)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Class of a platform object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    /// A table with typed columns and optional indices
    Gtable,
    /// A metadata-only object (contig sets are records)
    Record,
    /// A byte blob
    File,
}

impl ObjectClass {
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Gtable => "gtable",
            Self::Record => "record",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// Severity of a recorded finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "ERROR"),
            Self::Warning => write!(f, "WARNING"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_parse() {
        let id = ObjectId::parse("record-000000000000000000000001").unwrap();
        assert_eq!(id.class_prefix(), "record");
        assert_eq!(id.to_string(), "record-000000000000000000000001");

        assert!(ObjectId::parse("record-1").is_none());
        assert!(ObjectId::parse("").is_none());
    }

    #[test]
    fn test_object_class_serde() {
        let class: ObjectClass = serde_json::from_str("\"gtable\"").unwrap();
        assert_eq!(class, ObjectClass::Gtable);
        assert_eq!(serde_json::to_string(&ObjectClass::File).unwrap(), "\"file\"");
    }
}
