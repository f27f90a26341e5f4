use serde::{Deserialize, Serialize};

/// A single contig/sequence in a contig set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contig {
    /// Sequence name (e.g. `chr1`)
    pub name: String,

    /// Sequence length in bases
    pub length: u64,
}

impl Contig {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}
