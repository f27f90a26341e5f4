//! Resolution of a dataset's `original_contigset` link into a [`ContigCatalog`].

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::contigs::{
    ContigCatalog, ContigSet, FlatDeclaration, FlatFileIndex, FlatIndexError,
};
use crate::core::contig::Contig;
use crate::core::object::parse_link;
use crate::core::types::{ObjectClass, ObjectId};
use crate::store::ObjectStore;
use crate::validation::messages::Category;

/// Details field of a GRI dataset that links to its contig set
pub const CONTIGSET_FIELD: &str = "original_contigset";

/// Type carried by contig set records
pub const CONTIGSET_TYPE: &str = "ContigSet";

/// Details field of a contig set that links to its flat sequence file
pub const FLAT_FILE_FIELD: &str = "flat_sequence_file";

/// Why a contig set could not be resolved. Each variant is terminal for the
/// genomic checks of a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("'Details' of this object does not contain 'original_contigset'")]
    Missing,

    #[error("'original_contigset' is not a valid link to a contigset object")]
    Invalid,

    #[error("Failed to fetch contigset: {0}")]
    Fetch(String),
}

impl ResolveError {
    /// The report category this error is recorded under
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Self::Missing => Category::ContigsetMissing,
            Self::Invalid => Category::ContigsetInvalid,
            Self::Fetch(_) => Category::ContigsetFetchFail,
        }
    }

    /// Positional parameters for the category template
    #[must_use]
    pub fn params(&self) -> Vec<String> {
        match self {
            Self::Missing | Self::Invalid => Vec::new(),
            Self::Fetch(cause) => vec![cause.clone()],
        }
    }
}

/// The `contigs` entry of a contig set's details
#[derive(Debug, Deserialize)]
struct ContigsContent {
    names: Vec<String>,
    sizes: Vec<u64>,
    #[serde(default)]
    offsets: Option<Vec<i64>>,
}

/// Extract the contig set ID linked from a dataset's details
///
/// # Errors
///
/// Returns `ResolveError::Missing` if the details have no `original_contigset`
/// field, or `ResolveError::Invalid` if it is not a link to a record.
pub fn contigset_reference(details: &Value) -> Result<ObjectId, ResolveError> {
    let link = details.get(CONTIGSET_FIELD).ok_or(ResolveError::Missing)?;

    parse_link(link)
        .filter(|id| id.class_prefix() == ObjectClass::Record.prefix())
        .ok_or(ResolveError::Invalid)
}

impl ContigCatalog {
    /// Resolve the contig set linked from a dataset's details.
    ///
    /// The flat sequence file, if declared, is not checked here; call
    /// [`ContigCatalog::resolve_flat_index`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::Missing` or `ResolveError::Invalid` for a bad
    /// reference, and `ResolveError::Fetch` if the contig set cannot be fetched
    /// or its content is malformed. No retries are attempted.
    pub fn resolve(store: &dyn ObjectStore, details: &Value) -> Result<Self, ResolveError> {
        let id = contigset_reference(details)?;
        debug!("Resolving contig set {id}");

        let desc = store
            .describe(&id)
            .map_err(|e| ResolveError::Fetch(e.to_string()))?;

        if desc.class != ObjectClass::Record || !desc.has_type(CONTIGSET_TYPE) {
            return Err(ResolveError::Invalid);
        }

        let content = desc
            .details
            .get("contigs")
            .ok_or_else(|| ResolveError::Fetch("contigset details have no 'contigs'".to_string()))?;
        let content: ContigsContent = serde_json::from_value(content.clone())
            .map_err(|e| ResolveError::Fetch(format!("malformed contigs: {e}")))?;

        if content.names.len() != content.sizes.len() {
            return Err(ResolveError::Fetch(format!(
                "contigset lists {} names but {} sizes",
                content.names.len(),
                content.sizes.len()
            )));
        }

        let contigs = content
            .names
            .into_iter()
            .zip(content.sizes)
            .map(|(name, size)| Contig::new(name, size))
            .collect();
        let contig_set =
            ContigSet::new(id.clone(), contigs).map_err(|e| ResolveError::Fetch(e.to_string()))?;

        info!(
            "Resolved contig set {} with {} contigs ({} bp)",
            id,
            contig_set.len(),
            contig_set.total_length()
        );

        let mut catalog = Self::new(contig_set);
        catalog.flat_declaration = desc.details.get(FLAT_FILE_FIELD).map(|link| FlatDeclaration {
            link: link.clone(),
            offsets: content.offsets,
        });
        Ok(catalog)
    }

    /// Check and attach the flat sequence file declared by the contig set.
    ///
    /// Returns `Ok(false)` when no flat file is declared; that is not an error.
    ///
    /// # Errors
    ///
    /// Returns a `FlatIndexError` if the declared file cannot be described or
    /// its offsets are inconsistent with the contigs. The catalog stays usable
    /// without a flat index in that case.
    pub fn resolve_flat_index(&mut self, store: &dyn ObjectStore) -> Result<bool, FlatIndexError> {
        let Some(declaration) = self.flat_declaration.take() else {
            return Ok(false);
        };

        let file = parse_link(&declaration.link)
            .filter(|id| id.class_prefix() == ObjectClass::File.prefix())
            .ok_or(FlatIndexError::InvalidLink)?;

        let desc = store
            .describe(&file)
            .map_err(|e| FlatIndexError::Fetch(e.to_string()))?;
        if desc.class != ObjectClass::File {
            return Err(FlatIndexError::InvalidLink);
        }
        let file_length = desc
            .size
            .ok_or_else(|| FlatIndexError::Fetch(format!("{file} has no size")))?;

        let offsets = declaration.offsets.ok_or(FlatIndexError::MissingOffsets)?;
        let index = FlatFileIndex::new(file, &offsets, file_length, &self.contig_set)?;

        debug!(
            "Attached flat sequence file {} ({} bytes)",
            index.file, index.file_length
        );
        self.flat_index = Some(index);
        Ok(true)
    }
}
