use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::core::contig::Contig;
use crate::core::types::ObjectId;
use crate::utils::validation::{check_contig_limit, MAX_CONTIGS};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContigSetError {
    #[error("contig name '{0}' appears more than once")]
    DuplicateName(String),

    #[error("contig set is empty")]
    Empty,

    #[error("Too many contigs: {0} exceeds maximum allowed ({max})", max = MAX_CONTIGS)]
    TooManyContigs(usize),
}

/// Errors describing a flat sequence file whose offsets disagree with its contig set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlatIndexError {
    #[error("'flat_sequence_file' is not a valid link to a file object")]
    InvalidLink,

    #[error("a flat sequence file is declared but the contigs carry no offsets")]
    MissingOffsets,

    #[error("{offsets} offsets were declared for {contigs} contigs")]
    LengthMismatch { offsets: usize, contigs: usize },

    #[error("offset of contig {0} is negative")]
    NegativeOffset(String),

    #[error("offset of contig {0} is smaller than the offset of the contig before it")]
    DecreasingOffset(String),

    #[error("contig {name} ends at byte {end}, past the end of the flat file ({file_length} bytes)")]
    OutOfBounds {
        name: String,
        end: u64,
        file_length: u64,
    },

    #[error("cannot describe the flat sequence file: {0}")]
    Fetch(String),
}

/// The ordered contigs of a reference genome with a name lookup table
#[derive(Debug, Clone)]
pub struct ContigSet {
    /// ID of the record the contigs were resolved from
    pub id: ObjectId,

    contigs: Vec<Contig>,

    /// Index: contig name -> position in `contigs`
    name_to_index: HashMap<String, usize>,
}

impl ContigSet {
    /// Build a contig set, rejecting empty sets and duplicate names
    ///
    /// # Errors
    ///
    /// Returns `ContigSetError::Empty` when no contigs are given,
    /// `ContigSetError::DuplicateName` when a name repeats, or
    /// `ContigSetError::TooManyContigs` if the limit is exceeded.
    pub fn new(id: ObjectId, contigs: Vec<Contig>) -> Result<Self, ContigSetError> {
        if contigs.is_empty() {
            return Err(ContigSetError::Empty);
        }

        let mut name_to_index = HashMap::with_capacity(contigs.len());
        for (index, contig) in contigs.iter().enumerate() {
            // Check contig limit for DOS protection
            if check_contig_limit(index).is_some() {
                return Err(ContigSetError::TooManyContigs(contigs.len()));
            }
            if name_to_index.insert(contig.name.clone(), index).is_some() {
                return Err(ContigSetError::DuplicateName(contig.name.clone()));
            }
        }

        Ok(Self {
            id,
            contigs,
            name_to_index,
        })
    }

    /// Look up a contig by exact name
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<(usize, &Contig)> {
        self.name_to_index
            .get(name)
            .map(|&index| (index, &self.contigs[index]))
    }

    #[must_use]
    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// Sum of all contig lengths
    #[must_use]
    pub fn total_length(&self) -> u64 {
        self.contigs.iter().map(|c| c.length).sum()
    }
}

/// Byte offsets of each contig inside a flat sequence file
#[derive(Debug, Clone, Serialize)]
pub struct FlatFileIndex {
    /// The flat sequence file
    pub file: ObjectId,

    /// Start offset of each contig, aligned with the contig set
    offsets: Vec<u64>,

    /// Total size of the flat file in bytes
    pub file_length: u64,
}

impl FlatFileIndex {
    /// Check declared offsets against the contig set and the flat file size
    ///
    /// # Errors
    ///
    /// Returns a `FlatIndexError` if the offsets are not aligned with the
    /// contigs, are negative or decreasing, or if any contig would extend
    /// past the end of the file.
    pub fn new(
        file: ObjectId,
        offsets: &[i64],
        file_length: u64,
        contig_set: &ContigSet,
    ) -> Result<Self, FlatIndexError> {
        if offsets.len() != contig_set.len() {
            return Err(FlatIndexError::LengthMismatch {
                offsets: offsets.len(),
                contigs: contig_set.len(),
            });
        }

        let mut checked = Vec::with_capacity(offsets.len());
        let mut previous = 0u64;

        for (&offset, contig) in offsets.iter().zip(contig_set.contigs()) {
            let offset = u64::try_from(offset)
                .map_err(|_| FlatIndexError::NegativeOffset(contig.name.clone()))?;

            if offset < previous {
                return Err(FlatIndexError::DecreasingOffset(contig.name.clone()));
            }

            let end = offset.saturating_add(contig.length);
            if end > file_length {
                return Err(FlatIndexError::OutOfBounds {
                    name: contig.name.clone(),
                    end,
                    file_length,
                });
            }

            previous = offset;
            checked.push(offset);
        }

        Ok(Self {
            file,
            offsets: checked,
            file_length,
        })
    }

    /// Start offset of the contig at `index`
    #[must_use]
    pub fn offset(&self, index: usize) -> Option<u64> {
        self.offsets.get(index).copied()
    }
}

/// A flat sequence file as declared by a contig set, before it is checked
#[derive(Debug, Clone, PartialEq)]
pub struct FlatDeclaration {
    /// The link value found in the contig set details
    pub link: Value,
    /// Offsets listed alongside the contig names and sizes
    pub offsets: Option<Vec<i64>>,
}

/// A resolved contig set together with its optional flat file index.
///
/// Only a successfully resolved catalog can be handed to the row checker, so
/// rows are never checked against a missing reference.
#[derive(Debug, Clone)]
pub struct ContigCatalog {
    pub contig_set: ContigSet,
    pub flat_index: Option<FlatFileIndex>,
    pub(super) flat_declaration: Option<FlatDeclaration>,
}

impl ContigCatalog {
    #[must_use]
    pub fn new(contig_set: ContigSet) -> Self {
        Self {
            contig_set,
            flat_index: None,
            flat_declaration: None,
        }
    }

    #[must_use]
    pub fn with_flat_index(mut self, flat_index: Option<FlatFileIndex>) -> Self {
        self.flat_index = flat_index;
        self
    }

    /// Look up a contig, returning `(index, size, flat offset)`
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<(usize, u64, Option<u64>)> {
        self.contig_set.lookup(name).map(|(index, contig)| {
            let offset = self.flat_index.as_ref().and_then(|f| f.offset(index));
            (index, contig.length, offset)
        })
    }

    #[must_use]
    pub fn has_flat_file(&self) -> bool {
        self.flat_index.is_some()
    }
}
