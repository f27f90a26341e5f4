//! Parsers for reference and table inputs of the local object store.
//!
//! This module provides parsers for:
//!
//! - **FASTA files**: Flatten sequences into a flat sequence file with per-contig offsets
//! - **FASTA index (.fai) files**: Contig names and lengths without sequence
//! - **TSV rows**: Lazily read gtable rows, typing each cell by its column
//!
//! ## Flat sequence files
//!
//! A flat sequence file is the concatenation of every contig's bases with no
//! headers or line breaks. Contig `i` starts at byte `offsets[i]` and spans
//! `length[i]` bytes, so base `pos` of a contig lives at `offsets[i] + pos`.

use thiserror::Error;

use crate::utils::validation::MAX_CONTIGS;

pub mod fai;
pub mod fasta;
pub mod rows;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Too many contigs: {0} exceeds maximum allowed ({max})", max = MAX_CONTIGS)]
    TooManyContigs(usize),
}
