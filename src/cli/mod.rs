//! Command-line interface for gri-validator.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **validate**: Validate a GRI gtable in a local object store
//! - **contigs**: Show the contigs of a contig set
//! - **import-fasta**: Create a contig set with a flat sequence file from a FASTA
//! - **import-fai**: Create a contig set from a FASTA index
//! - **import-table**: Create a GRI gtable from a TSV file
//!
//! ## Usage
//!
//! ```text
//! # Build a contig set from a reference
//! gri-validator import-fasta store/ ref.fa.gz
//!
//! # Add a table of spans on that reference
//! gri-validator import-table store/ spans.tsv --contigset record-...
//!
//! # Validate it, sampling the flat file
//! gri-validator validate store/ gtable-... --sample
//!
//! # JSON output for scripting
//! gri-validator validate store/ gtable-... --format json
//! ```

use clap::{Parser, Subcommand};

pub mod contigs;
pub mod import;
pub mod validate;

#[derive(Parser)]
#[command(name = "gri-validator")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Validate genomic range index tables against their contig set")]
#[command(
    long_about = "gri-validator checks that a table of genomic ranges is consistent with the reference it claims.\n\nFor a gtable of type 'gri' it verifies:\n- The chr, lo and hi columns exist with the right types\n- The linked contig set can be resolved\n- Every row lies within the bounds of its contig\n- A genomic range index named 'gri' is declared"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a GRI gtable
    Validate(validate::ValidateArgs),

    /// Show the contigs of a contig set
    Contigs(contigs::ContigsArgs),

    /// Import a FASTA as a contig set with a flat sequence file
    ImportFasta(import::ImportFastaArgs),

    /// Import a FASTA index as a contig set
    ImportFai(import::ImportFaiArgs),

    /// Import a TSV file as a GRI gtable
    ImportTable(import::ImportTableArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
