//! # gri-validator
//!
//! A library for validating genomic range index (GRI) tables against the
//! reference genome they refer to.
//!
//! A GRI table stores one genomic range per row: a contig name (`chr`), a low
//! coordinate (`lo`) and a high coordinate (`hi`). The table links to a
//! *contig set* listing the contigs of its reference and their sizes, and the
//! contig set may point at a flat sequence file holding the bases of every
//! contig back to back.
//!
//! `gri-validator` checks that:
//!
//! - **Schema**: the table has the `gri` type and typed `chr`/`lo`/`hi` columns
//! - **Reference**: the linked contig set resolves, and its flat file offsets are consistent
//! - **Rows**: every range lies within the bounds of its contig
//! - **Index**: a genomic range index named `gri` is declared
//!
//! Unknown contig names are reported as warnings; everything else is an error.
//!
//! ## Example
//!
//! ```rust
//! use gri_validator::core::object::{make_link, ColumnSpec, IndexSpec, ObjectDescription};
//! use gri_validator::core::types::{ObjectClass, ObjectId};
//! use gri_validator::store::MemoryStore;
//! use gri_validator::GriValidator;
//! use serde_json::json;
//!
//! let contigset = ObjectId::new("record-000000000000000000000001");
//! let table = ObjectId::new("gtable-000000000000000000000002");
//!
//! let mut store = MemoryStore::new();
//! store.insert(
//!     ObjectDescription::new(contigset.clone(), ObjectClass::Record)
//!         .with_types(["ContigSet"])
//!         .with_details(json!({"contigs": {"names": ["chr1"], "sizes": [1000]}})),
//! );
//! store.insert_table(
//!     ObjectDescription::new(table.clone(), ObjectClass::Gtable)
//!         .with_types(["gri"])
//!         .with_columns(vec![
//!             ColumnSpec::new("chr", "string"),
//!             ColumnSpec::new("lo", "int64"),
//!             ColumnSpec::new("hi", "int64"),
//!         ])
//!         .with_index(IndexSpec::genomic("gri", "chr", "lo", "hi"))
//!         .with_details(json!({"original_contigset": make_link(&contigset)})),
//!     vec![vec![json!("chr1"), json!(-5), json!(200)]],
//! );
//!
//! let outcome = GriValidator::new(&store).validate(&table).unwrap();
//! assert!(!outcome.valid);
//! assert_eq!(outcome.report.messages(), vec!["In 1st row, lo is negative"]);
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Contig set resolution and flat file offsets
//! - [`core`]: Core data types for objects, contigs and severities
//! - [`store`]: Object store trait with in-memory and directory backends
//! - [`validation`]: Schema, row and index checks, and the findings report
//! - [`parsing`]: Parsers for FASTA, FASTA index and TSV row files
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod parsing;
pub mod store;
pub mod utils;
pub mod validation;

// Re-export commonly used types for convenience
pub use catalog::contigs::{ContigCatalog, ContigSet, FlatFileIndex};
pub use catalog::resolve::ResolveError;
pub use core::contig::Contig;
pub use core::object::ObjectDescription;
pub use core::types::*;
pub use store::{LocalStore, MemoryStore, ObjectStore, StoreError};
pub use validation::engine::{GriValidator, ValidationOutcome, ValidatorConfig};
pub use validation::messages::Category;
pub use validation::report::{Finding, ValidationReport};
