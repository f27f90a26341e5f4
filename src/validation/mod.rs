//! Validation of genomic range index (GRI) gtables.
//!
//! A run goes through these stages, in order:
//!
//! 1. **Schema**: the object has the `gri` type and string `chr` plus integer
//!    `lo`/`hi` columns
//! 2. **Contig set**: `original_contigset` resolves to a contig set
//! 3. **Rows**: every row's coordinates lie within its contig
//! 4. **Index**: a genomic index named `gri` is declared
//!
//! Schema and contig set failures end the run. Row findings never do. The
//! object is valid iff the [`report::ValidationReport`] holds no error;
//! unknown contig names are only warnings.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gri_validator::core::types::ObjectId;
//! use gri_validator::store::LocalStore;
//! use gri_validator::validation::engine::GriValidator;
//!
//! let store = LocalStore::open("store").unwrap();
//! let validator = GriValidator::new(&store);
//! let outcome = validator
//!     .validate(&ObjectId::new("gtable-000000000000000000000001"))
//!     .unwrap();
//!
//! for message in outcome.report.messages() {
//!     println!("{message}");
//! }
//! ```

pub mod engine;
pub mod messages;
pub mod report;
pub mod rows;
pub mod schema;
