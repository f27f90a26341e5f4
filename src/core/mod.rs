//! Core data types shared by the store, catalog and validation layers.
//!
//! - [`types::ObjectId`], [`types::ObjectClass`]: identity of platform objects
//! - [`object::ObjectDescription`]: what the store knows about an object
//! - [`contig::Contig`]: a named sequence with its length
//! - [`types::Severity`]: whether a finding is an error or a warning
//!
//! Contig names are compared **exactly**. `chr1` and `1` are different contigs.

pub mod contig;
pub mod object;
pub mod types;
