//! The contig set a GRI dataset refers to.
//!
//! A dataset names its reference through the `original_contigset` field of its
//! details. Resolving that link yields a [`contigs::ContigCatalog`]: the ordered
//! contigs with their sizes, and optionally the byte offset of each contig in a
//! flat sequence file.
//!
//! ## Example
//!
//! ```rust
//! use gri_validator::catalog::contigs::ContigCatalog;
//! use gri_validator::core::object::{make_link, ObjectDescription};
//! use gri_validator::core::types::{ObjectClass, ObjectId};
//! use gri_validator::store::MemoryStore;
//! use serde_json::json;
//!
//! let contigset = ObjectId::new("record-000000000000000000000001");
//! let mut store = MemoryStore::new();
//! store.insert(
//!     ObjectDescription::new(contigset.clone(), ObjectClass::Record)
//!         .with_types(["ContigSet"])
//!         .with_details(json!({"contigs": {"names": ["chr1"], "sizes": [1000]}})),
//! );
//!
//! let details = json!({"original_contigset": make_link(&contigset)});
//! let catalog = ContigCatalog::resolve(&store, &details).unwrap();
//! assert_eq!(catalog.lookup("chr1"), Some((0, 1000, None)));
//! ```

pub mod contigs;
pub mod resolve;
