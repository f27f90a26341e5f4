//! Per-row checks of genomic coordinates against a resolved contig set.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::catalog::contigs::ContigCatalog;
use crate::store::ObjectStore;
use crate::utils::validation::ordinal;
use crate::validation::messages::Category;
use crate::validation::report::ValidationReport;
use crate::validation::schema::ColumnBinding;

/// A validator that sees every row of a table once, in order, then finalizes.
pub trait RowValidator {
    /// Check one row, recording findings. Returns false if the row is invalid.
    fn validate_row(&mut self, row: &[Value], report: &mut ValidationReport) -> bool;

    /// Run the checks that need the whole table. Returns false on failure.
    fn final_validate(&mut self, report: &mut ValidationReport) -> bool;
}

/// Column names used as parameters of row findings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub chr: String,
    pub lo: String,
    pub hi: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            chr: "chr".to_string(),
            lo: "lo".to_string(),
            hi: "hi".to_string(),
        }
    }
}

impl From<&ColumnBinding> for FieldNames {
    fn from(binding: &ColumnBinding) -> Self {
        Self {
            chr: binding.chr.name.clone(),
            lo: binding.lo.name.clone(),
            hi: binding.hi.name.clone(),
        }
    }
}

/// Counters of one pass over the rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowStats {
    pub rows_checked: u64,
    pub rows_invalid: u64,
    pub samples_attempted: u64,
    pub samples_failed: u64,
}

/// Settings for reading sequence samples out of the flat file
#[derive(Clone, Copy)]
pub struct Sampling<'a> {
    pub store: &'a dyn ObjectStore,
    /// Bytes read per sample
    pub length: usize,
    /// Sample every n-th row
    pub every: u64,
}

/// Checks `(chr, lo, hi)` triples against a resolved [`ContigCatalog`].
///
/// Construction requires a resolved catalog, so there is no way to check rows
/// before the contig set is known.
pub struct RowRangeChecker<'a> {
    catalog: ContigCatalog,
    fields: FieldNames,
    sampling: Option<Sampling<'a>>,
    /// Whether the chr column has already been warned about
    chr_warned: bool,
    stats: RowStats,
}

impl<'a> RowRangeChecker<'a> {
    #[must_use]
    pub fn new(catalog: ContigCatalog, fields: FieldNames) -> Self {
        Self {
            catalog,
            fields,
            sampling: None,
            chr_warned: false,
            stats: RowStats::default(),
        }
    }

    /// Read a short sample of sequence for rows that pass the bound checks.
    ///
    /// Has no effect unless the catalog carries a flat file index.
    #[must_use]
    pub fn with_sampling(mut self, sampling: Sampling<'a>) -> Self {
        self.sampling = Some(sampling);
        self
    }

    #[must_use]
    pub fn stats(&self) -> RowStats {
        self.stats
    }

    /// Check one row; `row_number` is 1-based.
    ///
    /// An unknown contig is a warning, recorded once for the chr column at the
    /// first row where it happens, and leaves the row valid. Bound checks are
    /// independent of each other and all of them are recorded.
    pub fn check(
        &mut self,
        chr: &str,
        lo: i64,
        hi: i64,
        row_number: u64,
        report: &mut ValidationReport,
    ) -> bool {
        self.stats.rows_checked += 1;

        let Some((_, size, offset)) = self.catalog.lookup(chr) else {
            if !self.chr_warned {
                self.chr_warned = true;
                debug!(
                    "Contig {chr} in the {} row is not in the contig set",
                    ordinal(row_number)
                );
                report.record(
                    Category::ChrInvalid,
                    vec![ordinal(row_number), self.fields.chr.clone()],
                );
            }
            return true;
        };

        let mut valid = true;
        if lo < 0 {
            report.record(
                Category::LoTooSmall,
                vec![ordinal(row_number), self.fields.lo.clone()],
            );
            valid = false;
        }
        if i128::from(lo) > i128::from(size) {
            report.record(
                Category::LoTooLarge,
                vec![ordinal(row_number), self.fields.lo.clone(), size.to_string()],
            );
            valid = false;
        }
        if i128::from(hi) > i128::from(size) {
            report.record(
                Category::HiTooLarge,
                vec![ordinal(row_number), self.fields.hi.clone()],
            );
            valid = false;
        }

        if valid {
            if let (Some(offset), Ok(lo)) = (offset, u64::try_from(lo)) {
                self.sample(offset, lo, size, row_number);
            }
        } else {
            self.stats.rows_invalid += 1;
        }
        valid
    }

    /// Record a row that could not be checked at all
    pub fn record_malformed(
        &mut self,
        row_number: u64,
        problem: &str,
        report: &mut ValidationReport,
    ) {
        self.stats.rows_checked += 1;
        self.stats.rows_invalid += 1;
        report.record(
            Category::RowMalformed,
            vec![ordinal(row_number), problem.to_string()],
        );
    }

    /// Read `min(length, size - lo)` bytes at `offset + lo`. The outcome only
    /// feeds the counters and the debug log.
    fn sample(&mut self, offset: u64, lo: u64, size: u64, row_number: u64) {
        let (Some(sampling), Some(flat)) = (self.sampling, self.catalog.flat_index.as_ref()) else {
            return;
        };
        if row_number.saturating_sub(1) % sampling.every.max(1) != 0 {
            return;
        }

        let remaining = usize::try_from(size - lo).unwrap_or(usize::MAX);
        let len = sampling.length.min(remaining);
        if len == 0 {
            return;
        }

        self.stats.samples_attempted += 1;
        let position = offset + lo;
        match sampling.store.read_range(&flat.file, position, len) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_alphabetic) => {}
            Ok(_) => {
                self.stats.samples_failed += 1;
                debug!(
                    "Sample at byte {position} of {} for the {} row is not sequence",
                    flat.file,
                    ordinal(row_number)
                );
            }
            Err(e) => {
                self.stats.samples_failed += 1;
                debug!(
                    "Cannot read sample for the {} row: {e}",
                    ordinal(row_number)
                );
            }
        }
    }
}

/// The genomic range [`RowValidator`]: projects rows through the column
/// binding, checks coordinates, and requires the `gri` index at the end.
pub struct GriRowValidator<'a> {
    binding: ColumnBinding,
    checker: RowRangeChecker<'a>,
    has_gri_index: bool,
    row_number: u64,
}

impl<'a> GriRowValidator<'a> {
    #[must_use]
    pub fn new(binding: ColumnBinding, checker: RowRangeChecker<'a>, has_gri_index: bool) -> Self {
        Self {
            binding,
            checker,
            has_gri_index,
            row_number: 0,
        }
    }

    /// Record a row the store failed to produce
    pub fn record_unreadable(&mut self, problem: &str, report: &mut ValidationReport) {
        self.row_number += 1;
        self.checker.record_malformed(self.row_number, problem, report);
    }

    #[must_use]
    pub fn stats(&self) -> RowStats {
        self.checker.stats()
    }
}

impl RowValidator for GriRowValidator<'_> {
    fn validate_row(&mut self, row: &[Value], report: &mut ValidationReport) -> bool {
        self.row_number += 1;

        match self.binding.project(row) {
            Ok(gri) => self
                .checker
                .check(gri.chr, gri.lo, gri.hi, self.row_number, report),
            Err(problem) => {
                self.checker.record_malformed(self.row_number, &problem, report);
                false
            }
        }
    }

    fn final_validate(&mut self, report: &mut ValidationReport) -> bool {
        if !self.has_gri_index {
            report.record(Category::GriIndexMissing, Vec::new());
        }
        self.has_gri_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::contigs::{ContigSet, FlatFileIndex};
    use crate::core::contig::Contig;
    use crate::core::object::ObjectDescription;
    use crate::core::types::{ObjectClass, ObjectId};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn contig_set() -> ContigSet {
        ContigSet::new(
            ObjectId::new("record-000000000000000000000001"),
            vec![Contig::new("chr1", 1000), Contig::new("chr2", 8)],
        )
        .unwrap()
    }

    fn checker() -> RowRangeChecker<'static> {
        RowRangeChecker::new(ContigCatalog::new(contig_set()), FieldNames::default())
    }

    fn flat_id() -> ObjectId {
        ObjectId::new("file-000000000000000000000002")
    }

    /// A store holding a flat file for the contig set: 1000 `A`s then 8 bases
    fn flat_store(chr2: &[u8]) -> MemoryStore {
        let mut content = vec![b'A'; 1000];
        content.extend_from_slice(chr2);
        let mut store = MemoryStore::new();
        store.insert_file(ObjectDescription::new(flat_id(), ObjectClass::File), content);
        store
    }

    fn flat_catalog() -> ContigCatalog {
        let set = contig_set();
        let flat = FlatFileIndex::new(flat_id(), &[0, 1000], 1008, &set).unwrap();
        ContigCatalog::new(set).with_flat_index(Some(flat))
    }

    #[test]
    fn test_valid_row_records_nothing() {
        let mut report = ValidationReport::new();
        let mut checker = checker();

        assert!(checker.check("chr1", 100, 500, 1, &mut report));
        // Both ends of the contig are valid coordinates
        assert!(checker.check("chr1", 0, 1000, 2, &mut report));
        assert!(checker.check("chr1", 1000, 1000, 3, &mut report));
        assert!(report.is_empty());
        assert_eq!(checker.stats().rows_checked, 3);
        assert_eq!(checker.stats().rows_invalid, 0);
    }

    #[test]
    fn test_negative_lo() {
        let mut report = ValidationReport::new();
        assert!(!checker().check("chr1", -5, 200, 1, &mut report));
        assert_eq!(report.messages(), vec!["In 1st row, lo is negative"]);
    }

    #[test]
    fn test_lo_and_hi_past_end() {
        let mut report = ValidationReport::new();
        assert!(!checker().check("chr1", 1001, 2000, 22, &mut report));
        assert_eq!(
            report.messages(),
            vec![
                "In 22nd row, lo is larger than 1000",
                "In 22nd row, hi is larger than the size of the mapped contig",
            ]
        );
    }

    #[test]
    fn test_hi_past_end_only() {
        let mut report = ValidationReport::new();
        assert!(!checker().check("chr1", 0, 2000, 3, &mut report));
        assert_eq!(report.count(Category::HiTooLarge), 1);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_unknown_contig_warns_once_for_column() {
        let mut report = ValidationReport::new();
        let mut checker = checker();

        assert!(checker.check("chr1", 0, 10, 1, &mut report));
        assert!(checker.check("chrUn_a", 0, 10, 2, &mut report));
        assert!(checker.check("chrUn_b", -100, 5000, 3, &mut report));
        assert!(checker.check("chrUn_c", 0, 10, 4, &mut report));
        assert!(checker.check("chrUn_a", 0, 10, 5, &mut report));

        assert!(report.is_valid());
        assert_eq!(report.warning_count(), 1);
        assert_eq!(
            report.messages(),
            vec!["In some row, such as the 2nd one, chr does not match any contig name"]
        );
    }

    #[test]
    fn test_field_names_from_binding() {
        let fields = FieldNames {
            chr: "chrom".to_string(),
            lo: "start".to_string(),
            hi: "end".to_string(),
        };
        let mut report = ValidationReport::new();
        let mut checker = RowRangeChecker::new(ContigCatalog::new(contig_set()), fields);

        checker.check("chr2", -1, 9, 1, &mut report);
        assert_eq!(
            report.messages(),
            vec![
                "In 1st row, start is negative",
                "In 1st row, end is larger than the size of the mapped contig",
            ]
        );
    }

    #[test]
    fn test_sampling_reads_flat_file() {
        let store = flat_store(b"ACGTACGT");
        let mut report = ValidationReport::new();
        let mut checker = RowRangeChecker::new(flat_catalog(), FieldNames::default())
            .with_sampling(Sampling {
                store: &store,
                length: 4,
                every: 1,
            });

        assert!(checker.check("chr2", 2, 8, 1, &mut report));
        // Empty range at the end of the contig has nothing to sample
        assert!(checker.check("chr2", 8, 8, 2, &mut report));
        // Rows with bound errors are not sampled
        assert!(!checker.check("chr2", 9, 9, 3, &mut report));

        let stats = checker.stats();
        assert_eq!(stats.samples_attempted, 1);
        assert_eq!(stats.samples_failed, 0);
    }

    #[test]
    fn test_sampling_failures_are_advisory() {
        let store = flat_store(b"AC\0\0ACGT");
        let mut report = ValidationReport::new();
        let mut checker = RowRangeChecker::new(flat_catalog(), FieldNames::default())
            .with_sampling(Sampling {
                store: &store,
                length: 4,
                every: 1,
            });

        assert!(checker.check("chr2", 0, 4, 1, &mut report));
        assert!(report.is_empty());
        assert_eq!(checker.stats().samples_attempted, 1);
        assert_eq!(checker.stats().samples_failed, 1);
    }

    #[test]
    fn test_sampling_unreadable_file() {
        let store = MemoryStore::new();
        let mut report = ValidationReport::new();
        let mut checker = RowRangeChecker::new(flat_catalog(), FieldNames::default())
            .with_sampling(Sampling {
                store: &store,
                length: 1,
                every: 1,
            });

        assert!(checker.check("chr1", 10, 20, 1, &mut report));
        assert!(report.is_valid());
        assert_eq!(checker.stats().samples_failed, 1);
    }

    #[test]
    fn test_sample_every() {
        let store = flat_store(b"ACGTACGT");
        let mut report = ValidationReport::new();
        let mut checker = RowRangeChecker::new(flat_catalog(), FieldNames::default())
            .with_sampling(Sampling {
                store: &store,
                length: 1,
                every: 3,
            });

        for row in 1..=7 {
            checker.check("chr1", 0, 10, row, &mut report);
        }
        // Rows 1, 4 and 7
        assert_eq!(checker.stats().samples_attempted, 3);
    }

    #[test]
    fn test_gri_row_validator() {
        let binding = ColumnBinding {
            chr: crate::validation::schema::BoundColumn {
                name: "chr".to_string(),
                index: 0,
            },
            lo: crate::validation::schema::BoundColumn {
                name: "lo".to_string(),
                index: 1,
            },
            hi: crate::validation::schema::BoundColumn {
                name: "hi".to_string(),
                index: 2,
            },
        };
        let checker =
            RowRangeChecker::new(ContigCatalog::new(contig_set()), FieldNames::from(&binding));
        let mut validator = GriRowValidator::new(binding, checker, false);
        let mut report = ValidationReport::new();

        assert!(validator.validate_row(&[json!("chr1"), json!(1), json!(2)], &mut report));
        assert!(!validator.validate_row(&[json!("chr1"), json!(null), json!(2)], &mut report));
        validator.record_unreadable("Line 3 has 2 fields, expected 3", &mut report);
        assert!(!validator.validate_row(&[json!("chr1"), json!(-1), json!(2)], &mut report));
        assert!(!validator.final_validate(&mut report));

        assert_eq!(
            report.messages(),
            vec![
                "In 2nd row, lo is not an integer",
                "In 3rd row, Line 3 has 2 fields, expected 3",
                "In 4th row, lo is negative",
                "Object does not have genomic range index named 'gri'",
            ]
        );
        assert_eq!(
            validator.stats(),
            RowStats {
                rows_checked: 4,
                rows_invalid: 3,
                samples_attempted: 0,
                samples_failed: 0,
            }
        );
    }
}
