use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::contigs::ContigCatalog;
use crate::core::object::ObjectDescription;
use crate::core::types::ObjectId;
use crate::store::{ObjectStore, StoreError};
use crate::validation::messages::Category;
use crate::validation::report::ValidationReport;
use crate::validation::rows::{
    FieldNames, GriRowValidator, RowRangeChecker, RowStats, RowValidator, Sampling,
};
use crate::validation::schema::{has_genomic_index, validate_types, ColumnBinding};

/// Default number of bytes read per flat file sample
pub const DEFAULT_SAMPLE_LENGTH: usize = 1;

/// Configuration for the validation engine
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Read a short sequence sample from the flat file for rows that pass
    pub sample_flat_file: bool,
    /// Bytes read per sample
    pub sample_length: usize,
    /// Sample every n-th row (1 = every row)
    pub sample_every: u64,
    /// Store at most this many findings; further ones are only counted
    pub max_findings: Option<usize>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            sample_flat_file: false,
            sample_length: DEFAULT_SAMPLE_LENGTH,
            sample_every: 1,
            max_findings: None,
        }
    }
}

/// Last stage a validation run completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    SchemaChecked,
    ContigResolved,
    RowsChecked,
    IndexChecked,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::SchemaChecked => "schema checked",
            Self::ContigResolved => "contig set resolved",
            Self::RowsChecked => "rows checked",
            Self::IndexChecked => "index checked",
            Self::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// Result of validating one object
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub object: ObjectId,
    pub valid: bool,
    pub stage: Stage,
    pub report: ValidationReport,
    pub stats: RowStats,
}

/// Validates GRI gtables held in an object store
pub struct GriValidator<'a> {
    store: &'a dyn ObjectStore,
    config: ValidatorConfig,
}

impl<'a> GriValidator<'a> {
    /// Create a validator with default configuration
    #[must_use]
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self::with_config(store, ValidatorConfig::default())
    }

    #[must_use]
    pub fn with_config(store: &'a dyn ObjectStore, config: ValidatorConfig) -> Self {
        Self { store, config }
    }

    /// Describe and validate an object
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the object itself cannot be described. Every
    /// other problem is a finding in the returned outcome.
    pub fn validate(&self, id: &ObjectId) -> Result<ValidationOutcome, StoreError> {
        let desc = self.store.describe(id)?;
        Ok(self.validate_description(&desc))
    }

    /// Validate an object that has already been described.
    ///
    /// Schema and contig set problems stop the run at their stage. Row
    /// problems never do. The verdict is valid iff no error was recorded.
    #[must_use]
    pub fn validate_description(&self, desc: &ObjectDescription) -> ValidationOutcome {
        info!("Validating {}", desc.id);
        let mut report = ValidationReport::new().with_max_findings(self.config.max_findings);
        let mut run = Run {
            stage: Stage::Start,
            stats: RowStats::default(),
        };

        self.run(desc, &mut report, &mut run);
        if run.stage == Stage::IndexChecked {
            run.stage = Stage::Done;
        }

        let valid = report.is_valid();
        info!(
            "{} is {} ({} errors, {} warnings, stopped at {})",
            desc.id,
            if valid { "valid" } else { "invalid" },
            report.error_count(),
            report.warning_count(),
            run.stage
        );

        ValidationOutcome {
            object: desc.id.clone(),
            valid,
            stage: run.stage,
            report,
            stats: run.stats,
        }
    }

    fn run(&self, desc: &ObjectDescription, report: &mut ValidationReport, run: &mut Run) {
        if !validate_types(desc, report) {
            return;
        }
        let Some(binding) = ColumnBinding::bind(desc, report) else {
            return;
        };
        run.stage = Stage::SchemaChecked;
        debug!("Schema of {} checked", desc.id);

        let mut catalog = match ContigCatalog::resolve(self.store, &desc.details) {
            Ok(catalog) => catalog,
            Err(e) => {
                debug!("Contig set of {} not resolved: {e}", desc.id);
                report.record(e.category(), e.params());
                return;
            }
        };
        if let Err(e) = catalog.resolve_flat_index(self.store) {
            warn!("Ignoring flat sequence file of {}: {e}", catalog.contig_set.id);
            report.record(Category::FlatIndexInvalid, vec![e.to_string()]);
        }
        run.stage = Stage::ContigResolved;

        let mut checker = RowRangeChecker::new(catalog, FieldNames::from(&binding));
        if self.config.sample_flat_file {
            checker = checker.with_sampling(Sampling {
                store: self.store,
                length: self.config.sample_length,
                every: self.config.sample_every,
            });
        }
        let has_index = has_genomic_index(desc, &binding);
        let mut validator = GriRowValidator::new(binding, checker, has_index);

        match self.store.rows(&desc.id) {
            Ok(rows) => {
                for row in rows {
                    match row {
                        Ok(row) => {
                            validator.validate_row(&row, report);
                        }
                        Err(e) => validator.record_unreadable(&e.to_string(), report),
                    }
                }
            }
            Err(e) => report.record(Category::RowFetchFail, vec![e.to_string()]),
        }
        run.stats = validator.stats();
        run.stage = Stage::RowsChecked;
        debug!(
            "Checked {} rows of {} ({} invalid)",
            run.stats.rows_checked, desc.id, run.stats.rows_invalid
        );

        validator.final_validate(report);
        run.stage = Stage::IndexChecked;
    }
}

struct Run {
    stage: Stage,
    stats: RowStats,
}
