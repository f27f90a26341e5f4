//! Schema checks of a GRI gtable and projection of its rows.

use serde_json::Value;

use crate::core::object::ObjectDescription;
use crate::parsing::rows::INTEGER_COLUMN_TYPES;
use crate::validation::messages::Category;
use crate::validation::report::ValidationReport;

/// Type a gtable must carry to be validated as a genomic range index
pub const GRI_TYPE: &str = "gri";

/// Name of the genomic range index every GRI gtable declares
pub const GRI_INDEX_NAME: &str = "gri";

/// Index type of genomic range indices
pub const GENOMIC_INDEX_TYPE: &str = "genomic";

/// A logical column bound to its position in the row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundColumn {
    pub name: String,
    pub index: usize,
}

/// Positions of the `chr`, `lo` and `hi` columns in the gtable schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub chr: BoundColumn,
    pub lo: BoundColumn,
    pub hi: BoundColumn,
}

/// One row after projection through a [`ColumnBinding`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GriRow<'a> {
    pub chr: &'a str,
    pub lo: i64,
    pub hi: i64,
}

impl ColumnBinding {
    /// Bind the default `chr`, `lo` and `hi` columns of a description.
    ///
    /// Records `COLUMN_MISSING` or `COLUMN_TYPE_INVALID` for every column that
    /// is absent or of the wrong type, and returns None if any was recorded.
    pub fn bind(desc: &ObjectDescription, report: &mut ValidationReport) -> Option<Self> {
        let chr = bind_column(desc, "chr", &["string"], "string", report);
        let lo = bind_column(desc, "lo", INTEGER_COLUMN_TYPES, "integer", report);
        let hi = bind_column(desc, "hi", INTEGER_COLUMN_TYPES, "integer", report);

        Some(Self {
            chr: chr?,
            lo: lo?,
            hi: hi?,
        })
    }

    /// Pull the bound cells out of a row.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the row is too short or a bound
    /// cell is not of the expected kind.
    pub fn project<'a>(&self, row: &'a [Value]) -> Result<GriRow<'a>, String> {
        let cell = |column: &BoundColumn| {
            row.get(column.index)
                .ok_or_else(|| format!("{} is missing", column.name))
        };

        let chr = cell(&self.chr)?
            .as_str()
            .ok_or_else(|| format!("{} is not a string", self.chr.name))?;
        let lo = cell(&self.lo)?
            .as_i64()
            .ok_or_else(|| format!("{} is not an integer", self.lo.name))?;
        let hi = cell(&self.hi)?
            .as_i64()
            .ok_or_else(|| format!("{} is not an integer", self.hi.name))?;

        Ok(GriRow { chr, lo, hi })
    }
}

fn bind_column(
    desc: &ObjectDescription,
    name: &str,
    allowed: &[&str],
    expected: &str,
    report: &mut ValidationReport,
) -> Option<BoundColumn> {
    let Some((index, column)) = desc.column(name) else {
        report.record(Category::ColumnMissing, vec![name.to_string()]);
        return None;
    };

    if !allowed.contains(&column.column_type.as_str()) {
        report.record(
            Category::ColumnTypeInvalid,
            vec![
                name.to_string(),
                column.column_type.clone(),
                expected.to_string(),
            ],
        );
        return None;
    }

    Some(BoundColumn {
        name: name.to_string(),
        index,
    })
}

/// Record `TYPE_NOT_GRI` unless the object carries the `gri` type
pub fn validate_types(desc: &ObjectDescription, report: &mut ValidationReport) -> bool {
    if desc.has_type(GRI_TYPE) {
        true
    } else {
        report.record(Category::TypeNotGri, Vec::new());
        false
    }
}

/// Whether the object declares a genomic index named `gri` over the bound columns.
///
/// Index fields left unset are not compared.
#[must_use]
pub fn has_genomic_index(desc: &ObjectDescription, binding: &ColumnBinding) -> bool {
    let Some(index) = desc.index(GRI_INDEX_NAME) else {
        return false;
    };

    let matches = |declared: &Option<String>, column: &BoundColumn| {
        declared.as_ref().map_or(true, |name| *name == column.name)
    };

    index.index_type == GENOMIC_INDEX_TYPE
        && matches(&index.chr, &binding.chr)
        && matches(&index.lo, &binding.lo)
        && matches(&index.hi, &binding.hi)
}
