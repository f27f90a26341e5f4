//! The fixed catalog of finding categories and their message templates.
//!
//! Templates use `{n}` for the n-th (1-based) positional parameter.

use serde::{Deserialize, Serialize};

use crate::core::types::Severity;

/// Stable identifier of a kind of finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    TypeNotGri,
    ContigsetMissing,
    ContigsetInvalid,
    ContigsetFetchFail,
    GriIndexMissing,
    LoTooSmall,
    LoTooLarge,
    HiTooLarge,
    ChrInvalid,
    ColumnMissing,
    ColumnTypeInvalid,
    RowMalformed,
    RowFetchFail,
    FlatIndexInvalid,
}

/// `(category, identifier, severity, template)` for every category, in
/// declaration order of [`Category`]
pub const MESSAGE_CATALOG: &[(Category, &str, Severity, &str)] = &[
    (
        Category::TypeNotGri,
        "TYPE_NOT_GRI",
        Severity::Error,
        "Object is not a gri type",
    ),
    (
        Category::ContigsetMissing,
        "CONTIGSET_MISSING",
        Severity::Error,
        "'Details' of this object does not contain 'original_contigset'",
    ),
    (
        Category::ContigsetInvalid,
        "CONTIGSET_INVALID",
        Severity::Error,
        "'original_contigset' is not a valid link to a contigset object",
    ),
    (
        Category::ContigsetFetchFail,
        "CONTIGSET_FETCH_FAIL",
        Severity::Error,
        "Internal error: {1}. Fail to fetch contigset",
    ),
    (
        Category::GriIndexMissing,
        "GRI_INDEX_MISSING",
        Severity::Error,
        "Object does not have genomic range index named 'gri'",
    ),
    (
        Category::LoTooSmall,
        "LO_TOO_SMALL",
        Severity::Error,
        "In {1} row, {2} is negative",
    ),
    (
        Category::LoTooLarge,
        "LO_TOO_LARGE",
        Severity::Error,
        "In {1} row, {2} is larger than {3}",
    ),
    (
        Category::HiTooLarge,
        "HI_TOO_LARGE",
        Severity::Error,
        "In {1} row, {2} is larger than the size of the mapped contig",
    ),
    (
        Category::ChrInvalid,
        "CHR_INVALID",
        Severity::Warning,
        "In some row, such as the {1} one, {2} does not match any contig name",
    ),
    (
        Category::ColumnMissing,
        "COLUMN_MISSING",
        Severity::Error,
        "Column {1} is missing",
    ),
    (
        Category::ColumnTypeInvalid,
        "COLUMN_TYPE_INVALID",
        Severity::Error,
        "Column {1} has type {2}, expected {3}",
    ),
    (
        Category::RowMalformed,
        "ROW_MALFORMED",
        Severity::Error,
        "In {1} row, {2}",
    ),
    (
        Category::RowFetchFail,
        "ROW_FETCH_FAIL",
        Severity::Error,
        "Internal error: {1}. Fail to fetch rows",
    ),
    (
        Category::FlatIndexInvalid,
        "FLAT_INDEX_INVALID",
        Severity::Error,
        "Flat sequence file of the contigset is inconsistent: {1}",
    ),
];

impl Category {
    fn entry(self) -> &'static (Category, &'static str, Severity, &'static str) {
        &MESSAGE_CATALOG[self as usize]
    }

    /// Stable identifier, e.g. `LO_TOO_SMALL`
    #[must_use]
    pub fn id(self) -> &'static str {
        self.entry().1
    }

    #[must_use]
    pub fn severity(self) -> Severity {
        self.entry().2
    }

    #[must_use]
    pub fn template(self) -> &'static str {
        self.entry().3
    }

    /// Look a category up by its identifier
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        MESSAGE_CATALOG
            .iter()
            .find(|(_, entry_id, ..)| *entry_id == id)
            .map(|(category, ..)| *category)
    }

    /// Render the template with positional parameters
    #[must_use]
    pub fn render(self, params: &[String]) -> String {
        render_template(self.template(), params)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Substitute `{n}` placeholders with `params[n - 1]`.
///
/// Placeholders without a matching parameter are left as they are.
#[must_use]
pub fn render_template(template: &str, params: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let substituted = after.find('}').and_then(|end| {
            let n: usize = after[..end].parse().ok()?;
            let param = params.get(n.checked_sub(1)?)?;
            Some((param, end))
        });

        match substituted {
            Some((param, end)) => {
                out.push_str(param);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
