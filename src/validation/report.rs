use serde::Serialize;

use crate::core::types::Severity;
use crate::validation::messages::Category;

/// A single recorded error or warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub category: Category,
    pub severity: Severity,
    pub params: Vec<String>,
    /// The category template rendered with `params`
    pub message: String,
}

impl Finding {
    #[must_use]
    pub fn new(category: Category, params: Vec<String>) -> Self {
        let message = category.render(&params);
        Self {
            category,
            severity: category.severity(),
            params,
            message,
        }
    }
}

/// Append-only sink for findings of one validation run.
///
/// The run is valid iff no error was recorded; warnings never affect validity.
/// With a cap set, findings past the cap are counted but not stored.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    findings: Vec<Finding>,
    error_count: usize,
    warning_count: usize,
    suppressed: usize,
    #[serde(skip)]
    max_findings: Option<usize>,
}

impl ValidationReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store at most `max` findings
    #[must_use]
    pub fn with_max_findings(mut self, max: Option<usize>) -> Self {
        self.max_findings = max;
        self
    }

    /// Record a finding; its severity comes from the category
    pub fn record(&mut self, category: Category, params: Vec<String>) {
        match category.severity() {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }

        if self.max_findings.is_some_and(|max| self.findings.len() >= max) {
            self.suppressed += 1;
            return;
        }

        self.findings.push(Finding::new(category, params));
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Findings that were counted but not stored because of the cap
    #[must_use]
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    /// Stored findings in recording order
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Rendered messages in recording order
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.findings.iter().map(|f| f.message.as_str()).collect()
    }

    /// Number of stored findings of a category
    #[must_use]
    pub fn count(&self, category: Category) -> usize {
        self.findings
            .iter()
            .filter(|f| f.category == category)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty() && self.suppressed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_valid() {
        let report = ValidationReport::new();
        assert!(report.is_valid());
        assert!(report.is_empty());
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let mut report = ValidationReport::new();
        report.record(
            Category::ChrInvalid,
            vec!["1st".to_string(), "chr".to_string()],
        );

        assert!(report.is_valid());
        assert_eq!(report.warning_count(), 1);
        assert_eq!(
            report.messages(),
            vec!["In some row, such as the 1st one, chr does not match any contig name"]
        );
    }

    #[test]
    fn test_errors_keep_recording_order() {
        let mut report = ValidationReport::new();
        report.record(
            Category::LoTooSmall,
            vec!["2nd".to_string(), "lo".to_string()],
        );
        report.record(Category::GriIndexMissing, vec![]);

        assert!(!report.is_valid());
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.findings()[0].category, Category::LoTooSmall);
        assert_eq!(report.findings()[0].severity, Severity::Error);
        assert_eq!(report.findings()[1].category, Category::GriIndexMissing);
        assert_eq!(report.count(Category::LoTooSmall), 1);
    }

    #[test]
    fn test_max_findings_cap() {
        let mut report = ValidationReport::new().with_max_findings(Some(2));
        for i in 1..=5u64 {
            report.record(
                Category::HiTooLarge,
                vec![crate::utils::validation::ordinal(i), "hi".to_string()],
            );
        }

        assert_eq!(report.findings().len(), 2);
        assert_eq!(report.suppressed(), 3);
        // The verdict still sees every error
        assert_eq!(report.error_count(), 5);
        assert!(!report.is_valid());
    }
}
