use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::ObjectId;
use crate::store::LocalStore;
use crate::validation::engine::{
    GriValidator, ValidationOutcome, ValidatorConfig, DEFAULT_SAMPLE_LENGTH,
};

#[derive(Args)]
pub struct ValidateArgs {
    /// Object store directory
    #[arg(required = true)]
    pub store: PathBuf,

    /// ID of the gtable to validate (e.g. gtable-...)
    #[arg(required = true)]
    pub object: String,

    /// Read a short sequence sample from the flat file for each valid row
    #[arg(long)]
    pub sample: bool,

    /// Bytes read per sample
    #[arg(long, default_value_t = DEFAULT_SAMPLE_LENGTH)]
    pub sample_length: usize,

    /// Sample only every n-th row
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    pub sample_every: u64,

    /// Report at most this many findings
    #[arg(long)]
    pub max_findings: Option<usize>,
}

/// Validate an object, print the outcome and return the verdict
pub fn run(args: ValidateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<bool> {
    let id = ObjectId::parse(&args.object)
        .ok_or_else(|| anyhow::anyhow!("Invalid object ID: '{}'", args.object))?;
    let store = LocalStore::open(&args.store)?;

    let config = ValidatorConfig {
        sample_flat_file: args.sample,
        sample_length: args.sample_length,
        sample_every: args.sample_every,
        max_findings: args.max_findings,
    };

    let outcome = GriValidator::with_config(&store, config).validate(&id)?;

    match format {
        OutputFormat::Text => print_text(&outcome, verbose),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Tsv => print_tsv(&outcome),
    }

    Ok(outcome.valid)
}

fn print_text(outcome: &ValidationOutcome, verbose: bool) {
    let report = &outcome.report;
    println!(
        "{}: {}",
        outcome.object,
        if outcome.valid { "VALID" } else { "INVALID" }
    );

    if !report.findings().is_empty() {
        println!();
        for finding in report.findings() {
            println!(
                "{:<8} {:<22} {}",
                finding.severity.to_string(),
                finding.category.to_string(),
                finding.message
            );
        }
    }
    if report.suppressed() > 0 {
        println!("... {} more findings not shown", report.suppressed());
    }

    let stats = &outcome.stats;
    println!();
    println!(
        "Errors: {}  Warnings: {}",
        report.error_count(),
        report.warning_count()
    );
    println!(
        "Rows:   {} checked, {} invalid",
        stats.rows_checked, stats.rows_invalid
    );
    if stats.samples_attempted > 0 {
        println!(
            "Samples: {} read, {} failed",
            stats.samples_attempted, stats.samples_failed
        );
    }
    if verbose {
        println!("Stage:  {}", outcome.stage);
    }
}

fn print_tsv(outcome: &ValidationOutcome) {
    println!("severity\tcategory\tmessage");
    for finding in outcome.report.findings() {
        println!(
            "{}\t{}\t{}",
            finding.severity, finding.category, finding.message
        );
    }
}
