use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::catalog::contigs::ContigCatalog;
use crate::catalog::resolve::CONTIGSET_FIELD;
use crate::cli::OutputFormat;
use crate::core::object::make_link;
use crate::core::types::ObjectId;
use crate::store::LocalStore;

#[derive(Args)]
pub struct ContigsArgs {
    /// Object store directory
    #[arg(required = true)]
    pub store: PathBuf,

    /// ID of the contig set record (e.g. record-...)
    #[arg(required = true)]
    pub contigset: String,
}

#[derive(Serialize)]
struct ContigRow<'a> {
    name: &'a str,
    length: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<u64>,
}

pub fn run(args: ContigsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let id = ObjectId::parse(&args.contigset)
        .ok_or_else(|| anyhow::anyhow!("Invalid object ID: '{}'", args.contigset))?;
    let store = LocalStore::open(&args.store)?;

    // Resolve through the same path a dataset's details take
    let details = serde_json::json!({ CONTIGSET_FIELD: make_link(&id) });
    let mut catalog = ContigCatalog::resolve(&store, &details)
        .map_err(|e| anyhow::anyhow!("Cannot resolve {id}: {e}"))?;
    if let Err(e) = catalog.resolve_flat_index(&store) {
        eprintln!("Warning: ignoring flat sequence file: {e}");
    }

    let rows: Vec<ContigRow> = catalog
        .contig_set
        .contigs()
        .iter()
        .enumerate()
        .map(|(index, contig)| ContigRow {
            name: &contig.name,
            length: contig.length,
            offset: catalog.flat_index.as_ref().and_then(|f| f.offset(index)),
        })
        .collect();

    match format {
        OutputFormat::Text => {
            println!(
                "Contig set: {} ({} contigs, {} bp)",
                id,
                rows.len(),
                catalog.contig_set.total_length()
            );
            if let Some(flat) = &catalog.flat_index {
                println!("Flat file:  {} ({} bytes)", flat.file, flat.file_length);
            }
            if verbose || rows.len() <= 30 {
                println!();
                println!("{:<25} {:>15} {:>15}", "Name", "Length", "Offset");
                println!("{}", "-".repeat(57));
                for row in &rows {
                    println!(
                        "{:<25} {:>15} {:>15}",
                        row.name,
                        row.length,
                        row.offset.map_or_else(|| "-".to_string(), |o| o.to_string())
                    );
                }
            } else {
                println!("\nUse --verbose to list all {} contigs", rows.len());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Tsv => {
            println!("name\tlength\toffset");
            for row in &rows {
                println!(
                    "{}\t{}\t{}",
                    row.name,
                    row.length,
                    row.offset.map_or_else(String::new, |o| o.to_string())
                );
            }
        }
    }

    Ok(())
}
