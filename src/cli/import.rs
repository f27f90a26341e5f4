use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::json;

use crate::catalog::resolve::{CONTIGSET_FIELD, CONTIGSET_TYPE, FLAT_FILE_FIELD};
use crate::cli::OutputFormat;
use crate::core::contig::Contig;
use crate::core::object::{make_link, ColumnSpec, IndexSpec, ObjectDescription};
use crate::core::types::{ObjectClass, ObjectId};
use crate::parsing::fai::parse_fai_file;
use crate::parsing::fasta::{flatten_fasta_file, is_fasta_file};
use crate::store::LocalStore;
use crate::utils::validation::derive_object_id;
use crate::validation::schema::{GRI_INDEX_NAME, GRI_TYPE};

#[derive(Args)]
pub struct ImportFastaArgs {
    /// Object store directory (created if missing)
    #[arg(required = true)]
    pub store: PathBuf,

    /// FASTA file (.fa, .fasta, .fna, optionally .gz/.bgz)
    #[arg(required = true)]
    pub fasta: PathBuf,

    /// ID for the contig set record (derived from the contigs by default)
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Args)]
pub struct ImportFaiArgs {
    /// Object store directory (created if missing)
    #[arg(required = true)]
    pub store: PathBuf,

    /// FASTA index file (.fai)
    #[arg(required = true)]
    pub fai: PathBuf,

    /// ID for the contig set record (derived from the contigs by default)
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Args)]
pub struct ImportTableArgs {
    /// Object store directory (created if missing)
    #[arg(required = true)]
    pub store: PathBuf,

    /// Tab-separated rows, optionally gzipped; leading '#' lines are a header
    #[arg(required = true)]
    pub rows: PathBuf,

    /// ID of the contig set the rows refer to
    #[arg(long, required = true)]
    pub contigset: String,

    /// Column as name:type, in file order; can be specified multiple times
    #[arg(
        long = "column",
        value_parser = parse_column,
        default_values = ["chr:string", "lo:int64", "hi:int64"]
    )]
    pub columns: Vec<ColumnSpec>,

    /// Do not declare the genomic range index
    #[arg(long)]
    pub no_index: bool,

    /// ID for the gtable (derived from the inputs by default)
    #[arg(long)]
    pub id: Option<String>,
}

fn parse_column(s: &str) -> Result<ColumnSpec, String> {
    match s.split_once(':') {
        Some((name, column_type)) if !name.is_empty() && !column_type.is_empty() => {
            Ok(ColumnSpec::new(name, column_type))
        }
        _ => Err(format!("expected name:type, got '{s}'")),
    }
}

/// Use the given ID, or derive one from `parts`
fn object_id(
    given: Option<&str>,
    class: ObjectClass,
    parts: &[String],
) -> anyhow::Result<ObjectId> {
    let Some(given) = given else {
        return Ok(ObjectId::new(derive_object_id(class.prefix(), parts)));
    };

    let id = ObjectId::parse(given)
        .ok_or_else(|| anyhow::anyhow!("Invalid object ID: '{given}'"))?;
    if id.class_prefix() != class.prefix() {
        anyhow::bail!("Object ID '{given}' must start with '{}-'", class.prefix());
    }
    Ok(id)
}

/// ID parts of a contig set: the import kind, then `name:length` per contig.
///
/// The kind keeps a FASTA import and an index import of one reference apart,
/// as only the former carries a flat file.
fn contig_parts(kind: &str, contigs: &[Contig]) -> Vec<String> {
    std::iter::once(kind.to_string())
        .chain(contigs.iter().map(|c| format!("{}:{}", c.name, c.length)))
        .collect()
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().to_string())
}

pub fn run_fasta(args: ImportFastaArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if !args.fasta.exists() {
        anyhow::bail!("Input file not found: {}", args.fasta.display());
    }
    if !is_fasta_file(&args.fasta) {
        anyhow::bail!(
            "Unrecognized FASTA extension: {} (expected .fa, .fasta or .fna)",
            args.fasta.display()
        );
    }
    let store = LocalStore::create(&args.store)?;

    let mut temp = store.temp_file()?;
    let flattened = {
        let mut writer = BufWriter::new(temp.as_file_mut());
        flatten_fasta_file(&args.fasta, &mut writer)?
    };
    if verbose {
        eprintln!(
            "Flattened {} contigs ({} bytes) from {}",
            flattened.contigs.len(),
            flattened.flat_length,
            args.fasta.display()
        );
    }

    let parts = contig_parts("fasta", &flattened.contigs);
    let record_id = object_id(args.id.as_deref(), ObjectClass::Record, &parts)?;
    let flat_id = object_id(None, ObjectClass::File, &parts)?;

    let flat = store.put_file(
        ObjectDescription::new(flat_id, ObjectClass::File).with_details(json!({
            "source": source_name(&args.fasta),
        })),
        temp,
    )?;

    let record = contigset_record(
        record_id,
        &flattened.contigs,
        Some((flattened.offsets.as_slice(), &flat.id)),
        &args.fasta,
    );
    store.put(&record)?;

    print_created(&record, format)
}

pub fn run_fai(args: ImportFaiArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if !args.fai.exists() {
        anyhow::bail!("Input file not found: {}", args.fai.display());
    }
    let store = LocalStore::create(&args.store)?;

    let contigs = parse_fai_file(&args.fai)?;
    if verbose {
        eprintln!("Read {} contigs from {}", contigs.len(), args.fai.display());
    }

    let parts = contig_parts("fai", &contigs);
    let record_id = object_id(args.id.as_deref(), ObjectClass::Record, &parts)?;
    let record = contigset_record(record_id, &contigs, None, &args.fai);
    store.put(&record)?;

    print_created(&record, format)
}

pub fn run_table(args: ImportTableArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if !args.rows.exists() {
        anyhow::bail!("Input file not found: {}", args.rows.display());
    }
    let contigset = ObjectId::parse(&args.contigset)
        .ok_or_else(|| anyhow::anyhow!("Invalid object ID: '{}'", args.contigset))?;
    let store = LocalStore::create(&args.store)?;

    let mut parts = vec![contigset.to_string(), source_name(&args.rows)];
    parts.extend(
        args.columns
            .iter()
            .map(|c| format!("{}:{}", c.name, c.column_type)),
    );
    let id = object_id(args.id.as_deref(), ObjectClass::Gtable, &parts)?;

    let mut desc = ObjectDescription::new(id, ObjectClass::Gtable)
        .with_types([GRI_TYPE])
        .with_columns(args.columns)
        .with_details(json!({
            CONTIGSET_FIELD: make_link(&contigset),
            "source": source_name(&args.rows),
            "created_at": chrono::Utc::now().to_rfc3339(),
        }));
    if !args.no_index {
        desc = desc.with_index(IndexSpec::genomic(GRI_INDEX_NAME, "chr", "lo", "hi"));
    }

    store.put_table(&desc, &args.rows)?;
    if verbose {
        eprintln!("Copied rows from {}", args.rows.display());
    }

    print_created(&desc, format)
}

/// Build a contig set record, with a flat file link when offsets are known
fn contigset_record(
    id: ObjectId,
    contigs: &[Contig],
    flat: Option<(&[u64], &ObjectId)>,
    source: &Path,
) -> ObjectDescription {
    let names: Vec<&str> = contigs.iter().map(|c| c.name.as_str()).collect();
    let sizes: Vec<u64> = contigs.iter().map(|c| c.length).collect();

    let mut details = json!({
        "contigs": {"names": names, "sizes": sizes},
        "source": source_name(source),
        "created_at": chrono::Utc::now().to_rfc3339(),
    });
    if let Some((offsets, file)) = flat {
        details["contigs"]["offsets"] = json!(offsets);
        details[FLAT_FILE_FIELD] = make_link(file);
    }

    ObjectDescription::new(id, ObjectClass::Record)
        .with_types([CONTIGSET_TYPE])
        .with_details(details)
}

fn print_created(desc: &ObjectDescription, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => println!("Created {} {}", desc.class, desc.id),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(desc)?),
        OutputFormat::Tsv => println!("{}\t{}", desc.class, desc.id),
    }
    Ok(())
}
