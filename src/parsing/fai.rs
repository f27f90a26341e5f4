//! Parser for FASTA index (.fai) files using noodles.
//!
//! FAI format provides name and length for each contig.
//! Format: `name\tlength\toffset\tline_bases\tline_width`
//!
//! The FAI offsets point into the line-wrapped FASTA, not into a flat sequence
//! file, so contig sets imported from an index carry names and sizes only.

use std::io::BufReader;
use std::path::Path;

use crate::core::contig::Contig;
use crate::parsing::ParseError;
use crate::utils::validation::check_contig_limit;

/// Parse a FASTA index (.fai) file using noodles
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// parsing fails, `ParseError::InvalidFormat` if no contigs are found, or
/// `ParseError::TooManyContigs` if the limit is exceeded.
pub fn parse_fai_file(path: &Path) -> Result<Vec<Contig>, ParseError> {
    use noodles::fasta;

    let reader = std::fs::File::open(path).map(BufReader::new)?;

    let index = fasta::fai::io::Reader::new(reader)
        .read_index()
        .map_err(|e| ParseError::Noodles(format!("Failed to parse FAI file: {e}")))?;

    index_to_contigs(&index)
}

/// Convert noodles FAI index to contigs
fn index_to_contigs(index: &noodles::fasta::fai::Index) -> Result<Vec<Contig>, ParseError> {
    let mut contigs = Vec::new();

    for record in index.as_ref() {
        // Check contig limit for DOS protection
        if check_contig_limit(contigs.len()).is_some() {
            return Err(ParseError::TooManyContigs(contigs.len()));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        contigs.push(Contig::new(name, record.length()));
    }

    if contigs.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No contigs found in FAI file".to_string(),
        ));
    }

    Ok(contigs)
}
