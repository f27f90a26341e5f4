//! Flatten FASTA files into a flat sequence file using noodles.
//!
//! Every record's bases are written back to back, without headers or line
//! breaks, and the start offset of each contig is remembered. Supports both
//! uncompressed and gzip/bgzip compressed input.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;

use crate::core::contig::Contig;
use crate::parsing::ParseError;
use crate::utils::validation::check_contig_limit;

/// Contigs of a flattened FASTA with their offsets in the flat file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedFasta {
    pub contigs: Vec<Contig>,
    pub offsets: Vec<u64>,
    /// Total bytes written to the flat file
    pub flat_length: u64,
}

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    // Check for gzipped FASTA
    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    // Check for uncompressed FASTA
    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Flatten a FASTA file, writing the concatenated bases to `out`.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or the output written,
/// `ParseError::Noodles` if parsing fails, `ParseError::InvalidFormat` if no
/// sequences are found, or `ParseError::TooManyContigs` if the limit is exceeded.
pub fn flatten_fasta_file<W: Write>(
    path: &Path,
    out: &mut W,
) -> Result<FlattenedFasta, ParseError> {
    let file = std::fs::File::open(path)?;

    if is_gzipped(path) {
        let reader = BufReader::new(MultiGzDecoder::new(file));
        flatten_fasta_reader(&mut fasta::io::Reader::new(reader), out)
    } else {
        let reader = BufReader::new(file);
        flatten_fasta_reader(&mut fasta::io::Reader::new(reader), out)
    }
}

/// Flatten from a noodles FASTA reader
fn flatten_fasta_reader<R: BufRead, W: Write>(
    reader: &mut fasta::io::Reader<R>,
    out: &mut W,
) -> Result<FlattenedFasta, ParseError> {
    let mut contigs = Vec::new();
    let mut offsets = Vec::new();
    let mut position = 0u64;

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        // Check contig limit for DOS protection
        if check_contig_limit(contigs.len()).is_some() {
            return Err(ParseError::TooManyContigs(contigs.len()));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        let bases = record.sequence().as_ref();
        out.write_all(bases)?;

        let length = bases.len() as u64;
        contigs.push(Contig::new(name, length));
        offsets.push(position);
        position += length;
    }

    if contigs.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    out.flush()?;

    Ok(FlattenedFasta {
        contigs,
        offsets,
        flat_length: position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::NamedTempFile;

    #[test]
    fn test_is_fasta_file() {
        assert!(is_fasta_file(Path::new("test.fa")));
        assert!(is_fasta_file(Path::new("test.fasta")));
        assert!(is_fasta_file(Path::new("test.fna")));
        assert!(is_fasta_file(Path::new("test.fa.gz")));
        assert!(is_fasta_file(Path::new("test.fna.bgz")));
        assert!(is_fasta_file(Path::new("/path/to/Reference.FA")));

        assert!(!is_fasta_file(Path::new("test.fai")));
        assert!(!is_fasta_file(Path::new("test.tsv")));
    }

    #[test]
    fn test_flatten_fasta_file() {
        let fasta_content = b">chr1 description\nACGTACGT\nACGT\n>chr2\nGGGG\n";

        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(fasta_content).unwrap();
        temp.flush().unwrap();

        let mut flat = Vec::new();
        let flattened = flatten_fasta_file(temp.path(), &mut flat).unwrap();

        assert_eq!(flat, b"ACGTACGTACGTGGGG");
        assert_eq!(
            flattened.contigs,
            vec![Contig::new("chr1", 12), Contig::new("chr2", 4)]
        );
        assert_eq!(flattened.offsets, vec![0, 12]);
        assert_eq!(flattened.flat_length, 16);
    }

    #[test]
    fn test_flatten_gzipped_fasta() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b">chrM\nacgtn\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut temp = NamedTempFile::with_suffix(".fa.gz").unwrap();
        temp.write_all(&compressed).unwrap();
        temp.flush().unwrap();

        let mut flat = Vec::new();
        let flattened = flatten_fasta_file(temp.path(), &mut flat).unwrap();

        // Case is preserved
        assert_eq!(flat, b"acgtn");
        assert_eq!(flattened.contigs[0].name, "chrM");
    }

    #[test]
    fn test_flatten_empty_fasta() {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(b"").unwrap();
        temp.flush().unwrap();

        let mut flat = Vec::new();
        assert!(flatten_fasta_file(temp.path(), &mut flat).is_err());
    }
}
