use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use serde_json::{Number, Value};

use crate::core::object::ColumnSpec;
use crate::parsing::ParseError;

/// Column types whose cells are parsed as signed 64-bit integers
pub const INTEGER_COLUMN_TYPES: &[&str] = &[
    "int8", "uint8", "int16", "uint16", "int32", "uint32", "int64",
];

/// Column types whose cells are parsed as floating point numbers
pub const FLOAT_COLUMN_TYPES: &[&str] = &["float", "double"];

/// Convert one TSV cell into a JSON value according to its column type.
///
/// Cells that do not parse as the declared type are kept as strings so the
/// row can still be reported on instead of aborting the whole scan.
#[must_use]
pub fn parse_cell(text: &str, column_type: &str) -> Value {
    if INTEGER_COLUMN_TYPES.contains(&column_type) {
        if let Ok(n) = text.trim().parse::<i64>() {
            return Value::from(n);
        }
    } else if FLOAT_COLUMN_TYPES.contains(&column_type) {
        if let Some(n) = text.trim().parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    } else if column_type == "boolean" {
        match text.trim() {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
    }

    Value::String(text.to_string())
}

/// Open a TSV file for row reading, transparently decompressing `.gz`
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_tsv(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    let file = std::fs::File::open(path)?;
    let is_gzipped = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));

    if is_gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Lazy iterator over the rows of a tab-separated table.
///
/// Empty lines are skipped, as are lines starting with `#` before the first
/// row (an optional header). Once rows have started, a leading `#` is part of
/// the first cell. Every other line must have exactly one field per column.
pub struct TsvRows<R> {
    lines: Lines<R>,
    columns: Vec<ColumnSpec>,
    line_num: usize,
    in_header: bool,
}

impl<R: BufRead> TsvRows<R> {
    pub fn new(reader: R, columns: Vec<ColumnSpec>) -> Self {
        Self {
            lines: reader.lines(),
            columns,
            line_num: 0,
            in_header: true,
        }
    }

    fn parse_line(&self, line: &str) -> Result<Vec<Value>, ParseError> {
        let fields: Vec<&str> = line.split('\t').collect();

        if fields.len() != self.columns.len() {
            // Line numbers in errors are 1-based for user friendliness
            return Err(ParseError::InvalidFormat(format!(
                "Line {} has {} fields, expected {}",
                self.line_num,
                fields.len(),
                self.columns.len()
            )));
        }

        Ok(fields
            .iter()
            .zip(&self.columns)
            .map(|(field, column)| parse_cell(field, &column.column_type))
            .collect())
    }
}

impl<R: BufRead> Iterator for TsvRows<R> {
    type Item = Result<Vec<Value>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_num += 1;

            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || (self.in_header && line.starts_with('#')) {
                continue;
            }

            self.in_header = false;
            return Some(self.parse_line(line));
        }
    }
}
