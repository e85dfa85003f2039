//! CSV column parsing
//!
//! Reads one designated column of a CSV document as `f64` samples. The first
//! record is always a header and is discarded. Any bad row aborts the whole
//! document; there is no partial result.

use crate::error::{Error, Result};
use csv::{ByteRecord, ReaderBuilder, Trim};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, trace};

/// Parse the 1-based `column` of every data record in `reader`.
///
/// Rows are allowed to differ in length; a row is only rejected when it is too
/// short to contain the requested column. Surrounding whitespace is trimmed
/// from every field before it is parsed, so ` 236 ` reads as `236`. Only the
/// selected field is decoded; other columns may hold any bytes.
///
/// # Errors
///
/// - [`Error::InvalidColumn`] if `column` is 0
/// - [`Error::ShortRow`] with the observed field count for a short row
/// - [`Error::NotANumber`] if the selected field is not a float, including a
///   field that is not valid UTF-8
/// - [`Error::Read`] for any other read failure
pub fn parse_column<R: Read>(reader: R, column: usize) -> Result<Vec<f64>> {
    let index = column
        .checked_sub(1)
        .ok_or(Error::InvalidColumn { column: 0 })?;

    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::Fields)
        .from_reader(reader);

    let mut record = ByteRecord::new();
    let mut samples = Vec::new();
    let mut header_seen = false;

    while csv_reader
        .read_byte_record(&mut record)
        .map_err(|source| Error::Read { source })?
    {
        if !header_seen {
            header_seen = true;
            trace!("Skipping header: {:?}", record);
            continue;
        }

        let field = record.get(index).ok_or(Error::ShortRow {
            fields: record.len(),
        })?;

        let field = String::from_utf8_lossy(field);
        let value = field.parse::<f64>().map_err(|source| Error::NotANumber {
            value: field.to_string(),
            source,
        })?;

        samples.push(value);
    }

    Ok(samples)
}

/// Open `path` and parse its `column`.
///
/// The file handle lives only for the duration of this call. Parse failures
/// are wrapped with the path so they can be attributed once they leave the
/// worker that produced them.
pub fn parse_file(path: &Path, column: usize) -> Result<Vec<f64>> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let samples =
        parse_column(BufReader::new(file), column).map_err(|e| Error::in_file(path, e))?;

    debug!("Parsed {} samples from {}", samples.len(), path.display());
    Ok(samples)
}
