//! Tabular reading of decoded CSV files
//!
//! Files are decoded in full with the resolved encoding, substituting
//! U+FFFD for undecodable sequences, then parsed as delimited text. Every
//! cell stays an opaque string so leading zeros and odd formats survive
//! until normalisation. Rows the CSV parser rejects are counted and skipped.

use super::encoding_detector::DetectedEncoding;
use crate::app::models::RawTable;
use crate::{Error, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Table plus what happened while reading it
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    pub table: RawTable,

    /// Encoding actually used (a BOM can override the detector's guess)
    pub encoding: String,

    /// Replacement characters were substituted while decoding
    pub had_replacements: bool,

    /// Rows skipped because the parser rejected them
    pub malformed_rows: usize,
}

/// Delimited text reader
#[derive(Debug, Clone)]
pub struct TabularReader {
    delimiter: u8,
}

impl Default for TabularReader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl TabularReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read and parse a whole file
    pub fn read(&self, path: &Path, detected: &DetectedEncoding) -> Result<ReadOutcome> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::file_unreadable(path.display().to_string(), e.to_string()))?;
        self.read_bytes(&bytes, detected, &path.display().to_string())
    }

    /// Decode and parse raw file bytes
    pub fn read_bytes(
        &self,
        bytes: &[u8],
        detected: &DetectedEncoding,
        file_label: &str,
    ) -> Result<ReadOutcome> {
        let (text, actual, had_replacements) = detected.encoding.decode(bytes);

        let encoding = if actual == detected.encoding {
            detected.name.clone()
        } else {
            debug!(
                "Byte order mark in {} overrides {} with {}",
                file_label,
                detected.name,
                actual.name()
            );
            actual.name().to_lowercase()
        };

        if had_replacements {
            warn!(
                "Undecodable bytes in {} were replaced while decoding as {}",
                file_label, encoding
            );
        }

        let (table, malformed_rows) = self.parse_text(&text, file_label)?;

        Ok(ReadOutcome {
            table,
            encoding,
            had_replacements,
            malformed_rows,
        })
    }

    /// Parse decoded text; the first accepted record is the header
    ///
    /// A record whose quote is never closed swallows every following line.
    /// Such a record is dropped as malformed along with its first line, and
    /// parsing resumes on the line after it.
    pub fn parse_text(&self, text: &str, file_label: &str) -> Result<(RawTable, usize)> {
        let mut parsed = ParsedRows::default();
        let mut offset = 0;

        while offset < text.len() {
            match self.parse_segment(&text[offset..], &mut parsed, file_label) {
                Some(resume) => offset += resume,
                None => break,
            }
        }

        let ParsedRows {
            headers,
            rows,
            malformed_rows,
        } = parsed;
        let table = RawTable::new(headers.unwrap_or_default(), rows);
        debug!(
            "Read {} rows x {} columns from {} ({} malformed)",
            table.row_count(),
            table.column_count(),
            file_label,
            malformed_rows
        );

        Ok((table, malformed_rows))
    }

    /// Parse until the end of `segment` or the first runaway record
    ///
    /// Returns the byte offset to resume from when a runaway record was
    /// dropped.
    fn parse_segment(
        &self,
        segment: &str,
        parsed: &mut ParsedRows,
        file_label: &str,
    ) -> Option<usize> {
        let bytes = segment.as_bytes();
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(bytes);
        let mut record = csv::StringRecord::new();

        loop {
            match csv_reader.read_record(&mut record) {
                Ok(false) => return None,
                Ok(true) => {
                    let start = record
                        .position()
                        .map(|p| p.byte() as usize)
                        .unwrap_or(0)
                        .min(bytes.len());
                    let end = (csv_reader.position().byte() as usize).clamp(start, bytes.len());

                    if is_unterminated(&record, &bytes[start..end], end == bytes.len()) {
                        parsed.malformed_rows += 1;
                        let resume = bytes[start..]
                            .iter()
                            .position(|&b| b == b'\n')
                            .map(|newline| start + newline + 1)
                            .unwrap_or(bytes.len());
                        debug!(
                            "Skipping record with unterminated quote at byte {} in {}",
                            start, file_label
                        );
                        return Some(resume);
                    }

                    let cells: Vec<String> = record.iter().map(str::to_string).collect();
                    if parsed.headers.is_none() {
                        parsed.headers = Some(cells);
                    } else {
                        parsed.rows.push(cells);
                    }
                }
                Err(e) => {
                    parsed.malformed_rows += 1;
                    debug!("Skipping malformed record in {}: {}", file_label, e);
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct ParsedRows {
    headers: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    malformed_rows: usize,
}

/// A record that ran to end of input with an odd number of quotes and an
/// embedded line break
fn is_unterminated(record: &csv::StringRecord, raw: &[u8], at_end: bool) -> bool {
    at_end
        && raw.iter().filter(|&&b| b == b'"').count() % 2 == 1
        && record.iter().any(|cell| cell.contains('\n'))
}
