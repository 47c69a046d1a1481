//! # uar-csv
//!
//! **Tier 1 (Ingestion)**
//!
//! RFC-4180-ish row iteration with recovery on column-count mismatch
//! (spec.md §4.2). Produces a best-effort list of [`RawRow`]s sharing a
//! header vector, plus structured warnings, rather than failing hard on
//! the first malformed row.

use csv::ReaderBuilder;
use uar_types::{EngineError, ParseWarning, RawRow};

/// Result of parsing one CSV document.
#[derive(Debug, Clone, Default)]
pub struct CsvParseResult {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub warnings: Vec<ParseWarning>,
}

/// Trims leading/trailing ASCII whitespace (` `, `\t`, `\r`, `\n`) —
/// the exact set spec.md §4.2 names, not `char::is_whitespace`.
fn trim_ascii(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '\t' || c == '\r' || c == '\n')
}

/// Parses a UTF-8 CSV document (already decoded by `uar-encoding`) into
/// a header vector, a list of [`RawRow`]s, and non-fatal warnings.
///
/// Header is row 0; the first data row is row 1 (spec.md §4.2).
pub fn parse_csv(text: &str) -> Result<CsvParseResult, EngineError> {
    if text.trim().is_empty() {
        return Err(EngineError::EmptyFile);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let header_record = match records.next() {
        None => return Err(EngineError::EmptyFile),
        Some(Err(_)) => return Err(EngineError::HeaderRead),
        Some(Ok(record)) => record,
    };

    let headers: Vec<String> = header_record
        .iter()
        .map(|h| trim_ascii(h).to_string())
        .collect();

    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(EngineError::EmptyFile);
    }

    let mut rows = Vec::new();
    let mut warnings = Vec::new();
    let mut row_num: u64 = 0;

    for result in records {
        row_num += 1;
        match result {
            Err(_) => {
                warnings.push(ParseWarning::new(
                    row_num,
                    format!("row {row_num} is unreadable; skipping"),
                ));
            }
            Ok(record) => {
                let mut values: Vec<String> =
                    record.iter().map(|v| trim_ascii(v).to_string()).collect();

                if values.len() < headers.len() {
                    warnings.push(ParseWarning::new(
                        row_num,
                        format!(
                            "row {row_num} has {} columns, expected {}; padding…",
                            values.len(),
                            headers.len()
                        ),
                    ));
                    values.resize(headers.len(), String::new());
                } else if values.len() > headers.len() {
                    warnings.push(ParseWarning::new(
                        row_num,
                        format!(
                            "row {row_num} has {} columns, expected {}; truncating…",
                            values.len(),
                            headers.len()
                        ),
                    ));
                    values.truncate(headers.len());
                }

                let fields = headers.iter().cloned().zip(values).collect();
                rows.push(RawRow::new(fields));
            }
        }
    }

    if rows.is_empty() {
        return Err(EngineError::NoDataRows);
    }

    Ok(CsvParseResult {
        headers,
        rows,
        warnings,
    })
}
