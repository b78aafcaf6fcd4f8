//! CSV reader
//!
//! Accepts comma or semicolon separators (spreadsheet exports in
//! comma-decimal locales use `;`) and an optional UTF-8 byte order mark.

use std::path::Path;

use csv::ReaderBuilder;

use crate::table::RawTable;
use crate::ParseError;

/// Read a CSV file whose first record is the header row
pub fn read_csv(path: &Path) -> Result<RawTable, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("csv")
        .to_string();
    parse_csv(&name, &content)
}

/// Parse CSV text into a table named `name`
pub fn parse_csv(name: &str, content: &str) -> Result<RawTable, ParseError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let delimiter = sniff_delimiter(content.lines().next().unwrap_or(""));

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ParseError::EmptyTable(name.to_string()));
    }

    let mut table = RawTable::new(name, headers);
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        table.push_row(line, record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

fn sniff_delimiter(header_line: &str) -> u8 {
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}
