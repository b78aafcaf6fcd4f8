//! # agroprog-parser
//!
//! Reads the three agroprog input tables from spreadsheet or CSV files.
//!
//! This crate provides:
//! - Format detection by extension (`.xlsx`, `.xlsm`, `.xls`, `.ods`, `.csv`)
//! - A schema-free `RawTable` view of a sheet
//! - Typed conversion into `StatusRecord`, `ApplicationRule` and
//!   `DosageRecord`, rejecting tables that lack a required column
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::path::Path;
//! use agroprog_parser::{load_dosages, load_rules, load_statuses, DOSAGE_SHEET};
//!
//! let statuses = load_statuses(Path::new("estado.xlsx"))?;
//! let rules = load_rules(Path::new("aplicaciones.xlsx"))?;
//! let dosages = load_dosages(Path::new("insumos.xlsx"), DOSAGE_SHEET)?;
//! ```

pub mod delimited;
pub mod excel;
pub mod records;
pub mod table;

use std::path::Path;

use agroprog_core::{ApplicationRule, DosageRecord, StatusRecord};
use thiserror::Error;

pub use records::{
    parse_application_rules, parse_day_first_date, parse_dosage_records, parse_status_records,
    APPLICATION_COLUMNS, DOSAGE_COLUMNS, STATUS_COLUMNS,
};
pub use table::{RawRow, RawTable};

/// Sheet of the dosage workbook that holds the dosage table
pub const DOSAGE_SHEET: &str = "Base";

/// Ingestion error
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file format: '{0}' (expected .xlsx, .xlsm, .xls, .ods or .csv)")]
    UnsupportedFormat(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Sheet '{sheet}' not found (available: {})", .available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("Table '{0}' has no header row")]
    EmptyTable(String),

    #[error("Missing column in {table} table: {column}")]
    MissingColumn { table: String, column: String },

    #[error("Invalid value in {table} table, row {row}, column {column}: '{value}' (expected {expected})")]
    InvalidValue {
        table: String,
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },
}

/// Supported input file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Workbook read through calamine
    Spreadsheet,
    /// Comma or semicolon separated text
    Csv,
}

/// Detect file format from extension
pub fn detect_format(path: &Path) -> Result<FileFormat, ParseError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(FileFormat::Spreadsheet),
        "csv" => Ok(FileFormat::Csv),
        _ => Err(ParseError::UnsupportedFormat(ext)),
    }
}

/// Read one table from a file.
///
/// For workbooks `sheet` selects a sheet by name (first sheet when `None`);
/// CSV files hold a single table and ignore it.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable, ParseError> {
    let table = match detect_format(path)? {
        FileFormat::Spreadsheet => excel::read_sheet(path, sheet)?,
        FileFormat::Csv => delimited::read_csv(path)?,
    };
    tracing::debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.len(),
        "read table"
    );
    Ok(table)
}

/// Read and convert the status table
pub fn load_statuses(path: &Path) -> Result<Vec<StatusRecord>, ParseError> {
    let table = read_table(path, None)?.named("status");
    parse_status_records(&table)
}

/// Read and convert the application rule table
pub fn load_rules(path: &Path) -> Result<Vec<ApplicationRule>, ParseError> {
    let table = read_table(path, None)?.named("applications");
    parse_application_rules(&table)
}

/// Read and convert the dosage table from `sheet`
pub fn load_dosages(path: &Path, sheet: &str) -> Result<Vec<DosageRecord>, ParseError> {
    let table = read_table(path, Some(sheet))?.named("dosage");
    parse_dosage_records(&table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detect_format_spreadsheet() {
        assert_eq!(
            detect_format(Path::new("estado.xlsx")).unwrap(),
            FileFormat::Spreadsheet
        );
        assert_eq!(
            detect_format(Path::new("ESTADO.XLS")).unwrap(),
            FileFormat::Spreadsheet
        );
        assert_eq!(
            detect_format(Path::new("estado.ods")).unwrap(),
            FileFormat::Spreadsheet
        );
    }

    #[test]
    fn detect_format_csv() {
        assert_eq!(detect_format(Path::new("estado.csv")).unwrap(), FileFormat::Csv);
    }

    #[test]
    fn detect_format_unknown() {
        let err = detect_format(Path::new("estado.txt")).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat(ref ext) if ext == "txt"));
        assert!(detect_format(Path::new("estado")).is_err());
    }

    #[test]
    fn read_table_not_found() {
        let result = read_table(Path::new("/nonexistent/path/estado.csv"), None);
        assert!(matches!(result, Err(ParseError::Io { .. })));
    }

    #[test]
    fn load_statuses_from_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Lote,Bloque,Area_ha,Estado,Fecha_Estado,G_Forza").unwrap();
        writeln!(file, "12,A,2.456,Floración,01/02/2024,G1").unwrap();

        let records = load_statuses(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field_id, "12");
        assert_eq!(
            records[0].status_date,
            chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
    }

    #[test]
    fn load_rules_reports_missing_column_by_name() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Aplicacion,Estado_valido").unwrap();
        writeln!(file, "App1,Floración").unwrap();

        let err = load_rules(file.path()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing column in applications table: Edad_calendario"
        );
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::InvalidValue {
            table: "status".into(),
            row: 4,
            column: "Area_ha".into(),
            value: "abc".into(),
            expected: "a decimal number",
        };
        let msg = err.to_string();
        assert!(msg.contains("row 4"));
        assert!(msg.contains("Area_ha"));
        assert!(msg.contains("abc"));

        let err = ParseError::SheetNotFound {
            sheet: "Base".into(),
            available: vec!["Hoja1".into(), "Hoja2".into()],
        };
        assert!(err.to_string().contains("Hoja1, Hoja2"));
    }
}
