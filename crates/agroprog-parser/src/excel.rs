//! Workbook reader (xlsx, xlsm, xlsb, xls, ods) built on calamine
//!
//! Cells are normalised to text so that spreadsheet and CSV inputs share one
//! conversion path:
//! - integral numbers lose their fractional part (`12.0` → `12`)
//! - date cells become ISO dates (`2024-01-31`)
//! - empty and error cells become empty text or the error literal

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};

use crate::table::RawTable;
use crate::ParseError;

/// Read one sheet of a workbook, the first one when `sheet` is `None`
pub fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<RawTable, ParseError> {
    std::fs::metadata(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut workbook =
        open_workbook_auto(path).map_err(|e| ParseError::Workbook(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|name| name.as_str() == wanted)
            .cloned()
            .ok_or_else(|| ParseError::SheetNotFound {
                sheet: wanted.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ParseError::Workbook("workbook has no sheets".into()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ParseError::Workbook(e.to_string()))?;

    // Line numbers follow the sheet, which may not start at row 1
    let first_line = range.start().map_or(1, |(row, _)| row as usize + 1);

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| ParseError::EmptyTable(sheet_name.clone()))?;

    let mut table = RawTable::new(sheet_name, header_row.iter().map(cell_text).collect());
    for (offset, data_row) in rows.enumerate() {
        table.push_row(first_line + 1 + offset, data_row.iter().map(cell_text).collect());
    }

    Ok(table)
}

/// Text form of a cell
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            serial_to_date(serial)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| format_number(serial))
        }
        Data::Error(e) => e.to_string(),
    }
}

/// Render a float without a trailing `.0` when it is integral
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Convert a spreadsheet serial day number (1900 date system) to a date
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    // Serial 1 is 1900-01-01; the epoch absorbs the phantom 1900-02-29
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}
