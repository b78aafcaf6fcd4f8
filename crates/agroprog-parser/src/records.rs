//! Typed conversion from raw tables to domain records
//!
//! Column presence is checked before any row is read, so a table missing a
//! required column is rejected with that column's name even when it has no
//! data rows.

use std::str::FromStr;

use agroprog_core::{ApplicationRule, DosageRecord, StatusRecord};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::table::{RawRow, RawTable};
use crate::ParseError;

/// Required status table columns
pub const STATUS_COLUMNS: [&str; 6] = [
    "Lote",
    "Bloque",
    "Area_ha",
    "Estado",
    "Fecha_Estado",
    "G_Forza",
];

/// Required application table columns
pub const APPLICATION_COLUMNS: [&str; 3] = ["Aplicacion", "Edad_calendario", "Estado_valido"];

/// Required dosage table columns
pub const DOSAGE_COLUMNS: [&str; 6] = [
    "Aplicacion",
    "Tipo_Insumo",
    "Cod_Insumo",
    "Insumo",
    "UM",
    "Dosis",
];

/// Convert a status table
pub fn parse_status_records(table: &RawTable) -> Result<Vec<StatusRecord>, ParseError> {
    let cols = table.require_columns(&STATUS_COLUMNS)?;
    table
        .rows
        .iter()
        .map(|row| {
            let area = decimal_cell(table, row, cols[2], STATUS_COLUMNS[2])?;
            let status_date = date_cell(table, row, cols[4], STATUS_COLUMNS[4])?;
            Ok(StatusRecord::new(
                row.cell(cols[0]),
                row.cell(cols[1]),
                row.cell(cols[3]),
                status_date,
            )
            .area(area)
            .forcing_group(row.cell(cols[5])))
        })
        .collect()
}

/// Convert an application rule table
pub fn parse_application_rules(table: &RawTable) -> Result<Vec<ApplicationRule>, ParseError> {
    let cols = table.require_columns(&APPLICATION_COLUMNS)?;
    table
        .rows
        .iter()
        .map(|row| {
            let text = row.cell(cols[1]);
            let age = parse_whole_days(text).ok_or_else(|| {
                invalid(table, row, APPLICATION_COLUMNS[1], text, "a whole number of days")
            })?;
            Ok(ApplicationRule::new(row.cell(cols[0]), age, row.cell(cols[2])))
        })
        .collect()
}

/// Convert a dosage table; a blank `Dosis` is kept as no dosage
pub fn parse_dosage_records(table: &RawTable) -> Result<Vec<DosageRecord>, ParseError> {
    let cols = table.require_columns(&DOSAGE_COLUMNS)?;
    table
        .rows
        .iter()
        .map(|row| {
            let mut record = DosageRecord::new(row.cell(cols[0]), row.cell(cols[2]))
                .input_type(row.cell(cols[1]))
                .name(row.cell(cols[3]))
                .unit(row.cell(cols[4]));
            if !row.cell(cols[5]).is_empty() {
                record = record.dosage(decimal_cell(table, row, cols[5], DOSAGE_COLUMNS[5])?);
            }
            Ok(record)
        })
        .collect()
}

// ============================================================================
// Value parsing
// ============================================================================

/// Parse a date written day-first.
///
/// Accepts `dd/mm/yyyy`, `dd-mm-yyyy`, `dd.mm.yyyy`, two-digit years
/// (taken as 20yy), ISO `yyyy-mm-dd`, and a trailing time of day which is
/// ignored.
///
/// ```rust
/// use chrono::NaiveDate;
/// use agroprog_parser::parse_day_first_date;
///
/// assert_eq!(parse_day_first_date("03/02/2024"), NaiveDate::from_ymd_opt(2024, 2, 3));
/// assert_eq!(parse_day_first_date("2024-02-03 00:00:00"), NaiveDate::from_ymd_opt(2024, 2, 3));
/// ```
pub fn parse_day_first_date(text: &str) -> Option<NaiveDate> {
    let date_part = text.split(|c: char| c == ' ' || c == 'T').next()?.trim();
    let parts: Vec<&str> = date_part.split(|c: char| c == '/' || c == '-' || c == '.').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }

    let numbers: Vec<u32> = parts
        .iter()
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<_>>()?;

    let (year, month, day) = if parts[0].len() == 4 {
        (numbers[0], numbers[1], numbers[2])
    } else {
        let year = match parts[2].len() {
            2 => 2000 + numbers[2],
            4 => numbers[2],
            _ => return None,
        };
        (year, numbers[1], numbers[0])
    };

    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// Parse a decimal, accepting a comma as decimal separator and exponents
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let normalized = if text.contains(',') && !text.contains('.') {
        text.replace(',', ".")
    } else {
        text.to_string()
    };
    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// Parse an integral day count; `10` and `10.0` are accepted, `10.5` is not
pub fn parse_whole_days(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(days) = text.parse::<i64>() {
        return Some(days);
    }
    let value = parse_decimal(text)?;
    if value.fract().is_zero() {
        value.to_i64()
    } else {
        None
    }
}

fn decimal_cell(
    table: &RawTable,
    row: &RawRow,
    index: usize,
    column: &str,
) -> Result<Decimal, ParseError> {
    let text = row.cell(index);
    parse_decimal(text).ok_or_else(|| invalid(table, row, column, text, "a decimal number"))
}

fn date_cell(
    table: &RawTable,
    row: &RawRow,
    index: usize,
    column: &str,
) -> Result<NaiveDate, ParseError> {
    let text = row.cell(index);
    parse_day_first_date(text)
        .ok_or_else(|| invalid(table, row, column, text, "a day-first date such as 31/01/2024"))
}

fn invalid(
    table: &RawTable,
    row: &RawRow,
    column: &str,
    value: &str,
    expected: &'static str,
) -> ParseError {
    ParseError::InvalidValue {
        table: table.name.clone(),
        row: row.line,
        column: column.to_string(),
        value: value.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn table(name: &str, headers: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut table = RawTable::new(name, headers.iter().map(|h| h.to_string()).collect());
        for (i, row) in rows.iter().enumerate() {
            table.push_row(i + 2, row.iter().map(|c| c.to_string()).collect());
        }
        table
    }

    #[test]
    fn day_first_dates() {
        assert_eq!(parse_day_first_date("01/02/2024"), Some(date(2024, 2, 1)));
        assert_eq!(parse_day_first_date("1-2-2024"), Some(date(2024, 2, 1)));
        assert_eq!(parse_day_first_date("01.02.24"), Some(date(2024, 2, 1)));
        assert_eq!(parse_day_first_date("2024-02-01"), Some(date(2024, 2, 1)));
        assert_eq!(parse_day_first_date("2024-02-01T08:30:00"), Some(date(2024, 2, 1)));
        assert_eq!(parse_day_first_date("31/02/2024"), None);
        assert_eq!(parse_day_first_date("yesterday"), None);
        assert_eq!(parse_day_first_date(""), None);
    }

    #[test]
    fn decimals() {
        assert_eq!(parse_decimal("2.5"), Some(dec!(2.5)));
        assert_eq!(parse_decimal("2,5"), Some(dec!(2.5)));
        assert_eq!(parse_decimal(" 4 "), Some(dec!(4)));
        assert_eq!(parse_decimal("1e2"), Some(dec!(100)));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("n/a"), None);
    }

    #[test]
    fn whole_days() {
        assert_eq!(parse_whole_days("10"), Some(10));
        assert_eq!(parse_whole_days("10.0"), Some(10));
        assert_eq!(parse_whole_days("-3"), Some(-3));
        assert_eq!(parse_whole_days("10.5"), None);
        assert_eq!(parse_whole_days(""), None);
    }

    #[test]
    fn status_records() {
        let raw = table(
            "status",
            &["G_Forza", "Lote", "Bloque", "Area_ha", "Estado", "Fecha_Estado", "Extra"],
            &[&["F1", "12", "A", "1.257", "Floración", "15/01/2024", "x"]],
        );
        let records = parse_status_records(&raw).unwrap();
        assert_eq!(
            records,
            vec![StatusRecord::new("12", "A", "Floración", date(2024, 1, 15))
                .area(dec!(1.257))
                .forcing_group("F1")]
        );
    }

    #[test]
    fn status_bad_date_reports_row_and_column() {
        let raw = table(
            "status",
            &STATUS_COLUMNS,
            &[
                &["1", "A", "1", "Floración", "01/01/2024", "G"],
                &["2", "A", "1", "Floración", "someday", "G"],
            ],
        );
        match parse_status_records(&raw).unwrap_err() {
            ParseError::InvalidValue {
                row, column, value, ..
            } => {
                assert_eq!(row, 3);
                assert_eq!(column, "Fecha_Estado");
                assert_eq!(value, "someday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_column_checked_before_rows() {
        let raw = table("status", &["Lote", "Bloque", "Area_ha", "Estado", "Fecha_Estado"], &[]);
        assert!(matches!(
            parse_status_records(&raw),
            Err(ParseError::MissingColumn { ref column, .. }) if column == "G_Forza"
        ));
    }

    #[test]
    fn application_rules() {
        let raw = table(
            "applications",
            &APPLICATION_COLUMNS,
            &[&["App1", "10", "Floración"], &["App2", "21.0", "Floración"]],
        );
        let rules = parse_application_rules(&raw).unwrap();
        assert_eq!(
            rules,
            vec![
                ApplicationRule::new("App1", 10, "Floración"),
                ApplicationRule::new("App2", 21, "Floración"),
            ]
        );
    }

    #[test]
    fn application_rule_fractional_age_rejected() {
        let raw = table("applications", &APPLICATION_COLUMNS, &[&["App1", "10.5", "Floración"]]);
        assert!(matches!(
            parse_application_rules(&raw),
            Err(ParseError::InvalidValue { ref column, .. }) if column == "Edad_calendario"
        ));
    }

    #[test]
    fn dosage_records_keep_blank_dosage() {
        let raw = table(
            "dosage",
            &DOSAGE_COLUMNS,
            &[
                &["App1", "Fertilizante", "F-001", "Urea", "kg", "4"],
                &["App1", "Adherente", "A-010", "Pegante", "l", ""],
            ],
        );
        let records = parse_dosage_records(&raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].dosage_per_ha, Some(dec!(4)));
        assert_eq!(records[0].input_key().input_name, "Urea");
        assert_eq!(records[1].dosage_per_ha, None);
    }
}
