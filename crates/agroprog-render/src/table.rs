//! Tabular view of a report
//!
//! Both output tables are flattened into rows of typed cells so every
//! backend writes the same columns in the same order. Field and block
//! labels that look like plain numbers are kept as numbers, matching how
//! the source sheets store them.

use agroprog_core::{ProgramReport, SCHEDULE_COLUMNS};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One cell of an output table
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Date(NaiveDate),
}

impl Cell {
    /// A label cell: integers without leading zeros become numbers
    pub fn label(value: &str) -> Self {
        let is_plain_integer = !value.is_empty()
            && value.bytes().all(|b| b.is_ascii_digit())
            && (value == "0" || !value.starts_with('0'));
        match value.parse::<i64>() {
            Ok(n) if is_plain_integer => Cell::Integer(n),
            _ => Cell::Text(value.to_string()),
        }
    }

    /// Display form used by the text backend
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Integer(n) => n.to_string(),
            Cell::Decimal(d) => d.normalize().to_string(),
            Cell::Date(d) => d.format("%d/%m/%Y").to_string(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Integer(_) | Cell::Decimal(_))
    }
}

/// A header row plus data rows
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Width of each column in characters, header included
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.display().chars().count();
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(len);
                }
            }
        }
        widths
    }
}

/// The application schedule, one row per scheduled application
pub fn schedule_table(report: &ProgramReport, name: &str) -> Table {
    let rows = report
        .schedule
        .iter()
        .map(|s| {
            vec![
                Cell::Integer(i64::from(s.week_index)),
                Cell::Text(s.application_name.clone()),
                Cell::Text(s.farm_name.clone()),
                Cell::label(&s.field_id),
                Cell::label(&s.block_id),
                Cell::Decimal(s.area_ha),
                Cell::label(&s.forcing_group),
                Cell::Date(s.application_date),
            ]
        })
        .collect();

    Table {
        name: name.to_string(),
        header: SCHEDULE_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
        rows,
    }
}

/// The input usage summary, one row per input
pub fn summary_table(report: &ProgramReport, name: &str) -> Table {
    let summary = &report.summary;
    let rows = summary
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                Cell::Text(row.key.input_type.clone()),
                Cell::label(&row.key.input_code),
                Cell::Text(row.key.input_name.clone()),
                Cell::Text(row.key.unit_of_measure.clone()),
            ];
            cells.extend(row.quantities.iter().map(|q| Cell::Decimal(*q)));
            cells.push(Cell::Decimal(row.total));
            cells
        })
        .collect();

    Table {
        name: name.to_string(),
        header: summary.columns(),
        rows,
    }
}
