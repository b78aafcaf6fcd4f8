//! XLSX program workbook
//!
//! Generates a two-sheet workbook:
//! - Programacion: one row per scheduled application
//! - Resumen_Insumos: input usage per week range with a total column
//!
//! The first row of each sheet is a bold header holding the column names in
//! order. Application dates are real Excel dates shown as `dd/mm/yyyy`;
//! areas and quantities are numbers.
//!
//! ```text
//! Sheet: Programacion
//! | Semana | Aplicacion  | Finca    | Lote | Bloque | Area | G_Forza | Fecha Aplicacion |
//! |--------|-------------|----------|------|--------|------|---------|------------------|
//! | 2      | Boro foliar | La Judea | 12   | A      | 2.46 | F-01    | 13/01/2024       |
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use agroprog_core::{ProgramReport, RenderError, Renderer};
use chrono::Datelike;

use crate::table::{schedule_table, summary_table, Cell, Table};

/// Default name of the schedule sheet
pub const SCHEDULE_SHEET: &str = "Programacion";

/// Default name of the input summary sheet
pub const SUMMARY_SHEET: &str = "Resumen_Insumos";

/// XLSX program renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Name of the first sheet
    pub schedule_sheet: String,
    /// Name of the second sheet
    pub summary_sheet: String,
    /// Excel number format for application dates
    pub date_format: String,
    /// Excel number format for areas and quantities
    pub quantity_format: String,
    /// Freeze the header row of both sheets
    pub freeze_header: bool,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            schedule_sheet: SCHEDULE_SHEET.into(),
            summary_sheet: SUMMARY_SHEET.into(),
            date_format: "dd/mm/yyyy".into(),
            quantity_format: "#,##0.00".into(),
            freeze_header: true,
        }
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename both sheets
    pub fn sheet_names(mut self, schedule: impl Into<String>, summary: impl Into<String>) -> Self {
        self.schedule_sheet = schedule.into();
        self.summary_sheet = summary.into();
        self
    }

    /// Set the date number format
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Set the quantity number format
    pub fn quantity_format(mut self, format: impl Into<String>) -> Self {
        self.quantity_format = format.into();
        self
    }

    /// Leave the header row scrollable
    pub fn no_freeze(mut self) -> Self {
        self.freeze_header = false;
        self
    }

    /// Build the workbook in memory
    pub fn render_to_bytes(&self, report: &ProgramReport) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let formats = self.create_formats();

        let schedule = schedule_table(report, &self.schedule_sheet);
        let summary = summary_table(report, &self.summary_sheet);

        self.add_table_sheet(&mut workbook, &schedule, &formats)?;
        self.add_table_sheet(&mut workbook, &summary, &formats)?;

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(e.to_string()))
    }

    fn create_formats(&self) -> ExcelFormats {
        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_background_color(0x4472C4)
            .set_font_color(0xFFFFFF)
            .set_border(FormatBorder::Thin);

        let text = Format::new().set_border(FormatBorder::Thin);

        let integer = Format::new()
            .set_num_format("0")
            .set_border(FormatBorder::Thin);

        let quantity = Format::new()
            .set_num_format(&self.quantity_format)
            .set_border(FormatBorder::Thin);

        let date = Format::new()
            .set_num_format(&self.date_format)
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin);

        ExcelFormats {
            header,
            text,
            integer,
            quantity,
            date,
        }
    }

    fn add_table_sheet(
        &self,
        workbook: &mut Workbook,
        table: &Table,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(&table.name)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        for (col, header) in table.header.iter().enumerate() {
            sheet
                .write_with_format(0, col as u16, header.as_str(), &formats.header)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        for (i, cells) in table.rows.iter().enumerate() {
            let row = i as u32 + 1;
            for (col, cell) in cells.iter().enumerate() {
                write_cell(sheet, row, col as u16, cell, formats)?;
            }
        }

        // Dates render as ########## below ~11 characters
        for (col, width) in table.column_widths().into_iter().enumerate() {
            sheet.set_column_width(col as u16, (width + 2).max(12) as f64).ok();
        }

        if self.freeze_header {
            sheet.set_freeze_panes(1, 0).ok();
        }

        Ok(())
    }
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    formats: &ExcelFormats,
) -> Result<(), RenderError> {
    let written = match cell {
        Cell::Text(s) => sheet.write_with_format(row, col, s.as_str(), &formats.text),
        Cell::Integer(n) => sheet.write_with_format(row, col, *n as f64, &formats.integer),
        Cell::Decimal(d) => {
            let value = d.to_f64().ok_or_else(|| {
                RenderError::InvalidData(format!("quantity {d} does not fit a spreadsheet number"))
            })?;
            sheet.write_with_format(row, col, value, &formats.quantity)
        }
        Cell::Date(d) => {
            let datetime = ExcelDateTime::from_ymd(d.year() as u16, d.month() as u8, d.day() as u8)
                .map_err(|e| RenderError::InvalidData(format!("date {d}: {e}")))?;
            sheet.write_datetime_with_format(row, col, &datetime, &formats.date)
        }
    };
    written
        .map(|_| ())
        .map_err(|e| RenderError::Format(e.to_string()))
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, report: &ProgramReport) -> Result<Vec<u8>, RenderError> {
        if report.schedule.is_empty() {
            return Err(RenderError::InvalidData("No applications to render".into()));
        }
        self.render_to_bytes(report)
    }
}

struct ExcelFormats {
    header: Format,
    text: Format,
    integer: Format,
    quantity: Format,
    date: Format,
}
