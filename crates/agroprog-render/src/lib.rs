//! # agroprog-render
//!
//! Output backends for agroprog programs.
//!
//! This crate provides:
//! - The two-sheet XLSX workbook (schedule and input summary)
//! - Aligned plain-text tables for terminal previews
//! - JSON output of the whole report
//!
//! ## Example
//!
//! ```rust,ignore
//! use agroprog_core::Renderer;
//! use agroprog_render::{report_file_name, ExcelRenderer, TextRenderer};
//!
//! println!("{}", TextRenderer::new().render(&report)?);
//!
//! let bytes = ExcelRenderer::new().render(&report)?;
//! std::fs::write(report_file_name("LaJudea", report.horizon.start), bytes)?;
//! ```

pub mod excel;
pub mod json;
pub mod table;
pub mod text;

pub use excel::{ExcelRenderer, SCHEDULE_SHEET, SUMMARY_SHEET};
pub use json::JsonRenderer;
pub use table::{schedule_table, summary_table, Cell, Table};
pub use text::TextRenderer;

use chrono::NaiveDate;

/// Default tag embedded in workbook file names
pub const DEFAULT_FILE_TAG: &str = "LaJudea";

/// Workbook file name for a program starting on `start`
///
/// ```rust
/// use chrono::NaiveDate;
/// use agroprog_render::report_file_name;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// assert_eq!(report_file_name("LaJudea", start), "Programacion_LaJudea_20240101.xlsx");
/// ```
pub fn report_file_name(tag: &str, start: NaiveDate) -> String {
    let tag = if tag.trim().is_empty() {
        DEFAULT_FILE_TAG
    } else {
        tag.trim()
    };
    format!("Programacion_{}_{}.xlsx", tag, start.format("%Y%m%d"))
}
