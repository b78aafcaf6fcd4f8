//! Plain-text program tables
//!
//! Renders both tables as aligned columns for terminal output, followed by
//! any warnings raised while building the report. Numbers are right-aligned.

use agroprog_core::{ProgramReport, RenderError, Renderer};

use crate::excel::{SCHEDULE_SHEET, SUMMARY_SHEET};
use crate::table::{schedule_table, summary_table, Table};

/// Text table renderer
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Include the input summary after the schedule
    pub include_summary: bool,
    /// Column separator
    pub separator: String,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            include_summary: true,
            separator: "  ".into(),
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print the schedule only
    pub fn schedule_only(mut self) -> Self {
        self.include_summary = false;
        self
    }

    /// Set the column separator
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    fn write_table(&self, out: &mut String, table: &Table) {
        let widths = table.column_widths();

        out.push_str(&table.name);
        out.push('\n');

        let header: Vec<String> = table
            .header
            .iter()
            .zip(widths.iter().copied())
            .map(|(h, w)| format!("{h:<w$}"))
            .collect();
        out.push_str(header.join(&self.separator).trim_end());
        out.push('\n');

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join(&self.separator));
        out.push('\n');

        for row in &table.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(widths.iter().copied())
                .map(|(cell, w)| {
                    let text = cell.display();
                    if cell.is_numeric() {
                        format!("{text:>w$}")
                    } else {
                        format!("{text:<w$}")
                    }
                })
                .collect();
            out.push_str(cells.join(&self.separator).trim_end());
            out.push('\n');
        }
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, report: &ProgramReport) -> Result<String, RenderError> {
        let mut out = String::new();
        self.write_table(&mut out, &schedule_table(report, SCHEDULE_SHEET));

        if self.include_summary {
            out.push('\n');
            if report.summary.is_empty() {
                out.push_str(SUMMARY_SHEET);
                out.push_str("\n(no input usage)\n");
            } else {
                self.write_table(&mut out, &summary_table(report, SUMMARY_SHEET));
            }
        }

        if report.has_warnings() {
            out.push_str("\nWarnings\n");
            for warning in &report.warnings {
                out.push_str(&format!("- {warning}\n"));
            }
        }

        Ok(out)
    }
}
