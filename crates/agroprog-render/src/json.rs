//! JSON program output

use serde::Serialize;

use agroprog_core::{
    InputSummary, ProgramReport, ProgramWarning, RenderError, Renderer, ScheduledApplication,
};
use chrono::NaiveDate;

/// JSON renderer
#[derive(Clone, Debug, Default)]
pub struct JsonRenderer {
    /// Indent the output
    pub pretty: bool,
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent the output
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

#[derive(Serialize)]
struct JsonProgram<'a> {
    start: NaiveDate,
    end: NaiveDate,
    weeks: u32,
    schedule: &'a [ScheduledApplication],
    summary: &'a InputSummary,
    warnings: &'a [ProgramWarning],
}

impl Renderer for JsonRenderer {
    type Output = String;

    fn render(&self, report: &ProgramReport) -> Result<String, RenderError> {
        let program = JsonProgram {
            start: report.horizon.start,
            end: report.horizon.end(),
            weeks: report.horizon.weeks,
            schedule: &report.schedule,
            summary: &report.summary,
            warnings: &report.warnings,
        };
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&program)
        } else {
            serde_json::to_string(&program)
        };
        rendered.map_err(|e| RenderError::Format(e.to_string()))
    }
}
