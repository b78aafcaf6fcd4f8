//! # agroprog-core
//!
//! Core domain model and traits for the agroprog application scheduler.
//!
//! This crate provides:
//! - Domain types: `StatusRecord`, `ApplicationRule`, `DosageRecord`,
//!   `WeekWindow`, `ScheduledApplication`, `ProgramReport`
//! - Core traits: `Scheduler`, `Renderer`
//! - Error types and warnings
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use agroprog_core::{ApplicationRule, StatusRecord};
//!
//! let flowering = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let status = StatusRecord::new("12", "A", "Floración", flowering)
//!     .area(Decimal::new(125, 2))
//!     .forcing_group("F-03");
//! let rule = ApplicationRule::new("Boro foliar", 10, "Floración");
//!
//! let candidate = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
//! assert!(rule.fires(&status, candidate));
//! ```

pub mod summary;

use std::cmp::Ordering;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use summary::{InputKey, InputSummary, InputUsageRow};

// ============================================================================
// Type Aliases & Constants
// ============================================================================

/// Field (lot) identifier as written in the status sheet
pub type FieldId = String;

/// Block identifier within a field
pub type BlockId = String;

/// Phenological or operational status label
pub type StatusLabel = String;

/// Name of an application program entry
pub type ApplicationName = String;

/// Farm name written into every scheduled row unless configured otherwise
pub const DEFAULT_FARM_NAME: &str = "La Judea";

/// Smallest accepted horizon, in weeks
pub const MIN_HORIZON_WEEKS: u32 = 1;

/// Largest accepted horizon, in weeks
pub const MAX_HORIZON_WEEKS: u32 = 12;

/// Days in a week window
pub const DAYS_PER_WEEK: i64 = 7;

/// Column headers of the schedule table, in export order
pub const SCHEDULE_COLUMNS: [&str; 8] = [
    "Semana",
    "Aplicacion",
    "Finca",
    "Lote",
    "Bloque",
    "Area",
    "G_Forza",
    "Fecha Aplicacion",
];

/// Leading key columns of the input summary table
pub const SUMMARY_KEY_COLUMNS: [&str; 4] = ["Tipo_Insumo", "Cod_Insumo", "Insumo", "UM"];

/// Trailing column of the input summary table
pub const SUMMARY_TOTAL_COLUMN: &str = "Total";

// ============================================================================
// Label ordering
// ============================================================================

/// Compare two spreadsheet labels.
///
/// Labels that both read as numbers compare numerically (so lot `9` sorts
/// before lot `10`), numbers sort before text, and text compares
/// lexicographically. Equal numeric values fall back to the raw text so the
/// ordering stays consistent with string equality.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    let left = a.trim().parse::<f64>().ok().filter(|v| v.is_finite());
    let right = b.trim().parse::<f64>().ok().filter(|v| v.is_finite());
    match (left, right) {
        (Some(x), Some(y)) => x
            .partial_cmp(&y)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// A (field, block) management unit
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldBlock {
    pub field_id: FieldId,
    pub block_id: BlockId,
}

impl FieldBlock {
    pub fn new(field_id: impl Into<FieldId>, block_id: impl Into<BlockId>) -> Self {
        Self {
            field_id: field_id.into(),
            block_id: block_id.into(),
        }
    }
}

impl Ord for FieldBlock {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_labels(&self.field_id, &other.field_id)
            .then_with(|| compare_labels(&self.block_id, &other.block_id))
    }
}

impl PartialOrd for FieldBlock {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for FieldBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.field_id, self.block_id)
    }
}

// ============================================================================
// Status
// ============================================================================

/// A dated status observation for a field/block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Field (lot) code
    pub field_id: FieldId,
    /// Block code within the field
    pub block_id: BlockId,
    /// Planted area in hectares
    pub area_ha: Decimal,
    /// Status label (e.g. "Floración")
    pub status: StatusLabel,
    /// Date the status was recorded
    pub status_date: NaiveDate,
    /// Forcing group tag, carried through to the schedule
    pub forcing_group: String,
}

impl StatusRecord {
    /// Create a status record with zero area and no forcing group
    pub fn new(
        field_id: impl Into<FieldId>,
        block_id: impl Into<BlockId>,
        status: impl Into<StatusLabel>,
        status_date: NaiveDate,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            block_id: block_id.into(),
            area_ha: Decimal::ZERO,
            status: status.into(),
            status_date,
            forcing_group: String::new(),
        }
    }

    /// Set the area in hectares (builder pattern)
    pub fn area(mut self, area_ha: Decimal) -> Self {
        self.area_ha = area_ha;
        self
    }

    /// Set the forcing group (builder pattern)
    pub fn forcing_group(mut self, group: impl Into<String>) -> Self {
        self.forcing_group = group.into();
        self
    }

    /// The management unit this record describes
    pub fn key(&self) -> FieldBlock {
        FieldBlock::new(self.field_id.clone(), self.block_id.clone())
    }

    /// Whole days elapsed between the status date and `date`.
    ///
    /// Negative when `date` precedes the status date.
    pub fn age_on(&self, date: NaiveDate) -> i64 {
        (date - self.status_date).num_days()
    }
}

// ============================================================================
// Application rules
// ============================================================================

/// A calendar-age rule: apply `application_name` when a unit in
/// `valid_status` reaches `calendar_age_days`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRule {
    pub application_name: ApplicationName,
    pub calendar_age_days: i64,
    pub valid_status: StatusLabel,
}

impl ApplicationRule {
    pub fn new(
        application_name: impl Into<ApplicationName>,
        calendar_age_days: i64,
        valid_status: impl Into<StatusLabel>,
    ) -> Self {
        Self {
            application_name: application_name.into(),
            calendar_age_days,
            valid_status: valid_status.into(),
        }
    }

    /// Whether this rule fires for `status` on `candidate`
    pub fn fires(&self, status: &StatusRecord, candidate: NaiveDate) -> bool {
        status.status == self.valid_status && status.age_on(candidate) == self.calendar_age_days
    }
}

// ============================================================================
// Dosage
// ============================================================================

/// Input dosage for one application
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DosageRecord {
    pub application_name: ApplicationName,
    /// Input category (fertilizer, fungicide, ...)
    pub input_type: String,
    pub input_code: String,
    pub input_name: String,
    /// Unit of measure of the dosage
    pub unit_of_measure: String,
    /// Quantity per hectare; `None` when the sheet leaves it blank
    pub dosage_per_ha: Option<Decimal>,
}

impl DosageRecord {
    pub fn new(application_name: impl Into<ApplicationName>, input_code: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            input_type: String::new(),
            input_code: input_code.into(),
            input_name: String::new(),
            unit_of_measure: String::new(),
            dosage_per_ha: None,
        }
    }

    /// Set the input type (builder pattern)
    pub fn input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = input_type.into();
        self
    }

    /// Set the input name (builder pattern)
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.input_name = name.into();
        self
    }

    /// Set the unit of measure (builder pattern)
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit_of_measure = unit.into();
        self
    }

    /// Set the dosage per hectare (builder pattern)
    pub fn dosage(mut self, dosage_per_ha: Decimal) -> Self {
        self.dosage_per_ha = Some(dosage_per_ha);
        self
    }

    /// Identifying columns of the consumed input
    pub fn input_key(&self) -> InputKey {
        InputKey {
            input_type: self.input_type.clone(),
            input_code: self.input_code.clone(),
            input_name: self.input_name.clone(),
            unit_of_measure: self.unit_of_measure.clone(),
        }
    }
}

// ============================================================================
// Calendar
// ============================================================================

/// A 7-day scheduling window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekWindow {
    /// 1-based week number within the horizon
    pub week_index: u32,
    pub start_date: NaiveDate,
    /// Inclusive; always `start_date + 6 days`
    pub end_date: NaiveDate,
}

impl WeekWindow {
    pub fn new(week_index: u32, start_date: NaiveDate) -> Self {
        Self {
            week_index,
            start_date,
            end_date: start_date + Duration::days(DAYS_PER_WEEK - 1),
        }
    }

    /// Whether `date` falls inside the window (inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// The seven candidate dates of the window, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..DAYS_PER_WEEK).map(move |offset| self.start_date + Duration::days(offset))
    }

    /// Display label used as a summary column header
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use agroprog_core::WeekWindow;
    ///
    /// let week = WeekWindow::new(2, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    /// assert_eq!(week.label(), "Sem 2 08/01 - 14/01");
    /// ```
    pub fn label(&self) -> String {
        format!(
            "Sem {} {} - {}",
            self.week_index,
            self.start_date.format("%d/%m"),
            self.end_date.format("%d/%m")
        )
    }
}

/// Requested scheduling horizon
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    /// Reference start date (first day of week 1)
    pub start: NaiveDate,
    /// Number of weeks, 1 to 12 inclusive
    pub weeks: u32,
}

impl Horizon {
    pub fn new(start: NaiveDate, weeks: u32) -> Result<Self, ScheduleError> {
        if !(MIN_HORIZON_WEEKS..=MAX_HORIZON_WEEKS).contains(&weeks) {
            return Err(ScheduleError::InvalidHorizon { weeks });
        }
        Ok(Self { start, weeks })
    }

    /// Last day covered by the horizon
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(DAYS_PER_WEEK * i64::from(self.weeks) - 1)
    }
}

// ============================================================================
// Schedule (Result)
// ============================================================================

/// One application due on one field/block on one date
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledApplication {
    pub week_index: u32,
    pub application_name: ApplicationName,
    pub farm_name: String,
    pub field_id: FieldId,
    pub block_id: BlockId,
    /// Area rounded to two decimals
    pub area_ha: Decimal,
    pub forcing_group: String,
    pub application_date: NaiveDate,
}

/// The three tables a run consumes
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProgramInputs {
    pub statuses: Vec<StatusRecord>,
    pub rules: Vec<ApplicationRule>,
    pub dosages: Vec<DosageRecord>,
}

impl ProgramInputs {
    pub fn new(
        statuses: Vec<StatusRecord>,
        rules: Vec<ApplicationRule>,
        dosages: Vec<DosageRecord>,
    ) -> Self {
        Self {
            statuses,
            rules,
            dosages,
        }
    }
}

/// The output of a successful run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgramReport {
    pub horizon: Horizon,
    /// Week windows covering the horizon, in order
    pub weeks: Vec<WeekWindow>,
    /// Scheduled applications sorted by (week, application, field)
    pub schedule: Vec<ScheduledApplication>,
    /// Input usage per week range
    pub summary: InputSummary,
    /// Non-fatal findings raised while building the report
    pub warnings: Vec<ProgramWarning>,
}

impl ProgramReport {
    /// Whether any warning was raised
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Non-fatal condition surfaced to the caller
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgramWarning {
    /// Scheduled application with no dosage record; excluded from the summary
    UnmatchedDosage {
        application: ApplicationName,
        occurrences: usize,
    },
    /// Dosage record whose per-hectare dosage is blank; counted as zero
    MissingDosage {
        application: ApplicationName,
        input_code: String,
    },
}

impl std::fmt::Display for ProgramWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramWarning::UnmatchedDosage {
                application,
                occurrences,
            } => write!(
                f,
                "application '{}' has no dosage record ({} scheduled rows left out of the input summary)",
                application, occurrences
            ),
            ProgramWarning::MissingDosage {
                application,
                input_code,
            } => write!(
                f,
                "dosage for input '{}' in application '{}' is blank; counted as 0",
                input_code, application
            ),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Core scheduling abstraction
pub trait Scheduler: Send + Sync {
    /// Build the application program and input summary for a horizon
    fn schedule(
        &self,
        inputs: &ProgramInputs,
        horizon: &Horizon,
    ) -> Result<ProgramReport, ScheduleError>;
}

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render a report to the output format
    fn render(&self, report: &ProgramReport) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Scheduling error
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Missing input tables: {}", .0.join(", "))]
    MissingInput(Vec<String>),

    #[error("Horizon must be between 1 and 12 weeks, got {weeks}")]
    InvalidHorizon { weeks: u32 },

    #[error("No applications scheduled for the requested horizon")]
    EmptySchedule,

    #[error("Applications without dosage records: {}", .0.join(", "))]
    UnmatchedDosage(Vec<ApplicationName>),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
