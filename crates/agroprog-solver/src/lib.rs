//! # agroprog-solver
//!
//! Weekly application scheduling and input aggregation.
//!
//! This crate provides:
//! - Week window generation for a 1–12 week horizon
//! - Status resolution (latest record per field/block)
//! - Calendar-age rule matching over every day of every week
//! - Dosage join and per-week input pivot
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use agroprog_core::{ApplicationRule, Horizon, ProgramInputs, Scheduler, StatusRecord};
//! use agroprog_solver::WeeklySolver;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let inputs = ProgramInputs::new(
//!     vec![StatusRecord::new("1", "A", "Floración", start).area(Decimal::ONE)],
//!     vec![ApplicationRule::new("App1", 10, "Floración")],
//!     Vec::new(),
//! );
//!
//! let report = WeeklySolver::new().schedule(&inputs, &Horizon::new(start, 4).unwrap()).unwrap();
//! assert_eq!(report.schedule[0].week_index, 2);
//! ```

pub mod aggregate;
pub mod calendar;
pub mod matcher;
pub mod status;

pub use aggregate::{aggregate_inputs, Aggregation};
pub use calendar::generate_calendar;
pub use matcher::{match_applications, sort_schedule};
pub use status::resolve_statuses;

use agroprog_core::{
    Horizon, ProgramInputs, ProgramReport, ProgramWarning, ScheduleError, Scheduler,
    DEFAULT_FARM_NAME,
};

/// Week-by-week scheduler
#[derive(Clone, Debug)]
pub struct WeeklySolver {
    /// Farm name written into every scheduled row
    pub farm_name: String,
    /// Fail instead of warning when an application has no dosage record
    pub strict_dosage: bool,
}

impl WeeklySolver {
    pub fn new() -> Self {
        Self {
            farm_name: DEFAULT_FARM_NAME.to_string(),
            strict_dosage: false,
        }
    }

    /// Set the farm name (builder pattern)
    pub fn farm_name(mut self, name: impl Into<String>) -> Self {
        self.farm_name = name.into();
        self
    }

    /// Treat unmatched dosage joins as errors
    pub fn strict(mut self) -> Self {
        self.strict_dosage = true;
        self
    }
}

impl Default for WeeklySolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for WeeklySolver {
    fn schedule(
        &self,
        inputs: &ProgramInputs,
        horizon: &Horizon,
    ) -> Result<ProgramReport, ScheduleError> {
        let weeks = generate_calendar(horizon.start, horizon.weeks);
        let statuses = resolve_statuses(&inputs.statuses);

        let mut schedule = match_applications(&weeks, &statuses, &inputs.rules, &self.farm_name);
        if schedule.is_empty() {
            return Err(ScheduleError::EmptySchedule);
        }
        sort_schedule(&mut schedule);

        let Aggregation { summary, warnings } =
            aggregate_inputs(&schedule, &inputs.dosages, &weeks);

        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        if self.strict_dosage {
            let unmatched: Vec<String> = warnings
                .iter()
                .filter_map(|w| match w {
                    ProgramWarning::UnmatchedDosage { application, .. } => {
                        Some(application.clone())
                    }
                    ProgramWarning::MissingDosage { .. } => None,
                })
                .collect();
            if !unmatched.is_empty() {
                return Err(ScheduleError::UnmatchedDosage(unmatched));
            }
        }

        tracing::info!(
            start = %horizon.start,
            weeks = horizon.weeks,
            applications = schedule.len(),
            inputs = summary.rows.len(),
            "program generated"
        );

        Ok(ProgramReport {
            horizon: *horizon,
            weeks,
            schedule,
            summary,
            warnings,
        })
    }
}
