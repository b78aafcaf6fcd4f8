//! Input usage aggregation
//!
//! Scheduled rows are joined to dosage records on the application name
//! (one scheduled row may join several inputs). Each joined pair yields
//! `quantity = area × dosage`; quantities are summed per input and week, then
//! pivoted so each week range becomes a column.
//!
//! Scheduled rows with no dosage record carry no input identity and are left
//! out of the pivot; they are reported as `UnmatchedDosage` warnings. Dosage
//! records with a blank dosage count as zero and are reported as
//! `MissingDosage` warnings.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use agroprog_core::{
    DosageRecord, InputKey, InputSummary, InputUsageRow, ProgramWarning, ScheduledApplication,
    WeekWindow,
};
use rust_decimal::Decimal;

/// Pivoted summary plus the warnings raised while joining
#[derive(Clone, Debug, Default)]
pub struct Aggregation {
    pub summary: InputSummary,
    pub warnings: Vec<ProgramWarning>,
}

/// Join, multiply and pivot scheduled applications into an input summary
pub fn aggregate_inputs(
    schedule: &[ScheduledApplication],
    dosages: &[DosageRecord],
    weeks: &[WeekWindow],
) -> Aggregation {
    let mut dosages_by_application: HashMap<&str, Vec<&DosageRecord>> = HashMap::new();
    for dosage in dosages {
        dosages_by_application
            .entry(dosage.application_name.as_str())
            .or_default()
            .push(dosage);
    }

    let mut usage: HashMap<InputKey, BTreeMap<u32, Decimal>> = HashMap::new();
    let mut used_weeks: BTreeSet<u32> = BTreeSet::new();
    let mut unmatched: BTreeMap<&str, usize> = BTreeMap::new();
    let mut blank_dosages: BTreeSet<(&str, &str)> = BTreeSet::new();

    for row in schedule {
        let Some(joined) = dosages_by_application.get(row.application_name.as_str()) else {
            *unmatched.entry(row.application_name.as_str()).or_default() += 1;
            continue;
        };

        for dosage in joined {
            let per_ha = dosage.dosage_per_ha.unwrap_or_else(|| {
                blank_dosages.insert((
                    dosage.application_name.as_str(),
                    dosage.input_code.as_str(),
                ));
                Decimal::ZERO
            });
            *usage
                .entry(dosage.input_key())
                .or_default()
                .entry(row.week_index)
                .or_default() += row.area_ha * per_ha;
            used_weeks.insert(row.week_index);
        }
    }

    let columns: Vec<&WeekWindow> = weeks
        .iter()
        .filter(|w| used_weeks.contains(&w.week_index))
        .collect();

    let mut rows: Vec<InputUsageRow> = usage
        .into_iter()
        .map(|(key, per_week)| {
            let quantities = columns
                .iter()
                .map(|w| per_week.get(&w.week_index).copied().unwrap_or(Decimal::ZERO))
                .collect();
            InputUsageRow::new(key, quantities)
        })
        .collect();
    rows.sort_by(|a, b| {
        a.key
            .summary_order(&b.key)
            .then_with(|| a.key.input_name.cmp(&b.key.input_name))
            .then_with(|| a.key.unit_of_measure.cmp(&b.key.unit_of_measure))
    });

    let mut warnings: Vec<ProgramWarning> = unmatched
        .into_iter()
        .map(|(application, occurrences)| ProgramWarning::UnmatchedDosage {
            application: application.to_string(),
            occurrences,
        })
        .collect();
    warnings.extend(
        blank_dosages
            .into_iter()
            .map(|(application, input_code)| ProgramWarning::MissingDosage {
                application: application.to_string(),
                input_code: input_code.to_string(),
            }),
    );

    tracing::debug!(
        inputs = rows.len(),
        week_columns = columns.len(),
        warnings = warnings.len(),
        "aggregated input usage"
    );

    Aggregation {
        summary: InputSummary {
            week_labels: columns.iter().map(|w| w.label()).collect(),
            rows,
        },
        warnings,
    }
}
