//! Calendar-age rule matching
//!
//! For every week window, every resolved field/block and every day of the
//! window, a rule fires when the unit's status equals the rule's valid status
//! and the days elapsed since the status date equal the rule's calendar age.
//! Every firing produces its own row; several rules may fire for the same
//! (field/block, date) pair.

use std::collections::HashMap;

use agroprog_core::{
    compare_labels, ApplicationRule, ScheduledApplication, StatusRecord, WeekWindow,
};

/// Match `rules` against every candidate date of `weeks`.
///
/// Rows come out in generation order (week, field/block, day, rule); use
/// [`sort_schedule`] for display order.
pub fn match_applications(
    weeks: &[WeekWindow],
    statuses: &[StatusRecord],
    rules: &[ApplicationRule],
    farm_name: &str,
) -> Vec<ScheduledApplication> {
    // Rules grouped by the status they apply to, keeping sheet order
    let mut rules_by_status: HashMap<&str, Vec<&ApplicationRule>> = HashMap::new();
    for rule in rules {
        rules_by_status
            .entry(rule.valid_status.as_str())
            .or_default()
            .push(rule);
    }

    let mut scheduled = Vec::new();
    for week in weeks {
        for status in statuses {
            let Some(candidates) = rules_by_status.get(status.status.as_str()) else {
                continue;
            };
            for date in week.days() {
                for rule in candidates.iter().filter(|r| r.fires(status, date)) {
                    scheduled.push(ScheduledApplication {
                        week_index: week.week_index,
                        application_name: rule.application_name.clone(),
                        farm_name: farm_name.to_string(),
                        field_id: status.field_id.clone(),
                        block_id: status.block_id.clone(),
                        area_ha: status.area_ha,
                        forcing_group: status.forcing_group.clone(),
                        application_date: date,
                    });
                }
            }
        }
    }

    tracing::debug!(
        weeks = weeks.len(),
        field_blocks = statuses.len(),
        rules = rules.len(),
        matches = scheduled.len(),
        "matched applications"
    );

    scheduled
}

/// Sort by week, then application name, then field; stable otherwise
pub fn sort_schedule(schedule: &mut [ScheduledApplication]) {
    schedule.sort_by(|a, b| {
        a.week_index
            .cmp(&b.week_index)
            .then_with(|| a.application_name.cmp(&b.application_name))
            .then_with(|| compare_labels(&a.field_id, &b.field_id))
    });
}
