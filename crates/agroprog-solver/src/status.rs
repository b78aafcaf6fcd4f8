//! Authoritative status per field/block
//!
//! Each (field, block) keeps only its most recent status record. Among
//! records sharing the latest date, the one that appears last in the input
//! wins. The resolved area is rounded to two decimals, halves away from
//! zero (2.345 ha becomes 2.35).

use std::collections::HashMap;

use agroprog_core::{FieldBlock, StatusRecord};
use rust_decimal::RoundingStrategy;

/// Resolve one status per field/block, ordered by field then block
pub fn resolve_statuses(records: &[StatusRecord]) -> Vec<StatusRecord> {
    let mut latest: HashMap<FieldBlock, &StatusRecord> = HashMap::new();

    for record in records {
        latest
            .entry(record.key())
            .and_modify(|current| {
                if record.status_date >= current.status_date {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    let mut resolved: Vec<(FieldBlock, StatusRecord)> = latest
        .into_iter()
        .map(|(key, record)| {
            let mut record = record.clone();
            record.area_ha = record
                .area_ha
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            (key, record)
        })
        .collect();
    resolved.sort_by(|a, b| a.0.cmp(&b.0));

    tracing::debug!(
        records = records.len(),
        field_blocks = resolved.len(),
        "resolved statuses"
    );

    resolved.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn latest_date_wins_regardless_of_order() {
        let older = StatusRecord::new("1", "A", "Vegetativo", date(2024, 1, 1));
        let newer = StatusRecord::new("1", "A", "Floración", date(2024, 2, 1));

        let forward = resolve_statuses(&[older.clone(), newer.clone()]);
        let backward = resolve_statuses(&[newer.clone(), older]);

        assert_eq!(forward, vec![newer.clone()]);
        assert_eq!(backward, vec![newer]);
    }

    #[test]
    fn same_date_tie_goes_to_last_record() {
        let first = StatusRecord::new("1", "A", "Vegetativo", date(2024, 2, 1)).forcing_group("G1");
        let second = StatusRecord::new("1", "A", "Floración", date(2024, 2, 1)).forcing_group("G2");

        let resolved = resolve_statuses(&[first, second]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].status, "Floración");
        assert_eq!(resolved[0].forcing_group, "G2");
    }

    #[test]
    fn one_record_per_field_block() {
        let records = vec![
            StatusRecord::new("10", "A", "Floración", date(2024, 1, 1)),
            StatusRecord::new("2", "B", "Floración", date(2024, 1, 1)),
            StatusRecord::new("2", "A", "Floración", date(2024, 1, 1)),
            StatusRecord::new("2", "A", "Cosecha", date(2024, 3, 1)),
        ];

        let resolved = resolve_statuses(&records);
        let keys: Vec<_> = resolved.iter().map(|r| r.key()).collect();
        assert_eq!(
            keys,
            vec![
                FieldBlock::new("2", "A"),
                FieldBlock::new("2", "B"),
                FieldBlock::new("10", "A"),
            ]
        );
        assert_eq!(resolved[0].status, "Cosecha");
    }

    #[test]
    fn area_rounded_to_two_decimals() {
        let records = vec![
            StatusRecord::new("1", "A", "Floración", date(2024, 1, 1)).area(dec!(1.23456)),
            StatusRecord::new("1", "B", "Floración", date(2024, 1, 1)).area(dec!(2.5)),
        ];
        let resolved = resolve_statuses(&records);
        assert_eq!(resolved[0].area_ha, dec!(1.23));
        assert_eq!(resolved[1].area_ha, dec!(2.5));
    }

    #[test]
    fn area_midpoints_round_away_from_zero() {
        let records = vec![
            StatusRecord::new("1", "A", "Floración", date(2024, 1, 1)).area(dec!(2.345)),
            StatusRecord::new("1", "B", "Floración", date(2024, 1, 1)).area(dec!(3.215)),
            StatusRecord::new("1", "C", "Floración", date(2024, 1, 1)).area(dec!(0.005)),
        ];
        let areas: Vec<_> = resolve_statuses(&records).iter().map(|r| r.area_ha).collect();
        assert_eq!(areas, vec![dec!(2.35), dec!(3.22), dec!(0.01)]);
    }

    #[test]
    fn empty_input() {
        assert!(resolve_statuses(&[]).is_empty());
    }
}
