//! Input usage summary
//!
//! The summary is a matrix: one row per consumed input, one column per week
//! range that carries any usage, and a trailing total.
//!
//! ```text
//! | Tipo_Insumo | Cod_Insumo | Insumo | UM | Sem 1 01/01 - 07/01 | Sem 2 08/01 - 14/01 | Total |
//! |-------------|------------|--------|----|---------------------|---------------------|-------|
//! | Fertilizante| F-001      | Urea   | kg | 10.0                | 0                   | 10.0  |
//! ```

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{compare_labels, SUMMARY_KEY_COLUMNS, SUMMARY_TOTAL_COLUMN};

/// Identifying columns of a consumed input
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputKey {
    pub input_type: String,
    pub input_code: String,
    pub input_name: String,
    pub unit_of_measure: String,
}

impl InputKey {
    /// Row order of the summary: input type, then input code
    pub fn summary_order(&self, other: &Self) -> Ordering {
        compare_labels(&self.input_type, &other.input_type)
            .then_with(|| compare_labels(&self.input_code, &other.input_code))
    }
}

/// One summary row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputUsageRow {
    pub key: InputKey,
    /// Quantity per week column, aligned with `InputSummary::week_labels`
    pub quantities: Vec<Decimal>,
    /// Sum of `quantities`
    pub total: Decimal,
}

impl InputUsageRow {
    pub fn new(key: InputKey, quantities: Vec<Decimal>) -> Self {
        let total = quantities.iter().copied().sum();
        Self {
            key,
            quantities,
            total,
        }
    }
}

/// Pivoted input usage table
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSummary {
    /// Week-range column labels in chronological order
    pub week_labels: Vec<String>,
    pub rows: Vec<InputUsageRow>,
}

impl InputSummary {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Full header row: key columns, week labels, total
    pub fn columns(&self) -> Vec<String> {
        SUMMARY_KEY_COLUMNS
            .iter()
            .map(|c| (*c).to_string())
            .chain(self.week_labels.iter().cloned())
            .chain(std::iter::once(SUMMARY_TOTAL_COLUMN.to_string()))
            .collect()
    }

    /// Find a row by input code
    pub fn row(&self, input_code: &str) -> Option<&InputUsageRow> {
        self.rows.iter().find(|r| r.key.input_code == input_code)
    }

    /// Sum of every row total
    pub fn grand_total(&self) -> Decimal {
        self.rows.iter().map(|r| r.total).sum()
    }
}
