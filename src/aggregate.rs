//! Cross-quarter aggregation of per-equipment revenue.
//!
//! The aggregator is a pure function of the four loaded tables, a validated
//! column mapping, and the year label. Absent columns or rows degrade to
//! zero revenue rather than failing, and revenue cells that do not parse as
//! numbers contribute zero. That silent coercion is deliberate: real-world
//! quarterly files carry `N/A` and free text in revenue columns, and the
//! report must stay complete regardless.

use std::cmp::Ordering;

use tracing::debug;

use crate::error::Result;
use crate::model::{CellValue, ColumnMapping, EquipmentRecord, QuarterSet, Report};
use crate::resolve;

/// Builds the yearly report: one record per distinct equipment key observed
/// in any quarter, sorted by year total descending (stable on ties).
///
/// The mapping must pass [`resolve::validate`]; that is re-checked here so an
/// unvalidated mapping can never reach the aggregation itself.
pub fn aggregate(quarters: &QuarterSet, mapping: &ColumnMapping, year: &str) -> Result<Report> {
    resolve::validate(mapping)?;
    let key_column = mapping.equipment_key.as_deref().unwrap_or_default();
    let revenue_column = mapping.revenue.as_deref().unwrap_or_default();

    let all_keys = collect_keys(quarters, key_column);
    debug!(key_count = all_keys.len(), "distinct equipment keys collected");

    let mut records: Vec<EquipmentRecord> = all_keys
        .iter()
        .map(|key| build_record(quarters, mapping, key, key_column, revenue_column))
        .collect();

    // Stable sort keeps first-sighting order for equal totals.
    records.sort_by(|lhs, rhs| {
        rhs.year_total
            .partial_cmp(&lhs.year_total)
            .unwrap_or(Ordering::Equal)
    });

    Ok(Report {
        year: year.to_string(),
        records,
    })
}

/// Union of non-missing key values across all tables, ordered by first
/// sighting in Q1 → Q4 table order. A table without the key column simply
/// contributes no keys.
fn collect_keys(quarters: &QuarterSet, key_column: &str) -> Vec<CellValue> {
    let mut keys: Vec<CellValue> = Vec::new();
    for (_, table) in quarters.iter() {
        let Some(key_index) = table.column_index(key_column) else {
            continue;
        };
        for row in &table.rows {
            let Some(cell) = row.get(key_index) else {
                continue;
            };
            if !cell.is_empty() && !keys.contains(cell) {
                keys.push(cell.clone());
            }
        }
    }
    keys
}

fn build_record(
    quarters: &QuarterSet,
    mapping: &ColumnMapping,
    key: &CellValue,
    key_column: &str,
    revenue_column: &str,
) -> EquipmentRecord {
    let mut description = String::new();
    let mut quarter_revenue = [0.0f64; 4];

    for (quarter, table) in quarters.iter() {
        let Some(key_index) = table.column_index(key_column) else {
            continue;
        };

        // Exact equality on the raw cell value; no normalisation.
        let matching: Vec<&Vec<CellValue>> = table
            .rows
            .iter()
            .filter(|row| row.get(key_index) == Some(key))
            .collect();
        let Some(first_row) = matching.first() else {
            continue;
        };

        // First non-missing description in quarter order wins.
        if description.is_empty() {
            if let Some(cell) = mapping
                .description
                .as_deref()
                .and_then(|column| table.column_index(column))
                .and_then(|index| first_row.get(index))
            {
                if !cell.is_empty() {
                    description = cell.display_text();
                }
            }
        }

        if let Some(revenue_index) = table.column_index(revenue_column) {
            let sum: f64 = matching
                .iter()
                .map(|row| coerce_number(row.get(revenue_index)))
                .sum();
            quarter_revenue[quarter.index()] = round_cents(sum);
        }
    }

    let year_total = quarter_revenue.iter().sum();
    EquipmentRecord {
        equipment_code: key.display_text(),
        description,
        quarter_revenue,
        year_total,
    }
}

/// Lossy numeric coercion: anything that is not a number and does not parse
/// as one counts as zero.
fn coerce_number(cell: Option<&CellValue>) -> f64 {
    match cell {
        Some(CellValue::Number(value)) => *value,
        Some(CellValue::Text(value)) => value.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
