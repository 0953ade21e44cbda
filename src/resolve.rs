//! Heuristic resolution of observed column names to the canonical schema.
//!
//! The resolver only ever proposes names drawn from its input set. Each slot
//! is filled independently with the first match in sorted column order, so a
//! column such as `Item Revenue Code` can legitimately end up proposed for
//! more than one slot; the caller confirms or overrides before validation.

use std::collections::BTreeSet;

use crate::error::{Result, ToolError};
use crate::model::ColumnMapping;

/// Substrings that mark a column as an equipment identifier candidate.
const EQUIPMENT_HINTS: [&str; 4] = ["equipment", "code", "item", "id"];
/// Substrings that mark a column as a revenue candidate.
const REVENUE_HINTS: [&str; 4] = ["revenue", "price", "amount", "total"];
/// Substrings that mark a column as a description candidate.
const DESCRIPTION_HINTS: [&str; 3] = ["description", "desc", "name"];

/// Proposes a default mapping for the union of column names observed across
/// the four quarterly tables. Slots with no matching column stay unset.
pub fn resolve(columns: &BTreeSet<String>) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();

    for column in columns {
        let lowered = column.to_lowercase();
        if mapping.equipment_key.is_none() && matches_any(&lowered, &EQUIPMENT_HINTS) {
            mapping.equipment_key = Some(column.clone());
        }
        if mapping.revenue.is_none() && matches_any(&lowered, &REVENUE_HINTS) {
            mapping.revenue = Some(column.clone());
        }
        if mapping.description.is_none() && matches_any(&lowered, &DESCRIPTION_HINTS) {
            mapping.description = Some(column.clone());
        }
    }

    mapping
}

/// Checks that both required slots are mapped. An unset description is fine.
pub fn validate(mapping: &ColumnMapping) -> Result<()> {
    if mapping.equipment_key.is_none() {
        return Err(ToolError::MissingRequiredField {
            slot: "equipment key",
        });
    }
    if mapping.revenue.is_none() {
        return Err(ToolError::MissingRequiredField { slot: "revenue" });
    }
    Ok(())
}

/// Applies caller-supplied overrides on top of the proposed mapping. Each
/// override must name a column present in at least one loaded table.
pub fn apply_overrides(
    mapping: &mut ColumnMapping,
    columns: &BTreeSet<String>,
    equipment_key: Option<String>,
    revenue: Option<String>,
    description: Option<String>,
) -> Result<()> {
    for slot in [&equipment_key, &revenue, &description].into_iter().flatten() {
        if !columns.contains(slot) {
            return Err(ToolError::UnknownColumn(slot.clone()));
        }
    }

    if equipment_key.is_some() {
        mapping.equipment_key = equipment_key;
    }
    if revenue.is_some() {
        mapping.revenue = revenue;
    }
    if description.is_some() {
        mapping.description = description;
    }
    Ok(())
}

fn matches_any(lowered: &str, hints: &[&str]) -> bool {
    hints.iter().any(|hint| lowered.contains(hint))
}
