use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single spreadsheet cell as loaded from an input file.
///
/// `Empty` is the only value treated as missing; everything else, including
/// an empty string, is a present value and participates in key matching with
/// plain value equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Plain string cell.
    Text(String),
    /// Numeric cell. Integer cells are widened to `f64` on load.
    Number(f64),
    /// Boolean cell.
    Bool(bool),
    /// Blank cell.
    Empty,
}

impl CellValue {
    /// Whether the cell holds no value.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Textual form of the cell, used for equipment codes and descriptions.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Text(value) => value.clone(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Bool(value) => value.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

/// One loaded quarterly table: ordered named columns plus ordered rows.
/// Immutable for the duration of a run; a reload replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl InputTable {
    /// Index of the named column, if this table has it.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

/// One of the four fixed quarterly periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// Zero-based position within the year.
    pub fn index(self) -> usize {
        match self {
            Quarter::Q1 => 0,
            Quarter::Q2 => 1,
            Quarter::Q3 => 2,
            Quarter::Q4 => 3,
        }
    }

    /// Short label such as `Q1`.
    pub fn label(self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        }
    }

    /// The months the quarter covers, for listings.
    pub fn period(self) -> &'static str {
        match self {
            Quarter::Q1 => "Jan-Mar",
            Quarter::Q2 => "Apr-Jun",
            Quarter::Q3 => "Jul-Sep",
            Quarter::Q4 => "Oct-Dec",
        }
    }
}

/// The four quarterly tables of one run, in Q1 → Q4 order.
#[derive(Debug, Clone, PartialEq)]
pub struct QuarterSet {
    tables: [InputTable; 4],
}

impl QuarterSet {
    pub fn new(tables: [InputTable; 4]) -> Self {
        Self { tables }
    }

    pub fn table(&self, quarter: Quarter) -> &InputTable {
        &self.tables[quarter.index()]
    }

    /// Tables paired with their quarter, in Q1 → Q4 order.
    pub fn iter(&self) -> impl Iterator<Item = (Quarter, &InputTable)> {
        Quarter::ALL.iter().map(|quarter| (*quarter, self.table(*quarter)))
    }

    /// Sorted union of the column names observed across all four tables.
    pub fn column_union(&self) -> BTreeSet<String> {
        self.tables
            .iter()
            .flat_map(|table| table.columns.iter().cloned())
            .collect()
    }
}

/// Resolved assignment of observed column names to the three semantic roles.
///
/// Proposed by the resolver, optionally overridden by the caller, and frozen
/// once validation succeeds. The same column may fill more than one slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Column identifying the equipment item. Required.
    pub equipment_key: Option<String>,
    /// Column holding the revenue figures. Required.
    pub revenue: Option<String>,
    /// Column holding a human-readable description. Optional.
    pub description: Option<String>,
}

/// One output row: a distinct equipment key with its per-quarter revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    /// Textual form of the distinct key value.
    pub equipment_code: String,
    /// First non-missing description found in Q1 → Q4 order; may be empty.
    pub description: String,
    /// Per-quarter revenue, rounded to two decimals; 0.0 when absent.
    pub quarter_revenue: [f64; 4],
    /// Sum of the four quarterly values.
    pub year_total: f64,
}

/// The aggregated result of one run, sorted by year total descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub year: String,
    pub records: Vec<EquipmentRecord>,
}

impl Report {
    /// Total revenue across all records for the given quarter.
    pub fn quarter_total(&self, quarter: Quarter) -> f64 {
        self.records
            .iter()
            .map(|record| record.quarter_revenue[quarter.index()])
            .sum()
    }

    /// Grand total across all records.
    pub fn grand_total(&self) -> f64 {
        self.records.iter().map(|record| record.year_total).sum()
    }
}
