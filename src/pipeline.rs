//! Orchestration of one full run: load the four quarterly files, resolve the
//! column mapping, apply caller overrides, validate, aggregate, and export.
//!
//! Each run is self-contained: loaded tables and the produced report are
//! plain values owned by the caller, and a re-run rebuilds everything from
//! scratch rather than mutating prior state.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::aggregate;
use crate::error::{Result, ToolError};
use crate::io::{excel_read, excel_write};
use crate::model::{ColumnMapping, InputTable, Quarter, QuarterSet, Report};
use crate::resolve;

/// Explicit column choices supplied by the caller; unset slots keep the
/// resolver's proposal.
#[derive(Debug, Clone, Default)]
pub struct MappingOverrides {
    pub equipment_key: Option<String>,
    pub revenue: Option<String>,
    pub description: Option<String>,
}

/// What `inspect` reports back about the loaded files: row counts, the
/// sorted union of available columns, and the mapping the resolver proposes.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub row_counts: [usize; 4],
    pub columns: Vec<String>,
    pub proposed: ColumnMapping,
}

/// Loads the four files and reports available columns plus the proposed
/// mapping, without aggregating anything.
#[instrument(level = "info", skip_all)]
pub fn inspect(paths: &[PathBuf; 4]) -> Result<Inspection> {
    let quarters = load_quarters(paths)?;
    let columns = quarters.column_union();
    let proposed = resolve::resolve(&columns);

    let mut row_counts = [0usize; 4];
    for (quarter, table) in quarters.iter() {
        row_counts[quarter.index()] = table.rows.len();
    }

    Ok(Inspection {
        row_counts,
        columns: columns.into_iter().collect(),
        proposed,
    })
}

/// Runs the full pipeline and writes the exported workbook to `output`.
/// Returns the report so callers can print summary figures.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %output.display(), year = %year)
)]
pub fn combine(
    paths: &[PathBuf; 4],
    overrides: &MappingOverrides,
    year: &str,
    output: &Path,
) -> Result<Report> {
    let quarters = load_quarters(paths)?;
    let columns = quarters.column_union();

    let mapping = resolve_mapping(&columns, overrides)?;
    debug!(?mapping, "column mapping confirmed");

    let report = aggregate::aggregate(&quarters, &mapping, year)?;
    info!(record_count = report.records.len(), "report assembled");

    excel_write::write_report(output, &report)?;
    info!("report exported");
    Ok(report)
}

/// Resolver proposal plus overrides, validated. Aggregation never sees an
/// unvalidated mapping.
fn resolve_mapping(
    columns: &BTreeSet<String>,
    overrides: &MappingOverrides,
) -> Result<ColumnMapping> {
    let mut mapping = resolve::resolve(columns);
    resolve::apply_overrides(
        &mut mapping,
        columns,
        overrides.equipment_key.clone(),
        overrides.revenue.clone(),
        overrides.description.clone(),
    )?;
    resolve::validate(&mapping)?;
    Ok(mapping)
}

fn load_quarters(paths: &[PathBuf; 4]) -> Result<QuarterSet> {
    for path in paths {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.clone()));
        }
    }

    let [q1, q2, q3, q4] = paths;
    Ok(QuarterSet::new([
        load_quarter(Quarter::Q1, q1)?,
        load_quarter(Quarter::Q2, q2)?,
        load_quarter(Quarter::Q3, q3)?,
        load_quarter(Quarter::Q4, q4)?,
    ]))
}

fn load_quarter(quarter: Quarter, path: &Path) -> Result<InputTable> {
    let table = excel_read::read_table(path)?;
    info!(
        quarter = quarter.label(),
        rows = table.rows.len(),
        "loaded quarterly file"
    );
    Ok(table)
}
