use std::path::Path;

use chrono::Local;
use rust_xlsxwriter::Workbook;

use crate::error::Result;
use crate::model::{Quarter, Report};

/// Name of the single worksheet in the exported workbook.
pub const SHEET_NAME: &str = "Quarterly Data";

/// Header row of the exported report. The trailing unprefixed `Revenue`
/// column duplicates the year total for downstream consumers that expect it.
pub fn report_headers(year: &str) -> Vec<String> {
    let mut headers = vec!["Equipment Code".to_string(), "Description".to_string()];
    for quarter in Quarter::ALL {
        headers.push(format!("{year} {} Revenue", quarter.label()));
    }
    headers.push(format!("{year} Revenue"));
    headers.push("Revenue".to_string());
    headers
}

/// Writes the report to the given path: a free-text title row carrying the
/// year and generation date, the header row, then one row per record.
pub fn write_report(path: &Path, report: &Report) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let title = format!(
        "{SHEET_NAME} {} - {}",
        report.year,
        Local::now().format("%Y-%m-%d")
    );
    worksheet.write_string(0, 0, &title)?;

    for (col_idx, header) in report_headers(&report.year).iter().enumerate() {
        worksheet.write_string(1, col_idx as u16, header)?;
    }

    for (row_idx, record) in report.records.iter().enumerate() {
        let row = (row_idx + 2) as u32;
        worksheet.write_string(row, 0, &record.equipment_code)?;
        worksheet.write_string(row, 1, &record.description)?;
        for quarter in Quarter::ALL {
            let col = (2 + quarter.index()) as u16;
            worksheet.write_number(row, col, record.quarter_revenue[quarter.index()])?;
        }
        worksheet.write_number(row, 6, record.year_total)?;
        worksheet.write_number(row, 7, record.year_total)?;
    }

    workbook.save(path)?;
    Ok(())
}
