use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::error::{Result, ToolError};
use crate::model::{CellValue, InputTable};

/// Reads the first worksheet of an Excel workbook as an [`InputTable`].
///
/// The first row supplies the column names, each trimmed of surrounding
/// whitespace. Cell values are kept raw; only `Empty` cells count as missing
/// downstream.
pub fn read_table(path: &Path) -> Result<InputTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("no worksheet in '{}'", path.display())))?;
    let range = read_required_sheet(&mut workbook, &sheet_name)?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or_else(|| {
        ToolError::InvalidWorkbook(format!("missing header row in '{}'", path.display()))
    })?;

    let columns: Vec<String> = header_row
        .iter()
        .map(|cell| cell_to_string(Some(cell)).trim().to_string())
        .collect();

    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    Ok(InputTable { columns, rows })
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::Empty => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
