use std::path::{Path, PathBuf};

use calamine::{DataType, Reader, Xlsx, open_workbook};
use quarterly_revenue::ToolError;
use quarterly_revenue::io::excel_write;
use quarterly_revenue::pipeline::{self, MappingOverrides};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

enum Cell {
    S(&'static str),
    N(f64),
}

fn write_fixture(path: &Path, columns: &[&str], rows: &[Vec<Cell>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col_idx, column) in columns.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, *column)
            .expect("header written");
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            match cell {
                Cell::S(value) => worksheet
                    .write_string((row_idx + 1) as u32, col_idx as u16, *value)
                    .expect("string cell written"),
                Cell::N(value) => worksheet
                    .write_number((row_idx + 1) as u32, col_idx as u16, *value)
                    .expect("number cell written"),
            };
        }
    }
    workbook.save(path).expect("fixture saved");
}

/// Four quarterly files with deliberately messy shapes: text in revenue
/// cells, a quarter missing the key column, and an empty quarter.
fn write_quarter_fixtures(dir: &Path) -> [PathBuf; 4] {
    let q1 = dir.join("q1.xlsx");
    let q2 = dir.join("q2.xlsx");
    let q3 = dir.join("q3.xlsx");
    let q4 = dir.join("q4.xlsx");

    write_fixture(
        &q1,
        &["Item Code", "Revenue", "Description"],
        &[
            vec![Cell::S("A100"), Cell::S("150.5"), Cell::S("Angle grinder")],
            vec![Cell::S("B200"), Cell::N(10.0), Cell::S("Bench saw")],
            vec![Cell::S("B200"), Cell::N(20.0), Cell::S("Bench saw")],
        ],
    );
    write_fixture(
        &q2,
        &["Item Code", "Revenue"],
        &[
            vec![Cell::S("A100"), Cell::N(200.0)],
            vec![Cell::S("C300"), Cell::S("N/A")],
        ],
    );
    // Q3 lacks the key column entirely; its rows contribute nothing.
    write_fixture(&q3, &["Revenue"], &[vec![Cell::N(999.0)]]);
    write_fixture(&q4, &["Item Code", "Revenue"], &[]);

    [q1, q2, q3, q4]
}

fn read_sheet(path: &Path) -> Vec<Vec<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("output opened");
    let range = workbook
        .worksheet_range(excel_write::SHEET_NAME)
        .expect("sheet present")
        .expect("sheet read");
    range.rows().map(|row| row.to_vec()).collect()
}

fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        other => other.to_string(),
    }
}

fn cell_number(cell: &DataType) -> f64 {
    match cell {
        DataType::Float(value) => *value,
        DataType::Int(value) => *value as f64,
        other => panic!("expected a numeric cell, got {other:?}"),
    }
}

#[test]
fn end_to_end_combine_exports_sorted_report() {
    let temp_dir = tempdir().expect("temporary directory");
    let paths = write_quarter_fixtures(temp_dir.path());
    let output = temp_dir.path().join("report.xlsx");

    let report = pipeline::combine(&paths, &MappingOverrides::default(), "2025", &output)
        .expect("pipeline completed");
    assert_eq!(report.records.len(), 3);

    let sheet = read_sheet(&output);
    assert!(cell_text(&sheet[0][0]).starts_with("Quarterly Data 2025 - "));

    let headers: Vec<String> = sheet[1].iter().map(cell_text).collect();
    assert_eq!(
        headers,
        [
            "Equipment Code",
            "Description",
            "2025 Q1 Revenue",
            "2025 Q2 Revenue",
            "2025 Q3 Revenue",
            "2025 Q4 Revenue",
            "2025 Revenue",
            "Revenue",
        ]
    );

    // A100 leads with 150.5 + 200: the text revenue parses, Q3/Q4 are zero.
    assert_eq!(cell_text(&sheet[2][0]), "A100");
    assert_eq!(cell_text(&sheet[2][1]), "Angle grinder");
    assert_eq!(cell_number(&sheet[2][2]), 150.5);
    assert_eq!(cell_number(&sheet[2][3]), 200.0);
    assert_eq!(cell_number(&sheet[2][4]), 0.0);
    assert_eq!(cell_number(&sheet[2][5]), 0.0);
    assert!((cell_number(&sheet[2][6]) - 350.5).abs() < 1e-9);

    // B200's duplicate Q1 rows are summed, not overwritten.
    assert_eq!(cell_text(&sheet[3][0]), "B200");
    assert_eq!(cell_number(&sheet[3][2]), 30.0);

    // C300's only revenue cell is unparseable text and counts as zero.
    assert_eq!(cell_text(&sheet[4][0]), "C300");
    assert_eq!(cell_number(&sheet[4][6]), 0.0);

    // Compatibility column duplicates the year total.
    for row in &sheet[2..] {
        assert_eq!(cell_number(&row[6]), cell_number(&row[7]));
    }
}

#[test]
fn inspect_reports_columns_and_proposal() {
    let temp_dir = tempdir().expect("temporary directory");
    let paths = write_quarter_fixtures(temp_dir.path());

    let inspection = pipeline::inspect(&paths).expect("inspection completed");
    assert_eq!(inspection.row_counts, [3, 2, 1, 0]);
    assert_eq!(inspection.columns, ["Description", "Item Code", "Revenue"]);
    assert_eq!(inspection.proposed.equipment_key.as_deref(), Some("Item Code"));
    assert_eq!(inspection.proposed.revenue.as_deref(), Some("Revenue"));
    assert_eq!(inspection.proposed.description.as_deref(), Some("Description"));
}

#[test]
fn loader_trims_header_whitespace() {
    let temp_dir = tempdir().expect("temporary directory");
    let q1 = temp_dir.path().join("q1.xlsx");
    write_fixture(
        &q1,
        &["  Item Code  ", " Revenue"],
        &[vec![Cell::S("A100"), Cell::N(1.0)]],
    );
    let blank = temp_dir.path().join("blank.xlsx");
    write_fixture(&blank, &["Item Code", "Revenue"], &[]);

    let paths = [q1, blank.clone(), blank.clone(), blank];
    let inspection = pipeline::inspect(&paths).expect("inspection completed");
    assert_eq!(inspection.columns, ["Item Code", "Revenue"]);
}

#[test]
fn missing_input_file_aborts_before_loading() {
    let temp_dir = tempdir().expect("temporary directory");
    let paths = write_quarter_fixtures(temp_dir.path());
    let mut paths = paths;
    paths[2] = temp_dir.path().join("nope.xlsx");

    let output = temp_dir.path().join("report.xlsx");
    let result = pipeline::combine(&paths, &MappingOverrides::default(), "2025", &output);
    assert!(matches!(result, Err(ToolError::MissingInput(path)) if path.ends_with("nope.xlsx")));
    assert!(!output.exists());
}

#[test]
fn override_with_unknown_column_is_rejected() {
    let temp_dir = tempdir().expect("temporary directory");
    let paths = write_quarter_fixtures(temp_dir.path());
    let output = temp_dir.path().join("report.xlsx");

    let overrides = MappingOverrides {
        revenue: Some("Net Proceeds".into()),
        ..MappingOverrides::default()
    };
    let result = pipeline::combine(&paths, &overrides, "2025", &output);
    assert!(matches!(result, Err(ToolError::UnknownColumn(name)) if name == "Net Proceeds"));
    assert!(!output.exists());
}

#[test]
fn override_changes_the_aggregation_key() {
    let temp_dir = tempdir().expect("temporary directory");
    let q = temp_dir.path().join("q.xlsx");
    write_fixture(
        &q,
        &["Item Code", "Serial", "Revenue"],
        &[
            vec![Cell::S("A100"), Cell::S("S-1"), Cell::N(10.0)],
            vec![Cell::S("A100"), Cell::S("S-2"), Cell::N(20.0)],
        ],
    );
    let blank = temp_dir.path().join("blank.xlsx");
    write_fixture(&blank, &["Item Code", "Serial", "Revenue"], &[]);

    let paths = [q, blank.clone(), blank.clone(), blank];
    let output = temp_dir.path().join("report.xlsx");
    let overrides = MappingOverrides {
        equipment_key: Some("Serial".into()),
        ..MappingOverrides::default()
    };

    let report =
        pipeline::combine(&paths, &overrides, "2024", &output).expect("pipeline completed");
    let codes: Vec<&str> = report
        .records
        .iter()
        .map(|record| record.equipment_code.as_str())
        .collect();
    assert_eq!(codes, ["S-2", "S-1"]);
}
