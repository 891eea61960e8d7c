mod common;

use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use common::{Cell, line, with, write_export};
use gl_consolidator::ToolError;
use gl_consolidator::io::{excel_write, report};
use gl_consolidator::model::{COLUMN_COUNT, CellValue, Column};
use gl_consolidator::pipeline::{self, InputErrorPolicy, RunOptions};
use tempfile::tempdir;

fn read_output(path: &Path) -> calamine::Range<DataType> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("output opened");
    workbook
        .worksheet_range(excel_write::SHEET_NAME)
        .expect("consolidated sheet present")
        .expect("consolidated sheet read")
}

fn output_column(column: Column) -> u32 {
    Column::output_order()
        .iter()
        .position(|candidate| *candidate == column)
        .expect("column in output") as u32
}

#[test]
fn consolidate_files_writes_keyed_workbook() {
    let temp_dir = tempdir().expect("temporary directory");
    let first = write_export(
        temp_dir.path(),
        "january.xlsx",
        &[line(1.0, 100.0, "DR", 50.0, 40.0), line(2.0, 200.0, "KR", 7.0, 50.0)],
    );
    let second = write_export(
        temp_dir.path(),
        "february.xlsx",
        &[line(1.0, 100.0, "DR", 30.0, 50.0)],
    );
    let output = excel_write::output_path(temp_dir.path(), "combined");

    let outcome = pipeline::consolidate_files(&[first, second], &output, &RunOptions::default())
        .expect("run succeeded");
    assert_eq!(outcome.table.len(), 2);
    assert!(outcome.skipped.is_empty());

    let range = read_output(&output);
    assert_eq!(
        range.get_value((0, 0)),
        Some(&DataType::String("schemeid".into()))
    );
    assert_eq!(
        range.get_value((0, 1)),
        Some(&DataType::String("GL Account".into()))
    );
    assert_eq!(
        range.get_value((0, 2)),
        Some(&DataType::String("Document Type".into()))
    );

    let amount = output_column(Column::Amount);
    assert_eq!(range.get_value((1, amount)), Some(&DataType::Float(20.0)));
    assert_eq!(range.get_value((2, amount)), Some(&DataType::Float(7.0)));
}

#[test]
fn unreadable_input_aborts_by_default() {
    let temp_dir = tempdir().expect("temporary directory");
    let good = write_export(temp_dir.path(), "good.xlsx", &[line(1.0, 100.0, "DR", 5.0, 40.0)]);
    let bad = temp_dir.path().join("bad.xlsx");
    std::fs::write(&bad, b"definitely not a zip").expect("bad fixture written");
    let output = excel_write::output_path(temp_dir.path(), "combined");

    let error = pipeline::consolidate_files(&[good, bad], &output, &RunOptions::default())
        .unwrap_err();
    assert!(matches!(error, ToolError::Parse { .. }));
    assert!(!output.exists());
}

#[test]
fn unreadable_input_can_be_skipped() {
    let temp_dir = tempdir().expect("temporary directory");
    let good = write_export(temp_dir.path(), "good.xlsx", &[line(1.0, 100.0, "DR", 5.0, 40.0)]);
    let bad = temp_dir.path().join("bad.xlsx");
    std::fs::write(&bad, b"definitely not a zip").expect("bad fixture written");
    let output = excel_write::output_path(temp_dir.path(), "combined");
    let options = RunOptions {
        on_input_error: InputErrorPolicy::Skip,
        ..RunOptions::default()
    };

    let outcome =
        pipeline::consolidate_files(&[good, bad.clone()], &output, &options).expect("run succeeded");
    assert_eq!(outcome.table.len(), 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].0, bad);
    assert!(output.exists());
}

#[test]
fn missing_input_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let missing = temp_dir.path().join("nowhere.xlsx");

    let error = pipeline::load_inputs(&[missing.clone()], &RunOptions::default()).unwrap_err();
    match error {
        ToolError::MissingInput(path) => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }

    let output = excel_write::output_path(temp_dir.path(), "combined");
    let error = pipeline::consolidate_files(&[missing], &output, &RunOptions::default())
        .unwrap_err();
    assert!(matches!(error, ToolError::MissingInput(_)));
    assert!(!output.exists());
}

#[test]
fn unwritable_output_is_a_write_error() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = write_export(temp_dir.path(), "a.xlsx", &[line(1.0, 100.0, "DR", 5.0, 40.0)]);
    let output = temp_dir.path().join("no-such-dir").join("combined.xlsx");

    let error =
        pipeline::consolidate_files(&[input], &output, &RunOptions::default()).unwrap_err();
    assert!(matches!(error, ToolError::Write { .. }));
}

#[test]
fn output_path_appends_a_single_extension() {
    let dir = Path::new("out");
    assert_eq!(excel_write::output_path(dir, "combined"), dir.join("combined.xlsx"));
    assert_eq!(excel_write::output_path(dir, "combined.XLSX"), dir.join("combined.XLSX"));
    assert_eq!(excel_write::output_path(dir, "  "), dir.join("combined_data.xlsx"));
    assert_eq!(excel_write::output_path(dir, "q1.report"), dir.join("q1.report.xlsx"));
}

#[test]
fn reports_render_consolidated_rows() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = write_export(
        temp_dir.path(),
        "a.xlsx",
        &[line(1.0, 100.0, "DR", 10.0, 50.0), line(2.0, 100.0, "DR", 3.0, 40.0)],
    );
    let loaded = pipeline::load_inputs(&[input], &RunOptions::default()).expect("inputs loaded");
    let table = gl_consolidator::consolidate::consolidate(&loaded.tables, Default::default())
        .expect("consolidated");

    let text = report::render_text(&table, 1);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("schemeid"));
    assert!(lines[1].starts_with("--------"));
    assert!(lines[2].starts_with('1'));
    assert_eq!(lines[3], "... 1 more rows");

    let json = report::to_json(&table).expect("json rendered");
    assert_eq!(json[0]["Amount"], serde_json::json!(10.0));
    assert_eq!(json[0]["Document Type"], serde_json::json!("DR"));
    assert_eq!(json[1]["Reference"], serde_json::Value::Null);

    let bytes = excel_write::render_workbook(&table).expect("workbook rendered");
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn dates_and_flags_survive_consolidation() {
    let temp_dir = tempdir().expect("temporary directory");
    let dated = with(
        with(
            line(1.0, 100.0, "DR", 5.0, 40.0),
            Column::DocumentDate,
            Cell::Date(45292.0),
        ),
        Column::CrossCompany,
        Cell::Flag(true),
    );
    let input = write_export(temp_dir.path(), "dated.xlsx", &[dated]);
    let output = excel_write::output_path(temp_dir.path(), "combined");

    let outcome = pipeline::consolidate_files(&[input], &output, &RunOptions::default())
        .expect("run succeeded");
    let row = &outcome.table.rows[0];
    assert_eq!(row.get(Column::DocumentDate), &CellValue::DateTime(45292.0));
    assert_eq!(row.get(Column::CrossCompany), &CellValue::Bool(true));

    let range = read_output(&output);
    assert_eq!(
        range.get_value((1, output_column(Column::DocumentDate))),
        Some(&DataType::DateTime(45292.0))
    );
    assert_eq!(
        range.get_value((1, output_column(Column::CrossCompany))),
        Some(&DataType::Bool(true))
    );
}

#[test]
fn no_inputs_write_a_header_only_workbook() {
    let temp_dir = tempdir().expect("temporary directory");
    let output = excel_write::output_path(temp_dir.path(), "empty");

    let outcome =
        pipeline::consolidate_files(&[], &output, &RunOptions::default()).expect("run succeeded");
    assert!(outcome.table.is_empty());

    let range = read_output(&output);
    assert_eq!(range.end(), Some((0, COLUMN_COUNT as u32 - 1)));
    assert_eq!(
        range.get_value((0, 0)),
        Some(&DataType::String("schemeid".into()))
    );
    assert_eq!(
        range.get_value((0, COLUMN_COUNT as u32 - 1)),
        Some(&DataType::String(Column::Text.header().into()))
    );
}
