use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::gl::consolidator::error::{Result, ToolError};
use crate::gl::consolidator::model::{CellValue, Column, ConsolidatedTable};

/// Name of the worksheet holding the consolidated journal.
pub const SHEET_NAME: &str = "Consolidated";
/// Base name used when the operator supplies an empty one.
pub const DEFAULT_BASE_NAME: &str = "combined_data";

const EXTENSION: &str = "xlsx";

/// Resolves `<dir>/<base>.xlsx`. A base that already ends in `.xlsx` keeps
/// a single extension.
pub fn output_path(dir: &Path, base: &str) -> PathBuf {
    let base = base.trim();
    let base = if base.is_empty() { DEFAULT_BASE_NAME } else { base };
    let has_extension = Path::new(base)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION));
    if has_extension {
        dir.join(base)
    } else {
        dir.join(format!("{base}.{EXTENSION}"))
    }
}

/// Writes the consolidated table to the given path.
pub fn write_workbook(path: &Path, table: &ConsolidatedTable) -> Result<()> {
    let wrap = |source| ToolError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = build_workbook(table).map_err(wrap)?;
    workbook.save(path).map_err(wrap)?;
    Ok(())
}

/// Renders the consolidated table as xlsx bytes, e.g. for a download.
pub fn render_workbook(table: &ConsolidatedTable) -> Result<Vec<u8>> {
    let wrap = |source| ToolError::Write {
        path: PathBuf::from("<in-memory workbook>"),
        source,
    };
    let mut workbook = build_workbook(table).map_err(wrap)?;
    workbook.save_to_buffer().map_err(wrap)
}

fn build_workbook(table: &ConsolidatedTable) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let columns = Column::output_order();
    for (col_idx, column) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, column.header(), &header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let sheet_row = (row_idx + 1) as u32;
        for (col_idx, column) in columns.iter().enumerate() {
            let col = col_idx as u16;
            match row.get(*column) {
                CellValue::Empty => {}
                CellValue::Text(value) => {
                    worksheet.write_string(sheet_row, col, value)?;
                }
                CellValue::Number(value) => {
                    worksheet.write_number(sheet_row, col, *value)?;
                }
                CellValue::Bool(value) => {
                    worksheet.write_boolean(sheet_row, col, *value)?;
                }
                CellValue::DateTime(serial) => {
                    let format = if serial.fract() == 0.0 {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet.write_number_with_format(sheet_row, col, *serial, format)?;
                }
            }
        }
    }

    finish_sheet(worksheet, table.rows.len() as u32, columns.len() as u16)?;
    Ok(workbook)
}

fn finish_sheet(
    worksheet: &mut Worksheet,
    row_count: u32,
    column_count: u16,
) -> std::result::Result<(), XlsxError> {
    let col_end = column_count.saturating_sub(1);
    worksheet.autofilter(0, 0, row_count, col_end)?;
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}
