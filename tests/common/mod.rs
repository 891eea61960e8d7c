#![allow(dead_code)]

use std::path::{Path, PathBuf};

use gl_consolidator::model::{COLUMN_COUNT, Column};
use rust_xlsxwriter::{Format, Workbook};

/// One fixture cell.
#[derive(Clone, Debug)]
pub enum Cell {
    Blank,
    Num(f64),
    Str(String),
    Flag(bool),
    /// Excel serial date, written with a date number format.
    Date(f64),
}

/// A 26-cell journal line with the fields the tests care about filled in.
pub fn line(scheme: f64, gl: f64, doc_type: &str, amount: f64, posting_key: f64) -> Vec<Cell> {
    let mut cells = vec![Cell::Blank; COLUMN_COUNT];
    cells[Column::SchemeId.index()] = Cell::Num(scheme);
    cells[Column::GlAccount.index()] = Cell::Num(gl);
    cells[Column::DocumentType.index()] = Cell::Str(doc_type.to_string());
    cells[Column::Amount.index()] = Cell::Num(amount);
    cells[Column::PostingKey.index()] = Cell::Num(posting_key);
    cells[Column::Currency.index()] = Cell::Str("EUR".to_string());
    cells
}

pub fn with(mut cells: Vec<Cell>, column: Column, value: Cell) -> Vec<Cell> {
    cells[column.index()] = value;
    cells
}

/// Builds a journal export: a banner row, a label row spanning `width`
/// columns, then the data lines.
pub fn workbook_bytes(lines: &[Vec<Cell>], width: usize) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let worksheet = workbook.add_worksheet();
    worksheet
        .write_string(0, 0, "SAP GL journal upload")
        .expect("banner written");
    for col in 0..width {
        worksheet
            .write_string(1, col as u16, format!("label {col}"))
            .expect("label written");
    }
    for (idx, cells) in lines.iter().enumerate() {
        let row = (idx + 2) as u32;
        for (col, cell) in cells.iter().enumerate().take(width) {
            match cell {
                Cell::Blank => {}
                Cell::Num(value) => {
                    worksheet
                        .write_number(row, col as u16, *value)
                        .expect("number written");
                }
                Cell::Str(value) => {
                    worksheet
                        .write_string(row, col as u16, value)
                        .expect("string written");
                }
                Cell::Flag(value) => {
                    worksheet
                        .write_boolean(row, col as u16, *value)
                        .expect("boolean written");
                }
                Cell::Date(serial) => {
                    worksheet
                        .write_number_with_format(row, col as u16, *serial, &date_format)
                        .expect("date written");
                }
            }
        }
    }
    workbook.save_to_buffer().expect("workbook rendered")
}

pub fn write_export(dir: &Path, name: &str, lines: &[Vec<Cell>]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, workbook_bytes(lines, COLUMN_COUNT)).expect("fixture written");
    path
}
