use std::io::Cursor;
use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx};
use tracing::{debug, instrument};

use crate::gl::consolidator::error::{Result, ToolError};
use crate::gl::consolidator::model::{COLUMN_COUNT, CellValue, Column, JournalRow, Table};

/// Zero-based sheet row holding the column labels. Row 0 is a banner.
const LABEL_ROW: u32 = 1;
/// Zero-based sheet row of the first journal line.
const FIRST_DATA_ROW: u32 = LABEL_ROW + 1;
/// Zero-based index of column Z.
const LAST_COLUMN: u32 = COLUMN_COUNT as u32 - 1;

/// Posting keys whose lines carry an Amount that must be negated before
/// aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct SignConvention {
    pub flip_posting_keys: Vec<f64>,
}

impl Default for SignConvention {
    fn default() -> Self {
        Self {
            flip_posting_keys: vec![50.0],
        }
    }
}

impl SignConvention {
    /// Whether the Posting Key cell selects a sign flip. Only numeric cells
    /// match; a text "50" is left alone.
    pub fn flips(&self, posting_key: &CellValue) -> bool {
        posting_key
            .as_number()
            .is_some_and(|key| self.flip_posting_keys.contains(&key))
    }

    /// Negates the row's Amount when its Posting Key selects a flip.
    pub fn apply(&self, row: &mut JournalRow) {
        if self.flips(row.get(Column::PostingKey)) {
            row.set_amount(-row.amount());
        }
    }
}

/// Reads one journal export from disk. The file name is used as the source
/// label in errors.
pub fn read_table(path: &Path, sign: &SignConvention) -> Result<Table> {
    let bytes = std::fs::read(path)?;
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    load_table(&source, &bytes, sign)
}

/// Parses the first worksheet of an xlsx workbook into a sign-normalised
/// [`Table`].
///
/// Columns A–Z are bound positionally to [`Column::ALL`]; the first row is
/// skipped as a banner and the labels in the second row are ignored. The
/// whole input is rejected if it is not a workbook or its used range does not
/// reach column Z.
#[instrument(level = "debug", skip(bytes, sign), fields(size = bytes.len()))]
pub fn load_table(source: &str, bytes: &[u8], sign: &SignConvention) -> Result<Table> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|error| ToolError::parse(source, error.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ToolError::parse(source, "workbook has no worksheets"))?
        .map_err(|error| ToolError::parse(source, error.to_string()))?;

    let mut rows = read_rows(source, &range)?;
    for row in &mut rows {
        sign.apply(row);
    }
    debug!(row_count = rows.len(), "loaded journal lines");
    Ok(Table::new(source, rows))
}

fn read_rows(source: &str, range: &Range<DataType>) -> Result<Vec<JournalRow>> {
    let (last_row, last_col) = range
        .end()
        .ok_or_else(|| ToolError::parse(source, "worksheet is empty"))?;

    if last_row < LABEL_ROW {
        return Err(ToolError::parse(source, "worksheet has no label row"));
    }
    if last_col < LAST_COLUMN {
        return Err(ToolError::parse(
            source,
            format!(
                "expected {COLUMN_COUNT} columns (A–Z), found {}",
                last_col + 1
            ),
        ));
    }

    let mut rows = Vec::new();
    for sheet_row in FIRST_DATA_ROW..=last_row {
        let cells: [CellValue; COLUMN_COUNT] = std::array::from_fn(|col| {
            cell_value(range.get_value((sheet_row, col as u32)))
        });
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }

        let line = sheet_row + 1;
        let amount = parse_amount(source, line, &cells[Column::Amount.index()])?;
        rows.push(JournalRow::new(line, cells, amount));
    }

    Ok(rows)
}

fn parse_amount(source: &str, line: u32, cell: &CellValue) -> Result<f64> {
    match cell {
        CellValue::Number(value) => Ok(*value),
        CellValue::Empty => Ok(0.0),
        CellValue::Text(text) if text.trim().is_empty() => Ok(0.0),
        CellValue::Text(text) => text.trim().replace(',', "").parse::<f64>().map_err(|_| {
            ToolError::parse(
                source,
                format!(
                    "line {line}, column {}: '{text}' is not a valid amount",
                    Column::Amount.letter()
                ),
            )
        }),
        other => Err(ToolError::parse(
            source,
            format!(
                "line {line}, column {}: '{other}' is not a valid amount",
                Column::Amount.letter()
            ),
        )),
    }
}

fn cell_value(cell: Option<&DataType>) -> CellValue {
    match cell {
        Some(DataType::String(value)) => CellValue::Text(value.clone()),
        Some(DataType::Float(value)) => CellValue::Number(*value),
        Some(DataType::Int(value)) => CellValue::Number(*value as f64),
        Some(DataType::Bool(value)) => CellValue::Bool(*value),
        Some(DataType::DateTime(value)) => CellValue::DateTime(*value),
        Some(DataType::Empty) | None => CellValue::Empty,
        Some(other) => CellValue::Text(other.to_string()),
    }
}
