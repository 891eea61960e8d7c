use serde_json::Value;

use crate::gl::consolidator::error::Result;
use crate::gl::consolidator::model::{Column, ConsolidatedTable};

const MAX_CELL_WIDTH: usize = 24;

/// Renders the first `limit` rows as an aligned plain-text table.
pub fn render_text(table: &ConsolidatedTable, limit: usize) -> String {
    let columns = Column::output_order();
    let shown = table.rows.len().min(limit);

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(shown + 1);
    grid.push(columns.iter().map(|c| clip(c.header())).collect());
    for row in table.rows.iter().take(shown) {
        grid.push(
            columns
                .iter()
                .map(|column| clip(&row.get(*column).to_string()))
                .collect(),
        );
    }

    let widths: Vec<usize> = (0..columns.len())
        .map(|col| {
            grid.iter()
                .map(|cells| cells[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for (line_idx, cells) in grid.iter().enumerate() {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(line.join(" | ").trim_end());
        out.push('\n');
        if line_idx == 0 {
            let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
            out.push_str(&rule.join("-+-"));
            out.push('\n');
        }
    }
    if table.rows.len() > shown {
        out.push_str(&format!("... {} more rows\n", table.rows.len() - shown));
    }
    out
}

/// Serialises the table as an array of records keyed by column header.
pub fn to_json(table: &ConsolidatedTable) -> Result<Value> {
    Ok(serde_json::to_value(&table.rows)?)
}

fn clip(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        value.to_string()
    } else {
        let mut clipped: String = value.chars().take(MAX_CELL_WIDTH - 1).collect();
        clipped.push('…');
        clipped
    }
}
