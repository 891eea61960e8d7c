use std::collections::HashMap;

use crate::gl::consolidator::error::{Result, ToolError};
use crate::gl::consolidator::model::{
    ConsolidatedTable, ConsolidationSummary, GroupKey, JournalRow, Table,
};

/// How rows with an empty key cell take part in grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NullKeyPolicy {
    /// An empty cell is an ordinary key value and forms its own group.
    #[default]
    Group,
    /// Rows with any empty key cell are left out and counted.
    Drop,
    /// The first row with an empty key cell fails the consolidation.
    Reject,
}

/// Merges the tables into one row per (schemeid, GL Account, Document Type).
///
/// Tables are visited in the order given and rows in sheet order. The first
/// row seen for a key supplies every field except Amount, which is the sum of
/// all the group's (already sign-normalised) amounts, made absolute once the
/// sum is complete. Output rows keep the order in which their keys first
/// appeared.
pub fn consolidate(tables: &[Table], policy: NullKeyPolicy) -> Result<ConsolidatedTable> {
    let mut positions: HashMap<GroupKey, usize> = HashMap::new();
    let mut rows: Vec<JournalRow> = Vec::new();
    let mut summary = ConsolidationSummary::default();

    for table in tables {
        for row in &table.rows {
            summary.input_rows += 1;

            if let Some(column) = row.empty_key_column() {
                match policy {
                    NullKeyPolicy::Group => {}
                    NullKeyPolicy::Drop => {
                        summary.dropped_rows += 1;
                        continue;
                    }
                    NullKeyPolicy::Reject => {
                        return Err(ToolError::Aggregation(format!(
                            "{} line {}: key column '{}' is empty",
                            table.source,
                            row.line,
                            column.header()
                        )));
                    }
                }
            }

            let key = row.key();
            match positions.get(&key) {
                Some(&position) => {
                    let merged = &mut rows[position];
                    merged.set_amount(merged.amount() + row.amount());
                }
                None => {
                    positions.insert(key, rows.len());
                    rows.push(row.clone());
                }
            }
        }
    }

    for row in &mut rows {
        row.set_amount(row.amount().abs());
    }
    summary.groups = rows.len();

    Ok(ConsolidatedTable { rows, summary })
}
