use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::gl::consolidator::consolidate::{NullKeyPolicy, consolidate};
use crate::gl::consolidator::error::{Result, ToolError};
use crate::gl::consolidator::io::excel_read::{self, SignConvention};
use crate::gl::consolidator::io::excel_write;
use crate::gl::consolidator::model::{ConsolidatedTable, Table};

/// What happens when one input cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputErrorPolicy {
    /// The first failing input ends the run.
    #[default]
    Abort,
    /// The failing input is logged and left out of the run.
    Skip,
}

/// Settings for a single consolidation run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub sign: SignConvention,
    pub null_keys: NullKeyPolicy,
    pub on_input_error: InputErrorPolicy,
}

/// Inputs that loaded, in the order given, plus the ones that were skipped.
#[derive(Debug, Default)]
pub struct LoadedInputs {
    pub tables: Vec<Table>,
    pub skipped: Vec<(PathBuf, ToolError)>,
}

/// Outcome of [`consolidate_files`].
#[derive(Debug)]
pub struct RunReport {
    pub output: PathBuf,
    pub table: ConsolidatedTable,
    pub skipped: Vec<(PathBuf, ToolError)>,
}

/// Loads every input into its own table. Parse failures either end the run
/// or are collected, depending on [`RunOptions::on_input_error`].
#[instrument(level = "info", skip_all, fields(input_count = inputs.len()))]
pub fn load_inputs(inputs: &[PathBuf], options: &RunOptions) -> Result<LoadedInputs> {
    let mut loaded = LoadedInputs::default();

    for path in inputs {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.clone()));
        }
        match excel_read::read_table(path, &options.sign) {
            Ok(table) => {
                debug!(input = %path.display(), row_count = table.rows.len(), "input loaded");
                loaded.tables.push(table);
            }
            Err(error @ ToolError::Parse { .. })
                if options.on_input_error == InputErrorPolicy::Skip =>
            {
                warn!(input = %path.display(), %error, "skipping input");
                loaded.skipped.push((path.clone(), error));
            }
            Err(error) => return Err(error),
        }
    }

    Ok(loaded)
}

/// Consolidates the inputs and writes the result to `output`.
#[instrument(
    level = "info",
    skip_all,
    fields(input_count = inputs.len(), output = %output.display())
)]
pub fn consolidate_files(
    inputs: &[PathBuf],
    output: &Path,
    options: &RunOptions,
) -> Result<RunReport> {
    if inputs.is_empty() {
        warn!("no inputs given; writing an empty workbook");
    }

    let loaded = load_inputs(inputs, options)?;
    let table = consolidate(&loaded.tables, options.null_keys)?;
    info!(
        input_rows = table.summary.input_rows,
        groups = table.summary.groups,
        dropped_rows = table.summary.dropped_rows,
        "consolidated journal lines"
    );

    excel_write::write_workbook(output, &table)?;
    info!("workbook written");

    Ok(RunReport {
        output: output.to_path_buf(),
        table,
        skipped: loaded.skipped,
    })
}
