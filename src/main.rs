use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use gl_consolidator::consolidate::NullKeyPolicy;
use gl_consolidator::io::excel_read::SignConvention;
use gl_consolidator::io::{excel_write, report};
use gl_consolidator::pipeline::{self, InputErrorPolicy, RunOptions};
use gl_consolidator::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let options = RunOptions {
        sign: SignConvention {
            flip_posting_keys: cli.flip_posting_keys.clone(),
        },
        null_keys: cli.null_keys.into(),
        on_input_error: if cli.skip_invalid {
            InputErrorPolicy::Skip
        } else {
            InputErrorPolicy::Abort
        },
    };

    let output = excel_write::output_path(&cli.output_dir, &cli.output);
    let outcome = pipeline::consolidate_files(&cli.inputs, &output, &options)?;

    for (path, error) in &outcome.skipped {
        eprintln!("skipped {}: {error}", path.display());
    }
    if let Some(limit) = cli.preview {
        print!("{}", report::render_text(&outcome.table, limit));
    }
    if cli.json {
        let json = report::to_json(&outcome.table)?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    }
    eprintln!(
        "wrote {} rows to {}",
        outcome.table.len(),
        outcome.output.display()
    );
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Consolidate general-ledger journal exports into one workbook."
)]
struct Cli {
    /// Journal export workbooks (.xlsx), consolidated in the order given.
    #[arg(value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Output file name without extension.
    #[arg(short, long, default_value = excel_write::DEFAULT_BASE_NAME)]
    output: String,

    /// Directory the output workbook is written to.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Treatment of rows whose schemeid, GL Account or Document Type is empty.
    #[arg(long, value_enum, default_value_t = NullKeys::Group)]
    null_keys: NullKeys,

    /// Leave out inputs that fail to parse instead of stopping.
    #[arg(long)]
    skip_invalid: bool,

    /// Posting Key whose Amount is negated before summing. Repeatable.
    #[arg(long = "flip-posting-key", value_name = "KEY", default_values_t = [50.0])]
    flip_posting_keys: Vec<f64>,

    /// Print the first ROWS consolidated rows as a table.
    #[arg(long, value_name = "ROWS", num_args = 0..=1, default_missing_value = "20")]
    preview: Option<usize>,

    /// Print the consolidated rows as JSON records.
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum NullKeys {
    Group,
    Drop,
    Reject,
}

impl From<NullKeys> for NullKeyPolicy {
    fn from(kind: NullKeys) -> Self {
        match kind {
            NullKeys::Group => NullKeyPolicy::Group,
            NullKeys::Drop => NullKeyPolicy::Drop,
            NullKeys::Reject => NullKeyPolicy::Reject,
        }
    }
}
