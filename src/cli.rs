use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_DB_PATH: &str = "data/devices.db";

#[derive(Debug, Parser)]
#[command(
    name = "fleetcomp",
    version,
    about = "Build the endpoint compliance history store from tool export spreadsheets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest every workbook in the input directories for one run date.
    Ingest(IngestArgs),
    /// Print stored summaries.
    Summary(SummaryArgs),
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Input directories, semicolon-separated; may be repeated.
    #[arg(long = "in", value_name = "DIRS", value_delimiter = ';')]
    pub input_dirs: Vec<String>,

    /// SQLite store to write.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DB_PATH)]
    pub out: PathBuf,

    /// Report date (YYYY-MM-DD); defaults to today.
    #[arg(long, value_name = "DATE")]
    pub run_date: Option<String>,

    /// JSON settings file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl IngestArgs {
    /// Input directories, trimmed, with empty `;;` segments removed.
    pub fn directories(&self) -> Vec<PathBuf> {
        self.input_dirs
            .iter()
            .map(|dir| dir.trim())
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// SQLite store to read.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DB_PATH)]
    pub out: PathBuf,

    /// Only show this report date.
    #[arg(long, value_name = "DATE")]
    pub run_date: Option<String>,

    #[arg(long)]
    pub json: bool,
}
