use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use crate::{context_model::ModelParameters, error::Result};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// The verbosity of the log written to stderr.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: CliCommands,
}

#[derive(Subcommand)]
pub enum CliCommands {
    /// Rank the sequences of a database by their NRC against a reference.
    Rank(RankCommand),

    /// Write the per-position coding cost of database sequences, one file per sequence.
    Progression(ProgressionCommand),
}

#[derive(Args)]
pub struct ModelArguments {
    /// The reference text the model is trained on.
    #[arg(short = 's', long)]
    pub reference: PathBuf,

    /// The database of candidate sequences, each introduced by a line `@name`.
    #[arg(short, long)]
    pub database: PathBuf,

    /// The number of preceding symbols used to predict the next one.
    #[arg(short = 'k', long, default_value_t = 2)]
    pub context_width: usize,

    /// The additive smoothing parameter.
    #[arg(short, long, default_value_t = 1.0)]
    pub alpha: f64,
}

impl ModelArguments {
    pub fn parameters(&self) -> Result<ModelParameters> {
        ModelParameters::new(self.context_width, self.alpha)
    }
}

#[derive(Args)]
pub struct RankCommand {
    #[command(flatten)]
    pub model: ModelArguments,

    /// The number of best sequences to output.
    #[arg(short, long, default_value_t = 20)]
    pub top: usize,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// The number of scoring threads. Defaults to the available parallelism.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Do not draw a progress bar while scoring.
    #[arg(long)]
    pub no_progress: bool,

    /// Also write the progressions of the ranked sequences into this directory.
    #[arg(long)]
    pub progression_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct ProgressionCommand {
    #[command(flatten)]
    pub model: ModelArguments,

    /// The sequences to trace. Defaults to all sequences of the database.
    #[arg(short, long)]
    pub name: Vec<String>,

    /// The directory the progressions are written to.
    #[arg(short, long)]
    pub output_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for reading.
    Table,
    Csv,
    /// The ranking together with the sequences that could not be scored.
    Json,
}
