use std::io::{self, BufWriter, Write};

use clap::Parser;
use cli::{Cli, CliCommands, ModelArguments, OutputFormat, ProgressionCommand, RankCommand};
use context_model::ContextModel;
use database::{read_reference, SequenceDatabase, SequenceRecord};
use error::{Error, Result};
use log::{debug, info, warn};
use output::ProgressionWriter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

mod alphabet;
mod cli;
mod context_model;
mod database;
mod error;
mod output;
mod ranking;

fn main() {
    let cli = Cli::parse();

    if let Err(error) = TermLogger::init(
        cli.log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Could not initialise logging: {error}");
    }

    if let Err(error) = match cli.command {
        CliCommands::Rank(rank_command) => rank(rank_command),
        CliCommands::Progression(progression_command) => progression(progression_command),
    } {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn load(model_arguments: &ModelArguments) -> Result<(ContextModel, SequenceDatabase)> {
    let parameters = model_arguments.parameters()?;
    let database = SequenceDatabase::from_file(&model_arguments.database)?;
    if database.is_empty() {
        warn!("The database contains no sequences");
    }
    let reference = read_reference(&model_arguments.reference)?;
    let model = ContextModel::train(&reference, parameters)?;
    debug!(
        "Alphabet: {}",
        String::from_utf8_lossy(model.alphabet().symbols())
    );
    Ok((model, database))
}

fn rank(rank_command: RankCommand) -> Result<()> {
    let (model, database) = load(&rank_command.model)?;
    let scores = ranking::score_database(
        &model,
        &database,
        rank_command.threads,
        !rank_command.no_progress,
    )?;
    let ranking = scores.ranking(rank_command.top);
    info!(
        "Ranked the best {} of {} scored sequences",
        ranking.len(),
        scores.scored().len()
    );

    let mut stdout = BufWriter::new(io::stdout().lock());
    match rank_command.format {
        OutputFormat::Table => output::write_table(&mut stdout, &ranking)?,
        OutputFormat::Csv => output::write_csv(&mut stdout, &ranking)?,
        OutputFormat::Json => output::write_json(&mut stdout, &ranking, scores.failures())?,
    }
    stdout.flush()?;

    if !scores.failures().is_empty() {
        warn!(
            "{} of {} sequences could not be scored and are missing from the ranking",
            scores.failures().len(),
            database.len()
        );
    }

    if let Some(progression_dir) = &rank_command.progression_dir {
        let mut writer = ProgressionWriter::new(progression_dir)?;
        let records: Vec<_> = ranking
            .iter()
            .filter_map(|scored| database.get(&scored.name))
            .collect();
        write_progressions(&model, &mut writer, records);
    }

    Ok(())
}

fn progression(progression_command: ProgressionCommand) -> Result<()> {
    let (model, database) = load(&progression_command.model)?;

    let records: Vec<_> = if progression_command.name.is_empty() {
        database.records().iter().collect()
    } else {
        progression_command
            .name
            .iter()
            .map(|name| {
                database
                    .get(name)
                    .ok_or_else(|| Error::SequenceNotFound(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?
    };

    let mut writer = ProgressionWriter::new(&progression_command.output_dir)?;
    let written = write_progressions(&model, &mut writer, records);
    info!(
        "Wrote {written} progressions to {}",
        progression_command.output_dir.display()
    );

    Ok(())
}

/// Traces and writes each record, skipping records that fail with a warning.
/// Returns the number of progressions written.
fn write_progressions<'database>(
    model: &ContextModel,
    writer: &mut ProgressionWriter,
    records: impl IntoIterator<Item = &'database SequenceRecord>,
) -> usize {
    let mut written = 0;
    for record in records {
        match model
            .progression(&record.sequence)
            .and_then(|values| writer.write(&record.name, values))
        {
            Ok(path) => {
                info!("Wrote progression of {:?} to {}", record.name, path.display());
                written += 1;
            }
            Err(error) => warn!("Could not write the progression of {:?}: {error}", record.name),
        }
    }
    written
}
