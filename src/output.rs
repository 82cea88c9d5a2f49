use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::PathBuf,
};

use ahash::AHashSet;
use serde::Serialize;

use crate::{
    error::Result,
    ranking::{ScoredSequence, ScoringFailure},
};

const NRC_WIDTH: usize = 8;
const IDENTIFIER_WIDTH: usize = 100;

pub fn write_table(output: &mut impl Write, ranking: &[&ScoredSequence]) -> Result<()> {
    writeln!(output, "{:<NRC_WIDTH$}  Identifier", "NRC")?;
    writeln!(output, "{}  {}", "-".repeat(NRC_WIDTH), "-".repeat(10))?;
    for scored in ranking {
        let name: String = scored.name.chars().take(IDENTIFIER_WIDTH).collect();
        writeln!(output, "{:<NRC_WIDTH$.4}  {name}", scored.nrc)?;
    }
    Ok(())
}

pub fn write_csv(output: &mut impl Write, ranking: &[&ScoredSequence]) -> Result<()> {
    writeln!(output, "nrc,bits,identifier")?;
    for scored in ranking {
        writeln!(
            output,
            "{},{},{}",
            scored.nrc,
            scored.bits,
            csv_field(&scored.name)
        )?;
    }
    Ok(())
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[derive(Serialize)]
struct JsonReport<'scores> {
    ranking: &'scores [&'scores ScoredSequence],
    failures: Vec<JsonFailure<'scores>>,
}

#[derive(Serialize)]
struct JsonFailure<'scores> {
    name: &'scores str,
    error: String,
}

pub fn write_json(
    output: &mut impl Write,
    ranking: &[&ScoredSequence],
    failures: &[ScoringFailure],
) -> Result<()> {
    let report = JsonReport {
        ranking,
        failures: failures
            .iter()
            .map(|failure| JsonFailure {
                name: &failure.name,
                error: failure.error.to_string(),
            })
            .collect(),
    };
    serde_json::to_writer_pretty(&mut *output, &report)?;
    writeln!(output)?;
    Ok(())
}

/// Longest file stem produced by [`sanitise_file_name`], in bytes.
/// Leaves room for a uniqueness suffix and the extension within common 255 byte limits.
const MAX_STEM_LENGTH: usize = 200;

/// Replaces every character that is unsafe in a file name with `_` and cuts the result to [`MAX_STEM_LENGTH`].
pub fn sanitise_file_name(name: &str) -> String {
    let mut sanitised: String = name
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || matches!(character, '.' | '_' | '-') {
                character
            } else {
                '_'
            }
        })
        .collect();
    // Only ASCII remains, so any byte offset is a character boundary.
    sanitised.truncate(MAX_STEM_LENGTH);

    if sanitised.chars().all(|character| character == '.') {
        sanitised.replace('.', "_")
    } else {
        sanitised
    }
}

/// Writes progressions into one directory, one file per record.
///
/// Names that sanitise to the same stem get the suffixes `_2`, `_3`, ... in the order they are written.
pub struct ProgressionWriter {
    directory: PathBuf,
    used_stems: AHashSet<String>,
}

impl ProgressionWriter {
    /// Creates the directory if needed.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        Ok(Self {
            directory,
            used_stems: Default::default(),
        })
    }

    fn unique_stem(&mut self, name: &str) -> String {
        let stem = sanitise_file_name(name);
        if self.used_stems.insert(stem.clone()) {
            return stem;
        }

        let mut suffix = 2;
        loop {
            let candidate = format!("{stem}_{suffix}");
            if self.used_stems.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Writes one value per line to `<directory>/<unique stem>.txt`.
    pub fn write(&mut self, name: &str, values: impl IntoIterator<Item = f64>) -> Result<PathBuf> {
        let file_name = format!("{}.txt", self.unique_stem(name));
        let path = self.directory.join(file_name);
        let mut output = BufWriter::new(File::create(&path)?);
        for value in values {
            writeln!(output, "{value}")?;
        }
        output.flush()?;

        Ok(path)
    }
}
