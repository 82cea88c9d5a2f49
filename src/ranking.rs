use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    thread,
};

use indicatif::ProgressBar;
use log::{debug, info, warn};
use rayon::{prelude::*, ThreadPoolBuilder};
use serde::Serialize;

use crate::{
    context_model::ContextModel,
    database::{SequenceDatabase, SequenceRecord},
    error::{Error, Result},
};

#[derive(Debug, Clone, Serialize)]
pub struct ScoredSequence {
    pub name: String,
    pub bits: f64,
    pub nrc: f64,
}

#[derive(Debug)]
pub struct ScoringFailure {
    pub name: String,
    pub error: Error,
}

/// The outcome of scoring every record of a database, in database order.
#[derive(Debug, Default)]
pub struct BatchScores {
    scored: Vec<ScoredSequence>,
    failures: Vec<ScoringFailure>,
}

impl BatchScores {
    pub fn scored(&self) -> &[ScoredSequence] {
        &self.scored
    }

    pub fn failures(&self) -> &[ScoringFailure] {
        &self.failures
    }

    /// The `n` best scored sequences, lowest NRC first.
    /// Equal scores keep their database order.
    pub fn ranking(&self, n: usize) -> Vec<&ScoredSequence> {
        let mut ranking: Vec<_> = self.scored.iter().collect();
        ranking.sort_by(|a, b| a.nrc.total_cmp(&b.nrc));
        ranking.truncate(n);
        ranking
    }
}

/// Scores all records of `database` in parallel.
///
/// Records that cannot be scored are reported as failures and do not affect the others.
/// The worker count defaults to the available parallelism and never exceeds the number of records.
pub fn score_database(
    model: &ContextModel,
    database: &SequenceDatabase,
    threads: Option<usize>,
    show_progress: bool,
) -> Result<BatchScores> {
    score_records(database, threads, show_progress, |sequence| {
        model.nrc(sequence)
    })
}

/// Scores all records with `score`, which returns the bits and the NRC of a sequence.
fn score_records(
    database: &SequenceDatabase,
    threads: Option<usize>,
    show_progress: bool,
    score: impl Fn(&[u8]) -> Result<(f64, f64)> + Sync,
) -> Result<BatchScores> {
    let threads = threads
        .unwrap_or_else(|| thread::available_parallelism().map_or(1, usize::from))
        .min(database.len())
        .max(1);
    debug!("Scoring {} sequences with {threads} threads", database.len());

    let progress_bar = if show_progress {
        ProgressBar::new(database.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
    let outcomes: Vec<Result<ScoredSequence>> = pool.install(|| {
        database
            .records()
            .par_iter()
            .map(|record| {
                let outcome = score_record(&score, record);
                progress_bar.inc(1);
                outcome
            })
            .collect()
    });
    progress_bar.finish_and_clear();

    let mut result = BatchScores::default();
    for (record, outcome) in database.records().iter().zip(outcomes) {
        match outcome {
            Ok(scored) => result.scored.push(scored),
            Err(error) => {
                warn!("Could not score {:?}: {error}", record.name);
                result.failures.push(ScoringFailure {
                    name: record.name.clone(),
                    error,
                });
            }
        }
    }

    info!(
        "Scored {} sequences, {} failed",
        result.scored.len(),
        result.failures.len()
    );
    Ok(result)
}

fn score_record(
    score: &impl Fn(&[u8]) -> Result<(f64, f64)>,
    record: &SequenceRecord,
) -> Result<ScoredSequence> {
    let (bits, nrc) = panic::catch_unwind(AssertUnwindSafe(|| score(&record.sequence)))
        .map_err(|payload| Error::WorkerPanicked(panic_message(payload)))??;

    Ok(ScoredSequence {
        name: record.name.clone(),
        bits,
        nrc,
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{panic_message, score_database, score_records};
    use crate::{
        context_model::{ContextModel, ModelParameters},
        database::SequenceDatabase,
        error::Error,
    };

    fn model() -> ContextModel {
        ContextModel::train(
            b"ACGTACGTACGTACGGATTACAGATTACA",
            ModelParameters::new(2, 1.0).unwrap(),
        )
        .unwrap()
    }

    fn database(records: &[(&str, &str)]) -> SequenceDatabase {
        let mut database = SequenceDatabase::new();
        for (name, sequence) in records {
            database
                .insert(name.to_string(), sequence.as_bytes().to_vec())
                .unwrap();
        }
        database
    }

    #[test]
    fn test_ranking_ascending() {
        let model = model();
        let database = database(&[
            ("random", "TTGCCTGGCTTCGGCT"),
            ("match", "ACGTACGTACGT"),
            ("partial", "GATTACATTTGGCC"),
        ]);
        let scores = score_database(&model, &database, None, false).unwrap();
        assert!(scores.failures().is_empty());
        assert_eq!(scores.scored().len(), 3);

        let ranking = scores.ranking(10);
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0].name, "match");
        assert!(ranking.windows(2).all(|pair| pair[0].nrc <= pair[1].nrc));

        let top = scores.ranking(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "match");

        assert!(scores.ranking(0).is_empty());
    }

    #[test]
    fn test_ties_keep_database_order() {
        let model = model();
        let names: Vec<String> = (0..50).map(|index| format!("copy {index}")).collect();
        let mut database = SequenceDatabase::new();
        for name in &names {
            database.insert(name.clone(), b"GATTACA".to_vec()).unwrap();
        }

        for threads in [None, Some(1), Some(8)] {
            let scores = score_database(&model, &database, threads, false).unwrap();
            let ranked: Vec<&str> = scores
                .ranking(names.len())
                .iter()
                .map(|scored| scored.name.as_str())
                .collect();
            assert_eq!(ranked, names);
        }
    }

    #[test]
    fn test_failures_are_isolated() {
        let model = model();
        let database = database(&[
            ("short", "A"),
            ("good", "ACGTAC"),
            ("single symbol", "AAAAAAAA"),
            ("exact width", "GA"),
        ]);
        let scores = score_database(&model, &database, Some(4), false).unwrap();

        let scored: Vec<&str> = scores
            .scored()
            .iter()
            .map(|scored| scored.name.as_str())
            .collect();
        assert_eq!(scored, ["good", "exact width"]);
        assert_eq!(scores.ranking(10)[0].name, "exact width");
        assert_eq!(scores.ranking(10)[0].nrc, 0.0);

        let failures = scores.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].name, "short");
        assert!(matches!(
            failures[0].error,
            Error::SequenceShorterThanContext { .. }
        ));
        assert_eq!(failures[1].name, "single symbol");
        assert!(matches!(
            failures[1].error,
            Error::DegenerateNormalization { .. }
        ));
    }

    #[test]
    fn test_empty_database() {
        let model = model();
        let scores = score_database(&model, &SequenceDatabase::new(), None, false).unwrap();
        assert!(scores.scored().is_empty());
        assert!(scores.ranking(5).is_empty());
    }

    #[test]
    fn test_panicking_record_is_isolated() {
        let model = model();
        let database = database(&[
            ("before", "ACGTACGT"),
            ("explodes", "GATTACA"),
            ("after", "TTGCCTGG"),
        ]);
        let scores = score_records(&database, Some(3), true, |sequence| {
            if sequence == b"GATTACA" {
                panic!("cannot score {}", String::from_utf8_lossy(sequence));
            }
            model.nrc(sequence)
        })
        .unwrap();

        let scored: Vec<&str> = scores
            .scored()
            .iter()
            .map(|scored| scored.name.as_str())
            .collect();
        assert_eq!(scored, ["before", "after"]);
        assert_eq!(
            scores.scored()[0].nrc,
            model.nrc(b"ACGTACGT").unwrap().1
        );

        let failures = scores.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "explodes");
        assert!(matches!(
            &failures[0].error,
            Error::WorkerPanicked(message) if message == "cannot score GATTACA"
        ));
        assert!(scores.ranking(10).iter().all(|scored| scored.name != "explodes"));
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new("owned".to_string())), "owned");
        assert_eq!(panic_message(Box::new(17)), "unknown panic");
    }
}
