use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("JSON serialisation error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not build the scoring thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("the context width must be at least 1")]
    ContextWidthZero,

    #[error("the given alpha {0} is not a finite non-negative number")]
    InvalidAlpha(f64),

    #[error("the reference contains no symbols")]
    EmptyAlphabet,

    #[error("the sequence of length {length} is shorter than the context width {context_width}")]
    SequenceShorterThanContext {
        length: usize,
        context_width: usize,
    },

    #[error("the sequence contains {distinct_symbols} distinct symbol(s), so its NRC is undefined")]
    DegenerateNormalization { distinct_symbols: usize },

    #[error("the probability at position {position} is zero or undefined (alpha = 0?)")]
    UndefinedProbability { position: usize },

    #[error("scoring panicked: {0}")]
    WorkerPanicked(String),

    #[error("the database contains the sequence name {0:?} twice")]
    DuplicateSequenceName(String),

    #[error("the database contains a record without a name")]
    EmptySequenceName,

    #[error("no sequence named {0:?} in the database")]
    SequenceNotFound(String),
}
