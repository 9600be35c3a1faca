use std::{io, path::PathBuf};

/// Errors for vocabulary building, training, prediction and evaluation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Class labels of the classifier and of the supplied pool differ.
    #[error("class label mismatch: expected {expected:?}, found {found:?}")]
    Configuration {
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// A class has no training documents, its centroid is undefined.
    #[error("class `{0}` has no training documents")]
    DegenerateClass(String),
    /// A metric has a zero denominator for the class.
    #[error("{metric} is undefined for class `{class}`")]
    MetricUndefined {
        class: String,
        metric: &'static str,
    },
    /// A persisted vocabulary record could not be parsed.
    #[error("malformed vocabulary record {record}: {reason}")]
    MalformedRecord {
        record: u64,
        reason: String,
    },
    /// `predict` was called before `train`.
    #[error("classifier is not trained")]
    NotTrained,
    /// `train` was called twice.
    #[error("classifier is already trained")]
    AlreadyTrained,
    /// A model snapshot is internally inconsistent.
    #[error("invalid model snapshot: {0}")]
    Snapshot(String),
    /// Train/test split ratio outside `[0, 1]`.
    #[error("split ratio {0} is outside [0, 1]")]
    InvalidRatio(f64),
    /// A single document could not be read.
    #[error("failed to read document {}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Cbor(#[from] serde_cbor::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
