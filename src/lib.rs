//! This crate is a Rocchio (nearest-centroid) text classifier over tf-idf vectors.

pub mod classifier;
pub mod dataset;
pub mod error;
pub mod utils;
pub mod vectorizer;

/// Error type of the crate
/// Every fallible operation returns `rocchio_classifier::Result<T>`.
///
/// Training and evaluation errors are terminal for that operation: no partial
/// centroid or metric is ever returned.
pub use error::{Error, Result};

/// Rocchio Classifier
/// The top-level struct of this crate.
/// It learns one centroid per class from labeled training documents and
/// predicts the label of the nearest centroid for new documents.
///
/// Lifecycle:
/// - `Rocchio::new(labels, vocabulary)` creates an untrained classifier
/// - `train(&token_pool)` computes the centroids, exactly once
/// - `predict(&tokens)` / `predict_pool(&docs)` read the centroids only
///
/// `Rocchio<E>` has the following generic parameter:
/// - `E`: weighting engine for training vectors (e.g., `ClassFrequencyEngine`)
///
/// # Serialization
/// Supported (CBOR via `to_cbor_writer` / `save_model`).
///
/// # Deserialization
/// Supported through `RocchioData`, which validates the snapshot.
pub use classifier::{LabelPool, Rocchio, RocchioState};

/// Rocchio Data Structure for Deserialization
/// Snapshot of a classifier (labels, vocabulary, class term counts and
/// centroids). Convert it with `into_rocchio`.
pub use vectorizer::serde::RocchioData;

/// Vocabulary
/// Maps every training term to its vector coordinate and to its number of
/// occurrences in each class.
///
/// Built once from the training split with `build_vocabulary` or a
/// `VocabularyBuilder`; indices are assigned in first-seen order.
/// Never modified afterwards.
///
/// Can be persisted to CSV with `vectorizer::persist`.
pub use vectorizer::corpus::{
    build_vocabulary, ClassTermCounts, TermEntry, TokenPool, Vocabulary, VocabularyBuilder,
};

/// Vectorization
/// `vectorize` (or a `Vectorizer<E>`) turns tokens into a unit-length dense
/// vector over the vocabulary.
///
/// The `Context` makes the asymmetry explicit:
/// - `Context::Training(class)`: raw tf weighted by `ln(class terms / term's class count)`
/// - `Context::Prediction`: raw tf only
pub use vectorizer::{vectorize, Context, Vectorizer};

/// Weighting Engine Trait
/// Defines how a training document's term frequencies are weighted.
///
/// - `ClassFrequencyEngine`: class-frequency log weighting (default)
/// - `RawFrequencyEngine`: no weighting
pub use vectorizer::tfidf::{ClassFrequencyEngine, RawFrequencyEngine, WeightingEngine};

/// Token Frequency structure
/// Raw token counts of one document, in first-seen order.
pub use vectorizer::token::TokenFrequency;

/// Evaluation
/// `calculate_metrics` computes per-class confusion counts from
/// true-class -> predicted-labels pools; `ClassMetrics` derives precision,
/// recall, F1 and accuracy and `Evaluation::macro_f1` averages F1.
pub use classifier::evaluate::{calculate_metrics, ClassMetrics, ConfusionCounts, Evaluation};

/// Vocabulary persistence
/// CSV records `term,index,class:count,...`; malformed records are skipped.
pub use vectorizer::persist::{
    load_vocabulary, read_vocabulary, save_vocabulary, write_vocabulary, VocabularyLoad,
};
