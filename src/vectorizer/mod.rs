pub mod corpus;
pub mod persist;
pub mod serde;
pub mod tfidf;
pub mod token;

use crate::utils::vector::{DenseVecTrait, NORM_EPSILON};
use crate::vectorizer::{
    corpus::{ClassTermCounts, Vocabulary},
    tfidf::{ClassFrequencyEngine, WeightingEngine},
    token::TokenFrequency,
};

/// What is known about a document when it is vectorized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context<'a> {
    /// Training document with its true class
    /// in-class term frequencies are weighted by the engine
    Training(&'a str),
    /// Document whose class is unknown
    /// raw term frequencies, no weighting
    Prediction,
}

/// Turns token sequences into unit-length dense vectors over a vocabulary
///
/// `Vectorizer<E>` has the following generic parameter:
/// - `E`: weighting engine applied in `Context::Training` (default `ClassFrequencyEngine`)
#[derive(Debug, Clone, Copy)]
pub struct Vectorizer<'a, E = ClassFrequencyEngine>
where
    E: WeightingEngine,
{
    pub vocabulary: &'a Vocabulary,
    pub class_term_counts: &'a ClassTermCounts,
    _marker: std::marker::PhantomData<E>,
}

impl<'a, E> Vectorizer<'a, E>
where
    E: WeightingEngine,
{
    pub fn new(vocabulary: &'a Vocabulary, class_term_counts: &'a ClassTermCounts) -> Self {
        Self {
            vocabulary,
            class_term_counts,
            _marker: std::marker::PhantomData,
        }
    }

    /// Vector of length `vocabulary.dim()`, normalized by `||v|| + 1e-14`
    ///
    /// Tokens outside the vocabulary are ignored.
    /// Recomputed on every call.
    pub fn vectorize<T>(&self, tokens: &[T], context: Context<'_>) -> Vec<f64>
    where
        T: AsRef<str>,
    {
        let freq: TokenFrequency = tokens.iter().collect();
        self.vectorize_freq(&freq, context)
    }

    /// Same as `vectorize` for an already counted document
    pub fn vectorize_freq(&self, freq: &TokenFrequency, context: Context<'_>) -> Vec<f64> {
        let mut vec = vec![0.0_f64; self.vocabulary.dim()];
        let class_term_count = match context {
            Context::Training(class) => Some((class, self.class_term_counts.get(class))),
            Context::Prediction => None,
        };
        // distinct term ごとに1回だけ重みを掛ける
        for (token, count) in freq.iter() {
            let Some(entry) = self.vocabulary.get(token) else {
                continue;
            };
            let mut value = count as f64;
            if let Some((class, total)) = class_term_count {
                if let Some(weight) = E::class_weight(total, entry.class_count(class)) {
                    value *= weight;
                }
            }
            vec[entry.index] += value;
        }
        vec.normalize_with_epsilon(NORM_EPSILON);
        vec
    }
}

/// Vectorize with the default class-frequency engine
pub fn vectorize<T>(
    tokens: &[T],
    vocabulary: &Vocabulary,
    class_term_counts: &ClassTermCounts,
    context: Context<'_>,
) -> Vec<f64>
where
    T: AsRef<str>,
{
    Vectorizer::<ClassFrequencyEngine>::new(vocabulary, class_term_counts).vectorize(tokens, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::{corpus::VocabularyBuilder, tfidf::RawFrequencyEngine};

    /// A: ["cat","cat","dog"], B: ["fish"]
    fn fixture() -> (Vocabulary, ClassTermCounts) {
        let mut builder = VocabularyBuilder::new();
        builder.add_document("A", &["cat", "cat", "dog"]);
        builder.add_document("B", &["fish"]);
        let vocab = builder.finish();
        let counts = vocab.class_term_counts(&["A", "B"]);
        (vocab, counts)
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn prediction_is_normalized_raw_tf() {
        let (vocab, counts) = fixture();
        let v = vectorize(&["cat", "cat", "fish", "unknown"], &vocab, &counts, Context::Prediction);
        assert_eq!(v.len(), 3);
        let n = 5.0_f64.sqrt();
        assert_close(v[0], 2.0 / n);
        assert_close(v[1], 0.0);
        assert_close(v[2], 1.0 / n);
        assert_close(v.norm(), 1.0);
    }

    #[test]
    fn training_applies_class_log_weight() {
        let (vocab, counts) = fixture();
        let v = vectorize(&["cat", "cat", "dog"], &vocab, &counts, Context::Training("A"));
        // cat: 2 * ln(3/2), dog: 1 * ln(3/1)
        let cat = 2.0 * (3.0_f64 / 2.0).ln();
        let dog = 3.0_f64.ln();
        let n = (cat * cat + dog * dog).sqrt();
        assert_close(v[0], cat / n);
        assert_close(v[1], dog / n);
        assert_close(v[2], 0.0);
    }

    #[test]
    fn training_skips_terms_absent_from_class() {
        let (vocab, counts) = fixture();
        // cat never occurs in B so it stays raw, fish gets ln(1/1) = 0
        let v = vectorize(&["cat", "fish"], &vocab, &counts, Context::Training("B"));
        assert_close(v[0], 1.0);
        assert_close(v[2], 0.0);
    }

    #[test]
    fn zero_vector_stays_zero() {
        let (vocab, counts) = fixture();
        let v = vectorize(&["fish"], &vocab, &counts, Context::Training("B"));
        assert_eq!(v, vec![0.0; 3]);
        let empty: [&str; 0] = [];
        let v = vectorize(&empty, &vocab, &counts, Context::Prediction);
        assert_eq!(v, vec![0.0; 3]);
    }

    #[test]
    fn raw_engine_ignores_training_context() {
        let (vocab, counts) = fixture();
        let vectorizer = Vectorizer::<RawFrequencyEngine>::new(&vocab, &counts);
        let tokens = ["cat", "cat", "dog"];
        assert_eq!(
            vectorizer.vectorize(&tokens, Context::Training("A")),
            vectorizer.vectorize(&tokens, Context::Prediction)
        );
    }

    #[test]
    fn vectorize_is_pure() {
        let (vocab, counts) = fixture();
        let tokens = vec!["dog".to_string(), "cat".to_string()];
        let a = vectorize(&tokens, &vocab, &counts, Context::Training("A"));
        let b = vectorize(&tokens, &vocab, &counts, Context::Training("A"));
        assert_eq!(a, b);
    }
}
