use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Training documents grouped by class label
/// Each document is its token sequence
pub type TokenPool = IndexMap<String, Vec<Vec<String>>>;

/// Vocabulary entry of one term
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TermEntry {
    /// coordinate of the term in every document vector
    pub index: usize,
    /// class label -> occurrences of the term across that class's documents
    /// classes without occurrence are absent
    pub class_counts: IndexMap<String, u64>,
}

impl TermEntry {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            class_counts: IndexMap::new(),
        }
    }

    /// Occurrences of the term in `class` (0 when absent)
    #[inline]
    pub fn class_count(&self, class: &str) -> u64 {
        self.class_counts.get(class).copied().unwrap_or(0)
    }
}

/// term -> (index, per-class counts)
///
/// Immutable once built; prediction never adds terms.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vocabulary {
    terms: IndexMap<Box<str>, TermEntry>,
    /// vector dimension
    /// `max(index) + 1`, equal to `len()` unless loaded records were skipped
    pub(crate) dim: usize,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of terms
    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Length of every document vector built over this vocabulary
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn get(&self, term: &str) -> Option<&TermEntry> {
        self.terms.get(term)
    }

    #[inline]
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.get(term).map(|entry| entry.index)
    }

    #[inline]
    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// (term, entry) in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TermEntry)> {
        self.terms.iter().map(|(term, entry)| (term.as_ref(), entry))
    }

    /// Insert a fully formed entry
    /// used when loading a persisted vocabulary, callers check index uniqueness
    pub(crate) fn insert_entry(&mut self, term: &str, entry: TermEntry) {
        self.dim = self.dim.max(entry.index.saturating_add(1));
        self.terms.insert(term.into(), entry);
    }

    /// Every index must be unique and `dim` must be `max(index) + 1`
    /// (0 for an empty vocabulary)
    pub(crate) fn check_indices(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::with_capacity(self.terms.len());
        let mut expected_dim = 0usize;
        for (term, entry) in self.iter() {
            if entry.index >= self.dim {
                return Err(format!(
                    "index {} of `{term}` is outside dimension {}",
                    entry.index, self.dim
                ));
            }
            if !seen.insert(entry.index) {
                return Err(format!("index {} of `{term}` is used twice", entry.index));
            }
            expected_dim = expected_dim.max(entry.index + 1);
        }
        if expected_dim != self.dim {
            return Err(format!(
                "dimension {} does not match the largest index (expected {expected_dim})",
                self.dim
            ));
        }
        Ok(())
    }

    /// Total term occurrences per class
    pub fn class_term_counts<S>(&self, classes: &[S]) -> ClassTermCounts
    where
        S: AsRef<str>,
    {
        ClassTermCounts::from_vocabulary(self, classes)
    }
}

/// Builds a `Vocabulary`, owning the running index counter
///
/// Indices are assigned first-seen-wins in the order tokens are added.
#[derive(Debug, Default)]
pub struct VocabularyBuilder {
    terms: IndexMap<Box<str>, TermEntry>,
    next_index: usize,
}

impl VocabularyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `token` in `class`
    #[inline]
    pub fn add_token(&mut self, class: &str, token: &str) -> &mut Self {
        if !self.terms.contains_key(token) {
            self.terms.insert(token.into(), TermEntry::new(self.next_index));
            self.next_index += 1;
        }
        if let Some(entry) = self.terms.get_mut(token) {
            match entry.class_counts.get_mut(class) {
                Some(count) => *count += 1,
                None => {
                    entry.class_counts.insert(class.to_string(), 1);
                }
            }
        }
        self
    }

    /// Count every token of one document of `class`
    pub fn add_document<T>(&mut self, class: &str, tokens: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for token in tokens {
            self.add_token(class, token.as_ref());
        }
        self
    }

    pub fn finish(self) -> Vocabulary {
        Vocabulary {
            dim: self.next_index,
            terms: self.terms,
        }
    }
}

/// Build the vocabulary from the training pool
///
/// Classes are visited in `classes` order, documents in pool order.
/// A class missing from the pool contributes nothing.
pub fn build_vocabulary<S>(classes: &[S], token_pool: &TokenPool) -> Vocabulary
where
    S: AsRef<str>,
{
    let mut builder = VocabularyBuilder::new();
    let mut doc_num = 0usize;
    for class in classes {
        let class = class.as_ref();
        let Some(docs) = token_pool.get(class) else {
            continue;
        };
        for doc in docs {
            builder.add_document(class, doc);
        }
        doc_num += docs.len();
    }
    let vocabulary = builder.finish();
    debug!(
        terms = vocabulary.len(),
        classes = classes.len(),
        documents = doc_num,
        "vocabulary built"
    );
    vocabulary
}

/// Total number of term occurrences attributed to each class
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassTermCounts {
    counts: IndexMap<String, u64>,
}

impl ClassTermCounts {
    pub fn from_vocabulary<S>(vocabulary: &Vocabulary, classes: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        let mut counts: IndexMap<String, u64> = classes
            .iter()
            .map(|class| (class.as_ref().to_string(), 0))
            .collect();
        for (_, entry) in vocabulary.iter() {
            for (class, total) in counts.iter_mut() {
                *total += entry.class_count(class);
            }
        }
        Self { counts }
    }

    /// Occurrences attributed to `class` (0 for unknown classes)
    #[inline]
    pub fn get(&self, class: &str) -> u64 {
        self.counts.get(class).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(class, &count)| (class.as_str(), count))
    }
}
