pub mod evaluate;

use std::{marker::PhantomData, time::Instant};

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, error, info};

use crate::{
    error::{Error, Result},
    utils::vector::DenseVecTrait,
    vectorizer::{
        corpus::{ClassTermCounts, TokenPool, Vocabulary},
        tfidf::{ClassFrequencyEngine, WeightingEngine},
        Context, Vectorizer,
    },
};

/// True class label -> predicted labels of that class's documents
pub type LabelPool = IndexMap<String, Vec<String>>;

/// Lifecycle of a `Rocchio` classifier
/// There is no transition back to `Untrained`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RocchioState {
    Untrained,
    Trained,
}

/// Rocchio (nearest-centroid) classifier
///
/// Training averages the normalized, class-weighted vectors of each class's
/// documents into one centroid per class. Centroids are not renormalized.
/// Prediction vectorizes the document without class information and returns
/// the label of the closest centroid (euclidean distance); ties go to the
/// label listed first.
///
/// `Rocchio<E>` has the following generic parameter:
/// - `E`: weighting engine used for training vectors (default `ClassFrequencyEngine`)
#[derive(Debug, Clone)]
pub struct Rocchio<E = ClassFrequencyEngine>
where
    E: WeightingEngine + Send + Sync,
{
    /// canonical label order, also the tie-break order
    pub(crate) class_labels: Vec<String>,
    pub(crate) vocabulary: Vocabulary,
    pub(crate) class_term_counts: ClassTermCounts,
    /// one centroid per label, `None` until trained
    pub(crate) centroids: Option<Vec<Vec<f64>>>,
    pub(crate) _marker: PhantomData<E>,
}

impl<E> Rocchio<E>
where
    E: WeightingEngine + Send + Sync,
{
    /// Create an untrained classifier
    /// Duplicate labels are kept once, at their first position.
    pub fn new<S>(class_labels: &[S], vocabulary: Vocabulary) -> Self
    where
        S: AsRef<str>,
    {
        let mut labels: Vec<String> = Vec::with_capacity(class_labels.len());
        for label in class_labels {
            let label = label.as_ref();
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
        Self {
            class_labels: labels,
            vocabulary,
            class_term_counts: ClassTermCounts::default(),
            centroids: None,
            _marker: PhantomData,
        }
    }

    pub fn state(&self) -> RocchioState {
        if self.centroids.is_some() {
            RocchioState::Trained
        } else {
            RocchioState::Untrained
        }
    }

    #[inline]
    pub fn is_trained(&self) -> bool {
        self.centroids.is_some()
    }

    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Empty until trained
    pub fn class_term_counts(&self) -> &ClassTermCounts {
        &self.class_term_counts
    }

    /// (label, centroid) in canonical order
    pub fn centroids(&self) -> Option<Vec<(&str, &[f64])>> {
        let centroids = self.centroids.as_ref()?;
        Some(
            self.class_labels
                .iter()
                .zip(centroids.iter())
                .map(|(label, c)| (label.as_str(), c.as_slice()))
                .collect(),
        )
    }

    /// Distance of every centroid to the first one
    pub fn centroid_distances(&self) -> Result<Vec<(&str, f64)>> {
        let centroids = self.centroids.as_ref().ok_or(Error::NotTrained)?;
        let Some(first) = centroids.first() else {
            return Ok(Vec::new());
        };
        Ok(self
            .class_labels
            .iter()
            .zip(centroids.iter())
            .map(|(label, c)| (label.as_str(), c.euclidean_distance(first)))
            .collect())
    }

    /// Learn one centroid per class
    ///
    /// The pool must hold exactly the classifier's labels and every class
    /// needs at least one document. On error nothing is stored.
    pub fn train(&mut self, token_pool: &TokenPool) -> Result<()> {
        if self.is_trained() {
            return Err(Error::AlreadyTrained);
        }
        let labels_match = !self.class_labels.is_empty()
            && token_pool.len() == self.class_labels.len()
            && self.class_labels.iter().all(|l| token_pool.contains_key(l));
        if !labels_match {
            let err = Error::Configuration {
                expected: self.class_labels.clone(),
                found: token_pool.keys().cloned().collect(),
            };
            error!("training aborted: {err}");
            return Err(err);
        }

        let start = Instant::now();
        let class_term_counts = ClassTermCounts::from_vocabulary(&self.vocabulary, &self.class_labels);
        let vectorizer = Vectorizer::<E>::new(&self.vocabulary, &class_term_counts);
        let dim = self.vocabulary.dim();

        let mut centroids = Vec::with_capacity(self.class_labels.len());
        for label in &self.class_labels {
            let docs = token_pool.get(label.as_str()).map(Vec::as_slice).unwrap_or_default();
            if docs.is_empty() {
                let err = Error::DegenerateClass(label.clone());
                error!("training aborted: {err}");
                return Err(err);
            }
            let mut centroid = vec![0.0_f64; dim];
            for doc in docs {
                centroid.add_vec(&vectorizer.vectorize(doc, Context::Training(label)));
            }
            centroid.scale(1.0 / docs.len() as f64);
            debug!(class = %label, documents = docs.len(), terms = class_term_counts.get(label), "centroid computed");
            centroids.push(centroid);
        }

        self.class_term_counts = class_term_counts;
        self.centroids = Some(centroids);
        info!(
            classes = self.class_labels.len(),
            dim,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "rocchio trained"
        );
        Ok(())
    }

    /// Label of the centroid closest to the document
    pub fn predict<T>(&self, tokens: &[T]) -> Result<&str>
    where
        T: AsRef<str>,
    {
        let centroids = self.centroids.as_ref().ok_or(Error::NotTrained)?;
        let doc_vec = self.vectorizer().vectorize(tokens, Context::Prediction);

        let mut best = 0usize;
        let mut best_dist = f64::INFINITY;
        for (i, centroid) in centroids.iter().enumerate() {
            let dist = doc_vec.euclidean_distance(centroid);
            // strict: the first label wins ties
            if dist < best_dist {
                best = i;
                best_dist = dist;
            }
        }
        Ok(self.class_labels[best].as_str())
    }

    /// Predict every document of the collection
    /// keys and document order are preserved, documents are predicted in parallel
    pub fn predict_pool(&self, doc_collection: &TokenPool) -> Result<LabelPool> {
        if !self.is_trained() {
            return Err(Error::NotTrained);
        }
        let start = Instant::now();
        let mut label_pool = LabelPool::with_capacity(doc_collection.len());
        let mut doc_num = 0usize;
        for (class, docs) in doc_collection {
            let labels = docs
                .par_iter()
                .map(|doc| self.predict(doc).map(str::to_string))
                .collect::<Result<Vec<_>>>()?;
            doc_num += labels.len();
            label_pool.insert(class.clone(), labels);
        }
        info!(
            documents = doc_num,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "pool predicted"
        );
        Ok(label_pool)
    }

    fn vectorizer(&self) -> Vectorizer<'_, E> {
        Vectorizer::new(&self.vocabulary, &self.class_term_counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::{corpus::build_vocabulary, tfidf::RawFrequencyEngine};

    fn pool(entries: &[(&str, &[&[&str]])]) -> TokenPool {
        entries
            .iter()
            .map(|(class, docs)| {
                let docs = docs
                    .iter()
                    .map(|doc| doc.iter().map(|t| t.to_string()).collect())
                    .collect();
                (class.to_string(), docs)
            })
            .collect()
    }

    fn trained(entries: &[(&str, &[&[&str]])]) -> Rocchio {
        let pool = pool(entries);
        let classes: Vec<&str> = entries.iter().map(|(c, _)| *c).collect();
        let vocab = build_vocabulary(&classes, &pool);
        let mut rocchio = Rocchio::new(&classes, vocab);
        rocchio.train(&pool).unwrap();
        rocchio
    }

    #[test]
    fn predicts_closest_centroid() {
        let rocchio = trained(&[("A", &[&["cat", "cat", "dog"]]), ("B", &[&["fish"]])]);
        assert_eq!(rocchio.predict(&["cat", "cat"]).unwrap(), "A");
    }

    #[test]
    fn centroids_are_means_and_not_renormalized() {
        let rocchio = trained(&[
            ("A", &[&["cat"], &["dog"]]),
            ("B", &[&["fish", "bird"]]),
        ]);
        let centroids = rocchio.centroids().unwrap();
        assert_eq!(centroids.len(), 2);
        let (label, a) = centroids[0];
        assert_eq!(label, "A");
        // cat and dog each normalize to a unit axis, the mean is half of each
        assert!((a[0] - 0.5).abs() < 1e-9);
        assert!((a[1] - 0.5).abs() < 1e-9);
        assert!((a.norm() - 0.5_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn empty_class_is_degenerate() {
        let pool = pool(&[("A", &[&["cat"]]), ("B", &[])]);
        let vocab = build_vocabulary(&["A", "B"], &pool);
        let mut rocchio: Rocchio = Rocchio::new(&["A", "B"], vocab);
        let err = rocchio.train(&pool).unwrap_err();
        assert!(matches!(err, Error::DegenerateClass(ref c) if c == "B"));
        assert!(!rocchio.is_trained());
        assert!(rocchio.centroids().is_none());
    }

    #[test]
    fn label_mismatch_is_configuration_error() {
        let pool = pool(&[("A", &[&["cat"]]), ("C", &[&["fish"]])]);
        let vocab = build_vocabulary(&["A", "C"], &pool);
        let mut rocchio: Rocchio = Rocchio::new(&["A", "B"], vocab);
        assert!(matches!(rocchio.train(&pool), Err(Error::Configuration { .. })));
        assert_eq!(rocchio.state(), RocchioState::Untrained);

        let mut empty: Rocchio = Rocchio::new::<&str>(&[], Vocabulary::new());
        assert!(matches!(empty.train(&TokenPool::new()), Err(Error::Configuration { .. })));
    }

    #[test]
    fn state_machine_guards() {
        let pool = pool(&[("A", &[&["cat"]]), ("B", &[&["fish"]])]);
        let vocab = build_vocabulary(&["A", "B"], &pool);
        let mut rocchio: Rocchio = Rocchio::new(&["A", "B"], vocab);
        assert!(matches!(rocchio.predict(&["cat"]), Err(Error::NotTrained)));
        assert!(matches!(rocchio.predict_pool(&pool), Err(Error::NotTrained)));
        assert!(matches!(rocchio.centroid_distances(), Err(Error::NotTrained)));
        rocchio.train(&pool).unwrap();
        assert_eq!(rocchio.state(), RocchioState::Trained);
        assert!(matches!(rocchio.train(&pool), Err(Error::AlreadyTrained)));
    }

    #[test]
    fn ties_go_to_first_label() {
        // both centroids are the zero vector: ln(1/1) = 0 everywhere
        let rocchio = trained(&[("B", &[&["fish"]]), ("A", &[&["cat"]])]);
        assert_eq!(rocchio.predict(&["cat"]).unwrap(), "B");
        assert_eq!(rocchio.predict(&["unknown"]).unwrap(), "B");
    }

    #[test]
    fn predict_pool_preserves_order() {
        let rocchio = trained(&[
            ("A", &[&["cat", "cat", "dog"], &["cat", "mouse"]]),
            ("B", &[&["fish", "water"], &["fish", "shark"]]),
        ]);
        let docs = pool(&[
            ("B", &[&["fish"], &["cat", "mouse"], &["water"]]),
            ("A", &[&["dog", "cat"]]),
        ]);
        let labels = rocchio.predict_pool(&docs).unwrap();
        assert_eq!(labels.keys().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(labels["B"], vec!["B", "A", "B"]);
        assert_eq!(labels["A"], vec!["A"]);
    }

    #[test]
    fn centroid_distances_start_at_zero() {
        let rocchio = trained(&[("A", &[&["cat", "dog"]]), ("B", &[&["fish", "dog"]])]);
        let distances = rocchio.centroid_distances().unwrap();
        assert_eq!(distances[0], ("A", 0.0));
        assert!(distances[1].1 > 0.0);
    }

    #[test]
    fn raw_engine_trains_plain_tf_centroids() {
        let pool = pool(&[("A", &[&["cat", "cat", "dog"]]), ("B", &[&["fish"]])]);
        let vocab = build_vocabulary(&["A", "B"], &pool);
        let mut rocchio: Rocchio<RawFrequencyEngine> = Rocchio::new(&["A", "B"], vocab);
        rocchio.train(&pool).unwrap();
        let centroids = rocchio.centroids().unwrap();
        // fish is not weighted away under the raw engine
        assert!((centroids[1].1[2] - 1.0).abs() < 1e-9);
        assert_eq!(rocchio.predict(&["fish"]).unwrap(), "B");
    }
}
