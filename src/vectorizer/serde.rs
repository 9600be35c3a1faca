use std::{collections::HashSet, fs::File, io, marker::PhantomData, path::Path};

use serde::{ser::SerializeStruct, Deserialize, Serialize};
use tracing::info;

use crate::{
    classifier::Rocchio,
    error::{Error, Result},
    vectorizer::{
        corpus::{ClassTermCounts, Vocabulary},
        tfidf::WeightingEngine,
    },
};

/// Rocchioのデシリアライズ用のデータ構造
/// `into_rocchio`メソッドで`Rocchio`に変換できます
/// 変換時に centroid の数と長さを検証します
#[derive(Debug, Clone, Deserialize)]
pub struct RocchioData {
    pub class_labels: Vec<String>,
    pub vocabulary: Vocabulary,
    pub class_term_counts: ClassTermCounts,
    /// `None` for an untrained classifier
    pub centroids: Option<Vec<Vec<f64>>>,
}

impl RocchioData {
    /// Validate and convert into a classifier
    pub fn into_rocchio<E>(self) -> Result<Rocchio<E>>
    where
        E: WeightingEngine + Send + Sync,
    {
        self.vocabulary.check_indices().map_err(Error::Snapshot)?;
        if let Some(centroids) = &self.centroids {
            if self.class_labels.is_empty() {
                return Err(Error::Snapshot("trained model without class labels".into()));
            }
            if centroids.len() != self.class_labels.len() {
                return Err(Error::Snapshot(format!(
                    "{} centroids for {} class labels",
                    centroids.len(),
                    self.class_labels.len()
                )));
            }
            let dim = self.vocabulary.dim();
            if let Some((label, c)) = self
                .class_labels
                .iter()
                .zip(centroids.iter())
                .find(|(_, c)| c.len() != dim)
            {
                return Err(Error::Snapshot(format!(
                    "centroid of `{label}` has length {}, vocabulary dimension is {dim}",
                    c.len()
                )));
            }
        }
        let unique: HashSet<&str> = self.class_labels.iter().map(String::as_str).collect();
        if unique.len() != self.class_labels.len() {
            return Err(Error::Snapshot("duplicate class labels".into()));
        }
        Ok(Rocchio {
            class_labels: self.class_labels,
            vocabulary: self.vocabulary,
            class_term_counts: self.class_term_counts,
            centroids: self.centroids,
            _marker: PhantomData,
        })
    }
}

impl<E> Serialize for Rocchio<E>
where
    E: WeightingEngine + Send + Sync,
{
    /// Rocchioをシリアライズします
    /// デシリアライズするには`RocchioData`を使用してください
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Rocchio", 4)?;
        state.serialize_field("class_labels", &self.class_labels)?;
        state.serialize_field("vocabulary", &self.vocabulary)?;
        state.serialize_field("class_term_counts", &self.class_term_counts)?;
        state.serialize_field("centroids", &self.centroids)?;
        state.end()
    }
}

impl<E> Rocchio<E>
where
    E: WeightingEngine + Send + Sync,
{
    /// CBOR snapshot of the classifier
    pub fn to_cbor_writer<W>(&self, writer: W) -> Result<()>
    where
        W: io::Write,
    {
        serde_cbor::to_writer(writer, self)?;
        Ok(())
    }

    pub fn from_cbor_reader<R>(reader: R) -> Result<Self>
    where
        R: io::Read,
    {
        let data: RocchioData = serde_cbor::from_reader(reader)?;
        data.into_rocchio()
    }

    pub fn save_model<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        self.to_cbor_writer(io::BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), trained = self.is_trained(), "model saved");
        Ok(())
    }

    pub fn load_model<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let model = Self::from_cbor_reader(io::BufReader::new(File::open(path)?))?;
        info!(path = %path.display(), classes = model.class_labels.len(), "model loaded");
        Ok(model)
    }
}
