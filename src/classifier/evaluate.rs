use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    classifier::LabelPool,
    error::{Error, Result},
};

/// Per-class confusion counts
///
/// Counting follows the label pool layout: the outer key is the true class.
/// For class `c`:
/// - `true_positive`: documents of `c` predicted as `c`
/// - `false_negative`: documents of `c` predicted as something else
/// - `false_positive`: documents of other classes predicted as `c`
/// - `true_negative`: documents of other classes predicted as something else
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positive: u64,
    pub false_negative: u64,
    pub false_positive: u64,
    pub true_negative: u64,
}

impl ConfusionCounts {
    #[inline]
    pub fn total(&self) -> u64 {
        self.true_positive + self.false_negative + self.false_positive + self.true_negative
    }
}

/// Confusion counts of one class and the metrics derived from them
///
/// Precision is taken over the documents predicted as the class and recall
/// over the documents truly in it. Tools that name the two false counts the
/// other way round report these two values swapped; F1 and accuracy agree.
///
/// Every metric fails with `Error::MetricUndefined` on a zero denominator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class: String,
    pub counts: ConfusionCounts,
}

impl ClassMetrics {
    /// tp / (tp + fp)
    pub fn precision(&self) -> Result<f64> {
        let c = &self.counts;
        self.ratio("precision", c.true_positive, c.true_positive + c.false_positive)
    }

    /// tp / (tp + fn)
    pub fn recall(&self) -> Result<f64> {
        let c = &self.counts;
        self.ratio("recall", c.true_positive, c.true_positive + c.false_negative)
    }

    /// 2PR / (P + R)
    pub fn f1(&self) -> Result<f64> {
        let p = self.precision()?;
        let r = self.recall()?;
        if p + r == 0.0 {
            return Err(self.undefined("F1"));
        }
        Ok(2.0 * p * r / (p + r))
    }

    /// (tp + tn) / total
    pub fn accuracy(&self) -> Result<f64> {
        let c = &self.counts;
        self.ratio("accuracy", c.true_positive + c.true_negative, c.total())
    }

    fn ratio(&self, metric: &'static str, num: u64, denom: u64) -> Result<f64> {
        if denom == 0 {
            return Err(self.undefined(metric));
        }
        Ok(num as f64 / denom as f64)
    }

    fn undefined(&self, metric: &'static str) -> Error {
        Error::MetricUndefined {
            class: self.class.clone(),
            metric,
        }
    }
}

/// Metrics of every class, in the order the classes were given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub classes: IndexMap<String, ClassMetrics>,
}

impl Evaluation {
    pub fn get(&self, class: &str) -> Option<&ClassMetrics> {
        self.classes.get(class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassMetrics> {
        self.classes.values()
    }

    /// Arithmetic mean of the per-class F1
    /// undefined as soon as one class's F1 is
    pub fn macro_f1(&self) -> Result<f64> {
        if self.classes.is_empty() {
            return Err(Error::MetricUndefined {
                class: String::new(),
                metric: "macro F1",
            });
        }
        let mut total = 0.0;
        for metrics in self.classes.values() {
            total += metrics.f1()?;
        }
        Ok(total / self.classes.len() as f64)
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show(v: Result<f64>) -> String {
            match v {
                Ok(v) => format!("{v:.4}"),
                Err(_) => "undefined".to_string(),
            }
        }
        for m in self.classes.values() {
            writeln!(f, "{}", m.class)?;
            writeln!(f, "    P = {}", show(m.precision()))?;
            writeln!(f, "    R = {}", show(m.recall()))?;
            writeln!(f, "    F1 = {}", show(m.f1()))?;
            writeln!(f, "    accuracy = {}", show(m.accuracy()))?;
        }
        write!(f, "macro-averaged F measure = {}", show(self.macro_f1()))
    }
}

/// Confusion counts for every class from true-class -> predictions pools
///
/// `label_pool` must hold exactly the given classes.
pub fn calculate_metrics<S>(classes: &[S], label_pool: &LabelPool) -> Result<Evaluation>
where
    S: AsRef<str>,
{
    let labels_match = label_pool.len() == classes.len()
        && classes.iter().all(|c| label_pool.contains_key(c.as_ref()));
    if !labels_match {
        let err = Error::Configuration {
            expected: classes.iter().map(|c| c.as_ref().to_string()).collect(),
            found: label_pool.keys().cloned().collect(),
        };
        error!("evaluation aborted: {err}");
        return Err(err);
    }

    let mut evaluation = IndexMap::with_capacity(classes.len());
    for class in classes {
        let class = class.as_ref();
        let mut counts = ConfusionCounts::default();
        for predicted in label_pool.get(class).into_iter().flatten() {
            if predicted == class {
                counts.true_positive += 1;
            } else {
                counts.false_negative += 1;
            }
        }
        for (other, predictions) in label_pool.iter() {
            if other == class {
                continue;
            }
            for predicted in predictions {
                if predicted == class {
                    counts.false_positive += 1;
                } else {
                    counts.true_negative += 1;
                }
            }
        }
        evaluation.insert(
            class.to_string(),
            ClassMetrics {
                class: class.to_string(),
                counts,
            },
        );
    }
    Ok(Evaluation {
        classes: evaluation,
    })
}
