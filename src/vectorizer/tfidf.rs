/// Class-frequency weighting engine
///
/// Plugged into `Vectorizer<E>` / `Rocchio<E>` to decide how a training
/// document's raw term frequency is scaled.
/// Prediction-side vectors are never weighted, whatever the engine.
pub trait WeightingEngine {
    /// 学習文書中のtermに掛ける重み
    /// # Arguments
    /// * `class_term_count` - 文書のクラスの総term出現数
    /// * `term_class_count` - そのtermのクラス内出現数
    /// # Returns
    /// * `Some(weight)` - raw tf に掛ける値
    /// * `None` - 重み付けしない (raw tf のまま)
    fn class_weight(class_term_count: u64, term_class_count: u64) -> Option<f64>;
}

/// デフォルトのエンジン
/// `ln(class_term_count / term_class_count)`
///
/// A term that never occurs in the class is left unweighted rather than
/// given an infinite weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassFrequencyEngine;

impl WeightingEngine for ClassFrequencyEngine {
    #[inline]
    fn class_weight(class_term_count: u64, term_class_count: u64) -> Option<f64> {
        if term_class_count == 0 {
            return None;
        }
        Some((class_term_count as f64 / term_class_count as f64).ln())
    }
}

/// 重み付けなし
/// centroids are averages of plain normalized term frequencies
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFrequencyEngine;

impl WeightingEngine for RawFrequencyEngine {
    #[inline]
    fn class_weight(_class_term_count: u64, _term_class_count: u64) -> Option<f64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_frequency_uses_natural_log() {
        let w = ClassFrequencyEngine::class_weight(10, 2).unwrap();
        assert!((w - 5.0_f64.ln()).abs() < 1e-12);
        // term that makes up the whole class gets weight 0
        assert_eq!(ClassFrequencyEngine::class_weight(7, 7), Some(0.0));
    }

    #[test]
    fn zero_class_count_is_skipped() {
        assert_eq!(ClassFrequencyEngine::class_weight(10, 0), None);
        assert_eq!(ClassFrequencyEngine::class_weight(0, 0), None);
    }

    #[test]
    fn raw_engine_never_weights() {
        assert_eq!(RawFrequencyEngine::class_weight(10, 2), None);
    }
}
