use num::Float;

/// 正規化の分母に足す微小値
/// ゼロベクトルはそのままゼロベクトルになる
pub const NORM_EPSILON: f64 = 1e-14;

/// Dense vector operations
///
/// Implemented for `[N]`, so `Vec<N>` gets them through deref.
pub trait DenseVecTrait<N>
where
    N: Float,
{
    /// ユークリッドノルム
    /// ||a|| = sqrt(Σ(a_i^2))
    fn norm(&self) -> N;
    /// `a_i / (||a|| + eps)`
    fn normalize_with_epsilon(&mut self, eps: N);
    /// ユークリッド距離
    /// d(a, b) = sqrt(Σ((a_i - b_i)^2))
    fn euclidean_distance(&self, other: &Self) -> N;
    /// a_i += b_i
    fn add_vec(&mut self, other: &Self);
    /// a_i *= s
    fn scale(&mut self, s: N);
}

impl<N> DenseVecTrait<N> for [N]
where
    N: Float,
{
    #[inline]
    fn norm(&self) -> N {
        self.iter()
            .fold(N::zero(), |acc, &v| acc + v * v)
            .sqrt()
    }

    #[inline]
    fn normalize_with_epsilon(&mut self, eps: N) {
        let denom = self.norm() + eps;
        for v in self.iter_mut() {
            *v = *v / denom;
        }
    }

    #[inline]
    fn euclidean_distance(&self, other: &Self) -> N {
        debug_assert_eq!(
            self.len(),
            other.len(),
            "Vectors must be of the same length to compute euclidean distance."
        );
        self.iter()
            .zip(other.iter())
            .fold(N::zero(), |acc, (&a, &b)| {
                let diff = a - b;
                acc + diff * diff
            })
            .sqrt()
    }

    #[inline]
    fn add_vec(&mut self, other: &Self) {
        debug_assert_eq!(
            self.len(),
            other.len(),
            "Vectors must be of the same length to add."
        );
        for (a, &b) in self.iter_mut().zip(other.iter()) {
            *a = *a + b;
        }
    }

    #[inline]
    fn scale(&mut self, s: N) {
        for v in self.iter_mut() {
            *v = *v * s;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norm_of_three_four_is_five() {
        let v = vec![3.0_f64, 4.0];
        assert!((v.norm() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_keeps_zero_vector() {
        let mut v = vec![0.0_f64; 4];
        v.normalize_with_epsilon(NORM_EPSILON);
        assert_eq!(v, vec![0.0; 4]);
    }

    #[test]
    fn normalize_gives_unit_length() {
        let mut v = vec![1.0_f32, 2.0, 2.0];
        v.normalize_with_epsilon(NORM_EPSILON as f32);
        assert!((v.norm() - 1.0).abs() < 1e-6);
        assert!((v[0] - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn distance_add_and_scale() {
        let mut a = vec![1.0_f64, 0.0];
        let b = vec![0.0_f64, 1.0];
        assert!((a.euclidean_distance(&b) - 2.0_f64.sqrt()).abs() < 1e-12);
        a.add_vec(&b);
        assert_eq!(a, vec![1.0, 1.0]);
        a.scale(0.5);
        assert_eq!(a, vec![0.5, 0.5]);
        assert_eq!(a.euclidean_distance(&a), 0.0);
    }
}
