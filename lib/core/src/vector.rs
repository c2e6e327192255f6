use serde::{Deserialize, Serialize};

/// An ordered feature vector.
///
/// Column meaning comes from the schema that produced it; the vector itself
/// only guarantees order and length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct FeatureVector {
    data: Vec<f64>,
}

impl FeatureVector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// All-zero vector of the given dimension
    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self { data: vec![0.0; dim] }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.data.get(index).copied()
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }

    /// Dot product; 0.0 when dimensions differ
    #[inline]
    pub fn dot(&self, other: &FeatureVector) -> f64 {
        if self.dim() != other.dim() {
            return 0.0;
        }
        dot_product(&self.data, &other.data)
    }

    /// Euclidean norm
    #[inline]
    pub fn norm(&self) -> f64 {
        dot_product(&self.data, &self.data).sqrt()
    }

    /// Cosine similarity with another vector.
    ///
    /// Zero vectors and dimension mismatches score 0.0, never NaN.
    #[inline]
    pub fn cosine_similarity(&self, other: &FeatureVector) -> f64 {
        if self.dim() != other.dim() {
            return 0.0;
        }
        cosine_with_norms(self, self.norm(), other, other.norm())
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(data: Vec<f64>) -> Self {
        Self::new(data)
    }
}

/// Cosine similarity with precomputed norms.
#[inline]
pub fn cosine_with_norms(a: &FeatureVector, norm_a: f64, b: &FeatureVector, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    a.dot(b) / (norm_a * norm_b)
}

/// Scalar dot product with two accumulators for better pipelining.
#[inline]
fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    let mut sum1 = 0.0;
    let mut sum2 = 0.0;
    let chunks = a.len() / 2;

    for i in 0..chunks {
        let j = i * 2;
        sum1 += a[j] * b[j];
        sum2 += a[j + 1] * b[j + 1];
    }
    if a.len() % 2 == 1 {
        let last = a.len() - 1;
        sum1 += a[last] * b[last];
    }

    sum1 + sum2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let v1 = FeatureVector::new(vec![1.0, 0.0]);
        let v2 = FeatureVector::new(vec![1.0, 0.0]);
        assert!((v1.cosine_similarity(&v2) - 1.0).abs() < 1e-12);

        let v3 = FeatureVector::new(vec![1.0, 0.0]);
        let v4 = FeatureVector::new(vec![0.0, 1.0]);
        assert!(v3.cosine_similarity(&v4).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        let zero = FeatureVector::zeros(3);
        let v = FeatureVector::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(zero.cosine_similarity(&v), 0.0);
        assert_eq!(zero.cosine_similarity(&zero), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = FeatureVector::new(vec![1.0, 2.0]);
        let b = FeatureVector::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(a.dot(&b), 0.0);
        assert_eq!(a.cosine_similarity(&b), 0.0);
    }

    #[test]
    fn test_odd_length_dot() {
        let a = FeatureVector::new(vec![1.0, 2.0, 3.0]);
        let b = FeatureVector::new(vec![4.0, 5.0, 6.0]);
        assert_eq!(a.dot(&b), 32.0);
        assert!((a.norm() - 14f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_serde_transparent() {
        let v = FeatureVector::new(vec![0.5, 1.0]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[0.5,1.0]");
    }
}
