//! TF-IDF vectorization over a closed vocabulary.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Vector normalization applied after TF-IDF weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    /// Divide by the Euclidean length.
    L2,

    /// Divide by the sum of absolute values.
    L1,
}

/// TF-IDF vector over a vocabulary of size `dim`.
///
/// Only non-zero components are stored, sorted by feature index.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Creates the all-zero vector.
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            indices: vec![],
            values: vec![],
        }
    }

    /// Length of the dense representation.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) components.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates over `(index, value)` pairs in increasing index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Gets the value of component `index`.
    pub fn get(&self, index: usize) -> f64 {
        self.indices
            .binary_search(&index)
            .map_or(0., |pos| self.values[pos])
    }

    /// Dot product with a dense row of length `dim`.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.iter().map(|(i, v)| dense[i] * v).sum()
    }

    /// Euclidean length.
    pub fn l2_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.; self.dim];
        for (i, v) in self.iter() {
            dense[i] = v;
        }
        dense
    }

    fn normalize(&mut self, norm: Norm) {
        let denom = match norm {
            Norm::L2 => self.l2_norm(),
            Norm::L1 => self.values.iter().map(|v| v.abs()).sum(),
        };
        if denom > 0. {
            for v in &mut self.values {
                *v /= denom;
            }
        }
    }
}

/// Converts n-grams into an L2-normalized TF-IDF vector.
///
/// N-grams missing from `vocabulary` are ignored. When nothing matches, the all-zero vector is
/// returned.
///
/// # Arguments
///
/// * `ngrams` - N-grams of a sentence, in any order.
/// * `vocabulary` - Mapping from n-gram to feature index.
/// * `idf` - Inverse document frequency of each feature index.
///
/// # Returns
///
/// A sparse vector of dimension `idf.len()`.
pub fn vectorize<S>(
    ngrams: &[S],
    vocabulary: &HashMap<String, usize>,
    idf: &[f64],
) -> SparseVector
where
    S: AsRef<str>,
{
    vectorize_with(ngrams, vocabulary, idf, false, Some(Norm::L2))
}

/// Same as [`vectorize`] with explicit weighting options.
///
/// # Arguments
///
/// * `sublinear_tf` - Replaces each term frequency `tf` with `1 + ln(tf)`.
/// * `norm` - Normalization to apply, or `None` to keep raw TF-IDF values.
pub fn vectorize_with<S>(
    ngrams: &[S],
    vocabulary: &HashMap<String, usize>,
    idf: &[f64],
    sublinear_tf: bool,
    norm: Option<Norm>,
) -> SparseVector
where
    S: AsRef<str>,
{
    let mut counts: HashMap<usize, u32> = HashMap::new();
    for ngram in ngrams {
        if let Some(&idx) = vocabulary.get(ngram.as_ref()) {
            *counts.entry(idx).or_insert(0) += 1;
        }
    }
    let mut counts: Vec<(usize, u32)> = counts.into_iter().collect();
    counts.sort_unstable_by_key(|&(idx, _)| idx);

    let mut indices = Vec::with_capacity(counts.len());
    let mut values = Vec::with_capacity(counts.len());
    for (idx, tf) in counts {
        let tf = f64::from(tf);
        let tf = if sublinear_tf { tf.ln() + 1. } else { tf };
        let v = tf * idf[idx];
        if v != 0. {
            indices.push(idx);
            values.push(v);
        }
    }

    let mut vector = SparseVector {
        dim: idf.len(),
        indices,
        values,
    };
    if let Some(norm) = norm {
        vector.normalize(norm);
    }
    vector
}
