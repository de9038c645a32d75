//! Multinomial logistic regression scoring.

use crate::vectorizer::SparseVector;

/// Computes the linear score of every class.
///
/// `coef` must have one row per class with `vector.dim()` columns.
pub fn decision_function(
    vector: &SparseVector,
    coef: &[Vec<f64>],
    intercept: &[f64],
) -> Vec<f64> {
    coef.iter()
        .zip(intercept)
        .map(|(row, &b)| b + vector.dot(row))
        .collect()
}

/// Converts scores into a probability distribution.
///
/// The maximum is subtracted before exponentiation so large scores do not overflow.
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let m = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&s| (s - m).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Returns the position of the largest value, preferring the first on ties.
///
/// Returns `None` for an empty slice or if a value is NaN.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            return None;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Scores a vector and converts the result to class probabilities.
///
/// # Arguments
///
/// * `vector` - A TF-IDF vector.
/// * `coef` - Coefficient matrix, one row per class.
/// * `intercept` - Bias of each class.
///
/// # Returns
///
/// The probability of each class, in row order.
pub fn score(vector: &SparseVector, coef: &[Vec<f64>], intercept: &[f64]) -> Vec<f64> {
    softmax(&decision_function(vector, coef, intercept))
}

#[cfg(test)]
mod tests {
    use super::*;

    use hashbrown::HashMap;

    use crate::vectorizer::vectorize;

    fn assert_simplex(ps: &[f64]) {
        let sum: f64 = ps.iter().sum();
        assert!((sum - 1.).abs() < 1e-6, "sum = {}", sum);
        for &p in ps {
            assert!((0. ..=1.).contains(&p), "p = {}", p);
        }
    }

    #[test]
    fn test_softmax_uniform() {
        let ps = softmax(&[0., 0., 0.]);
        for p in &ps {
            assert!((p - 1. / 3.).abs() < 1e-12);
        }
    }

    #[test]
    fn test_softmax_simplex() {
        for scores in [
            vec![1.414, 2.121],
            vec![-3., 0.5, 7.25],
            vec![1000., 999., -1000.],
            vec![-1e4, -1e4 + 1.],
            vec![42.],
        ] {
            assert_simplex(&softmax(&scores));
        }
    }

    #[test]
    fn test_softmax_large_scores() {
        let ps = softmax(&[1000., 1000.]);
        assert_eq!(vec![0.5, 0.5], ps);
    }

    #[test]
    fn test_argmax_ties() {
        assert_eq!(Some(1), argmax(&[0.2, 0.4, 0.4]));
        assert_eq!(Some(0), argmax(&[0.5, 0.5]));
        assert_eq!(Some(2), argmax(&[-1., -0.5, 3.]));
    }

    #[test]
    fn test_argmax_degenerate() {
        assert_eq!(None, argmax(&[]));
        assert_eq!(None, argmax(&[0.1, f64::NAN]));
    }

    #[test]
    fn test_score_worked_example() {
        let vocabulary: HashMap<String, usize> = [("run", 0), ("running", 1), ("will run", 2)]
            .iter()
            .map(|&(k, v)| (k.to_string(), v))
            .collect();
        let v = vectorize(&["will", "run", "will run"], &vocabulary, &[1., 1., 1.]);
        let coef = vec![vec![2., 0., 0.], vec![0., 0., 3.]];
        let intercept = [0., 0.];

        let scores = decision_function(&v, &coef, &intercept);
        assert!((scores[0] - 2f64.sqrt()).abs() < 1e-9);
        assert!((scores[1] - 3. / 2f64.sqrt()).abs() < 1e-9);

        let ps = score(&v, &coef, &intercept);
        assert_simplex(&ps);
        assert_eq!(Some(1), argmax(&ps));
        let expected = 1. / (1. + (-1. / 2f64.sqrt()).exp());
        assert!((ps[1] - expected).abs() < 1e-9);
        assert!((ps[1] - 0.67).abs() < 0.01);
    }

    #[test]
    fn test_score_zero_vector_uses_intercepts() {
        let v = SparseVector::zeros(2);
        let coef = vec![vec![5., -5.], vec![-5., 5.], vec![1., 1.]];
        let ps = score(&v, &coef, &[0., 0., 0.]);
        for p in &ps {
            assert!((p - 1. / 3.).abs() < 1e-12);
        }
        let ps = score(&v, &coef, &[0.1, 0.3, 0.2]);
        assert_eq!(Some(1), argmax(&ps));
    }
}
