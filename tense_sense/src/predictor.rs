use crate::errors::InferenceError;
use crate::model::Model;
use crate::ngram::extract_ngrams_with_stop_words;
use crate::preprocess::normalize;
use crate::scorer::{argmax, decision_function, softmax};
use crate::vectorizer::{vectorize_with, SparseVector};

/// Result of scoring one sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Position of the predicted class in the model's class order.
    pub class_index: usize,

    /// Predicted class id.
    pub class: i64,

    /// Probability of the predicted class.
    pub confidence: f64,

    /// Probability of every class, in the model's class order.
    pub probabilities: Vec<f64>,
}

/// Predictor.
///
/// Runs the whole pipeline (normalization, n-gram extraction, TF-IDF vectorization and
/// softmax scoring) over an immutable model. A predictor holds no mutable state, so one
/// instance can be shared by any number of threads.
#[derive(Debug)]
pub struct Predictor {
    model: Model,
}

impl Predictor {
    /// Creates a new predictor.
    ///
    /// # Arguments
    ///
    /// * `model` - A validated model.
    ///
    /// # Returns
    ///
    /// A new predictor.
    pub fn new(model: Model) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Extracts the n-grams of a raw sentence using the model's parameters.
    pub fn ngrams(&self, text: &str) -> Vec<String> {
        extract_ngrams_with_stop_words(
            &normalize(text),
            self.model.ngram_range(),
            self.model.stop_words(),
        )
    }

    /// Converts a raw sentence into the model's feature space.
    pub fn vectorize(&self, text: &str) -> SparseVector {
        let params = self.model.params();
        vectorize_with(
            &self.ngrams(text),
            self.model.vocabulary(),
            self.model.idf(),
            params.sublinear_tf,
            params.norm,
        )
    }

    /// Predicts the class of a raw sentence.
    ///
    /// # Arguments
    ///
    /// * `text` - A sentence.
    ///
    /// # Returns
    ///
    /// The predicted class and the probability distribution.
    ///
    /// # Errors
    ///
    /// [`InferenceError::Internal`] if the scores are not finite.
    pub fn predict(&self, text: &str) -> Result<Prediction, InferenceError> {
        let x = self.vectorize(text);
        let scores = decision_function(&x, self.model.coefficients(), self.model.intercept());
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(InferenceError::Internal(format!(
                "non-finite decision scores: {:?}",
                scores
            )));
        }
        // The decision is taken on the raw scores. Near-tied scores may round to equal
        // probabilities.
        let class_index = argmax(&scores).ok_or_else(|| {
            InferenceError::Internal(format!("invalid decision scores: {:?}", scores))
        })?;
        let probabilities = softmax(&scores);
        Ok(Prediction {
            class_index,
            class: self.model.classes()[class_index],
            confidence: probabilities[class_index],
            probabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{ModelData, StopWords};

    const WORKED_EXAMPLE: &str = r#"{
        "vocabulary": {"run": 0, "running": 1, "will run": 2},
        "idf": [1.0, 1.0, 1.0],
        "coefficients": [[2.0, 0.0, 0.0], [0.0, 0.0, 3.0]],
        "intercept": [0.0, 0.0],
        "classes": [0, 1],
        "tfidf_params": {"ngram_range": [1, 2]}
    }"#;

    fn predictor() -> Predictor {
        Predictor::new(Model::from_json_str(WORKED_EXAMPLE).unwrap())
    }

    #[test]
    fn test_predict_worked_example() {
        let predictor = predictor();
        assert_eq!(vec!["will", "run", "will run"], predictor.ngrams("I will run"));

        let x = predictor.vectorize("I will run");
        let expected = 1. / 2f64.sqrt();
        assert!((x.get(0) - expected).abs() < 1e-12);
        assert!((x.get(2) - expected).abs() < 1e-12);

        let p = predictor.predict("I will run").unwrap();
        assert_eq!(1, p.class_index);
        assert_eq!(1, p.class);
        let confidence = 1. / (1. + (-expected).exp());
        assert!((p.confidence - confidence).abs() < 1e-9);
        assert!((p.probabilities.iter().sum::<f64>() - 1.).abs() < 1e-9);
    }

    #[test]
    fn test_predict_no_vocabulary_hit() {
        let p = predictor().predict("Nothing matches here").unwrap();
        assert_eq!(0, p.class_index);
        assert_eq!(vec![0.5, 0.5], p.probabilities);
    }

    #[test]
    fn test_predict_deterministic() {
        let predictor = predictor();
        let first = predictor.predict("Running, I will run; run!").unwrap();
        for _ in 0..10 {
            assert_eq!(first, predictor.predict("Running, I will run; run!").unwrap());
        }
    }

    #[test]
    fn test_predict_near_tied_scores() {
        let mut data: ModelData = serde_json::from_str(WORKED_EXAMPLE).unwrap();
        data.intercept = vec![0., 1e-17];
        let predictor = Predictor::new(Model::try_from(data).unwrap());
        let p = predictor.predict("Nothing matches here").unwrap();
        assert_eq!(p.probabilities[0], p.probabilities[1]);
        assert_eq!(1, p.class_index);
        assert_eq!(1, p.class);
        assert_eq!(0.5, p.confidence);
    }

    #[test]
    fn test_predict_non_finite_scores() {
        let mut data: ModelData = serde_json::from_str(WORKED_EXAMPLE).unwrap();
        data.intercept = vec![f64::INFINITY, 0.];
        let predictor = Predictor::new(Model::try_from(data).unwrap());
        assert!(matches!(
            predictor.predict("run"),
            Err(InferenceError::Internal(_))
        ));
    }

    #[test]
    fn test_predict_stop_words() {
        let mut data: ModelData = serde_json::from_str(WORKED_EXAMPLE).unwrap();
        data.tfidf_params.stop_words = Some(StopWords::List(vec!["will".to_string()]));
        let predictor = Predictor::new(Model::try_from(data).unwrap());
        assert_eq!(vec!["run"], predictor.ngrams("I will run"));
        let p = predictor.predict("I will run").unwrap();
        assert_eq!(0, p.class);
    }
}
