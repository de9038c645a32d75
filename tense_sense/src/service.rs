use std::path::Path;
use std::sync::Arc;

use crate::api::{ErrorResponse, ErrorStatus, PredictRequest, PredictResponse};
use crate::errors::{InferenceError, Result};
use crate::labels::LabelTable;
use crate::model::Model;
use crate::predictor::Predictor;

/// Outcome of a successful classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Display label of the predicted class.
    pub label: String,

    /// Predicted class id.
    pub class: i64,

    /// Probability of the predicted class.
    pub confidence: f64,
}

/// Probability assigned to one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScore {
    pub class: i64,
    pub label: String,
    pub probability: f64,
}

/// Classifies a sentence with an optional predictor.
///
/// # Arguments
///
/// * `predictor` - The loaded model, or `None` if no valid model is available.
/// * `labels` - Display labels of the class ids.
/// * `text` - A raw sentence.
///
/// # Errors
///
/// * [`InferenceError::EmptyInput`] if `text` is empty after trimming.
/// * [`InferenceError::ModelUnavailable`] if `predictor` is `None`.
/// * [`InferenceError::Internal`] if scoring fails.
pub fn classify(
    predictor: Option<&Predictor>,
    labels: &LabelTable,
    text: &str,
) -> Result<Classification, InferenceError> {
    classify_with_scores(predictor, labels, text).map(|(c, _)| c)
}

/// Same as [`classify`], additionally returning the probability of every class.
pub fn classify_with_scores(
    predictor: Option<&Predictor>,
    labels: &LabelTable,
    text: &str,
) -> Result<(Classification, Vec<ClassScore>), InferenceError> {
    if text.trim().is_empty() {
        return Err(InferenceError::EmptyInput);
    }
    let predictor = predictor.ok_or(InferenceError::ModelUnavailable)?;
    let prediction = predictor.predict(text)?;
    let scores = predictor
        .model()
        .classes()
        .iter()
        .zip(&prediction.probabilities)
        .map(|(&class, &probability)| ClassScore {
            class,
            label: labels.label(class).to_string(),
            probability,
        })
        .collect();
    let classification = Classification {
        label: labels.label(prediction.class).to_string(),
        class: prediction.class,
        confidence: prediction.confidence,
    };
    log::debug!(
        "{:?} -> {} (confidence: {:.1}%)",
        text,
        classification.label,
        classification.confidence * 100.
    );
    Ok((classification, scores))
}

/// Inference service.
///
/// Owns the model behind an [`Arc`]; clones share it. A service created without a valid model
/// stays usable and answers every request with [`InferenceError::ModelUnavailable`].
#[derive(Debug, Clone)]
pub struct InferenceService {
    predictor: Option<Arc<Predictor>>,
    labels: LabelTable,
}

impl InferenceService {
    /// Creates a service over a validated model.
    pub fn new(model: Model, labels: LabelTable) -> Self {
        Self {
            predictor: Some(Arc::new(Predictor::new(model))),
            labels,
        }
    }

    /// Creates a service with no model.
    pub fn unavailable(labels: LabelTable) -> Self {
        Self {
            predictor: None,
            labels,
        }
    }

    /// Loads a model file, failing if the model cannot be read or is invalid.
    pub fn try_load<P>(path: P, labels: LabelTable) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let model = Model::open(path)?;
        log::info!(
            "Loaded model from {}: {} features, {} classes",
            path.display(),
            model.n_features(),
            model.n_classes()
        );
        Ok(Self::new(model, labels))
    }

    /// Loads a model file. On failure the error is logged and the returned service has no
    /// model.
    pub fn load<P>(path: P, labels: LabelTable) -> Self
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        match Self::try_load(path, labels.clone()) {
            Ok(service) => service,
            Err(e) => {
                log::error!("Failed to load model from {}: {}", path.display(), e);
                Self::unavailable(labels)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.predictor.is_some()
    }

    pub fn model(&self) -> Option<&Model> {
        self.predictor.as_deref().map(Predictor::model)
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Classifies a raw sentence. See [`classify`].
    pub fn classify(&self, text: &str) -> Result<Classification, InferenceError> {
        classify(self.predictor.as_deref(), &self.labels, text)
    }

    /// Classifies a raw sentence and returns the whole distribution. See
    /// [`classify_with_scores`].
    pub fn classify_with_scores(
        &self,
        text: &str,
    ) -> Result<(Classification, Vec<ClassScore>), InferenceError> {
        classify_with_scores(self.predictor.as_deref(), &self.labels, text)
    }

    /// Classifies every sentence independently.
    pub fn classify_batch<S>(&self, texts: &[S]) -> Vec<Result<Classification, InferenceError>>
    where
        S: AsRef<str>,
    {
        texts.iter().map(|t| self.classify(t.as_ref())).collect()
    }

    /// Answers a request object.
    ///
    /// # Errors
    ///
    /// The failure class and the error body to send back.
    pub fn handle_request(
        &self,
        request: &PredictRequest,
    ) -> Result<PredictResponse, (ErrorStatus, ErrorResponse)> {
        self.classify(&request.sentence)
            .map(PredictResponse::from)
            .map_err(|e| (ErrorStatus::from(&e), ErrorResponse::from(&e)))
    }
}
