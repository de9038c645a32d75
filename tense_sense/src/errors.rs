//! Definition of errors.

use thiserror::Error;

pub type Result<T, E = TenseSenseError> = core::result::Result<T, E>;

/// Error returned when loading, validating, or exporting a model artifact.
#[derive(Debug, Error)]
pub enum TenseSenseError {
    #[error(transparent)]
    InvalidModel(#[from] ValidationError),

    #[error("InvalidArgumentError: {arg}: {msg}")]
    InvalidArgument { arg: &'static str, msg: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TenseSenseError {
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument {
            arg,
            msg: msg.into(),
        }
    }
}

/// Error used when the model artifact is malformed or internally inconsistent.
///
/// Only the first violated invariant is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("InvalidModelError: idf length ({idf}) != vocabulary size ({vocabulary})")]
    IdfLength { idf: usize, vocabulary: usize },

    #[error(
        "InvalidModelError: coefficient columns ({columns}) != vocabulary size ({vocabulary}) in row {row}"
    )]
    CoefficientColumns {
        row: usize,
        columns: usize,
        vocabulary: usize,
    },

    #[error("InvalidModelError: coefficient rows ({rows}) != number of classes ({classes})")]
    CoefficientRows { rows: usize, classes: usize },

    #[error("InvalidModelError: intercept length ({intercept}) != number of classes ({classes})")]
    InterceptLength { intercept: usize, classes: usize },

    #[error("InvalidModelError: vocabulary index {index} of {ngram:?} is out of range [0, {size})")]
    VocabularyIndexOutOfRange {
        ngram: String,
        index: usize,
        size: usize,
    },

    #[error("InvalidModelError: vocabulary index {index} is assigned to both {first:?} and {second:?}")]
    DuplicateVocabularyIndex {
        index: usize,
        first: String,
        second: String,
    },

    #[error("InvalidModelError: the model has no classes")]
    NoClasses,

    #[error("InvalidModelError: class {0} appears more than once")]
    DuplicateClass(i64),

    #[error("InvalidModelError: invalid ngram_range ({min}, {max})")]
    NgramRange { min: usize, max: usize },

    #[error("InvalidModelError: named stop word list {0:?} is not supported; export the word list")]
    NamedStopWords(String),
}

/// Error returned by a classification request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// The sentence is empty after trimming.
    #[error("No sentence provided")]
    EmptyInput,

    /// No valid model artifact is loaded.
    #[error("Model not loaded")]
    ModelUnavailable,

    /// Scoring failed unexpectedly.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let e = ValidationError::IdfLength {
            idf: 2,
            vocabulary: 3,
        };
        assert_eq!(
            "InvalidModelError: idf length (2) != vocabulary size (3)",
            e.to_string()
        );
    }

    #[test]
    fn test_validation_error_into_crate_error() {
        let e: TenseSenseError = ValidationError::NoClasses.into();
        assert!(matches!(
            e,
            TenseSenseError::InvalidModel(ValidationError::NoClasses)
        ));
        assert_eq!("InvalidModelError: the model has no classes", e.to_string());
    }

    #[test]
    fn test_inference_error_messages() {
        assert_eq!("No sentence provided", InferenceError::EmptyInput.to_string());
        assert_eq!("Model not loaded", InferenceError::ModelUnavailable.to_string());
        assert_eq!(
            "Internal error: non-finite score",
            InferenceError::Internal("non-finite score".into()).to_string()
        );
    }
}
