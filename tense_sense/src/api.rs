//! Transport-agnostic request and response objects.
//!
//! An HTTP binding deserializes [`PredictRequest`] from the request body, calls
//! [`InferenceService::handle_request`](crate::InferenceService::handle_request), and maps
//! [`ErrorStatus`] to a status code.

use serde::{Deserialize, Serialize};

use crate::errors::InferenceError;
use crate::service::Classification;

/// Body of a classification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub sentence: String,
}

/// Body of a successful classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub tense: String,
    pub prediction_value: i64,
    pub confidence: f64,
}

impl From<Classification> for PredictResponse {
    fn from(c: Classification) -> Self {
        Self {
            tense: c.label,
            prediction_value: c.class,
            confidence: c.confidence,
        }
    }
}

/// Body of a failed classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&InferenceError> for ErrorResponse {
    fn from(e: &InferenceError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

/// Failure class of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    BadInput,
    ServiceUnavailable,
    Internal,
}

impl ErrorStatus {
    pub const fn http_status(self) -> u16 {
        match self {
            Self::BadInput => 400,
            Self::ServiceUnavailable => 503,
            Self::Internal => 500,
        }
    }
}

impl From<&InferenceError> for ErrorStatus {
    fn from(e: &InferenceError) -> Self {
        match e {
            InferenceError::EmptyInput => Self::BadInput,
            InferenceError::ModelUnavailable => Self::ServiceUnavailable,
            InferenceError::Internal(_) => Self::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_missing_sentence() {
        let req: PredictRequest = serde_json::from_str("{}").unwrap();
        assert_eq!("", req.sentence);
    }

    #[test]
    fn test_response_json() {
        let res = PredictResponse::from(Classification {
            label: "Past Tense".to_string(),
            class: 2,
            confidence: 0.75,
        });
        assert_eq!(
            r#"{"tense":"Past Tense","prediction_value":2,"confidence":0.75}"#,
            serde_json::to_string(&res).unwrap()
        );
    }

    #[test]
    fn test_error_status() {
        let cases = [
            (InferenceError::EmptyInput, 400),
            (InferenceError::ModelUnavailable, 503),
            (InferenceError::Internal("boom".into()), 500),
        ];
        for (e, code) in cases {
            assert_eq!(code, ErrorStatus::from(&e).http_status());
        }
    }

    #[test]
    fn test_error_response_json() {
        let res = ErrorResponse::from(&InferenceError::EmptyInput);
        assert_eq!(
            r#"{"error":"No sentence provided"}"#,
            serde_json::to_string(&res).unwrap()
        );
    }
}
