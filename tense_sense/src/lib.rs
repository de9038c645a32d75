#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Tense Sense
//!
//! Tense Sense classifies the grammatical tense of an English sentence with a TF-IDF +
//! multinomial logistic regression model exported as JSON by an external trainer. Inference
//! needs no machine-learning library: the exported vocabulary, idf weights, and coefficients
//! are enough.
//!
//! ## Examples
//!
//! ```no_run
//! use std::io::{prelude::*, stdin};
//!
//! use tense_sense::{InferenceService, LabelTable};
//!
//! let service = InferenceService::try_load("model_data.json", LabelTable::default()).unwrap();
//!
//! for line in stdin().lock().lines() {
//!     let c = service.classify(&line.unwrap()).unwrap();
//!     println!("{}\t{:.3}", c.label, c.confidence);
//! }
//! ```

pub mod api;
pub mod errors;

mod labels;
mod model;
mod ngram;
mod predictor;
mod preprocess;
mod scorer;
mod service;
mod vectorizer;

pub use errors::{InferenceError, TenseSenseError, ValidationError};
pub use labels::{LabelTable, UNKNOWN_LABEL};
pub use model::{Model, ModelData, StopWords, TermInfo, TfidfParams};
pub use ngram::{extract_ngrams, extract_ngrams_with_stop_words, tokenize, NgramRange};
pub use predictor::{Prediction, Predictor};
pub use preprocess::normalize;
pub use scorer::{argmax, decision_function, score, softmax};
pub use service::{classify, classify_with_scores, ClassScore, Classification, InferenceService};
pub use vectorizer::{vectorize, vectorize_with, Norm, SparseVector};
