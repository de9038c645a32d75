use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::{Result, ValidationError};
use crate::ngram::NgramRange;
use crate::vectorizer::Norm;

const ZSTD_EXTENSION: &str = "zst";
const ZSTD_LEVEL: i32 = 19;

/// Stop words recorded by the exporting vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopWords {
    /// An explicit word list.
    List(Vec<String>),

    /// A named built-in list such as `"english"`.
    Named(String),
}

/// Vectorizer parameters recorded in the artifact.
///
/// Only `ngram_range`, `stop_words`, `sublinear_tf`, and `norm` affect inference. Any other key
/// is kept in `extra` so that re-exported artifacts keep it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfParams {
    pub ngram_range: NgramRange,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_words: Option<StopWords>,

    #[serde(default)]
    pub sublinear_tf: bool,

    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

impl Default for TfidfParams {
    fn default() -> Self {
        Self {
            ngram_range: NgramRange::default(),
            stop_words: None,
            sublinear_tf: false,
            norm: default_norm(),
            extra: Map::new(),
        }
    }
}

/// Exported artifact before validation.
///
/// This mirrors the JSON document written by the trainer field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelData {
    #[serde(serialize_with = "serialize_vocabulary")]
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    pub classes: Vec<i64>,
    pub tfidf_params: TfidfParams,
}

// Writes entries in index order so that exports are reproducible.
fn serialize_vocabulary<S>(
    vocabulary: &HashMap<String, usize>,
    serializer: S,
) -> core::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut entries: Vec<(&String, &usize)> = vocabulary.iter().collect();
    entries.sort_unstable_by_key(|&(_, idx)| *idx);
    serializer.collect_map(entries)
}

impl ModelData {
    /// Checks every structural invariant of the artifact.
    ///
    /// # Errors
    ///
    /// The first violated invariant is returned.
    pub fn validate(&self) -> core::result::Result<(), ValidationError> {
        let n_classes = self.classes.len();
        if n_classes == 0 {
            return Err(ValidationError::NoClasses);
        }
        let mut seen = HashSet::with_capacity(n_classes);
        for &cls in &self.classes {
            if !seen.insert(cls) {
                return Err(ValidationError::DuplicateClass(cls));
            }
        }
        if self.intercept.len() != n_classes {
            return Err(ValidationError::InterceptLength {
                intercept: self.intercept.len(),
                classes: n_classes,
            });
        }
        if self.coefficients.len() != n_classes {
            return Err(ValidationError::CoefficientRows {
                rows: self.coefficients.len(),
                classes: n_classes,
            });
        }

        let n_features = self.vocabulary.len();
        if self.idf.len() != n_features {
            return Err(ValidationError::IdfLength {
                idf: self.idf.len(),
                vocabulary: n_features,
            });
        }
        for (row, weights) in self.coefficients.iter().enumerate() {
            if weights.len() != n_features {
                return Err(ValidationError::CoefficientColumns {
                    row,
                    columns: weights.len(),
                    vocabulary: n_features,
                });
            }
        }

        // N distinct keys with N distinct indices below N form a permutation of [0, N).
        let mut owners: Vec<Option<&str>> = vec![None; n_features];
        let mut entries: Vec<(&String, &usize)> = self.vocabulary.iter().collect();
        entries.sort_unstable();
        for (ngram, &index) in entries {
            let owner = owners
                .get_mut(index)
                .ok_or_else(|| ValidationError::VocabularyIndexOutOfRange {
                    ngram: ngram.clone(),
                    index,
                    size: n_features,
                })?;
            if let Some(first) = *owner {
                return Err(ValidationError::DuplicateVocabularyIndex {
                    index,
                    first: first.to_string(),
                    second: ngram.clone(),
                });
            }
            *owner = Some(ngram.as_str());
        }

        self.tfidf_params.ngram_range.validate()?;
        if let Some(StopWords::Named(name)) = &self.tfidf_params.stop_words {
            return Err(ValidationError::NamedStopWords(name.clone()));
        }
        Ok(())
    }
}

/// Weights attached to one vocabulary entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TermInfo<'a> {
    pub ngram: &'a str,
    pub index: usize,
    pub idf: f64,

    /// Coefficient of this feature for each class, in class order.
    pub weights: Vec<f64>,
}

/// Validated, immutable model artifact.
#[derive(Debug)]
pub struct Model {
    data: ModelData,
    stop_words: Option<HashSet<String>>,
}

impl TryFrom<ModelData> for Model {
    type Error = ValidationError;

    fn try_from(data: ModelData) -> core::result::Result<Self, Self::Error> {
        data.validate()?;
        let stop_words = match &data.tfidf_params.stop_words {
            Some(StopWords::List(words)) => Some(words.iter().cloned().collect()),
            _ => {
                log::warn!(
                    "The model records no stop words; if the vectorizer was fitted with \
                     stop words, n-grams spanning them will not match the vocabulary"
                );
                None
            }
        };
        Ok(Self { data, stop_words })
    }
}

impl Model {
    /// Creates a model from a reader of the exported JSON document.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Errors
    ///
    /// [`TenseSenseError::Json`](crate::errors::TenseSenseError::Json) if the document cannot be
    /// parsed, [`TenseSenseError::InvalidModel`](crate::errors::TenseSenseError::InvalidModel)
    /// if it violates an invariant.
    pub fn read<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let data: ModelData = serde_json::from_reader(rdr)?;
        Ok(Self::try_from(data)?)
    }

    /// Creates a model from the exported JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let data: ModelData = serde_json::from_str(s)?;
        Ok(Self::try_from(data)?)
    }

    /// Loads a model file. Files with the `.zst` extension are decompressed first.
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let f = BufReader::new(File::open(path)?);
        if is_zstd(path) {
            Self::read(zstd::Decoder::new(f)?)
        } else {
            Self::read(f)
        }
    }

    /// Exports the model data as JSON.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        serde_json::to_writer(wtr, &self.data)?;
        Ok(())
    }

    /// Writes the model to a file, compressing it when the path ends with `.zst`.
    pub fn save<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let f = File::create(path)?;
        if is_zstd(path) {
            let mut enc = zstd::Encoder::new(f, ZSTD_LEVEL)?;
            self.write(&mut enc)?;
            enc.finish()?;
        } else {
            let mut f = BufWriter::new(f);
            self.write(&mut f)?;
            f.flush()?;
        }
        Ok(())
    }

    pub fn data(&self) -> &ModelData {
        &self.data
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.data.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.data.idf
    }

    pub fn coefficients(&self) -> &[Vec<f64>] {
        &self.data.coefficients
    }

    pub fn intercept(&self) -> &[f64] {
        &self.data.intercept
    }

    pub fn classes(&self) -> &[i64] {
        &self.data.classes
    }

    pub fn params(&self) -> &TfidfParams {
        &self.data.tfidf_params
    }

    pub fn ngram_range(&self) -> NgramRange {
        self.data.tfidf_params.ngram_range
    }

    pub(crate) fn stop_words(&self) -> Option<&HashSet<String>> {
        self.stop_words.as_ref()
    }

    /// Number of features (vocabulary size).
    pub fn n_features(&self) -> usize {
        self.data.idf.len()
    }

    pub fn n_classes(&self) -> usize {
        self.data.classes.len()
    }

    /// Looks up a vocabulary entry.
    pub fn term(&self, ngram: &str) -> Option<TermInfo<'_>> {
        let (ngram, &index) = self.data.vocabulary.get_key_value(ngram)?;
        Some(self.term_info(ngram, index))
    }

    /// Returns every vocabulary entry in index order.
    pub fn terms(&self) -> Vec<TermInfo<'_>> {
        let mut terms: Vec<TermInfo<'_>> = self
            .data
            .vocabulary
            .iter()
            .map(|(ngram, &index)| self.term_info(ngram, index))
            .collect();
        terms.sort_unstable_by_key(|t| t.index);
        terms
    }

    fn term_info<'a>(&'a self, ngram: &'a str, index: usize) -> TermInfo<'a> {
        TermInfo {
            ngram,
            index,
            idf: self.data.idf[index],
            weights: self.data.coefficients.iter().map(|row| row[index]).collect(),
        }
    }
}

fn is_zstd(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == ZSTD_EXTENSION)
}
