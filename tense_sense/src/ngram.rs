//! Tokenization and word n-gram extraction.

use hashbrown::HashSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::preprocess::WORD_CLASS;

// A maximal run of two or more word characters. Tokens of a single character are never part of
// the vocabulary.
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("[{}]{{2,}}", WORD_CLASS)).unwrap());

/// Inclusive range of n-gram sizes, serialized as `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct NgramRange {
    pub min: usize,
    pub max: usize,
}

impl NgramRange {
    /// Creates a range after checking `1 <= min <= max`.
    pub fn new(min: usize, max: usize) -> Result<Self, ValidationError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.min == 0 || self.min > self.max {
            return Err(ValidationError::NgramRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl Default for NgramRange {
    fn default() -> Self {
        Self { min: 1, max: 2 }
    }
}

impl From<(usize, usize)> for NgramRange {
    fn from((min, max): (usize, usize)) -> Self {
        Self { min, max }
    }
}

impl From<NgramRange> for (usize, usize) {
    fn from(range: NgramRange) -> Self {
        (range.min, range.max)
    }
}

/// Splits normalized text into word tokens of at least two characters.
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Extracts word n-grams from normalized text.
///
/// For every window size in `range`, every contiguous window of tokens is joined with a single
/// space. Nothing is emitted for window sizes larger than the number of tokens.
///
/// # Arguments
///
/// * `text` - A normalized sentence.
/// * `range` - The window sizes to extract.
///
/// # Returns
///
/// The n-grams, window size by window size, each from left to right.
///
/// # Examples
///
/// ```
/// use tense_sense::{extract_ngrams, NgramRange};
///
/// let ngrams = extract_ngrams("i will run", NgramRange::default());
/// assert_eq!(vec!["will", "run", "will run"], ngrams);
/// ```
pub fn extract_ngrams(text: &str, range: NgramRange) -> Vec<String> {
    extract_ngrams_with_stop_words(text, range, None)
}

/// Same as [`extract_ngrams`], but drops stop words from the token stream before windows are
/// formed. Windows therefore span across removed stop words.
pub fn extract_ngrams_with_stop_words(
    text: &str,
    range: NgramRange,
    stop_words: Option<&HashSet<String>>,
) -> Vec<String> {
    let mut tokens = tokenize(text);
    if let Some(stop_words) = stop_words {
        tokens.retain(|t| !stop_words.contains(*t));
    }
    let mut ngrams = vec![];
    // A zero-sized window has no n-grams.
    for n in range.min.max(1)..=range.max {
        if n > tokens.len() {
            break;
        }
        if n == 1 {
            ngrams.extend(tokens.iter().map(|t| t.to_string()));
        } else {
            ngrams.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
    }
    ngrams
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_single_characters() {
        assert_eq!(vec!["will", "run"], tokenize("i will run"));
        assert_eq!(vec!["ab", "cd"], tokenize("a ab b cd c"));
    }

    #[test]
    fn test_tokenize_word_characters() {
        assert_eq!(vec!["snake_case", "42", "café"], tokenize("snake_case 42 café"));
    }

    #[test]
    fn test_tokenize_after_normalize() {
        use crate::preprocess::normalize;

        assert_eq!(vec!["x\u{b2}"], tokenize(&normalize("x\u{b2} y")));
        assert_eq!(vec!["cafe", "run"], tokenize(&normalize("cafe\u{301} run")));
        assert_eq!(vec!["ab", "cd"], tokenize(&normalize("ab\u{1c}cd")));
        assert_eq!(vec!["willrun"], tokenize(&normalize("will\u{203f}run")));
    }

    #[test]
    fn test_tokenize_splits_on_non_word_characters() {
        assert_eq!(vec!["ab", "cd"], tokenize("ab\u{301}cd"));
        assert_eq!(vec!["don", "stop"], tokenize("don't stop"));
    }

    #[test]
    fn test_extract_ngrams_zero_min() {
        let expected = extract_ngrams("will run", NgramRange::default());
        assert_eq!(expected, extract_ngrams("will run", NgramRange { min: 0, max: 2 }));
        assert_eq!(vec!["will", "run"], extract_ngrams("will run", NgramRange::from((0, 1))));
        assert!(extract_ngrams("will run", NgramRange { min: 0, max: 0 }).is_empty());
    }

    #[test]
    fn test_extract_ngrams_empty() {
        assert!(extract_ngrams("", NgramRange::default()).is_empty());
        assert!(extract_ngrams("a b c", NgramRange::default()).is_empty());
    }

    #[test]
    fn test_extract_ngrams_unigrams_and_bigrams() {
        let ngrams = extract_ngrams("she will travel to paris", NgramRange::default());
        assert_eq!(
            vec![
                "she",
                "will",
                "travel",
                "to",
                "paris",
                "she will",
                "will travel",
                "travel to",
                "to paris",
            ],
            ngrams
        );
    }

    #[test]
    fn test_extract_ngrams_fewer_tokens_than_min() {
        let range = NgramRange::new(2, 3).unwrap();
        assert!(extract_ngrams("running", range).is_empty());
        assert_eq!(vec!["will run"], extract_ngrams("will run", range));
    }

    #[test]
    fn test_extract_ngrams_trigrams_only() {
        let range = NgramRange::new(3, 3).unwrap();
        assert_eq!(
            vec!["we will have", "will have finished"],
            extract_ngrams("we will have finished", range)
        );
    }

    #[test]
    fn test_extract_ngrams_repeated() {
        let ngrams = extract_ngrams("run run", NgramRange::default());
        assert_eq!(vec!["run", "run", "run run"], ngrams);
    }

    #[test]
    fn test_extract_ngrams_with_stop_words() {
        let stop_words: HashSet<String> = ["will", "to"].iter().map(|s| s.to_string()).collect();
        let ngrams = extract_ngrams_with_stop_words(
            "she will travel to paris",
            NgramRange::default(),
            Some(&stop_words),
        );
        assert_eq!(
            vec!["she", "travel", "paris", "she travel", "travel paris"],
            ngrams
        );
    }

    #[test]
    fn test_ngram_range_validation() {
        assert!(NgramRange::new(1, 1).is_ok());
        assert_eq!(
            Err(ValidationError::NgramRange { min: 0, max: 2 }),
            NgramRange::new(0, 2)
        );
        assert_eq!(
            Err(ValidationError::NgramRange { min: 3, max: 2 }),
            NgramRange::new(3, 2)
        );
    }

    #[test]
    fn test_ngram_range_serde() {
        let range: NgramRange = serde_json::from_str("[1, 3]").unwrap();
        assert_eq!(NgramRange { min: 1, max: 3 }, range);
        assert_eq!("[1,3]", serde_json::to_string(&range).unwrap());
    }
}
