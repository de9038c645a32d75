//! Text normalization applied before tokenization.

use once_cell::sync::Lazy;
use regex::Regex;

// Word characters are letters, numbers (including `²` and `½`) and `_`. Combining marks and
// connector punctuation other than `_` are not word characters.
pub(crate) const WORD_CLASS: &str = r"\p{L}\p{N}_";

// Unicode white space plus the information separators U+001C..U+001F.
const SPACE_CLASS: &str = r"\s\x1C-\x1F";

static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("[^{}{}]", WORD_CLASS, SPACE_CLASS)).unwrap());

fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\x1C'..='\x1F').contains(&c)
}

/// Normalizes a raw sentence.
///
/// The text is lower-cased, every character that is neither a word character nor whitespace is
/// removed, and surrounding whitespace is trimmed.
///
/// # Arguments
///
/// * `text` - A raw sentence.
///
/// # Returns
///
/// The normalized sentence.
///
/// # Examples
///
/// ```
/// use tense_sense::normalize;
///
/// assert_eq!("they went to the movies", normalize("  They went to the movies! "));
/// ```
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_WORD_RE
        .replace_all(&lower, "")
        .trim_matches(is_space)
        .to_string()
}
