//! Display labels of class ids.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use hashbrown::HashMap;
use serde::Deserialize;

use crate::errors::{Result, TenseSenseError};

/// Label returned for a class id missing from the table.
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Deserialize)]
struct LabelRecord {
    class: i64,
    label: String,
}

/// Mapping from class id to a display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: HashMap<i64, String>,
}

impl Default for LabelTable {
    /// The tense labels used by the trainer: 1 = present, 2 = past, 3 = future.
    fn default() -> Self {
        Self::from_pairs([
            (1, "Present Tense"),
            (2, "Past Tense"),
            (3, "Future Tense"),
        ])
    }
}

impl LabelTable {
    /// Creates a table from `(class, label)` pairs. Later pairs override earlier ones.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Self {
            labels: pairs.into_iter().map(|(c, l)| (c, l.into())).collect(),
        }
    }

    /// Reads a CSV table with the header `class,label`.
    ///
    /// # Errors
    ///
    /// Malformed records and class ids listed twice are rejected.
    pub fn from_csv_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut rdr = csv::Reader::from_reader(rdr);
        let mut labels = HashMap::new();
        for record in rdr.deserialize() {
            let LabelRecord { class, label } = record?;
            if labels.insert(class, label).is_some() {
                return Err(TenseSenseError::invalid_argument(
                    "labels",
                    format!("class {} is listed more than once", class),
                ));
            }
        }
        Ok(Self { labels })
    }

    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::from_csv_reader(File::open(path)?)
    }

    /// Gets the label of a class, or [`UNKNOWN_LABEL`].
    pub fn label(&self, class: i64) -> &str {
        self.labels.get(&class).map_or(UNKNOWN_LABEL, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
