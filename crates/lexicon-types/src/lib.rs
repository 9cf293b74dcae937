//! Shared types for the bilingual word-list.
//!
//! A headword maps to an ordered list of [`GlossEntry`] records, one per part
//! of speech (or homonym). The order is the order of the source data and is
//! significant for display.
//!
//! [`GlossLookup`] is the only seam between the data and the algorithms that
//! consume it: the cross-reference expander asks for a headword's glosses and
//! never learns how they were loaded.
//!
//! ```rust
//! use std::collections::HashMap;
//! use lexicon_types::{GlossEntry, GlossLookup};
//!
//! let mut map = HashMap::new();
//! map.insert(
//!     "koira".to_string(),
//!     vec![GlossEntry::new("koira", "noun", ["dog"])],
//! );
//! assert_eq!(map.glosses("koira")[0].meanings, vec!["dog"]);
//! assert!(map.glosses("kissa").is_empty());
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One definition record: part of speech plus its meanings, in source order.
///
/// Field names on the wire follow the gloss dataset (`word`, `pos`,
/// `meanings`).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GlossEntry {
    #[serde(rename = "word")]
    pub headword: String,
    #[serde(rename = "pos")]
    pub part_of_speech: String,
    #[serde(default)]
    pub meanings: Vec<String>,
}

impl GlossEntry {
    /// Build an entry from borrowed parts.
    pub fn new<I, S>(headword: &str, part_of_speech: &str, meanings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headword: headword.to_string(),
            part_of_speech: part_of_speech.to_string(),
            meanings: meanings.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for GlossEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.headword, self.part_of_speech)
    }
}

/// Read-only access to the glosses stored under a headword.
///
/// A miss is an empty slice, never an error: callers treat "no entry" and
/// "entry with zero glosses" identically.
pub trait GlossLookup {
    fn glosses(&self, headword: &str) -> &[GlossEntry];

    fn has_glosses(&self, headword: &str) -> bool {
        !self.glosses(headword).is_empty()
    }
}

impl GlossLookup for HashMap<String, Vec<GlossEntry>> {
    fn glosses(&self, headword: &str) -> &[GlossEntry] {
        self.get(headword).map(Vec::as_slice).unwrap_or(&[])
    }
}
