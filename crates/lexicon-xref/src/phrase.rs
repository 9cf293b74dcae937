use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::trace;

/// Set of reference phrases, matched on whole-word boundaries.
///
/// Each phrase is stored as a key with one trailing space (`"see also "`), the
/// same shape as the candidates built from the text being matched.
#[derive(Debug, Default, Clone)]
pub struct PhraseMatcher {
    keys: HashSet<String>,
    // Distinct token counts of the keys, longest first.
    token_counts: Vec<usize>,
}

/// The longest reference phrase found at the start of a text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PhraseMatch<'a> {
    /// Matched key, including its trailing space.
    pub key: &'a str,
    /// Length of `key` in code points.
    pub len: usize,
    /// Number of whitespace-delimited tokens in the phrase.
    pub tokens: usize,
    /// Byte offset in the matched text where the remainder begins.
    pub rest: usize,
}

impl<'a> PhraseMatch<'a> {
    /// The phrase without its trailing separator.
    pub fn phrase(&self) -> &'a str {
        self.key.trim_end()
    }
}

impl PhraseMatcher {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read one phrase per line. Blank lines are ignored.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("open phrase list {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut phrases = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line =
                line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
            phrases.push(line);
        }
        Ok(Self::from_phrases(phrases))
    }

    pub fn from_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys = HashSet::new();
        let mut counts = HashSet::new();
        for phrase in phrases {
            let Some(key) = phrase_key(phrase.as_ref()) else {
                continue;
            };
            counts.insert(key.split_whitespace().count());
            keys.insert(key);
        }

        let mut token_counts: Vec<usize> = counts.into_iter().collect();
        token_counts.sort_unstable_by(|a, b| b.cmp(a));

        Self { keys, token_counts }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, phrase: &str) -> bool {
        phrase_key(phrase).is_some_and(|key| self.keys.contains(&key))
    }

    /// Find the reference phrase covering the most leading tokens of `text`.
    ///
    /// Candidates are the first `k` tokens joined by single spaces plus a
    /// trailing space, tried from the largest `k` down; the first hit wins, so
    /// `see also` beats `see` when both are known.
    pub fn find_longest_prefix(&self, text: &str) -> Option<PhraseMatch<'_>> {
        if self.keys.is_empty() {
            return None;
        }
        let tokens: Vec<&str> = text.split_whitespace().collect();

        for &count in &self.token_counts {
            if count > tokens.len() {
                continue;
            }
            let mut candidate = tokens[..count].join(" ");
            candidate.push(' ');
            trace!("probing reference phrase {candidate:?}");

            if let Some(key) = self.keys.get(&candidate).map(String::as_str) {
                let last = tokens[count - 1];
                let rest = last.as_ptr() as usize - text.as_ptr() as usize + last.len();
                trace!("matched reference phrase {key:?}");
                return Some(PhraseMatch {
                    key,
                    len: key.chars().count(),
                    tokens: count,
                    rest,
                });
            }
        }

        None
    }
}

fn phrase_key(raw: &str) -> Option<String> {
    let mut key = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if key.is_empty() {
        return None;
    }
    key.push(' ');
    Some(key)
}
