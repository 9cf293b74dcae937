use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem::size_of;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

pub const MAX_MATCHES: usize = 50;

// Rough per-entry cost of a BTreeMap slot on top of the node itself.
const MAP_ENTRY_OVERHEAD: usize = 48;

#[derive(Debug, Clone, Default)]
pub struct PrefixIndex {
    root: TrieNode,
    words: usize,
}

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: BTreeMap<char, TrieNode>,
    terminal: bool,
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read wordlist: {0}")]
    Io(#[from] std::io::Error),
}

impl PrefixIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build_from_file<P: AsRef<Path>>(path: P) -> Result<Arc<Self>, IndexError> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);

        let mut index = Self::empty();
        let mut lines = 0usize;
        let mut skipped = 0usize;
        for line in reader.lines() {
            let raw = line?;
            lines += 1;
            match normalize_word(&raw) {
                Some(word) => index.insert(word),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!("skipped {skipped} blank lines in wordlist");
        }
        info!(
            "indexed {} distinct words from {lines} lines ({} trie nodes)",
            index.word_count(),
            index.count_nodes()
        );
        Ok(Arc::new(index))
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::empty();
        for word in words {
            index.insert(word.as_ref());
        }
        index
    }

    pub fn insert(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.children.entry(ch).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.words += 1;
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        !word.is_empty() && self.walk(word).is_some_and(|node| node.terminal)
    }

    pub fn find_matches(&self, prefix: &str) -> Vec<String> {
        self.find_matches_limited(prefix, MAX_MATCHES)
    }

    /// Like [`find_matches`](Self::find_matches) with a tighter cap. The cap
    /// never exceeds [`MAX_MATCHES`].
    pub fn find_matches_limited(&self, prefix: &str, limit: usize) -> Vec<String> {
        let limit = limit.min(MAX_MATCHES);
        if prefix.is_empty() || limit == 0 {
            return Vec::new();
        }
        let Some(start) = self.walk(prefix) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut path = prefix.to_string();
        start.collect(&mut path, &mut out, limit);
        out
    }

    pub fn word_count(&self) -> usize {
        self.words
    }

    pub fn count_nodes(&self) -> usize {
        self.root.count()
    }

    pub fn estimated_memory_bytes(&self) -> usize {
        self.count_nodes() * (size_of::<TrieNode>() + MAP_ENTRY_OVERHEAD)
    }

    fn walk(&self, prefix: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }
}

impl TrieNode {
    // Depth-first, children in code point order; stops once `limit` is reached.
    fn collect(&self, path: &mut String, out: &mut Vec<String>, limit: usize) {
        if self.terminal {
            out.push(path.clone());
        }
        for (ch, child) in &self.children {
            if out.len() >= limit {
                return;
            }
            path.push(*ch);
            child.collect(path, out, limit);
            path.pop();
        }
    }

    fn count(&self) -> usize {
        1 + self.children.values().map(TrieNode::count).sum::<usize>()
    }
}

fn normalize_word(raw: &str) -> Option<&str> {
    let word = raw.trim().trim_matches('"');
    if word.is_empty() { None } else { Some(word) }
}
