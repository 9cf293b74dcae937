//! Load a gloss dataset into an immutable, in-memory lexeme store.
//!
//! The dataset is JSON Lines: one object per line with the fields `word`,
//! `pos` and `meanings`. Several lines may share a `word` (homonyms or
//! different parts of speech); they are kept under that headword in the order
//! they appear.
//!
//! Loading is all-or-nothing. A line that is not a well-formed record aborts
//! the load with an error naming the line, because every consumer assumes the
//! stored records are complete. Blank lines are skipped.
//!
//! # Example
//! ```no_run
//! use lexicon_db::{LexemeStore, LoadMode};
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = LexemeStore::load_with_mode("glosses.jsonl", LoadMode::Mmap)?;
//! for entry in store.glosses("koira") {
//!     println!("{} ({}): {:?}", entry.headword, entry.part_of_speech, entry.meanings);
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p lexicon-db --example stats -- <glosses.jsonl>`.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, Read};
use std::path::Path;

use anyhow::{Context, Result};
use lexicon_types::{GlossEntry, GlossLookup};
use memmap2::Mmap;

/// Strategy for reading the dataset file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file and parse straight from the mapping.
    Mmap,
    /// Read the file into an owned buffer first (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// Headword → glosses, built once and never mutated afterwards.
#[derive(Debug, Default, Clone)]
pub struct LexemeStore {
    entries: HashMap<String, Vec<GlossEntry>>,
    entry_count: usize,
}

impl LexemeStore {
    /// Load a JSON Lines dataset, memory-mapping the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    /// Load a JSON Lines dataset choosing between mmap and owned buffers.
    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        let buffer = load_file(path, mode)?;
        parse_jsonl(buffer.as_slice())
            .with_context(|| format!("loading glosses from {}", path.display()))
    }

    /// Parse a dataset already held in memory.
    pub fn from_jsonl_str(s: &str) -> Result<Self> {
        parse_jsonl(s.as_bytes())
    }

    /// Parse a dataset from any buffered reader (e.g. stdin).
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut store = Self::default();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("read line {}", lineno + 1))?;
            store.push_line(line.as_bytes(), lineno)?;
        }
        Ok(store)
    }

    /// Build a store from records that are already parsed.
    pub fn from_entries(entries: impl IntoIterator<Item = GlossEntry>) -> Self {
        let mut store = Self::default();
        for entry in entries {
            store.push(entry);
        }
        store
    }

    /// Glosses stored under `headword`, in load order; empty on a miss.
    pub fn glosses(&self, headword: &str) -> &[GlossEntry] {
        self.entries
            .get(headword)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether at least one gloss is stored under `headword`.
    pub fn contains(&self, headword: &str) -> bool {
        !self.glosses(headword).is_empty()
    }

    /// Number of distinct headwords.
    pub fn headword_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of gloss records across all headwords.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Number of meaning lines across all records.
    pub fn meaning_count(&self) -> usize {
        self.entries
            .values()
            .flatten()
            .map(|entry| entry.meanings.len())
            .sum()
    }

    /// Iterate over every headword (unordered).
    pub fn headwords(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Headwords with a meaning containing `query`, case-insensitively.
    ///
    /// The query is trimmed first; an empty query matches nothing. Results are
    /// sorted and unique.
    pub fn reverse_find(&self, query: &str) -> Vec<&str> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let found: BTreeSet<&str> = self
            .entries
            .iter()
            .filter(|(_, glosses)| {
                glosses
                    .iter()
                    .flat_map(|g| g.meanings.iter())
                    .any(|m| m.to_lowercase().contains(&needle))
            })
            .map(|(headword, _)| headword.as_str())
            .collect();
        found.into_iter().collect()
    }

    fn push(&mut self, entry: GlossEntry) {
        self.entry_count += 1;
        self.entries
            .entry(entry.headword.clone())
            .or_default()
            .push(entry);
    }

    fn push_line(&mut self, raw_line: &[u8], lineno: usize) -> Result<()> {
        let line = strip_cr(raw_line);
        if line.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let entry: GlossEntry = serde_json::from_slice(line)
            .with_context(|| format!("malformed gloss record on line {}", lineno + 1))?;
        self.push(entry);
        Ok(())
    }
}

impl GlossLookup for LexemeStore {
    fn glosses(&self, headword: &str) -> &[GlossEntry] {
        LexemeStore::glosses(self, headword)
    }
}

fn parse_jsonl(bytes: &[u8]) -> Result<LexemeStore> {
    let mut store = LexemeStore::default();
    for (lineno, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        store.push_line(raw_line, lineno)?;
    }
    Ok(store)
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    match mode {
        // Mapping an empty file fails on some platforms.
        LoadMode::Mmap if file.metadata().map(|m| m.len() > 0).unwrap_or(false) => {
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    if line.ends_with(b"\r") {
        &line[..line.len() - 1]
    } else {
        line
    }
}
