use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use lexicon_db::{LexemeStore, LoadMode};

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p lexicon-db --example stats -- <glosses.jsonl>")?;

    let store = LexemeStore::load_with_mode(&path, LoadMode::Mmap)
        .with_context(|| format!("loading glosses from {}", path.display()))?;

    let mut homonyms = 0usize;
    let mut longest: Option<(&str, usize)> = None;
    for headword in store.headwords() {
        let glosses = store.glosses(headword);
        if glosses.len() > 1 {
            homonyms += 1;
        }
        let meanings: usize = glosses.iter().map(|g| g.meanings.len()).sum();
        if longest.is_none_or(|(_, n)| meanings > n) {
            longest = Some((headword, meanings));
        }
    }

    println!("Dataset: {}", path.display());
    println!("Headwords     : {}", store.headword_count());
    println!("Gloss records : {}", store.entry_count());
    println!("Meaning lines : {}", store.meaning_count());
    println!("Headwords with several records: {}", homonyms);
    if let Some((word, n)) = longest {
        println!("Most meanings : {} ({})", word, n);
    }

    for word in ["koira", "kissa", "olla"] {
        println!("Headword '{}' present? {}", word, store.contains(word));
    }

    Ok(())
}
