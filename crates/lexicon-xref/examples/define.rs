use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use lexicon_db::{LexemeStore, LoadMode};
use lexicon_xref::{ExpandedEntry, Expander, PhraseMatcher};

const USAGE: &str =
    "usage: cargo run -p lexicon-xref --example define -- <glosses.jsonl> <phrases.txt> <word>...";

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let glosses_path = args.next().map(PathBuf::from).context(USAGE)?;
    let phrases_path = args.next().map(PathBuf::from).context(USAGE)?;
    let words: Vec<String> = args.collect();
    if words.is_empty() {
        bail!(USAGE);
    }

    let store = LexemeStore::load_with_mode(&glosses_path, LoadMode::Mmap)
        .with_context(|| format!("loading glosses from {}", glosses_path.display()))?;
    let phrases = PhraseMatcher::load(&phrases_path)
        .with_context(|| format!("loading phrases from {}", phrases_path.display()))?;
    let expander = Expander::new(&store, &phrases);

    println!("Glosses: {} ({} headwords)", glosses_path.display(), store.headword_count());
    println!("Phrases: {} ({} phrases)", phrases_path.display(), phrases.len());

    for word in words {
        println!("\n{word}");
        match expander.define(&word) {
            Some(definition) => {
                for entry in &definition.entries {
                    print_entry(entry, 1);
                }
            }
            None => println!("  (not found)"),
        }
    }

    Ok(())
}

fn print_entry(entry: &ExpandedEntry<'_>, level: usize) {
    let pad = "  ".repeat(level);
    println!("{pad}{} [{}]", entry.headword, entry.part_of_speech);
    for meaning in &entry.meanings {
        println!("{pad}  - {}", meaning.text);
        if let Some(expansion) = &meaning.expansion {
            for inner in &expansion.entries {
                print_entry(inner, level + 2);
            }
        }
    }
}
