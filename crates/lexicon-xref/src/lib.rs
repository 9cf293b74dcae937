//! Cross-reference resolution for gloss meanings.
//!
//! Many meanings in the word-list do not define a word directly but point at
//! another headword: `diminutive of koira.`, `synonym of hauva (colloquial)`.
//! This crate recognises those lead-in phrases and splices the referenced
//! definitions into the output, two levels deep.
//!
//! # How it works
//! 1. [`PhraseMatcher`] finds the longest known reference phrase at the start
//!    of a meaning, matching on whole words so `see` never fires inside
//!    `seesaw`.
//! 2. [`Expander`] strips the phrase, cleans the remainder down to a headword
//!    (trailing punctuation, parenthesised notes, `;` alternates) and looks it
//!    up through a caller-provided [`GlossLookup`].
//! 3. Each referenced meaning is expanded once more; anything past
//!    [`MAX_DEPTH`] is dropped, since reference chains in the data may loop.
//!
//! Misses at any step are an empty result, never an error.
//!
//! # Example
//! ```no_run
//! use lexicon_db::LexemeStore;
//! use lexicon_xref::{Expander, PhraseMatcher};
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = LexemeStore::load("glosses.jsonl")?;
//! let phrases = PhraseMatcher::load("go-deeper.txt")?;
//! let expander = Expander::new(&store, &phrases);
//!
//! if let Some(expansion) = expander.expand("diminutive of koira.", 1) {
//!     for entry in &expansion.entries {
//!         println!("~> {} ({})", entry.headword, entry.part_of_speech);
//!     }
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p lexicon-xref --example define -- <glosses> <phrases> <word>`.

mod expand;
mod phrase;

pub use expand::{
    Definition, ExpandedEntry, ExpandedMeaning, Expander, Expansion, MAX_DEPTH, extract_target,
};
pub use lexicon_types::{GlossEntry, GlossLookup};
pub use phrase::{PhraseMatch, PhraseMatcher};
