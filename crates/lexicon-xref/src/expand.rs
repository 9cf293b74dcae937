use lexicon_types::{GlossEntry, GlossLookup};
use serde::Serialize;
use tracing::debug;

use crate::phrase::PhraseMatcher;

/// Deepest level a cross-reference is followed to.
///
/// Reference chains in the word-list are not guaranteed to be acyclic.
pub const MAX_DEPTH: u8 = 2;

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!', '?'];

/// Resolves reference phrases in meanings against a gloss lookup.
pub struct Expander<'a, L: GlossLookup + ?Sized> {
    lookup: &'a L,
    phrases: &'a PhraseMatcher,
}

/// Definitions spliced in for one meaning line.
#[derive(Clone, Debug, Serialize)]
pub struct Expansion<'a> {
    pub source_meaning: &'a str,
    pub phrase: &'a str,
    pub headword: String,
    pub depth: u8,
    pub entries: Vec<ExpandedEntry<'a>>,
}

/// A gloss record whose meanings carry their own expansions.
#[derive(Clone, Debug, Serialize)]
pub struct ExpandedEntry<'a> {
    #[serde(rename = "word")]
    pub headword: &'a str,
    #[serde(rename = "pos")]
    pub part_of_speech: &'a str,
    pub meanings: Vec<ExpandedMeaning<'a>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExpandedMeaning<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<Expansion<'a>>,
}

/// Every gloss of a headword with each meaning expanded from depth 1.
#[derive(Clone, Debug, Serialize)]
pub struct Definition<'a> {
    #[serde(rename = "word")]
    pub headword: &'a str,
    pub entries: Vec<ExpandedEntry<'a>>,
}

impl<'a, L: GlossLookup + ?Sized> Expander<'a, L> {
    pub fn new(lookup: &'a L, phrases: &'a PhraseMatcher) -> Self {
        Self { lookup, phrases }
    }

    /// Expand a single meaning line found at `depth` (1 for a top-level meaning).
    ///
    /// Returns `None` when the meaning has no reference phrase, when the
    /// referenced headword has no glosses, or when `depth` is outside
    /// `1..=MAX_DEPTH`. Meanings of the referenced entries are expanded at
    /// `depth + 1`, which yields nothing past [`MAX_DEPTH`].
    pub fn expand<'m>(&self, meaning: &'m str, depth: u8) -> Option<Expansion<'m>>
    where
        'a: 'm,
    {
        if depth == 0 || depth > MAX_DEPTH {
            return None;
        }

        let found = self.phrases.find_longest_prefix(meaning)?;
        let target = extract_target(&meaning[found.rest..]);
        if target.is_empty() {
            debug!("reference phrase {:?} has no target in {meaning:?}", found.key);
            return None;
        }

        let glosses = self.lookup.glosses(target);
        if glosses.is_empty() {
            debug!("cross-reference target {target:?} not found");
            return None;
        }

        Some(Expansion {
            source_meaning: meaning,
            phrase: found.phrase(),
            headword: target.to_string(),
            depth,
            entries: glosses
                .iter()
                .map(|entry| self.expand_entry(entry, depth + 1))
                .collect(),
        })
    }

    /// Annotate every gloss of `headword`; `None` if it has none.
    pub fn define(&self, headword: &str) -> Option<Definition<'a>> {
        let glosses = self.lookup.glosses(headword);
        let first = glosses.first()?;
        Some(Definition {
            headword: &first.headword,
            entries: glosses
                .iter()
                .map(|entry| self.expand_entry(entry, 1))
                .collect(),
        })
    }

    fn expand_entry(&self, entry: &'a GlossEntry, depth: u8) -> ExpandedEntry<'a> {
        ExpandedEntry {
            headword: &entry.headword,
            part_of_speech: &entry.part_of_speech,
            meanings: entry
                .meanings
                .iter()
                .map(|text| ExpandedMeaning {
                    text: text.as_str(),
                    expansion: self.expand(text, depth),
                })
                .collect(),
        }
    }
}

impl Expansion<'_> {
    /// Headwords referenced anywhere in this expansion, outermost first.
    pub fn referenced_headwords(&self) -> Vec<&str> {
        let mut out = vec![self.headword.as_str()];
        for entry in &self.entries {
            for meaning in &entry.meanings {
                if let Some(inner) = &meaning.expansion {
                    out.extend(inner.referenced_headwords());
                }
            }
        }
        out
    }
}

/// Reduce the text after a reference phrase to the headword it names.
///
/// Trailing punctuation is dropped, then anything from a `(` and anything
/// from a `;` onwards.
pub fn extract_target(remainder: &str) -> &str {
    let mut target = remainder.trim().trim_end_matches(TRAILING_PUNCTUATION);
    if let Some(idx) = target.find('(') {
        target = target[..idx].trim();
    }
    if let Some(idx) = target.find(';') {
        target = target[..idx].trim();
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn store(entries: &[(&str, &str, &[&str])]) -> HashMap<String, Vec<GlossEntry>> {
        let mut map: HashMap<String, Vec<GlossEntry>> = HashMap::new();
        for (word, pos, meanings) in entries {
            map.entry(word.to_string())
                .or_default()
                .push(GlossEntry::new(word, pos, meanings.iter().copied()));
        }
        map
    }

    #[test]
    fn expands_diminutive_one_level_and_stops_on_plain_meaning() {
        let glosses = store(&[
            ("koiranen", "noun", &["diminutive of koira."]),
            ("koira", "noun", &["dog"]),
        ]);
        let phrases = PhraseMatcher::from_phrases(["diminutive of"]);
        let expander = Expander::new(&glosses, &phrases);

        let expansion = expander.expand("diminutive of koira.", 1).unwrap();
        assert_eq!(expansion.headword, "koira");
        assert_eq!(expansion.phrase, "diminutive of");
        assert_eq!(expansion.depth, 1);
        assert_eq!(expansion.entries.len(), 1);

        let entry = &expansion.entries[0];
        assert_eq!(entry.headword, "koira");
        assert_eq!(entry.meanings.len(), 1);
        assert_eq!(entry.meanings[0].text, "dog");
        assert!(entry.meanings[0].expansion.is_none());
    }

    #[test]
    fn never_follows_a_chain_past_two_levels() {
        let glosses = store(&[
            ("a", "noun", &["see b"]),
            ("b", "noun", &["see c"]),
            ("c", "noun", &["see d"]),
            ("d", "noun", &["the end"]),
        ]);
        let phrases = PhraseMatcher::from_phrases(["see"]);
        let expander = Expander::new(&glosses, &phrases);

        let expansion = expander.expand("see b", 1).unwrap();
        assert_eq!(expansion.referenced_headwords(), vec!["b", "c"]);

        let c = &expansion.entries[0].meanings[0].expansion.as_ref().unwrap();
        assert_eq!(c.depth, 2);
        assert_eq!(c.entries[0].meanings[0].text, "see d");
        assert!(c.entries[0].meanings[0].expansion.is_none());
    }

    #[test]
    fn cyclic_references_terminate() {
        let glosses = store(&[("x", "noun", &["see y"]), ("y", "noun", &["see x"])]);
        let phrases = PhraseMatcher::from_phrases(["see"]);
        let expander = Expander::new(&glosses, &phrases);
        let definition = expander.define("x").unwrap();
        let top = definition.entries[0].meanings[0].expansion.as_ref().unwrap();
        assert_eq!(top.referenced_headwords(), vec!["y", "x"]);
    }

    #[test]
    fn no_phrase_means_no_expansion() {
        let glosses = store(&[("koira", "noun", &["dog"])]);
        let phrases = PhraseMatcher::from_phrases(["diminutive of"]);
        let expander = Expander::new(&glosses, &phrases);
        assert!(expander.expand("a small koira", 1).is_none());
    }

    #[test]
    fn unknown_or_empty_target_means_no_expansion() {
        let mut glosses = store(&[("koira", "noun", &["dog"])]);
        glosses.insert("tyhjä".into(), Vec::new());
        let phrases = PhraseMatcher::from_phrases(["synonym of"]);
        let expander = Expander::new(&glosses, &phrases);
        assert!(expander.expand("synonym of kissa", 1).is_none());
        assert!(expander.expand("synonym of tyhjä", 1).is_none());
        assert!(expander.expand("synonym of", 1).is_none());
        assert!(expander.expand("synonym of (archaic)", 1).is_none());
    }

    #[test]
    fn depth_outside_range_yields_nothing() {
        let glosses = store(&[("koira", "noun", &["dog"])]);
        let phrases = PhraseMatcher::from_phrases(["see"]);
        let expander = Expander::new(&glosses, &phrases);
        assert!(expander.expand("see koira", 0).is_none());
        assert!(expander.expand("see koira", 3).is_none());
        assert_eq!(expander.expand("see koira", 2).unwrap().depth, 2);
    }

    #[test]
    fn empty_phrase_list_expands_nothing() {
        let glosses = store(&[("a", "noun", &["see b"]), ("b", "noun", &["bee"])]);
        let phrases = PhraseMatcher::empty();
        let expander = Expander::new(&glosses, &phrases);
        let definition = expander.define("a").unwrap();
        assert!(definition.entries[0].meanings[0].expansion.is_none());
    }

    #[test]
    fn expands_every_homonym_of_the_target() {
        let glosses = store(&[
            ("kuusi", "num", &["six"]),
            ("kuusi", "noun", &["spruce"]),
        ]);
        let phrases = PhraseMatcher::from_phrases(["see"]);
        let expander = Expander::new(&glosses, &phrases);
        let expansion = expander.expand("see kuusi.", 1).unwrap();
        let pos: Vec<&str> = expansion.entries.iter().map(|e| e.part_of_speech).collect();
        assert_eq!(pos, vec!["num", "noun"]);
    }

    #[test]
    fn define_returns_none_for_unknown_headword() {
        let glosses = store(&[("koira", "noun", &["dog"])]);
        let phrases = PhraseMatcher::empty();
        let expander = Expander::new(&glosses, &phrases);
        assert!(expander.define("kissa").is_none());
        assert_eq!(expander.define("koira").unwrap().entries.len(), 1);
    }

    #[test]
    fn extracts_targets() {
        assert_eq!(extract_target(" koira."), "koira");
        assert_eq!(extract_target("koira?!"), "koira");
        assert_eq!(extract_target("koira (colloquial)"), "koira");
        assert_eq!(extract_target("koira; hound"), "koira");
        assert_eq!(extract_target("koira (dated); hound."), "koira");
        assert_eq!(extract_target("iso koira"), "iso koira");
        assert_eq!(extract_target("   "), "");
    }

    #[test]
    fn serializes_with_dataset_field_names() {
        let glosses = store(&[
            ("hauva", "noun", &["synonym of koira (colloquial)"]),
            ("koira", "noun", &["dog"]),
        ]);
        let phrases = PhraseMatcher::from_phrases(["synonym of"]);
        let expander = Expander::new(&glosses, &phrases);
        let value = serde_json::to_value(expander.define("hauva").unwrap()).unwrap();
        assert_eq!(value["word"], "hauva");
        let expansion = &value["entries"][0]["meanings"][0]["expansion"];
        assert_eq!(expansion["headword"], "koira");
        assert_eq!(expansion["entries"][0]["pos"], "noun");
        assert!(expansion["entries"][0]["meanings"][0].get("expansion").is_none());
    }
}
