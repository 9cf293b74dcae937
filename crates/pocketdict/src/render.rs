//! Plain-text rendering of annotated definitions.

use std::fmt::Write;

use lexicon_xref::{Definition, ExpandedEntry, Expansion};

struct Indent {
    entry: &'static str,
    meaning: &'static str,
}

const REFERENCE_INDENT: [Indent; 2] = [
    Indent {
        entry: "  ~> ",
        meaning: "      - ",
    },
    Indent {
        entry: "         ~> ",
        meaning: "            - ",
    },
];

pub fn render_definition(definition: &Definition<'_>) -> String {
    let mut out = String::new();
    for (i, entry) in definition.entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{} ({})\n", entry.headword, entry.part_of_speech);
        for meaning in &entry.meanings {
            let _ = writeln!(out, "- {}", meaning.text);
            if let Some(expansion) = &meaning.expansion {
                render_expansion(&mut out, expansion);
            }
        }
    }
    out
}

pub fn not_found(word: &str) -> String {
    format!("'{word}' not found.")
}

fn render_expansion(out: &mut String, expansion: &Expansion<'_>) {
    let level = usize::from(expansion.depth.saturating_sub(1)).min(REFERENCE_INDENT.len() - 1);
    let indent = &REFERENCE_INDENT[level];
    for entry in &expansion.entries {
        render_reference(out, entry, indent);
    }
}

fn render_reference(out: &mut String, entry: &ExpandedEntry<'_>, indent: &Indent) {
    let _ = writeln!(
        out,
        "{}{} ({})",
        indent.entry, entry.headword, entry.part_of_speech
    );
    for meaning in &entry.meanings {
        let _ = writeln!(out, "{}{}", indent.meaning, meaning.text);
        if let Some(inner) = &meaning.expansion {
            render_expansion(out, inner);
        }
    }
}
