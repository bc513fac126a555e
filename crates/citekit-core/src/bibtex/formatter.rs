//! BibTeX dictionary output
//!
//! Renders canonical entities back to BibTeX/BibLaTeX text: one block per
//! entity, tab-indented `field = {value},` lines in a fixed field order,
//! closed by `}` and a blank line. Values are brace-balanced; with
//! `ascii_only` (the default) non-ASCII characters are NFKD-folded and
//! stripped before rendering.

use super::dialect::Dialect;
use super::entry::RawEntry;
use super::mapper::from_canonical;
use crate::latex::special::{balance_braces, fold_ascii};
use crate::model::Entity;

/// Output-side options.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Fold/strip non-ASCII characters in rendered values.
    pub ascii_only: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { ascii_only: true }
    }
}

// Fixed rendering order; fields not listed keep their entry order after
// the known ones.
const FIELD_ORDER: [&str; 30] = [
    "address",
    "location",
    "author",
    "booktitle",
    "chapter",
    "doi",
    "edition",
    "editor",
    "eprint",
    "howpublished",
    "institution",
    "isbn",
    "issn",
    "journal",
    "journaltitle",
    "language",
    "month",
    "note",
    "number",
    "organization",
    "pages",
    "year",
    "date",
    "publisher",
    "school",
    "series",
    "title",
    "type",
    "url",
    "volume",
];

/// Render canonical entities as a BibTeX/BibLaTeX file.
pub fn format_entities(entities: &[Entity], dialect: Dialect, opts: &FormatOptions) -> String {
    entities
        .iter()
        .map(|entity| format_entry(&from_canonical(entity, dialect), opts))
        .collect()
}

/// Render one raw entry.
pub fn format_entry(entry: &RawEntry, opts: &FormatOptions) -> String {
    let mut result = String::new();
    result.push('@');
    result.push_str(&entry.entry_type);
    result.push('{');
    result.push_str(&entry.cite_key);
    result.push_str(",\n");

    for (name, value) in ordered_fields(entry) {
        let value = if opts.ascii_only {
            fold_ascii(value)
        } else {
            value.to_string()
        };
        result.push('\t');
        result.push_str(name);
        result.push_str(" = {");
        result.push_str(&balance_braces(&value));
        result.push_str("},\n");
    }

    result.push_str("}\n\n");
    result
}

fn ordered_fields(entry: &RawEntry) -> Vec<(&str, &str)> {
    let mut fields: Vec<(usize, &str, &str)> = entry
        .fields
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let rank = FIELD_ORDER
                .iter()
                .position(|known| *known == f.name)
                .unwrap_or(FIELD_ORDER.len() + i);
            (rank, f.name.as_str(), f.value.as_str())
        })
        .collect();
    fields.sort_by_key(|(rank, _, _)| *rank);
    fields
        .into_iter()
        .map(|(_, name, value)| (name, value))
        .collect()
}
