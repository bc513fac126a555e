//! Field mapping between raw BibTeX entries and the canonical model
//!
//! Table-driven and bidirectional: every field in a dialect's declared set
//! maps losslessly in both directions; fields outside the set pass through
//! byte-for-byte under their own names, so custom fields survive a round
//! trip untouched.

use super::dialect::Dialect;
use super::entry::RawEntry;
use crate::error::Error;
use crate::latex::{self, sentence_case, SentenceCase};
use crate::model::name::{format_name_list, parse_name_list, split_top_level, NameOrder};
use crate::model::{DateValue, Entity, FieldValue};

/// Raw field names that fold into the structured `issued` date.
const DATE_FIELDS: [&str; 3] = ["year", "month", "date"];

/// Convert a raw entry to a canonical entity.
///
/// Sentence casing applies to the title only; the entry's declared
/// languages gate the `english` mode.
pub fn to_canonical(
    entry: &RawEntry,
    dialect: Dialect,
    mode: SentenceCase,
    name_order: NameOrder,
) -> Result<Entity, Error> {
    let csl_type = dialect.csl_type(&entry.entry_type).unwrap_or("document");
    let mut entity = Entity::new(entry.cite_key.clone(), csl_type);
    entity.set(
        "citation-key",
        FieldValue::Scalar(entry.cite_key.clone()),
    );

    let languages = declared_languages(entry);
    let mut issued_emitted = false;

    for field in &entry.fields {
        let name = field.name.as_str();
        let value = field.value.as_str();

        if DATE_FIELDS.contains(&name) {
            if issued_emitted {
                continue;
            }
            if let Some(date) = assemble_date(entry, dialect) {
                entity.set("issued", FieldValue::Date(date));
                issued_emitted = true;
            } else {
                // Nothing assemblable (e.g. a month with no year); keep
                // the bare field rather than drop it.
                entity.set(name.to_string(), FieldValue::Scalar(value.to_string()));
            }
            continue;
        }

        match name {
            "title" => {
                let tree = latex::interpret(value)?;
                entity.set(
                    "title",
                    FieldValue::Scalar(sentence_case::to_sentence_case(&tree, mode, &languages)),
                );
            }
            "author" | "editor" => {
                let plain = latex::render_plain(&latex::interpret(value)?);
                entity.set(name.to_string(), FieldValue::Names(parse_name_list(&plain, name_order)));
            }
            "language" => {
                let parts: Vec<String> = split_top_level(value, " and ")
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                let fv = if parts.len() > 1 {
                    FieldValue::List(parts)
                } else {
                    FieldValue::Scalar(value.to_string())
                };
                entity.set("language", fv);
            }
            _ => {
                if let Some(canonical) = canonical_field_name(name, dialect) {
                    let plain = latex::render_plain(&latex::interpret(value)?);
                    entity.set(canonical, FieldValue::Scalar(plain));
                } else {
                    // Outside the declared set: pass through unchanged.
                    entity.set(name.to_string(), FieldValue::Scalar(value.to_string()));
                }
            }
        }
    }

    Ok(entity)
}

/// Convert a canonical entity back to a raw entry for the dialect.
pub fn from_canonical(entity: &Entity, dialect: Dialect) -> RawEntry {
    let entry_type = dialect.entry_type_for_csl(&entity.entry_type);
    let mut entry = RawEntry::new(entity.citation_key().to_string(), entry_type);

    for field in &entity.fields {
        let name = field.name.as_str();
        if name == "citation-key" {
            continue;
        }

        match (&field.value, name) {
            (FieldValue::Date(date), "issued") => match dialect {
                Dialect::Bibtex => {
                    if let Some(year) = date.year() {
                        entry.add_field("year", year.to_string());
                        if let Some(month) = date.month() {
                            entry.add_field("month", month.to_string());
                        }
                    } else {
                        entry.add_field("year", date.to_iso());
                    }
                }
                Dialect::Biblatex => {
                    entry.add_field("date", date.to_iso());
                }
            },
            (FieldValue::Names(names), _) => {
                entry.add_field(name, format_name_list(names));
            }
            (FieldValue::List(items), "language") => {
                entry.add_field("language", items.join(" and "));
            }
            (FieldValue::Scalar(value), "title") => {
                entry.add_field(
                    "title",
                    latex::special::balance_braces(&latex::special::markup_to_braces(value)),
                );
            }
            (FieldValue::Scalar(value), _) => {
                entry.add_field(raw_field_name(name, dialect, &entity.entry_type), value.clone());
            }
            (FieldValue::List(items), _) => {
                entry.add_field(name, items.join(" and "));
            }
            (FieldValue::Date(date), _) => {
                entry.add_field(name, date.to_iso());
            }
        }
    }

    entry
}

/// Languages declared on the raw entry, before mapping.
fn declared_languages(entry: &RawEntry) -> Vec<String> {
    match entry.get_field("language") {
        Some(value) => split_top_level(value, " and ")
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => Vec::new(),
    }
}

/// Fold the entry's date fields into one structured date. BibLaTeX's
/// `date` wins over `year`/`month` when both are present.
fn assemble_date(entry: &RawEntry, dialect: Dialect) -> Option<DateValue> {
    if dialect == Dialect::Biblatex {
        if let Some(date) = entry.get_field("date") {
            return Some(DateValue::from_iso(date));
        }
    }
    let year = entry.get_field("year")?;
    Some(DateValue::from_year_month(year, entry.get_field("month")))
}

/// Canonical name for a declared raw field; `None` means pass-through.
fn canonical_field_name(raw: &str, dialect: Dialect) -> Option<&'static str> {
    let shared = match raw {
        "publisher" => "publisher",
        "edition" => "edition",
        "note" => "note",
        "volume" => "volume",
        "abstract" => "abstract",
        "number" => "issue",
        "pages" => "page",
        "chapter" => "chapter-number",
        "series" => "collection-title",
        "booktitle" => "container-title",
        "doi" => "DOI",
        "isbn" => "ISBN",
        "issn" => "ISSN",
        "url" => "URL",
        "type" => "genre",
        "keywords" => "keyword",
        "version" => "version",
        _ => "",
    };
    if !shared.is_empty() {
        return Some(shared);
    }
    match (dialect, raw) {
        (Dialect::Bibtex, "address") => Some("publisher-place"),
        (Dialect::Bibtex, "journal") => Some("container-title"),
        (Dialect::Biblatex, "location") => Some("publisher-place"),
        (Dialect::Biblatex, "address") => Some("publisher-place"),
        (Dialect::Biblatex, "journaltitle") => Some("container-title"),
        (Dialect::Biblatex, "journal") => Some("container-title"),
        _ => None,
    }
}

/// Raw name for a canonical field on the way out; container titles depend
/// on the item type, everything else is a straight reverse lookup.
fn raw_field_name(canonical: &str, dialect: Dialect, csl_type: &str) -> String {
    let name = match canonical {
        "publisher-place" => match dialect {
            Dialect::Bibtex => "address",
            Dialect::Biblatex => "location",
        },
        "container-title" => {
            if matches!(csl_type, "chapter" | "paper-conference") {
                "booktitle"
            } else {
                match dialect {
                    Dialect::Bibtex => "journal",
                    Dialect::Biblatex => "journaltitle",
                }
            }
        }
        "collection-title" => "series",
        "chapter-number" => "chapter",
        "page" => "pages",
        "issue" => "number",
        "DOI" => "doi",
        "ISBN" => "isbn",
        "ISSN" => "issn",
        "URL" => "url",
        "genre" => "type",
        "keyword" => "keywords",
        other => other,
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bibtex::parser::parse;

    fn first_entry(input: &str) -> RawEntry {
        parse(input).unwrap().entries.remove(0)
    }

    #[test]
    fn test_basic_mapping() {
        let entry = first_entry(
            r#"@book{a, title = {T}, author = {Smith, John}, publisher = {P}, year = 1997, address = {Kyiv}}"#,
        );
        let entity = to_canonical(
            &entry,
            Dialect::Bibtex,
            SentenceCase::Never,
            NameOrder::default(),
        )
        .unwrap();

        assert_eq!(entity.entry_type, "book");
        assert_eq!(entity.id, "a");
        assert_eq!(entity.get("title").unwrap().as_scalar(), Some("T"));
        assert_eq!(
            entity.get("publisher-place").unwrap().as_scalar(),
            Some("Kyiv")
        );
        assert_eq!(
            entity.get("issued"),
            Some(&FieldValue::Date(DateValue::Parts(vec![vec![1997]])))
        );
        match entity.get("author").unwrap() {
            FieldValue::Names(names) => {
                assert_eq!(names[0].family.as_deref(), Some("Smith"));
                assert_eq!(names[0].given.as_deref(), Some("John"));
            }
            other => panic!("expected names, got {other:?}"),
        }
    }

    #[test]
    fn test_biblatex_date_field() {
        let entry = first_entry(r#"@book{a, title = {T}, author = {A}, date = {1997-05-03}}"#);
        let entity = to_canonical(
            &entry,
            Dialect::Biblatex,
            SentenceCase::Never,
            NameOrder::default(),
        )
        .unwrap();
        assert_eq!(
            entity.get("issued"),
            Some(&FieldValue::Date(DateValue::Parts(vec![vec![1997, 5, 3]])))
        );

        let back = from_canonical(&entity, Dialect::Biblatex);
        assert_eq!(back.get_field("date"), Some("1997-05-03"));
    }

    #[test]
    fn test_year_month_round_trip() {
        let entry = first_entry(r#"@article{a, title = {T}, journal = {J}, year = 2020, month = mar}"#);
        let entity = to_canonical(
            &entry,
            Dialect::Bibtex,
            SentenceCase::Never,
            NameOrder::default(),
        )
        .unwrap();
        let back = from_canonical(&entity, Dialect::Bibtex);
        assert_eq!(back.get_field("year"), Some("2020"));
        assert_eq!(back.get_field("month"), Some("3"));
        assert_eq!(back.get_field("journal"), Some("J"));
    }

    #[test]
    fn test_month_without_year_is_kept() {
        let entry = first_entry(r#"@misc{a, month = {5}, note = {N}}"#);
        let entity = to_canonical(
            &entry,
            Dialect::Bibtex,
            SentenceCase::Never,
            NameOrder::default(),
        )
        .unwrap();
        assert_eq!(entity.get("issued"), None);
        assert_eq!(entity.get("month").unwrap().as_scalar(), Some("5"));
        let back = from_canonical(&entity, Dialect::Bibtex);
        assert_eq!(back.get_field("month"), Some("5"));
        assert_eq!(back.get_field("note"), Some("N"));
    }

    #[test]
    fn test_container_title_depends_on_type() {
        let entry = first_entry(
            r#"@inproceedings{a, title = {T}, author = {A}, booktitle = {Proc}, year = 2020}"#,
        );
        let entity = to_canonical(
            &entry,
            Dialect::Bibtex,
            SentenceCase::Never,
            NameOrder::default(),
        )
        .unwrap();
        assert_eq!(entity.entry_type, "paper-conference");
        let back = from_canonical(&entity, Dialect::Bibtex);
        assert_eq!(back.get_field("booktitle"), Some("Proc"));
    }

    #[test]
    fn test_custom_fields_pass_through_unchanged() {
        let entry = first_entry(r#"@misc{a, mycustomfield = {Sch\"odinger raw}}"#);
        let entity = to_canonical(
            &entry,
            Dialect::Bibtex,
            SentenceCase::Never,
            NameOrder::default(),
        )
        .unwrap();
        assert_eq!(
            entity.get("mycustomfield").unwrap().as_scalar(),
            Some("Sch\\\"odinger raw")
        );
        let back = from_canonical(&entity, Dialect::Bibtex);
        assert_eq!(back.get_field("mycustomfield"), Some("Sch\\\"odinger raw"));
    }

    #[test]
    fn test_language_list() {
        let entry = first_entry(r#"@book{a, title = {T}, language = {English and en-US}}"#);
        let entity = to_canonical(
            &entry,
            Dialect::Bibtex,
            SentenceCase::Never,
            NameOrder::default(),
        )
        .unwrap();
        assert_eq!(
            entity.get("language"),
            Some(&FieldValue::List(vec!["English".into(), "en-US".into()]))
        );
    }

    #[test]
    fn test_sentence_case_gated_by_language() {
        let entry = first_entry(r#"@book{a, title = {Lowercase Lowercase}, language = {French}}"#);
        let entity = to_canonical(
            &entry,
            Dialect::Bibtex,
            SentenceCase::English,
            NameOrder::default(),
        )
        .unwrap();
        assert_eq!(
            entity.get("title").unwrap().as_scalar(),
            Some("Lowercase Lowercase")
        );
    }

    #[test]
    fn test_protected_title_markup_round_trip() {
        let entry = first_entry(r#"@book{a, title = {{lowercase}}, language = {French}}"#);
        let entity = to_canonical(
            &entry,
            Dialect::Bibtex,
            SentenceCase::Always,
            NameOrder::default(),
        )
        .unwrap();
        assert_eq!(
            entity.get("title").unwrap().as_scalar(),
            Some("<span class=\"nocase\">lowercase</span>")
        );
        let back = from_canonical(&entity, Dialect::Bibtex);
        assert_eq!(back.get_field("title"), Some("{lowercase}"));
    }
}
