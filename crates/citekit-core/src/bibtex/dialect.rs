//! Dialect data: entry types, required-field policies, CSL type mapping
//!
//! BibTeX and BibLaTeX share a grammar but differ in their entry-type and
//! field vocabularies. Everything here is data so new types can be added
//! without touching the validator or mapper logic.

use crate::validation::{FieldGroups, Policy};

/// A named variant of the BibTeX format family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Bibtex,
    Biblatex,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Bibtex => "bibtex",
            Dialect::Biblatex => "biblatex",
        }
    }

    /// Input tag for the raw text representation of this dialect.
    pub fn text_tag(&self) -> &'static str {
        match self {
            Dialect::Bibtex => "@bibtex/text",
            Dialect::Biblatex => "@biblatex/text",
        }
    }

    /// Input tag for the parsed entry-object representation.
    pub fn object_tag(&self) -> &'static str {
        match self {
            Dialect::Bibtex => "@bibtex/entry+object",
            Dialect::Biblatex => "@biblatex/entry+object",
        }
    }

    /// The validation policy for this dialect.
    pub fn policy(&self) -> Policy {
        match self {
            Dialect::Bibtex => Policy::new("bibtex", bibtex_required),
            Dialect::Biblatex => Policy::new("biblatex", biblatex_required),
        }
    }

    /// CSL item type for an entry type known to this dialect.
    pub fn csl_type(&self, entry_type: &str) -> Option<&'static str> {
        let table = match self {
            Dialect::Bibtex => BIBTEX_TYPES,
            Dialect::Biblatex => BIBLATEX_TYPES,
        };
        table
            .iter()
            .find(|row| row.name == entry_type || row.aliases.contains(&entry_type))
            .map(|row| row.csl)
    }

    /// Entry type to use when formatting a CSL item type; `misc` when the
    /// CSL type has no closer match.
    pub fn entry_type_for_csl(&self, csl: &str) -> &'static str {
        let table = match self {
            Dialect::Bibtex => BIBTEX_TYPES,
            Dialect::Biblatex => BIBLATEX_TYPES,
        };
        table
            .iter()
            .find(|row| row.csl == csl)
            .map(|row| row.name)
            .unwrap_or("misc")
    }
}

struct TypeRow {
    name: &'static str,
    aliases: &'static [&'static str],
    csl: &'static str,
    required: FieldGroups,
}

// Classic BibTeX required fields, per the BibTeX manual; alternatives
// within a group are joined by "/" in validation reports.
static BIBTEX_TYPES: &[TypeRow] = &[
    TypeRow {
        name: "article",
        aliases: &[],
        csl: "article-journal",
        required: &[&["author"], &["title"], &["journal"], &["year"]],
    },
    TypeRow {
        name: "book",
        aliases: &[],
        csl: "book",
        required: &[&["author", "editor"], &["title"], &["publisher"], &["year"]],
    },
    TypeRow {
        name: "booklet",
        aliases: &[],
        csl: "pamphlet",
        required: &[&["title"]],
    },
    TypeRow {
        name: "inbook",
        aliases: &[],
        csl: "chapter",
        required: &[
            &["author", "editor"],
            &["title"],
            &["chapter", "pages"],
            &["publisher"],
            &["year"],
        ],
    },
    TypeRow {
        name: "incollection",
        aliases: &[],
        csl: "chapter",
        required: &[&["author"], &["title"], &["booktitle"], &["publisher"], &["year"]],
    },
    TypeRow {
        name: "inproceedings",
        aliases: &["conference"],
        csl: "paper-conference",
        required: &[&["author"], &["title"], &["booktitle"], &["year"]],
    },
    TypeRow {
        name: "manual",
        aliases: &[],
        csl: "report",
        required: &[&["title"]],
    },
    TypeRow {
        name: "mastersthesis",
        aliases: &[],
        csl: "thesis",
        required: &[&["author"], &["title"], &["school"], &["year"]],
    },
    TypeRow { name: "misc", aliases: &[], csl: "document", required: &[] },
    TypeRow {
        name: "phdthesis",
        aliases: &[],
        csl: "thesis",
        required: &[&["author"], &["title"], &["school"], &["year"]],
    },
    TypeRow {
        name: "proceedings",
        aliases: &[],
        csl: "book",
        required: &[&["title"], &["year"]],
    },
    TypeRow {
        name: "techreport",
        aliases: &[],
        csl: "report",
        required: &[&["author"], &["title"], &["institution"], &["year"]],
    },
    TypeRow {
        name: "unpublished",
        aliases: &[],
        csl: "manuscript",
        required: &[&["author"], &["title"], &["note"]],
    },
];

// BibLaTeX required fields, per the biblatex package documentation. The
// year/date group reflects that `date` subsumes `year`.
static BIBLATEX_TYPES: &[TypeRow] = &[
    TypeRow {
        name: "article",
        aliases: &[],
        csl: "article-journal",
        required: &[
            &["author"],
            &["title"],
            &["journaltitle", "journal"],
            &["year", "date"],
        ],
    },
    TypeRow {
        name: "book",
        aliases: &["mvbook"],
        csl: "book",
        required: &[&["author"], &["title"], &["year", "date"]],
    },
    TypeRow {
        name: "inbook",
        aliases: &["bookinbook", "suppbook"],
        csl: "chapter",
        required: &[&["author"], &["title"], &["booktitle"], &["year", "date"]],
    },
    TypeRow {
        name: "booklet",
        aliases: &[],
        csl: "pamphlet",
        required: &[&["author", "editor"], &["title"], &["year", "date"]],
    },
    TypeRow {
        name: "collection",
        aliases: &["mvcollection"],
        csl: "book",
        required: &[&["editor"], &["title"], &["year", "date"]],
    },
    TypeRow {
        name: "incollection",
        aliases: &["suppcollection"],
        csl: "chapter",
        required: &[&["author"], &["title"], &["booktitle"], &["year", "date"]],
    },
    TypeRow {
        name: "dataset",
        aliases: &[],
        csl: "dataset",
        required: &[&["author", "editor"], &["title"], &["year", "date"]],
    },
    TypeRow {
        name: "manual",
        aliases: &[],
        csl: "report",
        required: &[&["author", "editor"], &["title"], &["year", "date"]],
    },
    TypeRow {
        name: "misc",
        aliases: &[],
        csl: "document",
        required: &[&["author", "editor"], &["title"], &["year", "date"]],
    },
    TypeRow {
        name: "online",
        aliases: &["electronic", "www"],
        csl: "webpage",
        required: &[
            &["author", "editor"],
            &["title"],
            &["year", "date"],
            &["url", "doi", "eprint"],
        ],
    },
    TypeRow {
        name: "patent",
        aliases: &[],
        csl: "patent",
        required: &[&["author"], &["title"], &["number"], &["year", "date"]],
    },
    TypeRow {
        name: "periodical",
        aliases: &[],
        csl: "periodical",
        required: &[&["editor"], &["title"], &["year", "date"]],
    },
    TypeRow {
        name: "proceedings",
        aliases: &["mvproceedings"],
        csl: "book",
        required: &[&["title"], &["year", "date"]],
    },
    TypeRow {
        name: "inproceedings",
        aliases: &["conference"],
        csl: "paper-conference",
        required: &[&["author"], &["title"], &["booktitle"], &["year", "date"]],
    },
    TypeRow {
        name: "report",
        aliases: &["techreport"],
        csl: "report",
        required: &[
            &["author"],
            &["title"],
            &["type"],
            &["institution"],
            &["year", "date"],
        ],
    },
    TypeRow {
        name: "thesis",
        aliases: &["phdthesis", "mastersthesis"],
        csl: "thesis",
        required: &[&["author"], &["title"], &["institution", "school"], &["year", "date"]],
    },
    TypeRow {
        name: "unpublished",
        aliases: &[],
        csl: "manuscript",
        required: &[&["author"], &["title"], &["year", "date"]],
    },
    TypeRow {
        name: "software",
        aliases: &[],
        csl: "software",
        required: &[&["author", "editor"], &["title"], &["year", "date"]],
    },
];

fn bibtex_required(entry_type: &str) -> Option<FieldGroups> {
    lookup_required(BIBTEX_TYPES, entry_type)
}

fn biblatex_required(entry_type: &str) -> Option<FieldGroups> {
    lookup_required(BIBLATEX_TYPES, entry_type)
}

fn lookup_required(table: &'static [TypeRow], entry_type: &str) -> Option<FieldGroups> {
    table
        .iter()
        .find(|row| row.name == entry_type || row.aliases.contains(&entry_type))
        .map(|row| row.required)
}
