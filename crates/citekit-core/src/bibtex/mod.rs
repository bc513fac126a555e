//! BibTeX format family
//!
//! Grammar, dialect data, field mapping, and dictionary output for BibTeX
//! and BibLaTeX, plus the registry hookup that exposes them as input
//! formats and output dictionaries. BibLaTeX registers first, so untagged
//! text sniffs as BibLaTeX and classic BibTeX is reached by forcing
//! `@bibtex/text`.

pub mod dialect;
pub mod entry;
pub mod formatter;
pub mod mapper;
pub mod parser;

pub use dialect::Dialect;
pub use entry::{RawEntry, RawField};
pub use formatter::{format_entities, format_entry, FormatOptions};
pub use mapper::{from_canonical, to_canonical};
pub use parser::{parse, ParseResult};

use tracing::warn;

use crate::error::Error;
use crate::registry::{
    FormatDescriptor, OutputDict, ParseOptions, ParseStep, Registry, Value,
};
use crate::validation::{validate, validate_strict};

/// Register both dialects' input formats and output dictionaries.
pub fn register(registry: &mut Registry) {
    for dialect in [Dialect::Biblatex, Dialect::Bibtex] {
        registry.register_input(text_descriptor(dialect));
        registry.register_input(object_descriptor(dialect));
        registry.register_output(OutputDict {
            name: dialect.name(),
            format: Box::new(move |entities, opts| {
                Ok(format_entities(entities, dialect, opts))
            }),
        });
    }
}

fn text_descriptor(dialect: Dialect) -> FormatDescriptor {
    // Only BibLaTeX sniffs raw text; the classic dialect shares the
    // grammar and is selected explicitly.
    let sniff: Option<Box<dyn Fn(&Value) -> Option<u8> + Send + Sync>> = match dialect {
        Dialect::Biblatex => Some(Box::new(|value| match value {
            Value::Text(text) if looks_like_bibtex(text) => Some(1),
            _ => None,
        })),
        Dialect::Bibtex => None,
    };
    FormatDescriptor {
        tag: dialect.text_tag(),
        sniff,
        parse: ParseStep::Sync(Box::new(move |value, _opts| {
            let Value::Text(text) = value else {
                return Err(Error::UnrecognizedInput);
            };
            let parsed = parse(&text)?;
            Ok(Value::Raw { dialect, entries: parsed.entries })
        })),
    }
}

fn object_descriptor(dialect: Dialect) -> FormatDescriptor {
    FormatDescriptor {
        tag: dialect.object_tag(),
        sniff: Some(Box::new(move |value| match value {
            Value::Raw { dialect: d, .. } if *d == dialect => Some(1),
            _ => None,
        })),
        parse: ParseStep::Sync(Box::new(move |value, opts: &ParseOptions| {
            let Value::Raw { entries, .. } = value else {
                return Err(Error::UnrecognizedInput);
            };
            let policy = dialect.policy();
            if opts.strict {
                validate_strict(&entries, &policy)?;
            } else {
                for violation in validate(&entries, &policy) {
                    warn!(policy = policy.name, "{violation}");
                }
            }
            let entities = entries
                .iter()
                .map(|entry| to_canonical(entry, dialect, opts.sentence_case, opts.name_order))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Entities(entities))
        })),
    }
}

fn looks_like_bibtex(text: &str) -> bool {
    let mut rest = text;
    while let Some(at) = rest.find('@') {
        rest = &rest[at + 1..];
        if rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetch;
    use crate::registry::chain::chain;

    #[test]
    fn test_text_recognition() {
        assert!(looks_like_bibtex("@book{a, title = {T}}"));
        assert!(looks_like_bibtex("% comment\n@misc{a,}"));
        assert!(!looks_like_bibtex("plain prose with an email@ sign"));
        assert!(!looks_like_bibtex("10.1021/ja01577a030"));
    }

    #[test]
    fn test_text_resolves_to_entities_as_biblatex() {
        let registry = Registry::with_defaults();
        let input = Value::Text(
            "@book{a, author = {Doe, Jane}, title = {T}, year = {1997}}".to_string(),
        );
        let entities = chain(
            &registry,
            input,
            &ParseOptions::default(),
            &StaticFetch::new(),
        )
        .unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].entry_type, "book");
        assert_eq!(entities[0].citation_key(), "a");
    }

    #[test]
    fn test_strict_validation_uses_forced_dialect() {
        let registry = Registry::with_defaults();
        let input = Value::Text("@book{c, author = {A}, title = {T}, year = {1}}".to_string());
        let opts = ParseOptions {
            strict: true,
            force_type: Some("@bibtex/text".to_string()),
            ..Default::default()
        };
        let err = chain(&registry, input, &opts, &StaticFetch::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid entries:\n  - c has missing fields: publisher"
        );
    }
}
