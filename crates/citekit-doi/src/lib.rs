//! DOI input format
//!
//! Registers `@doi/id` (bare DOIs) and `@doi/api` (doi.org URLs) as input
//! formats. Both are remote steps: each identifier becomes one request to
//! `https://doi.org/<doi>`, and each response body is expected to be a
//! CSL-JSON item, which doi.org serves under content negotiation. The
//! fetch collaborator must send the [`CSL_JSON_MIME`] accept header; the
//! fetchers in [`http`] (behind the `native` feature) do.
//!
//! A batch of identifiers is whitespace-separated; one unresolvable DOI
//! fails only its own item when resolved through a chain report.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use citekit_core::model::FieldValue;
use citekit_core::registry::{
    FetchRequest, FormatDescriptor, ParseStep, Registry, RemoteParse, Value,
};
use citekit_core::{Entity, Error};

#[cfg(feature = "native")]
pub mod http;

/// MIME type doi.org serves CSL-JSON under.
pub const CSL_JSON_MIME: &str = "application/vnd.citationstyles.csl+json";

lazy_static! {
    static ref DOI_PATTERN: Regex = Regex::new(r"^10\.\d{4,9}/\S+$").unwrap();
    static ref DOI_URL_PATTERN: Regex =
        Regex::new(r"^https?://(?:dx\.)?doi\.org/(10\.\d{4,9}/\S+)$").unwrap();
}

/// Register the DOI input formats.
pub fn register(registry: &mut Registry) {
    registry.register_input(descriptor("@doi/api", |token| {
        DOI_URL_PATTERN.is_match(token)
    }));
    registry.register_input(descriptor("@doi/id", |token| DOI_PATTERN.is_match(token)));
}

fn descriptor(tag: &'static str, matches: fn(&str) -> bool) -> FormatDescriptor {
    FormatDescriptor {
        tag,
        sniff: Some(Box::new(move |value| match value {
            Value::Text(text) if recognizes(text, matches) => Some(2),
            _ => None,
        })),
        parse: ParseStep::Remote(RemoteParse {
            requests: Box::new(|value| {
                let Value::Text(text) = value else { return Vec::new() };
                text.split_whitespace()
                    .filter_map(extract_doi)
                    .map(|doi| {
                        debug!(doi, "resolving identifier");
                        FetchRequest {
                            id: doi.to_string(),
                            url: format!("https://doi.org/{doi}"),
                        }
                    })
                    .collect()
            }),
            parse_response: Box::new(parse_response),
        }),
    }
}

/// Every whitespace-separated token must match; an empty input never does.
fn recognizes(text: &str, matches: fn(&str) -> bool) -> bool {
    let mut tokens = text.split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(matches)
}

/// The DOI inside a token, whether bare or in doi.org URL form.
fn extract_doi(token: &str) -> Option<&str> {
    if DOI_PATTERN.is_match(token) {
        return Some(token);
    }
    DOI_URL_PATTERN
        .captures(token)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

fn parse_response(request: &FetchRequest, body: &str) -> Result<Entity, Error> {
    let json: serde_json::Value = serde_json::from_str(body).map_err(|e| Error::Transport {
        id: request.id.clone(),
        message: format!("invalid CSL JSON in response: {e}"),
    })?;
    let mut entity = Entity::from_csl_json(&json, &request.id).ok_or_else(|| Error::Transport {
        id: request.id.clone(),
        message: "response is not a CSL item".to_string(),
    })?;
    if entity.get("DOI").is_none() {
        entity.set("DOI", FieldValue::Scalar(request.id.clone()));
    }
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use citekit_core::fetch::StaticFetch;
    use citekit_core::registry::chain::{chain, chain_report};
    use citekit_core::registry::ParseOptions;
    use citekit_core::FormatOptions;

    fn registry() -> Registry {
        let mut registry = Registry::with_defaults();
        register(&mut registry);
        registry
    }

    const CSL_BODY: &str = r#"{
        "type": "article-journal",
        "DOI": "10.1021/ja01577a030",
        "title": "Correlation of the Base Strengths of Amines",
        "author": [{"given": "H. K.", "family": "Hall"}],
        "container-title": "Journal of the American Chemical Society",
        "volume": "79",
        "page": "5441-5444",
        "issued": {"date-parts": [[1957, 10]]}
    }"#;

    #[test]
    fn test_doi_sniffing() {
        let registry = registry();
        let bare = Value::Text("10.1021/ja01577a030".to_string());
        assert_eq!(registry.sniff(&bare).unwrap().tag, "@doi/id");

        let url = Value::Text("https://doi.org/10.1021/ja01577a030".to_string());
        assert_eq!(registry.sniff(&url).unwrap().tag, "@doi/api");

        let list = Value::Text("10.1021/ja01577a030 10.1016/j.str.2008.03.017".to_string());
        assert_eq!(registry.sniff(&list).unwrap().tag, "@doi/id");

        let not_a_doi = Value::Text("10.1021/ja01577a030 and some prose".to_string());
        assert!(registry.sniff(&not_a_doi).is_none());
    }

    #[test]
    fn test_resolves_to_entity() {
        let registry = registry();
        let fetch = StaticFetch::new().ok("https://doi.org/10.1021/ja01577a030", CSL_BODY);
        let entities = chain(
            &registry,
            Value::Text("10.1021/ja01577a030".to_string()),
            &ParseOptions::default(),
            &fetch,
        )
        .unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].id, "10.1021/ja01577a030");
        assert_eq!(entities[0].entry_type, "article-journal");
        assert_eq!(
            entities[0].get("DOI").unwrap().as_scalar(),
            Some("10.1021/ja01577a030")
        );
    }

    #[test]
    fn test_url_form_resolves_like_bare_doi() {
        let registry = registry();
        let fetch = StaticFetch::new().ok("https://doi.org/10.1021/ja01577a030", CSL_BODY);
        let entities = chain(
            &registry,
            Value::Text("https://doi.org/10.1021/ja01577a030".to_string()),
            &ParseOptions::default(),
            &fetch,
        )
        .unwrap();
        assert_eq!(entities[0].id, "10.1021/ja01577a030");
    }

    #[test]
    fn test_not_found_fails_only_its_item() {
        let registry = registry();
        let fetch = StaticFetch::new()
            .ok("https://doi.org/10.1021/ja01577a030", CSL_BODY)
            .err(
                "https://doi.org/10.1016/does-not-exist",
                "Server responded with status code 404",
            );
        let report = chain_report(
            &registry,
            Value::Text("10.1021/ja01577a030 10.1016/does-not-exist".to_string()),
            &ParseOptions::default(),
            &fetch,
        )
        .unwrap();
        assert_eq!(report.entities.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "10.1016/does-not-exist");
        assert_eq!(
            report.failures[0].error.to_string(),
            "Server responded with status code 404"
        );
    }

    #[test]
    fn test_garbage_response_body() {
        let registry = registry();
        let fetch = StaticFetch::new().ok("https://doi.org/10.1021/ja01577a030", "<html>");
        let report = chain_report(
            &registry,
            Value::Text("10.1021/ja01577a030".to_string()),
            &ParseOptions::default(),
            &fetch,
        )
        .unwrap();
        assert!(report.entities.is_empty());
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_fetched_entity_formats_as_bibtex() {
        let registry = registry();
        let fetch = StaticFetch::new().ok("https://doi.org/10.1021/ja01577a030", CSL_BODY);
        let entities = chain(
            &registry,
            Value::Text("10.1021/ja01577a030".to_string()),
            &ParseOptions::default(),
            &fetch,
        )
        .unwrap();
        let output = registry
            .format("bibtex", &entities, &FormatOptions::default())
            .unwrap();
        assert!(output.starts_with("@article{10.1021/ja01577a030,\n"));
        assert!(output.contains("\tdoi = {10.1021/ja01577a030},\n"));
        assert!(output.contains("\tjournal = {Journal of the American Chemical Society},\n"));
        assert!(output.contains("\tyear = {1957},\n"));
        assert!(output.contains("\tmonth = {10},\n"));
        assert!(output.ends_with("}\n\n"));
    }
}
