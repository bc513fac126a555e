//! Chain resolution across registered formats.

use citekit_core::fetch::StaticFetch;
use citekit_core::registry::chain::{chain, chain_async};
use citekit_core::registry::{ParseOptions, Registry, Value};
use citekit_core::FieldValue;
use serde_json::json;

#[test]
fn test_csl_json_object_resolves_directly() {
    let registry = Registry::with_defaults();
    let input = Value::Json(json!({
        "id": "doe2020",
        "type": "article-journal",
        "title": "A Title",
        "author": [{"given": "Jane", "family": "Doe"}],
        "issued": {"date-parts": [[2020, 3]]}
    }));
    let entities = chain(&registry, input, &ParseOptions::default(), &StaticFetch::new()).unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].id, "doe2020");
    assert_eq!(entities[0].entry_type, "article-journal");
    match entities[0].get("author").unwrap() {
        FieldValue::Names(names) => assert_eq!(names[0].family.as_deref(), Some("Doe")),
        other => panic!("expected names, got {other:?}"),
    }
}

#[test]
fn test_csl_json_array_without_ids_gets_fallbacks() {
    let registry = Registry::with_defaults();
    let input = Value::Json(json!([
        {"type": "book", "title": "First"},
        {"type": "book", "title": "Second"}
    ]));
    let entities = chain(&registry, input, &ParseOptions::default(), &StaticFetch::new()).unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].id, "item-1");
    assert_eq!(entities[1].id, "item-2");
}

#[tokio::test]
async fn test_async_chain_matches_sync_for_text() {
    let registry = Registry::with_defaults();
    let input = "@book{a, author = {Doe, Jane}, title = {T}, year = {1997}}";
    let fetch = StaticFetch::new();
    let sync = chain(
        &registry,
        Value::Text(input.to_string()),
        &ParseOptions::default(),
        &fetch,
    )
    .unwrap();
    let asynchronous = chain_async(
        &registry,
        Value::Text(input.to_string()),
        &ParseOptions::default(),
        &fetch,
    )
    .await
    .unwrap();
    assert_eq!(sync, asynchronous);
}
