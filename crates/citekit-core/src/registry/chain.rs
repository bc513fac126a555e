//! Chain resolver
//!
//! Repeatedly sniffs and parses a value until it reaches canonical
//! entities. Remote steps go through the caller's fetch collaborator; a
//! failed item never aborts the rest of the batch unless the caller uses
//! the all-or-nothing entry points.

use tracing::debug;

use super::{FormatDescriptor, ParseOptions, ParseStep, Registry, Value};
use crate::error::Error;
use crate::fetch::{Fetch, FetchAsync};
use crate::model::Entity;

// Descriptors must make progress; a chain longer than this is a cycle.
const MAX_HOPS: usize = 8;

/// One item that failed during a remote step.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    /// The source identifier the request was made for.
    pub id: String,
    pub error: Error,
}

/// Outcome of a chain run: the entities that resolved plus the items that
/// did not, in request order.
#[derive(Debug, Clone, Default)]
pub struct ChainReport {
    pub entities: Vec<Entity>,
    pub failures: Vec<ItemFailure>,
}

/// Resolve a value to entities, failing on the first item that cannot be
/// resolved.
pub fn chain(
    registry: &Registry,
    input: Value,
    opts: &ParseOptions,
    fetch: &dyn Fetch,
) -> Result<Vec<Entity>, Error> {
    let report = chain_report(registry, input, opts, fetch)?;
    match report.failures.into_iter().next() {
        Some(failure) => Err(failure.error),
        None => Ok(report.entities),
    }
}

/// Resolve a value to entities, isolating per-item fetch failures so one
/// bad identifier does not sink the batch.
pub fn chain_report(
    registry: &Registry,
    mut value: Value,
    opts: &ParseOptions,
    fetch: &dyn Fetch,
) -> Result<ChainReport, Error> {
    let mut failures = Vec::new();
    for hop in 0..MAX_HOPS {
        if let Value::Entities(entities) = value {
            return Ok(ChainReport { entities, failures });
        }
        let descriptor = resolve_descriptor(registry, &value, opts, hop)?;
        debug!(tag = descriptor.tag, hop, "chain hop");
        value = match &descriptor.parse {
            ParseStep::Sync(parse) => parse(value, opts)?,
            ParseStep::Remote(remote) => {
                let mut entities = Vec::new();
                for request in (remote.requests)(&value) {
                    match fetch.fetch(&request.url) {
                        Ok(body) => match (remote.parse_response)(&request, &body) {
                            Ok(entity) => entities.push(entity),
                            Err(error) => failures.push(ItemFailure { id: request.id, error }),
                        },
                        Err(transport) => failures.push(ItemFailure {
                            id: request.id.clone(),
                            error: Error::Transport {
                                id: request.id,
                                message: transport.message,
                            },
                        }),
                    }
                }
                Value::Entities(entities)
            }
        };
    }
    Err(no_path(&value))
}

/// Async variant of [`chain`].
pub async fn chain_async<F>(
    registry: &Registry,
    input: Value,
    opts: &ParseOptions,
    fetch: &F,
) -> Result<Vec<Entity>, Error>
where
    F: FetchAsync + Sync,
{
    let report = chain_report_async(registry, input, opts, fetch).await?;
    match report.failures.into_iter().next() {
        Some(failure) => Err(failure.error),
        None => Ok(report.entities),
    }
}

/// Async variant of [`chain_report`].
pub async fn chain_report_async<F>(
    registry: &Registry,
    mut value: Value,
    opts: &ParseOptions,
    fetch: &F,
) -> Result<ChainReport, Error>
where
    F: FetchAsync + Sync,
{
    let mut failures = Vec::new();
    for hop in 0..MAX_HOPS {
        if let Value::Entities(entities) = value {
            return Ok(ChainReport { entities, failures });
        }
        let descriptor = resolve_descriptor(registry, &value, opts, hop)?;
        debug!(tag = descriptor.tag, hop, "chain hop");
        value = match &descriptor.parse {
            ParseStep::Sync(parse) => parse(value, opts)?,
            ParseStep::Remote(remote) => {
                let mut entities = Vec::new();
                for request in (remote.requests)(&value) {
                    match fetch.fetch(&request.url).await {
                        Ok(body) => match (remote.parse_response)(&request, &body) {
                            Ok(entity) => entities.push(entity),
                            Err(error) => failures.push(ItemFailure { id: request.id, error }),
                        },
                        Err(transport) => failures.push(ItemFailure {
                            id: request.id.clone(),
                            error: Error::Transport {
                                id: request.id,
                                message: transport.message,
                            },
                        }),
                    }
                }
                Value::Entities(entities)
            }
        };
    }
    Err(no_path(&value))
}

// The forced type only covers the first hop; afterwards the chain is back
// to sniffing, so a forced text format still flows through its own
// dialect's entry-object step.
fn resolve_descriptor<'r>(
    registry: &'r Registry,
    value: &Value,
    opts: &ParseOptions,
    hop: usize,
) -> Result<&'r FormatDescriptor, Error> {
    if hop == 0 {
        if let Some(tag) = &opts.force_type {
            return registry
                .input(tag)
                .ok_or_else(|| Error::UnknownFormat(tag.clone()));
        }
    }
    registry.sniff(value).ok_or(Error::UnrecognizedInput)
}

fn no_path(value: &Value) -> Error {
    let from = match value {
        Value::Text(_) => "text",
        Value::Raw { dialect, .. } => dialect.name(),
        Value::Json(_) => "json",
        Value::Entities(_) => "entities",
    };
    Error::NoConversionPath {
        from: from.to_string(),
        to: "@csl/object".to_string(),
    }
}
