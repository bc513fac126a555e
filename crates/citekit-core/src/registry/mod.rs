//! Format registry
//!
//! Input formats are described by tagged descriptors: an optional sniffer
//! that recognizes a value and a parse step that moves it one hop closer to
//! the canonical entity form. Output dictionaries are registered separately
//! under plain names. The chain resolver in [`chain`](crate::registry::chain)
//! walks descriptors until it reaches entities.

pub mod chain;

use tracing::debug;

use crate::bibtex::{self, Dialect, FormatOptions, RawEntry};
use crate::error::Error;
use crate::latex::SentenceCase;
use crate::model::name::NameOrder;
use crate::model::Entity;

/// A value travelling through the conversion chain.
#[derive(Debug, Clone)]
pub enum Value {
    /// Unparsed source text.
    Text(String),
    /// Parsed but dialect-shaped entries.
    Raw { dialect: Dialect, entries: Vec<RawEntry> },
    /// CSL-JSON data.
    Json(serde_json::Value),
    /// Canonical entities, the chain's terminal form.
    Entities(Vec<Entity>),
}

/// Input-side options, applied across the whole chain.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Raise a batch validation report instead of warning on invalid
    /// entries.
    pub strict: bool,
    /// Sentence-casing mode for titles.
    pub sentence_case: SentenceCase,
    /// Name-splitting heuristic for unbraced names without a comma.
    pub name_order: NameOrder,
    /// Skip sniffing on the first hop and use this input tag directly.
    /// Later hops are sniffed as usual.
    pub force_type: Option<String>,
    /// Accepted for configuration parity; cross-entity relationship
    /// resolution is left to the caller.
    pub generate_graph: bool,
}

/// One step of a parse chain.
pub enum ParseStep {
    /// Pure transformation of the value.
    Sync(SyncParse),
    /// Resolution through a fetch collaborator, one request per item.
    Remote(RemoteParse),
}

pub type SyncParse = Box<dyn Fn(Value, &ParseOptions) -> Result<Value, Error> + Send + Sync>;

/// A remote step: the descriptor names the requests it needs and how to
/// turn each response into an entity. The transport itself is supplied by
/// the caller.
pub struct RemoteParse {
    pub requests: Box<dyn Fn(&Value) -> Vec<FetchRequest> + Send + Sync>,
    pub parse_response: Box<dyn Fn(&FetchRequest, &str) -> Result<Entity, Error> + Send + Sync>,
}

/// One request owed to the fetch collaborator, attributed to the source
/// identifier for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub id: String,
    pub url: String,
}

/// A registered input format.
pub struct FormatDescriptor {
    /// Tag in `@scheme/representation` form.
    pub tag: &'static str,
    /// Recognizer; returns a priority when the value matches. Higher
    /// priorities win, ties go to the earlier registration.
    pub sniff: Option<Box<dyn Fn(&Value) -> Option<u8> + Send + Sync>>,
    pub parse: ParseStep,
}

/// A registered output dictionary.
pub struct OutputDict {
    pub name: &'static str,
    pub format: Box<dyn Fn(&[Entity], &FormatOptions) -> Result<String, Error> + Send + Sync>,
}

/// The format registry: input descriptors plus output dictionaries.
#[derive(Default)]
pub struct Registry {
    inputs: Vec<FormatDescriptor>,
    outputs: Vec<OutputDict>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in formats: CSL-JSON plus the BibTeX
    /// family, BibLaTeX first so it wins ties when sniffing raw text.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_input(csl_json_descriptor());
        bibtex::register(&mut registry);
        registry
    }

    pub fn register_input(&mut self, descriptor: FormatDescriptor) {
        debug!(tag = descriptor.tag, "registering input format");
        self.inputs.push(descriptor);
    }

    pub fn register_output(&mut self, dict: OutputDict) {
        debug!(name = dict.name, "registering output dictionary");
        self.outputs.push(dict);
    }

    pub fn has_input(&self, tag: &str) -> bool {
        self.inputs.iter().any(|d| d.tag == tag)
    }

    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.iter().any(|d| d.name == name)
    }

    /// Look up a descriptor by tag.
    pub fn input(&self, tag: &str) -> Option<&FormatDescriptor> {
        self.inputs.iter().find(|d| d.tag == tag)
    }

    /// Recognize a value. Every sniffer runs; the highest priority wins
    /// and ties resolve to the earliest registration.
    pub fn sniff(&self, value: &Value) -> Option<&FormatDescriptor> {
        let mut best: Option<(u8, &FormatDescriptor)> = None;
        for descriptor in &self.inputs {
            let Some(sniff) = &descriptor.sniff else { continue };
            if let Some(priority) = sniff(value) {
                debug!(tag = descriptor.tag, priority, "sniffer matched");
                match best {
                    Some((current, _)) if current >= priority => {}
                    _ => best = Some((priority, descriptor)),
                }
            }
        }
        best.map(|(_, descriptor)| descriptor)
    }

    /// Render entities through a named output dictionary.
    pub fn format(
        &self,
        name: &str,
        entities: &[Entity],
        opts: &FormatOptions,
    ) -> Result<String, Error> {
        let dict = self
            .outputs
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| Error::OutputDictionaryNotAvailable(name.to_string()))?;
        (dict.format)(entities, opts)
    }
}

/// Canonical CSL-JSON input: a JSON value holding one item or an array of
/// items becomes entities directly.
fn csl_json_descriptor() -> FormatDescriptor {
    FormatDescriptor {
        tag: "@csl/object",
        sniff: Some(Box::new(|value| match value {
            Value::Json(_) => Some(1),
            _ => None,
        })),
        parse: ParseStep::Sync(Box::new(|value, _opts| {
            let Value::Json(json) = value else {
                return Err(Error::UnrecognizedInput);
            };
            let items: Vec<&serde_json::Value> = match &json {
                serde_json::Value::Array(items) => items.iter().collect(),
                other => vec![other],
            };
            let entities = items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| Entity::from_csl_json(item, &format!("item-{}", i + 1)))
                .collect();
            Ok(Value::Entities(entities))
        })),
    }
}
