//! Bibliographic format conversion core
//!
//! Converts bibliographic data between formats through a canonical entity
//! model. The built-in formats cover the BibTeX family: a grammar parser,
//! a LaTeX macro interpreter with sentence casing, bidirectional field
//! mapping, batch validation, and dictionary output. A format registry and
//! chain resolver tie formats together, including remote identifier
//! resolution through a pluggable fetch collaborator.
//!
//! ```no_run
//! use citekit_core::registry::{chain::chain, ParseOptions, Registry, Value};
//! use citekit_core::fetch::StaticFetch;
//!
//! # fn main() -> Result<(), citekit_core::Error> {
//! let registry = Registry::with_defaults();
//! let input = Value::Text("@book{key, title = {A Title}, year = {1997}}".into());
//! let entities = chain(&registry, input, &ParseOptions::default(), &StaticFetch::new())?;
//! let bibtex = registry.format("bibtex", &entities, &Default::default())?;
//! # let _ = bibtex;
//! # Ok(())
//! # }
//! ```

pub mod bibtex;
pub mod error;
pub mod fetch;
pub mod latex;
pub mod model;
pub mod registry;
pub mod validation;

pub use bibtex::{Dialect, FormatOptions};
pub use error::{Error, ErrorKind};
pub use latex::SentenceCase;
pub use model::{Entity, FieldValue};
pub use registry::{ParseOptions, Registry, Value};
