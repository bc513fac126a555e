//! Error types for the conversion core
//!
//! All failures share a single `Error` enum with structured payloads; the
//! human-readable report strings (asserted on in tests) are produced by the
//! `Display` impls and nowhere else. `ErrorKind` projects every variant onto
//! the closed syntax / range / transport taxonomy.

use crate::validation::Violation;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed markup or grammar; fatal to the parse call.
    Syntax,
    /// Semantic or contract violation: unknown format, failed validation,
    /// no conversion path.
    Range,
    /// Identifier resolution failure from the fetch collaborator.
    Transport,
}

/// Error raised by any core operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A `\begin`/`\end` pair with different identifiers.
    #[error("environment started with \"{started}\", ended with \"{ended}\"")]
    MismatchedEnvironment { started: String, ended: String },

    /// Input ended while an environment was still open.
    #[error("environment \"{name}\" not closed before end of input")]
    UnterminatedEnvironment { name: String },

    /// An `\end` with no matching `\begin` on the stack.
    #[error("environment ended with \"{ended}\" but none was open")]
    UnopenedEnvironment { ended: String },

    /// A `}` with no open brace group.
    #[error("unexpected closing brace")]
    UnexpectedClosingBrace,

    /// Input ended while a brace group was still open.
    #[error("brace group not closed before end of input")]
    UnclosedGroup,

    /// Unparseable BibTeX block.
    #[error("malformed entry near offset {offset}: {message}")]
    MalformedEntry { offset: usize, message: String },

    /// Strict-mode batch validation report, one line per invalid entry in
    /// original batch order.
    #[error("Invalid entries:\n{}", render_violations(.0))]
    InvalidEntries(Vec<Violation>),

    /// Requested output dictionary is not registered.
    #[error("Output dictionary \"{0}\" not available")]
    OutputDictionaryNotAvailable(String),

    /// No registered descriptor matched the input during sniffing.
    #[error("no registered format matched the input")]
    UnrecognizedInput,

    /// An explicitly requested input tag is not registered.
    #[error("input format \"{0}\" is not registered")]
    UnknownFormat(String),

    /// No converter path between two registered tags.
    #[error("no conversion path from \"{from}\" to \"{to}\"")]
    NoConversionPath { from: String, to: String },

    /// Fetch failure, attributed to the identifier being resolved. The
    /// collaborator's message is propagated unchanged.
    #[error("{message}")]
    Transport { id: String, message: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MismatchedEnvironment { .. }
            | Error::UnterminatedEnvironment { .. }
            | Error::UnopenedEnvironment { .. }
            | Error::UnexpectedClosingBrace
            | Error::UnclosedGroup
            | Error::MalformedEntry { .. } => ErrorKind::Syntax,
            Error::InvalidEntries(_)
            | Error::OutputDictionaryNotAvailable(_)
            | Error::UnrecognizedInput
            | Error::UnknownFormat(_)
            | Error::NoConversionPath { .. } => ErrorKind::Range,
            Error::Transport { .. } => ErrorKind::Transport,
        }
    }
}

fn render_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {}", v))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ViolationKind;

    #[test]
    fn test_batch_report_rendering() {
        let err = Error::InvalidEntries(vec![
            Violation {
                key: "b".to_string(),
                kind: ViolationKind::InvalidType("foo".to_string()),
            },
            Violation {
                key: "c".to_string(),
                kind: ViolationKind::MissingFields(vec![
                    "author".to_string(),
                    "title".to_string(),
                    "year/date".to_string(),
                ]),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid entries:\n  - b has invalid type: \"foo\"\n  - c has missing fields: author, title, year/date"
        );
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_output_dictionary_message() {
        let err = Error::OutputDictionaryNotAvailable("latex".to_string());
        assert_eq!(err.to_string(), "Output dictionary \"latex\" not available");
    }

    #[test]
    fn test_environment_mismatch_message() {
        let err = Error::MismatchedEnvironment {
            started: "it".to_string(),
            ended: "bf".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "environment started with \"it\", ended with \"bf\""
        );
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_transport_message_propagated_unchanged() {
        let err = Error::Transport {
            id: "10.1016/does-not-exist".to_string(),
            message: "Server responded with status code 404".to_string(),
        };
        assert_eq!(err.to_string(), "Server responded with status code 404");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
