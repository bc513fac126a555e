//! LaTeX-like markup interpreter
//!
//! Scans field values left to right with a stack of open groups and
//! environments and produces a span tree: literal text, case-protected
//! brace groups, and transparent environment groups. Accent and
//! special-character macros are resolved to Unicode eagerly; mismatched or
//! unterminated environments are hard syntax errors, never recovered.

pub mod sentence_case;
pub mod special;

pub use sentence_case::{to_sentence_case, SentenceCase};

use crate::error::Error;

/// One node of the interpreted markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    /// A `{...}` group (protected) or `\begin{x}...\end{x}` environment
    /// (not protected).
    Group { protected: bool, children: Vec<Span> },
}

pub type SpanTree = Vec<Span>;

enum FrameKind {
    Brace,
    Environment(String),
}

struct Frame {
    kind: FrameKind,
    children: Vec<Span>,
}

/// Interpret a raw field value into a span tree.
pub fn interpret(input: &str) -> Result<SpanTree, Error> {
    let mut root: Vec<Span> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut text = String::new();
    let mut rest = input;

    fn flush(text: &mut String, stack: &mut [Frame], root: &mut Vec<Span>) {
        if text.is_empty() {
            return;
        }
        let run = Span::Text(std::mem::take(text));
        match stack.last_mut() {
            Some(frame) => frame.children.push(run),
            None => root.push(run),
        }
    }

    fn push_span(span: Span, stack: &mut [Frame], root: &mut Vec<Span>) {
        match stack.last_mut() {
            Some(frame) => frame.children.push(span),
            None => root.push(span),
        }
    }

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("\\begin{") {
            let Some(end) = after.find('}') else {
                return Err(Error::UnclosedGroup);
            };
            flush(&mut text, &mut stack, &mut root);
            stack.push(Frame {
                kind: FrameKind::Environment(after[..end].to_string()),
                children: Vec::new(),
            });
            rest = &after[end + 1..];
        } else if let Some(after) = rest.strip_prefix("\\end{") {
            let Some(end) = after.find('}') else {
                return Err(Error::UnclosedGroup);
            };
            let name = &after[..end];
            flush(&mut text, &mut stack, &mut root);
            match stack.pop() {
                Some(Frame { kind: FrameKind::Environment(started), children }) => {
                    if started != name {
                        return Err(Error::MismatchedEnvironment {
                            started,
                            ended: name.to_string(),
                        });
                    }
                    push_span(
                        Span::Group { protected: false, children },
                        &mut stack,
                        &mut root,
                    );
                }
                Some(Frame { kind: FrameKind::Brace, .. }) | None => {
                    return Err(Error::UnopenedEnvironment { ended: name.to_string() });
                }
            }
            rest = &after[end + 1..];
        } else if let Some(after) = rest.strip_prefix('{') {
            flush(&mut text, &mut stack, &mut root);
            stack.push(Frame { kind: FrameKind::Brace, children: Vec::new() });
            rest = after;
        } else if let Some(after) = rest.strip_prefix('}') {
            flush(&mut text, &mut stack, &mut root);
            match stack.pop() {
                Some(Frame { kind: FrameKind::Brace, children }) => {
                    push_span(
                        Span::Group { protected: true, children },
                        &mut stack,
                        &mut root,
                    );
                }
                Some(Frame { kind: FrameKind::Environment(_), .. }) | None => {
                    return Err(Error::UnexpectedClosingBrace);
                }
            }
            rest = after;
        } else if rest.starts_with('\\') || rest.starts_with('~') {
            if let Some((consumed, replacement)) = special::resolve(rest) {
                text.push_str(replacement);
                rest = &rest[consumed..];
            } else if rest.starts_with('~') {
                text.push('\u{00A0}');
                rest = &rest[1..];
            } else {
                rest = skip_command(&mut text, rest);
            }
        } else {
            let mut chars = rest.chars();
            if let Some(ch) = chars.next() {
                text.push(ch);
            }
            rest = chars.as_str();
        }
    }

    flush(&mut text, &mut stack, &mut root);
    match stack.pop() {
        None => Ok(root),
        Some(Frame { kind: FrameKind::Environment(name), .. }) => {
            Err(Error::UnterminatedEnvironment { name })
        }
        Some(Frame { kind: FrameKind::Brace, .. }) => Err(Error::UnclosedGroup),
    }
}

/// Consume an unknown control sequence. Escaped punctuation becomes the
/// literal character; control words are dropped (their arguments, if any,
/// parse as ordinary groups).
fn skip_command<'a>(text: &mut String, rest: &'a str) -> &'a str {
    let after = &rest[1..];
    let mut chars = after.chars();
    match chars.next() {
        Some(ch) if ch.is_ascii_alphabetic() => {
            let word_len = after
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(after.len());
            // TeX eats whitespace after a control word.
            after[word_len..].trim_start_matches([' ', '\t'])
        }
        Some(ch) => {
            text.push(ch);
            &after[ch.len_utf8()..]
        }
        None => after,
    }
}

/// Flatten a span tree to plain text, dropping protection and markup.
pub fn render_plain(tree: &[Span]) -> String {
    let mut out = String::new();
    collect_plain(tree, &mut out);
    out
}

fn collect_plain(tree: &[Span], out: &mut String) {
    for span in tree {
        match span {
            Span::Text(text) => out.push_str(text),
            Span::Group { children, .. } => collect_plain(children, out),
        }
    }
}
