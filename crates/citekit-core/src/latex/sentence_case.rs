//! Sentence casing over span trees
//!
//! Lower-cases every literal letter except the first letter of the title
//! and letters immediately after sentence-terminal punctuation. Protection
//! is inherited top-down: a span is protected when any ancestor is, and
//! protected text is never altered. Protected spans that carry information
//! a consumer could not reconstruct are re-encoded as neutral
//! `<span class="nocase">` markup; a single capitalized word needs no
//! markup, since it reads as intentional in sentence-cased text.

use lazy_static::lazy_static;
use std::collections::HashSet;

use super::Span;

/// When to apply sentence casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentenceCase {
    /// Leave titles untouched.
    #[default]
    Never,
    /// Case unconditionally.
    Always,
    /// Case only entries whose declared languages intersect the English
    /// locale tag set.
    English,
}

lazy_static! {
    static ref ENGLISH_TAGS: HashSet<&'static str> = [
        "english",
        "american english",
        "british english",
        "canadian english",
        "australian english",
        "eng",
        "en",
        "en-us",
        "en-gb",
        "en-au",
        "en-ca",
        "en-nz",
    ]
    .into_iter()
    .collect();
}

/// Whether the mode applies given the entry's declared languages.
/// Multi-valued language fields are compared by set intersection, not
/// whole-set equality.
pub fn should_apply(mode: SentenceCase, languages: &[String]) -> bool {
    match mode {
        SentenceCase::Never => false,
        SentenceCase::Always => true,
        SentenceCase::English => languages
            .iter()
            .any(|lang| ENGLISH_TAGS.contains(lang.trim().to_lowercase().as_str())),
    }
}

/// Render a span tree to a rich-text title, sentence-casing when `mode`
/// and `languages` say so.
pub fn to_sentence_case(tree: &[Span], mode: SentenceCase, languages: &[String]) -> String {
    render(tree, should_apply(mode, languages))
}

/// Render with an already-decided casing switch.
pub fn render(tree: &[Span], cased: bool) -> String {
    let mut state = CaseState {
        out: String::new(),
        seen_first_letter: false,
        after_terminal: false,
    };
    walk(tree, false, cased, &mut state);
    state.out
}

struct CaseState {
    out: String,
    seen_first_letter: bool,
    after_terminal: bool,
}

impl CaseState {
    fn push_verbatim(&mut self, text: &str) {
        for ch in text.chars() {
            self.observe(ch);
            self.out.push(ch);
        }
    }

    fn push_cased(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_alphabetic() && self.seen_first_letter && !self.after_terminal {
                for lower in ch.to_lowercase() {
                    self.out.push(lower);
                }
                self.observe(ch);
            } else {
                self.observe(ch);
                self.out.push(ch);
            }
        }
    }

    fn observe(&mut self, ch: char) {
        if ch.is_alphabetic() {
            self.seen_first_letter = true;
            self.after_terminal = false;
        } else if matches!(ch, '.' | '!' | '?') {
            self.after_terminal = true;
        }
    }
}

fn walk(tree: &[Span], protected: bool, cased: bool, state: &mut CaseState) {
    for span in tree {
        match span {
            Span::Text(text) => {
                if protected || !cased {
                    state.push_verbatim(text);
                } else {
                    state.push_cased(text);
                }
            }
            Span::Group { protected: group_protected, children } => {
                let child_protected = protected || *group_protected;
                if *group_protected && !protected {
                    // Entering a protected span: decide whether it needs
                    // explicit markup to survive re-rendering. The markup
                    // decision is independent of the casing mode so
                    // protection round-trips through the canonical form.
                    let inner = super::render_plain(children);
                    if is_single_capitalized_word(&inner) {
                        state.push_verbatim(&inner);
                    } else {
                        state.out.push_str("<span class=\"nocase\">");
                        state.push_verbatim(&inner);
                        state.out.push_str("</span>");
                    }
                } else {
                    walk(children, child_protected, cased, state);
                }
            }
        }
    }
}

fn is_single_capitalized_word(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => !text.contains(char::is_whitespace),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latex::interpret;

    fn case(input: &str, mode: SentenceCase, languages: &[&str]) -> String {
        let tree = interpret(input).unwrap();
        let languages: Vec<String> = languages.iter().map(|s| s.to_string()).collect();
        to_sentence_case(&tree, mode, &languages)
    }

    #[test]
    fn test_never_is_identity() {
        for input in ["Lowercase Lowercase", "UPPERCASE", "mixed Case Words."] {
            assert_eq!(case(input, SentenceCase::Never, &[]), input);
        }
    }

    #[test]
    fn test_always_keeps_first_letter() {
        assert_eq!(
            case("Lowercase Lowercase", SentenceCase::Always, &["French"]),
            "Lowercase lowercase"
        );
    }

    #[test]
    fn test_letter_after_terminal_punctuation_kept() {
        assert_eq!(
            case("One Thing. Another Thing", SentenceCase::Always, &[]),
            "One thing. Another thing"
        );
    }

    #[test]
    fn test_protected_span_untouched() {
        assert_eq!(
            case("lowercase {Uppercase} Words", SentenceCase::Always, &[]),
            "lowercase Uppercase words"
        );
    }

    #[test]
    fn test_whole_title_protected_gets_markup() {
        assert_eq!(
            case("{lowercase}", SentenceCase::Always, &[]),
            "<span class=\"nocase\">lowercase</span>"
        );
    }

    #[test]
    fn test_single_capitalized_word_needs_no_markup() {
        assert_eq!(case("{Uppercase}", SentenceCase::Always, &[]), "Uppercase");
    }

    #[test]
    fn test_markup_survives_without_casing() {
        // Protection encoding is about round-tripping, not casing.
        assert_eq!(
            case("{lowercase}", SentenceCase::Never, &[]),
            "<span class=\"nocase\">lowercase</span>"
        );
    }

    #[test]
    fn test_nested_protection_is_inherited() {
        // The inner group stays verbatim even though the outer group is an
        // unprotected environment.
        assert_eq!(
            case("\\begin{it}The {DNA} Story\\end{it}", SentenceCase::Always, &[]),
            "The DNA story"
        );
    }

    #[test]
    fn test_english_gate_single_value() {
        assert_eq!(
            case("Lowercase Lowercase", SentenceCase::English, &["French"]),
            "Lowercase Lowercase"
        );
        assert_eq!(
            case("Lowercase Lowercase", SentenceCase::English, &["English"]),
            "Lowercase lowercase"
        );
    }

    #[test]
    fn test_english_gate_set_intersection() {
        assert_eq!(
            case("Lowercase Lowercase", SentenceCase::English, &["English", "en-US"]),
            "Lowercase lowercase"
        );
        // Intersection, not equality: one English tag is enough.
        assert_eq!(
            case("Lowercase Lowercase", SentenceCase::English, &["English", "French"]),
            "Lowercase lowercase"
        );
        assert_eq!(
            case("Lowercase Lowercase", SentenceCase::English, &["French", "German"]),
            "Lowercase Lowercase"
        );
    }
}
