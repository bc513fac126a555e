//! BibTeX grammar parser using nom
//!
//! Handles the top-level sequence of `@string` definitions, `@preamble`
//! declarations, `@comment` sections, and `@type{key, ...}` entries, with
//! braced and quoted field values, nested braces, numeric literals,
//! `#` concatenation, and string-macro substitution in declaration order.
//! Malformed blocks are a hard syntax error; validation (strict or
//! permissive) is the mapper's concern, not the grammar's.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    IResult,
};
use std::collections::HashMap;

use super::entry::RawEntry;
use crate::error::Error;

/// Result of parsing a BibTeX file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseResult {
    pub entries: Vec<RawEntry>,
    pub preambles: Vec<String>,
    pub strings: HashMap<String, String>,
}

// Month abbreviations are predefined string macros; they expand to month
// numbers so the mapper can fold them into structured dates.
const MONTH_MACROS: [(&str, &str); 12] = [
    ("jan", "1"),
    ("feb", "2"),
    ("mar", "3"),
    ("apr", "4"),
    ("may", "5"),
    ("jun", "6"),
    ("jul", "7"),
    ("aug", "8"),
    ("sep", "9"),
    ("oct", "10"),
    ("nov", "11"),
    ("dec", "12"),
];

/// Parse a BibTeX/BibLaTeX source text.
pub fn parse(input: &str) -> Result<ParseResult, Error> {
    let mut result = ParseResult::default();
    for (name, value) in MONTH_MACROS {
        result.strings.insert(name.to_string(), value.to_string());
    }

    let mut remaining = input;
    loop {
        remaining = skip_junk(remaining);
        if remaining.is_empty() {
            break;
        }
        // skip_junk leaves us at an '@' or at end of input.
        match parse_at_block(remaining, &result.strings) {
            Ok((rest, block)) => {
                match block {
                    AtBlock::Entry(entry) => result.entries.push(entry),
                    AtBlock::String(name, value) => {
                        result.strings.insert(name.to_lowercase(), value);
                    }
                    AtBlock::Preamble(text) => result.preambles.push(text),
                    AtBlock::Comment => {}
                }
                remaining = rest;
            }
            Err(_) => {
                return Err(Error::MalformedEntry {
                    offset: input.len() - remaining.len(),
                    message: "unparseable block".to_string(),
                });
            }
        }
    }

    Ok(result)
}

enum AtBlock {
    Entry(RawEntry),
    String(String, String),
    Preamble(String),
    Comment,
}

/// Skip whitespace, `%` line comments, and any stray text between blocks.
fn skip_junk(input: &str) -> &str {
    let mut pos = 0;
    let bytes = input.as_bytes();
    while pos < bytes.len() {
        match bytes[pos] {
            b'@' => return &input[pos..],
            b'%' => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            }
            _ => pos += 1,
        }
    }
    &input[pos..]
}

fn parse_at_block<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, AtBlock> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, block_type) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;

    match block_type.to_lowercase().as_str() {
        "string" => {
            let (rest, (name, value)) = parse_string_definition(rest, strings)?;
            Ok((rest, AtBlock::String(name, value)))
        }
        "preamble" => {
            let (rest, text) = parse_preamble(rest, strings)?;
            Ok((rest, AtBlock::Preamble(text)))
        }
        "comment" => {
            let (rest, _) = parse_comment_body(rest)?;
            Ok((rest, AtBlock::Comment))
        }
        _ => {
            let (rest, entry) = parse_entry_body(rest, block_type, strings)?;
            Ok((rest, AtBlock::Entry(entry)))
        }
    }
}

fn parse_string_definition<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, name) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    Ok((rest, (name.to_string(), value)))
}

fn parse_preamble<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    Ok((rest, value))
}

/// `@comment` bodies are skipped: braced content, or to end of line.
fn parse_comment_body(input: &str) -> IResult<&str, ()> {
    let (rest, _) = multispace0(input)?;
    if rest.starts_with('{') {
        let (rest, _) = parse_braced_content(rest)?;
        Ok((rest, ()))
    } else {
        let pos = rest.find('\n').unwrap_or(rest.len());
        Ok((&rest[pos..], ()))
    }
}

fn parse_entry_body<'a>(
    input: &'a str,
    entry_type: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, RawEntry> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;

    let (rest, cite_key) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || "_-:./+".contains(c))(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(',')(rest)?;

    let (rest, fields) = parse_fields(rest, strings)?;

    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    let mut entry = RawEntry::new(cite_key, entry_type);
    for (name, value) in fields {
        entry.add_field(name, value);
    }

    Ok((rest, entry))
}

fn parse_fields<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Vec<(String, String)>> {
    let mut fields = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;
        // End of entry; trailing commas are optional and already consumed.
        if rest.starts_with('}') {
            return Ok((rest, fields));
        }

        let (rest, (name, value)) = parse_single_field(rest, strings)?;
        fields.push((name, value));
        remaining = rest;

        let (rest, _) = multispace0(remaining)?;
        remaining = rest.strip_prefix(',').unwrap_or(rest);
    }
}

fn parse_single_field<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, name) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;

    Ok((rest, (name.to_string(), value)))
}

/// A field value: braced, quoted, numeric, or a string-macro name, with
/// `#` concatenation between parts. Macros resolve against declarations
/// seen so far; an undefined name passes through as its literal text.
fn parse_field_value<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let mut result = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        let (rest, part) = alt((
            parse_braced_value,
            parse_quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), |s: &str| {
                s.to_string()
            }),
            map(
                take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
                |s: &str| {
                    strings
                        .get(&s.to_lowercase())
                        .cloned()
                        .unwrap_or_else(|| s.to_string())
                },
            ),
        ))(rest)?;

        result.push_str(&part);
        remaining = rest;

        let (rest, _) = multispace0(remaining)?;
        if let Some(stripped) = rest.strip_prefix('#') {
            remaining = stripped;
        } else {
            return Ok((rest, result));
        }
    }
}

fn parse_braced_value(input: &str) -> IResult<&str, String> {
    let (rest, content) = parse_braced_content(input)?;
    // Drop the outer braces, keep nesting intact for the interpreter.
    let inner = &content[1..content.len() - 1];
    Ok((rest, inner.to_string()))
}

fn parse_braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut depth = 0;
    let mut pos = 0;
    let bytes = input.as_bytes();

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => {
                pos += 1;
            }
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn parse_quoted_value(input: &str) -> IResult<&str, String> {
    if !input.starts_with('"') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut result = String::new();
    let mut pos = 1;
    let bytes = input.as_bytes();
    let mut brace_depth = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'"' if brace_depth == 0 => {
                return Ok((&input[pos + 1..], result));
            }
            b'{' => {
                brace_depth += 1;
                result.push('{');
            }
            b'}' => {
                brace_depth -= 1;
                result.push('}');
            }
            b'\\' if pos + 1 < bytes.len() => {
                // The escaped character may be multi-byte.
                result.push('\\');
                pos += 1;
                let ch_len = utf8_len(bytes[pos]);
                result.push_str(&input[pos..pos + ch_len]);
                pos += ch_len - 1;
            }
            _ => {
                // Multi-byte characters pass through untouched.
                let ch_len = utf8_len(bytes[pos]);
                result.push_str(&input[pos..pos + ch_len]);
                pos += ch_len - 1;
            }
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn utf8_len(first_byte: u8) -> usize {
    match first_byte {
        b if b < 0x80 => 1,
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_entry() {
        let input = r#"
@article{Smith2024,
    author = {John Smith},
    title = {A Great Paper},
    year = {2024},
    journal = {Nature},
}
"#;
        let result = parse(input).unwrap();
        assert_eq!(result.entries.len(), 1);

        let entry = &result.entries[0];
        assert_eq!(entry.cite_key, "Smith2024");
        assert_eq!(entry.entry_type, "article");
        assert_eq!(entry.get_field("author"), Some("John Smith"));
        assert_eq!(entry.get_field("title"), Some("A Great Paper"));
        assert_eq!(entry.get_field("year"), Some("2024"));
    }

    #[test]
    fn test_parse_quoted_values() {
        let input = r#"@book{a, title = "lowercase {Uppercase}", language = "French" }"#;
        let result = parse(input).unwrap();
        assert_eq!(
            result.entries[0].get_field("title"),
            Some("lowercase {Uppercase}")
        );
        assert_eq!(result.entries[0].get_field("language"), Some("French"));
    }

    #[test]
    fn test_quoted_value_with_escaped_multibyte_char() {
        let input = "@book{a, title = \"x\\é\", year = {1}}";
        let result = parse(input).unwrap();
        assert_eq!(result.entries[0].get_field("title"), Some("x\\é"));
    }

    #[test]
    fn test_parse_nested_braces() {
        let input = r#"@article{Test2024, title = {A {B}ook about {LaTeX}}}"#;
        let result = parse(input).unwrap();
        assert_eq!(
            result.entries[0].get_field("title"),
            Some("A {B}ook about {LaTeX}")
        );
    }

    #[test]
    fn test_string_definitions_in_declaration_order() {
        let input = r#"
@string{nature = "Nature"}
@article{Test2024, journal = nature}
"#;
        let result = parse(input).unwrap();
        assert_eq!(result.strings.get("nature"), Some(&"Nature".to_string()));
        assert_eq!(result.entries[0].get_field("journal"), Some("Nature"));
    }

    #[test]
    fn test_forward_reference_not_resolved() {
        let input = r#"
@article{Test2024, journal = nature}
@string{nature = "Nature"}
"#;
        let result = parse(input).unwrap();
        assert_eq!(result.entries[0].get_field("journal"), Some("nature"));
    }

    #[test]
    fn test_string_concatenation() {
        let input = r#"
@string{prefix = "Phys."}
@article{Test, journal = prefix # " Rev. Lett."}
"#;
        let result = parse(input).unwrap();
        assert_eq!(
            result.entries[0].get_field("journal"),
            Some("Phys. Rev. Lett.")
        );
    }

    #[test]
    fn test_month_macros_predefined() {
        let input = r#"@article{Test, month = jan, year = 2020}"#;
        let result = parse(input).unwrap();
        assert_eq!(result.entries[0].get_field("month"), Some("1"));
    }

    #[test]
    fn test_preamble_and_comment() {
        let input = r#"
@preamble{"Some \TeX{} preamble"}
@comment{ignored content {with braces}}
@misc{a, note = {kept}}
"#;
        let result = parse(input).unwrap();
        assert_eq!(result.preambles.len(), 1);
        assert_eq!(result.entries.len(), 1);
    }

    #[test]
    fn test_entry_without_fields() {
        let result = parse("@foo{b, }").unwrap();
        assert_eq!(result.entries[0].cite_key, "b");
        assert_eq!(result.entries[0].entry_type, "foo");
        assert!(result.entries[0].fields.is_empty());
    }

    #[test]
    fn test_trailing_comma_optional() {
        for input in ["@misc{a, note = {x},}", "@misc{a, note = {x}}"] {
            let result = parse(input).unwrap();
            assert_eq!(result.entries[0].get_field("note"), Some("x"));
        }
    }

    #[test]
    fn test_malformed_block_is_fatal() {
        let err = parse("@article{broken, title = {unclosed").unwrap_err();
        assert!(matches!(err, Error::MalformedEntry { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn test_junk_between_entries_skipped() {
        let input = "stray text\n% a comment\n@misc{a, note = {x}}";
        let result = parse(input).unwrap();
        assert_eq!(result.entries.len(), 1);
    }
}
