//! Personal names: splitting, assembly, and CSL-JSON shape
//!
//! BibTeX name lists are separated by top-level ` and ` (never inside
//! braces). A single name splits into given/family at the last top-level
//! comma; names without a comma fall back to a word-position heuristic,
//! which is policy rather than hard-coded (see [`NameOrder`]).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};

/// A structured personal name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

/// Heuristic for splitting a comma-less name into given/family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameOrder {
    /// "First Middle Last": the last word is the family name.
    #[default]
    LastWordIsFamily,
    /// "Last First": the first word is the family name.
    FirstWordIsFamily,
}

impl Name {
    pub fn to_csl_json(&self) -> Json {
        let mut obj = serde_json::Map::new();
        if let Some(given) = &self.given {
            obj.insert("given".to_string(), json!(given));
        }
        if let Some(family) = &self.family {
            obj.insert("family".to_string(), json!(family));
        }
        Json::Object(obj)
    }

    pub fn from_csl_json(value: &Json) -> Option<Self> {
        let obj = value.as_object()?;
        let given = obj.get("given").and_then(Json::as_str).map(str::to_string);
        let family = obj.get("family").and_then(Json::as_str).map(str::to_string);
        // "literal" names (institutions) are kept whole under family.
        let family = family.or_else(|| {
            obj.get("literal").and_then(Json::as_str).map(str::to_string)
        });
        if given.is_none() && family.is_none() {
            return None;
        }
        Some(Name { given, family })
    }

    /// Render as BibTeX "Family, Given".
    pub fn to_bibtex(&self) -> String {
        match (&self.family, &self.given) {
            (Some(family), Some(given)) => format!("{}, {}", family, given),
            (Some(family), None) => family.clone(),
            (None, Some(given)) => given.clone(),
            (None, None) => String::new(),
        }
    }
}

/// Split a field value into individual names at top-level ` and `.
pub fn parse_name_list(value: &str, order: NameOrder) -> Vec<Name> {
    split_top_level(value, " and ")
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_name(s, order))
        .collect()
}

/// Split one name into given/family.
pub fn parse_name(value: &str, order: NameOrder) -> Name {
    // Brace-wrapped names are literal (institutions, one-part names).
    let trimmed = value.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') && trimmed.len() >= 2 {
        return Name {
            given: None,
            family: Some(trimmed[1..trimmed.len() - 1].to_string()),
        };
    }

    if let Some(pos) = last_top_level_comma(trimmed) {
        let family = trimmed[..pos].trim();
        let given = trimmed[pos + 1..].trim();
        return Name {
            given: non_empty(given),
            family: non_empty(family),
        };
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    match words.len() {
        0 => Name { given: None, family: None },
        1 => Name {
            given: None,
            family: Some(words[0].to_string()),
        },
        _ => match order {
            NameOrder::LastWordIsFamily => Name {
                given: Some(words[..words.len() - 1].join(" ")),
                family: Some(words[words.len() - 1].to_string()),
            },
            NameOrder::FirstWordIsFamily => Name {
                given: Some(words[1..].join(" ")),
                family: Some(words[0].to_string()),
            },
        },
    }
}

/// Render a name list back to BibTeX form.
pub fn format_name_list(names: &[Name]) -> String {
    names
        .iter()
        .map(Name::to_bibtex)
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Split on a separator, ignoring occurrences inside braces.
pub fn split_top_level<'a>(value: &'a str, separator: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let bytes = value.as_bytes();
    let sep = separator.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ if depth == 0 && bytes[i..].starts_with(sep) => {
                parts.push(&value[start..i]);
                i += sep.len();
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&value[start..]);
    parts
}

fn last_top_level_comma(value: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut last = None;
    for (i, b) in value.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => last = Some(i),
            _ => {}
        }
    }
    last
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_comma_split() {
        let name = parse_name("Антоненко-Давидович, Б.Д.", NameOrder::default());
        assert_eq!(name.family.as_deref(), Some("Антоненко-Давидович"));
        assert_eq!(name.given.as_deref(), Some("Б.Д."));
    }

    #[test_case("John Smith", Some("John"), Some("Smith") ; "two words")]
    #[test_case("Jean de la Fontaine", Some("Jean de la"), Some("Fontaine") ; "many words")]
    #[test_case("Plato", None, Some("Plato") ; "single word")]
    fn test_heuristic_split(input: &str, given: Option<&str>, family: Option<&str>) {
        let name = parse_name(input, NameOrder::LastWordIsFamily);
        assert_eq!(name.given.as_deref(), given);
        assert_eq!(name.family.as_deref(), family);
    }

    #[test]
    fn test_list_split_respects_braces() {
        let names = parse_name_list("{Wiley and Sons} and Smith, John", NameOrder::default());
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].family.as_deref(), Some("Wiley and Sons"));
        assert_eq!(names[0].given, None);
        assert_eq!(names[1].family.as_deref(), Some("Smith"));
    }

    #[test]
    fn test_round_trip() {
        let names = parse_name_list("Smith, John and Doe, Jane", NameOrder::default());
        assert_eq!(format_name_list(&names), "Smith, John and Doe, Jane");
    }
}
