//! Structured dates
//!
//! Canonical dates are CSL `date-parts` (one or two `[year, month, day]`
//! prefixes for a single date or a range) or a literal string when the
//! source value does not parse.

use serde_json::{json, Value as Json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    /// `[[y, m, d], ...]` with one entry for a date, two for a range.
    Parts(Vec<Vec<i32>>),
    /// Unparseable source text, carried verbatim.
    Literal(String),
}

impl DateValue {
    /// Parse an ISO 8601-ish date or `start/end` range as used by the
    /// BibLaTeX `date` field. Falls back to a literal.
    pub fn from_iso(value: &str) -> Self {
        let value = value.trim();
        let ranges: Vec<&str> = value.split('/').collect();
        let mut parts = Vec::new();
        for range in &ranges {
            match parse_iso_parts(range) {
                Some(p) => parts.push(p),
                None => return DateValue::Literal(value.to_string()),
            }
        }
        if parts.is_empty() || parts.len() > 2 {
            return DateValue::Literal(value.to_string());
        }
        DateValue::Parts(parts)
    }

    /// Build from separate BibTeX `year` and `month` values.
    pub fn from_year_month(year: &str, month: Option<&str>) -> Self {
        let Ok(year) = year.trim().parse::<i32>() else {
            return DateValue::Literal(year.trim().to_string());
        };
        let mut parts = vec![year];
        if let Some(month) = month {
            if let Ok(m) = month.trim().parse::<i32>() {
                if (1..=12).contains(&m) {
                    parts.push(m);
                }
            }
        }
        DateValue::Parts(vec![parts])
    }

    /// The year of the (first) date, when structured.
    pub fn year(&self) -> Option<i32> {
        match self {
            DateValue::Parts(parts) => parts.first().and_then(|p| p.first()).copied(),
            DateValue::Literal(_) => None,
        }
    }

    /// The month of the (first) date, when structured and present.
    pub fn month(&self) -> Option<i32> {
        match self {
            DateValue::Parts(parts) => parts.first().and_then(|p| p.get(1)).copied(),
            DateValue::Literal(_) => None,
        }
    }

    /// Render as a BibLaTeX `date` value (`1997`, `1997-05-03`,
    /// `1997/1998`), or the literal text.
    pub fn to_iso(&self) -> String {
        match self {
            DateValue::Parts(parts) => parts
                .iter()
                .map(|p| render_iso_parts(p))
                .collect::<Vec<_>>()
                .join("/"),
            DateValue::Literal(text) => text.clone(),
        }
    }

    pub fn to_csl_json(&self) -> Json {
        match self {
            DateValue::Parts(parts) => json!({ "date-parts": parts }),
            DateValue::Literal(text) => json!({ "raw": text }),
        }
    }

    pub fn from_csl_json(value: &Json) -> Option<Self> {
        let obj = value.as_object()?;
        if let Some(raw) = obj.get("raw").and_then(Json::as_str) {
            return Some(DateValue::Literal(raw.to_string()));
        }
        let parts = obj.get("date-parts")?.as_array()?;
        let parts: Vec<Vec<i32>> = parts
            .iter()
            .filter_map(|p| {
                let nums: Vec<i32> = p
                    .as_array()?
                    .iter()
                    .filter_map(|n| n.as_i64().map(|n| n as i32))
                    .collect();
                if nums.is_empty() {
                    None
                } else {
                    Some(nums)
                }
            })
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(DateValue::Parts(parts))
    }
}

fn parse_iso_parts(value: &str) -> Option<Vec<i32>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let mut parts = Vec::new();
    for (i, piece) in value.split('-').enumerate() {
        if i >= 3 {
            return None;
        }
        let n: i32 = piece.parse().ok()?;
        parts.push(n);
    }
    Some(parts)
}

fn render_iso_parts(parts: &[i32]) -> String {
    match parts {
        [y] => format!("{}", y),
        [y, m] => format!("{}-{:02}", y, m),
        [y, m, d, ..] => format!("{}-{:02}-{:02}", y, m, d),
        [] => String::new(),
    }
}
