//! Raw BibTeX entry structures (pre-mapping)

use crate::validation::Validatable;

/// A single field as it appeared in the source, value fully expanded
/// (string macros substituted, concatenation applied) but not yet
/// interpreted as markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    /// Lower-cased field name; field names are case-insensitive.
    pub name: String,
    pub value: String,
}

/// A parsed `@type{key, ...}` block before field mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Lower-cased entry type, as written (may be invalid under a policy).
    pub entry_type: String,
    pub cite_key: String,
    pub fields: Vec<RawField>,
}

impl RawEntry {
    pub fn new(cite_key: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into().to_lowercase(),
            cite_key: cite_key.into(),
            fields: Vec::new(),
        }
    }

    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(RawField {
            name: name.into().to_lowercase(),
            value: value.into(),
        });
    }

    pub fn get_field(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }
}

impl Validatable for RawEntry {
    fn key(&self) -> &str {
        &self.cite_key
    }

    fn type_name(&self) -> &str {
        &self.entry_type
    }

    fn has_field(&self, name: &str) -> bool {
        RawEntry::has_field(self, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup_is_case_insensitive() {
        let mut entry = RawEntry::new("Smith2024", "Article");
        entry.add_field("Title", "A Great Paper");
        assert_eq!(entry.entry_type, "article");
        assert_eq!(entry.get_field("TITLE"), Some("A Great Paper"));
        assert!(entry.has_field("title"));
    }
}
