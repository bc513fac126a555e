//! Canonical bibliographic model
//!
//! Every converter funnels through this representation: an entity is an
//! ordered list of named fields whose values come from a closed sum type.
//! Field values are format-agnostic; nothing past the field mapper may
//! contain raw format-specific markup (protected spans are encoded as
//! neutral `<span class="nocase">` rich-text markup).

pub mod date;
pub mod name;

pub use date::DateValue;
pub use name::{Name, NameOrder};

use serde_json::{json, Map as JsonMap, Value as Json};

/// A single canonical field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

/// Closed sum of canonical field value shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Plain or rich-text string.
    Scalar(String),
    /// Ordered list of strings (e.g. multi-valued language fields).
    List(Vec<String>),
    /// Ordered list of personal names.
    Names(Vec<Name>),
    /// Structured or literal date.
    Date(DateValue),
}

impl FieldValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

/// A canonical entity: type, id, and ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// CSL item type, e.g. "book" or "article-journal".
    pub entry_type: String,
    /// Citation key, unique within a processing batch.
    pub id: String,
    pub fields: Vec<Field>,
}

impl Entity {
    pub fn new(id: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            id: id.into(),
            fields: Vec::new(),
        }
    }

    /// Set a field, replacing an existing one of the same name in place so
    /// field order stays stable.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.value = value;
        } else {
            self.fields.push(Field { name, value });
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// The citation key: the `citation-key` field when present, else `id`.
    pub fn citation_key(&self) -> &str {
        match self.get("citation-key") {
            Some(FieldValue::Scalar(key)) => key,
            _ => &self.id,
        }
    }

    /// Encode as a CSL-JSON object.
    pub fn to_csl_json(&self) -> Json {
        let mut obj = JsonMap::new();
        obj.insert("type".to_string(), json!(self.entry_type));
        obj.insert("id".to_string(), json!(self.id));
        for field in &self.fields {
            obj.insert(field.name.clone(), field_value_to_json(&field.value));
        }
        Json::Object(obj)
    }

    /// Decode a CSL-JSON object. Items without an `id` fall back to
    /// `fallback_id` so fetch-resolved metadata stays addressable.
    pub fn from_csl_json(value: &Json, fallback_id: &str) -> Option<Self> {
        let obj = value.as_object()?;
        let entry_type = obj
            .get("type")
            .and_then(Json::as_str)
            .unwrap_or("document")
            .to_string();
        let id = match obj.get("id") {
            Some(Json::String(s)) => s.clone(),
            Some(Json::Number(n)) => n.to_string(),
            _ => fallback_id.to_string(),
        };
        let mut entity = Entity::new(id, entry_type);
        for (name, val) in obj {
            if name == "type" || name == "id" {
                continue;
            }
            if let Some(fv) = field_value_from_json(val) {
                entity.set(name.clone(), fv);
            }
        }
        Some(entity)
    }
}

fn field_value_to_json(value: &FieldValue) -> Json {
    match value {
        FieldValue::Scalar(s) => json!(s),
        FieldValue::List(items) => json!(items),
        FieldValue::Names(names) => {
            Json::Array(names.iter().map(Name::to_csl_json).collect())
        }
        FieldValue::Date(date) => date.to_csl_json(),
    }
}

fn field_value_from_json(value: &Json) -> Option<FieldValue> {
    match value {
        Json::String(s) => Some(FieldValue::Scalar(s.clone())),
        Json::Number(n) => Some(FieldValue::Scalar(n.to_string())),
        Json::Bool(b) => Some(FieldValue::Scalar(b.to_string())),
        Json::Array(items) => {
            if items.iter().all(|i| i.is_string()) {
                Some(FieldValue::List(
                    items
                        .iter()
                        .filter_map(Json::as_str)
                        .map(str::to_string)
                        .collect(),
                ))
            } else {
                let names: Vec<Name> =
                    items.iter().filter_map(Name::from_csl_json).collect();
                if names.is_empty() {
                    None
                } else {
                    Some(FieldValue::Names(names))
                }
            }
        }
        Json::Object(_) => DateValue::from_csl_json(value).map(FieldValue::Date).or_else(|| {
            // Unknown nested objects are carried as their JSON text so no
            // data is dropped on the floor.
            Some(FieldValue::Scalar(value.to_string()))
        }),
        Json::Null => None,
    }
}
