use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::CrmError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordAttributes {
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A single row returned by a query: a flat mapping from field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrmRecord {
    #[serde(default)]
    pub attributes: RecordAttributes,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CrmRecord {
    pub fn new(object_type: &str) -> Self {
        Self {
            attributes: RecordAttributes {
                object_type: object_type.to_string(),
                url: None,
            },
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn object_type(&self) -> &str {
        &self.attributes.object_type
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Numeric fields come back as JSON numbers, but formula fields and
    /// some currency types are serialized as strings.
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        match self.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn require_str(&self, field: &str) -> Result<&str, CrmError> {
        self.get_str(field).ok_or_else(|| self.missing(field))
    }

    pub fn require_f64(&self, field: &str) -> Result<f64, CrmError> {
        self.get_f64(field).ok_or_else(|| self.missing(field))
    }

    fn missing(&self, field: &str) -> CrmError {
        CrmError::MissingField {
            object: self.object_type().to_string(),
            field: field.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub total_size: u64,
    pub done: bool,
    #[serde(default)]
    pub records: Vec<CrmRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_records_url: Option<String>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&CrmRecord> {
        self.records.first()
    }
}
