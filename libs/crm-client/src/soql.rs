//! Construction of read-only, single-object SOQL queries.
//!
//! Only the shape the action handlers need is supported: a field projection
//! from one object, optionally filtered by equality on a single field.

use std::fmt;

use crate::CrmError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoqlQuery {
    fields: Vec<String>,
    object: String,
    filter: Option<(String, String)>,
}

impl SoqlQuery {
    pub fn select<I, S>(fields: I) -> SoqlBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SoqlBuilder {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn where_eq(mut self, field: &str, value: &str) -> Result<Self, CrmError> {
        if !is_safe_api_name(field) {
            return Err(CrmError::InvalidQuery(format!(
                "invalid field name: {}",
                field
            )));
        }
        self.filter = Some((field.to_string(), value.to_string()));
        Ok(self)
    }
}

pub struct SoqlBuilder {
    fields: Vec<String>,
}

impl SoqlBuilder {
    pub fn from(self, object: &str) -> Result<SoqlQuery, CrmError> {
        if !is_safe_api_name(object) {
            return Err(CrmError::InvalidQuery(format!(
                "invalid object name: {}",
                object
            )));
        }
        if self.fields.is_empty() {
            return Err(CrmError::InvalidQuery("no fields selected".to_string()));
        }
        if let Some(field) = self.fields.iter().find(|f| !is_safe_api_name(f)) {
            return Err(CrmError::InvalidQuery(format!(
                "invalid field name: {}",
                field
            )));
        }

        Ok(SoqlQuery {
            fields: self.fields,
            object: object.to_string(),
            filter: None,
        })
    }
}

impl fmt::Display for SoqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.fields.join(", "), self.object)?;
        if let Some((field, value)) = &self.filter {
            write!(f, " WHERE {} = '{}'", field, escape_literal(value))?;
        }
        Ok(())
    }
}

/// Escape a value for use inside a single-quoted SOQL string literal.
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// API names are letters, digits and underscores, starting with a letter.
/// Relationship paths (`Account.Name`) are accepted segment by segment.
pub fn is_safe_api_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
