//! Common types for HubSpot CRM resources.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single CRM property value.
///
/// HubSpot models every resource as a string-keyed property bag; values on the
/// wire are JSON scalars. Deserialization is untagged, so `"x"`, `42`, `true`
/// and `null` all round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A string property.
    String(String),
    /// A numeric property.
    Number(f64),
    /// A boolean property.
    Bool(bool),
    /// An unset property.
    Null,
}

impl PropertyValue {
    /// The string value, if this is a string property.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric value, if this is a number property.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean value, if this is a boolean property.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// True if the property is unset.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// String-keyed property bag carried by every CRM resource.
pub type Properties = HashMap<String, PropertyValue>;

/// A HubSpot contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// Object ID assigned by HubSpot.
    pub id: String,
    /// Contact properties.
    #[serde(default)]
    pub properties: Properties,
    /// Creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Last-modified timestamp.
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Whether the contact is archived.
    #[serde(default)]
    pub archived: bool,
}
