//! Structural description of an actor's input.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::FieldValue;

/// Editor hint for a multi-line text property.
pub const TEXTAREA_FORMAT: &str = "textarea";

/// Input schema of an actor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSchema {
    #[serde(default)]
    pub title: String,

    /// Structural kind, normally "object"
    #[serde(rename = "type", default = "object_kind")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameters in declaration order
    #[serde(default)]
    pub properties: IndexMap<String, Property>,

    /// Names of mandatory parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<IndexSet<String>>,

    /// Keys this crate does not interpret (e.g. `schemaVersion`)
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl InputSchema {
    /// Creates an empty object schema.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: object_kind(),
            description: None,
            properties: IndexMap::new(),
            required: None,
            extra: IndexMap::new(),
        }
    }

    /// Drops `required` entries that are not declared properties.
    #[must_use]
    pub fn retain_declared_required(mut self) -> Self {
        if let Some(required) = self.required.as_mut() {
            let before = required.len();
            required.retain(|name| self.properties.contains_key(name));
            if required.len() != before {
                warn!(
                    title = %self.title,
                    dropped = before - required.len(),
                    "Dropped required entries without a matching property"
                );
            }
        }
        self
    }

    /// Returns true if `name` is a mandatory parameter.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|required| required.contains(name))
    }
}

fn object_kind() -> String {
    "object".to_owned()
}

/// Value type of a single input parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

/// One input parameter.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "type")]
    pub kind: PropertyType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Presentation hint (e.g. `textarea`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<FieldValue>,

    /// Allowed literal values, in display order
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<FieldValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    /// Presentation only, never submitted
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    pub read_only: bool,

    /// Keys this crate does not interpret (e.g. `editor`, `prefill`)
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Property {
    /// Creates a property of the given type with no other attributes.
    #[must_use]
    pub fn new(kind: PropertyType) -> Self {
        Self {
            kind,
            title: None,
            description: None,
            format: None,
            default: None,
            example: None,
            allowed: None,
            minimum: None,
            maximum: None,
            read_only: false,
            extra: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Schema as delivered by the platform.
///
/// Versions embed the schema as an object, while build details carry it as
/// a JSON-encoded string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SchemaPayload {
    Inline(Box<InputSchema>),
    Encoded(String),
    /// Anything else; kept so one malformed schema cannot fail the record
    Unrecognized(serde_json::Value),
}

impl SchemaPayload {
    /// Decodes the payload into a schema.
    ///
    /// Returns `None` if an encoded payload is not a valid schema document.
    #[must_use]
    pub fn into_schema(self) -> Option<InputSchema> {
        let schema = match self {
            Self::Inline(schema) => *schema,
            Self::Encoded(raw) => match serde_json::from_str::<InputSchema>(&raw) {
                Ok(schema) => schema,
                Err(error) => {
                    warn!("Ignoring undecodable input schema: {error}");
                    return None;
                }
            },
            Self::Unrecognized(_) => {
                warn!("Ignoring input schema of unrecognized shape");
                return None;
            }
        };
        Some(schema.retain_declared_required())
    }
}
