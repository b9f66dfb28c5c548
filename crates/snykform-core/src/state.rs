// ── Declarative resource state ──
//
// A resource instance as the declarative layer sees it: an optional remote
// id plus a JSON attribute map. Nested blocks are one-element arrays of
// objects, the same shape they have in the snapshot file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Attribute map of one resource (or one block element).
pub type Attributes = Map<String, Value>;

/// One declared/applied resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    attributes: Attributes,
}

impl ResourceData {
    /// Declared-not-applied state: attributes without an id.
    pub fn new(attributes: Attributes) -> Self {
        Self {
            id: None,
            attributes,
        }
    }

    pub fn with_id(id: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            id: Some(id.into()),
            attributes,
        }
    }

    // ── Identity ─────────────────────────────────────────────────────

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// The id, or [`CoreError::MissingIdentity`] naming `resource`.
    pub fn require_id(&self, resource: &str) -> Result<&str, CoreError> {
        self.id().ok_or_else(|| CoreError::MissingIdentity {
            resource: resource.to_owned(),
        })
    }

    // ── Attributes ───────────────────────────────────────────────────

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// A string attribute that must be present and non-empty.
    pub fn require_str(&self, name: &str) -> Result<&str, CoreError> {
        match self.get_str(name) {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(CoreError::validation(name, "required attribute is not set")),
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.attributes.insert(name.to_owned(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    /// The single element of block `name`.
    pub fn block(&self, name: &str) -> Result<&Attributes, CoreError> {
        block(&self.attributes, name)
    }
}

/// The single element of block `name` inside `attrs`.
///
/// Blocks are declared with exactly one element; an absent, empty, or
/// malformed list is reported as [`CoreError::StateDecode`].
pub fn block<'a>(attrs: &'a Attributes, name: &str) -> Result<&'a Attributes, CoreError> {
    attrs
        .get(name)
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(Value::as_object)
        .ok_or_else(|| CoreError::StateDecode {
            block: name.to_owned(),
        })
}

/// Wrap a block element as the one-element list stored in state.
pub fn single_block(element: Attributes) -> Value {
    Value::Array(vec![Value::Object(element)])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn block_returns_first_element() {
        let data = ResourceData::new(attrs(json!({
            "credentials": [{"username": "u"}]
        })));
        let creds = data.block("credentials").unwrap();
        assert_eq!(creds.get("username"), Some(&json!("u")));
    }

    #[test]
    fn empty_block_is_a_state_decode_error() {
        let data = ResourceData::new(attrs(json!({"credentials": []})));
        let err = data.block("credentials").unwrap_err();
        assert_eq!(err.to_string(), "unable to fetch credentials from state");

        let missing = ResourceData::default();
        assert!(matches!(
            missing.block("notifications"),
            Err(CoreError::StateDecode { .. })
        ));
    }

    #[test]
    fn empty_id_counts_as_unset() {
        let mut data = ResourceData::default();
        data.set_id("");
        assert_eq!(data.id(), None);
        data.set_id("org-1");
        assert_eq!(data.require_id("organization.acme").unwrap(), "org-1");
        data.clear_id();
        assert!(matches!(
            data.require_id("organization.acme"),
            Err(CoreError::MissingIdentity { .. })
        ));
    }

    #[test]
    fn require_str_rejects_empty() {
        let data = ResourceData::new(attrs(json!({"name": ""})));
        assert!(data.require_str("name").is_err());
        assert!(data.require_str("other").is_err());
    }
}
