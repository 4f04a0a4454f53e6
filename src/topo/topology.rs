//! The fetched topology document and its object selection policy.

use serde_json::Value;

use crate::error::{Error, Result};

/// A compact encoded geometry document, as fetched. Held opaque until a
/// named geometry object is selected and expanded into features.
#[derive(Debug)]
pub struct Topology {
    doc: Value,
}

impl Topology {
    /// Wrap a fetched JSON document. The document must carry a
    /// non-empty `objects` mapping.
    pub fn from_value(doc: Value) -> Result<Self> {
        let objects = doc
            .get("objects")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::format("document has no objects mapping"))?;
        if objects.is_empty() {
            return Err(Error::format("objects mapping is empty"));
        }
        Ok(Self { doc })
    }

    /// Select a geometry object collection out of the document. The
    /// policy is order-sensitive: try `primary`, then `secondary`, then
    /// fall back to the first key in document order.
    pub fn select_object(&self, primary: &str, secondary: &str) -> Result<(&str, &Value)> {
        let objects = self
            .doc
            .get("objects")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::format("document has no objects mapping"))?;

        for key in [primary, secondary] {
            if let Some((name, value)) = objects.get_key_value(key) {
                return Ok((name.as_str(), value));
            }
        }
        objects
            .iter()
            .next()
            .map(|(name, value)| (name.as_str(), value))
            .ok_or_else(|| Error::format("objects mapping is empty"))
    }

    /// Names of the geometry objects the document carries, in document
    /// order.
    pub fn object_keys(&self) -> Vec<&str> {
        self.doc
            .get("objects")
            .and_then(Value::as_object)
            .map(|objects| objects.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub(crate) fn doc(&self) -> &Value {
        &self.doc
    }
}
