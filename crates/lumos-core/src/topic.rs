//! Bus topic identification and JSON round trip

use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value type that can be published on the bus.
///
/// `TYPE_NAME` is the topic a subscriber filters on and the event name the
/// `send` script refers to.
pub trait Topic: Serialize + DeserializeOwned {
    /// Fully qualified type name
    const TYPE_NAME: &'static str;

    /// Serialize to compact JSON
    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON
    fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
