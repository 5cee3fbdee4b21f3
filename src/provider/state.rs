//! Resource state passed between the host and the handlers

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Separator used by composite ids such as `<gateway>/<connection>`
pub const ID_SEPARATOR: char = '/';

/// Configuration and state of one resource or data source instance.
///
/// Handlers read configuration attributes from it and write computed
/// attributes back. An empty id means "no resource".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    attributes: Map<String, Value>,
}

impl ResourceData {
    /// State seeded with configuration attributes
    pub fn from_config(config: Map<String, Value>) -> Self {
        Self {
            id: String::new(),
            attributes: config,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// True once the id has been cleared (or was never set)
    pub fn is_gone(&self) -> bool {
        self.id.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Required string attribute
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key)
            .ok_or_else(|| anyhow::anyhow!("attribute {:?} is required", key))
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    /// State rendered as a single JSON object with `id` alongside the attributes
    pub fn to_json(&self) -> Value {
        let mut map = self.attributes.clone();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(map)
    }
}

/// Split a composite id into its parts
pub fn id_parts(id: &str) -> Result<Vec<&str>> {
    let parts: Vec<&str> = id.split(ID_SEPARATOR).collect();
    if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!(
            "The given id {:?} does not contain all expected sections, should be of format <gateway>{}<connection>",
            id,
            ID_SEPARATOR
        );
    }
    Ok(parts)
}

/// Join id parts into a composite id
pub fn build_id(parts: &[&str]) -> String {
    parts.join(&ID_SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_parts() {
        assert_eq!(id_parts("gw/conn").unwrap(), vec!["gw", "conn"]);
        assert!(id_parts("gw").is_err());
        assert!(id_parts("gw/").is_err());
        assert!(id_parts("").is_err());
    }

    #[test]
    fn test_build_id_round_trip() {
        let id = build_id(&["gw", "conn"]);
        assert_eq!(id, "gw/conn");
        assert_eq!(id_parts(&id).unwrap(), vec!["gw", "conn"]);
    }

    #[test]
    fn test_null_attributes_read_as_absent() {
        let config = json!({ "gateway": null, "action": "approve" });
        let data = ResourceData::from_config(config.as_object().unwrap().clone());
        assert!(data.get("gateway").is_none());
        assert_eq!(data.get_str("action"), Some("approve"));
        assert!(data.require_str("gateway").is_err());
    }

    #[test]
    fn test_to_json_includes_id() {
        let mut data = ResourceData::default();
        data.set_id("abc");
        data.set("name", "gw");
        assert_eq!(data.to_json(), json!({ "id": "abc", "name": "gw" }));
        assert!(!data.is_gone());
    }
}
