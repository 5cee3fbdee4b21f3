//! Schema Registry - Load resource and data source schemas from JSON
//!
//! Schemas and validator registrations are declared in embedded JSON and
//! parsed once on first access.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use std::time::Duration;

/// Embedded schema JSON files (compiled into the binary)
const SCHEMA_FILES: &[&str] = &[include_str!("schemas/transit_gateway.json")];

/// Attribute value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Int,
    Bool,
    List,
}

/// One attribute of a resource or data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDef {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub force_new: bool,
    /// Run the validator registered for this attribute
    #[serde(default)]
    pub validate: bool,
    #[serde(default)]
    pub description: Option<String>,
    /// Nested element schema for list attributes
    #[serde(default)]
    pub elem: Option<BTreeMap<String, AttributeDef>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct TimeoutsDef {
    #[serde(default)]
    pub create_secs: Option<u64>,
}

/// Schema of one resource or data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDef {
    pub description: String,
    #[serde(default)]
    pub timeouts: TimeoutsDef,
    #[serde(default)]
    pub importable: bool,
    pub attributes: BTreeMap<String, AttributeDef>,
}

impl SchemaDef {
    pub fn create_timeout(&self) -> Option<Duration> {
        self.timeouts.create_secs.map(Duration::from_secs)
    }

    pub fn required_attributes(&self) -> impl Iterator<Item = (&String, &AttributeDef)> {
        self.attributes.iter().filter(|(_, a)| a.required)
    }
}

/// Validation function identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidateFunction {
    AllowedStringValue,
    RegexpLen,
}

/// Validator registration for one attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorDef {
    pub function: ValidateFunction,
    /// Comma separated list, e.g. `"approve, reject"`
    #[serde(default)]
    pub allowed_values: Option<String>,
    #[serde(default)]
    pub regexp: Option<String>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
}

impl ValidatorDef {
    pub fn allowed_values(&self) -> Vec<String> {
        self.allowed_values
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Root structure of schemas/*.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchemaConfig {
    #[serde(default)]
    pub validators: HashMap<String, HashMap<String, ValidatorDef>>,
    #[serde(default)]
    pub resources: HashMap<String, SchemaDef>,
    #[serde(default)]
    pub data_sources: HashMap<String, SchemaDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<SchemaConfig> = OnceLock::new();

/// Get the schema registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static SchemaConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = SchemaConfig::default();

        for content in SCHEMA_FILES {
            let partial: SchemaConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded schema JSON: {}", e));
            final_config.validators.extend(partial.validators);
            final_config.resources.extend(partial.resources);
            final_config.data_sources.extend(partial.data_sources);
        }

        final_config
    })
}

/// Get a resource schema by type name
pub fn get_resource_schema(name: &str) -> Option<&'static SchemaDef> {
    get_registry().resources.get(name)
}

/// Get a data source schema by type name
pub fn get_data_source_schema(name: &str) -> Option<&'static SchemaDef> {
    get_registry().data_sources.get(name)
}

/// Get the validator registered for `resource`.`attribute`
pub fn get_validator(resource: &str, attribute: &str) -> Option<&'static ValidatorDef> {
    get_registry().validators.get(resource)?.get(attribute)
}
