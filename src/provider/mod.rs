//! Resource and data source handlers
//!
//! A host drives these through [`Provider`]: configuration goes in as an
//! attribute map, state comes back as a [`ResourceData`]. Schemas are
//! data-driven (see [`registry`]) and validated before any API call.
//!
//! # Architecture
//!
//! - [`registry`] - Loads resource/data source schemas and validator registrations
//! - [`validate`] - Required-attribute, allow-list and regexp/length validation
//! - [`state`] - [`ResourceData`] and composite id helpers
//! - [`connection_actions`] - `ibm_tg_connection_actions` resource
//! - [`gateway`] - `ibm_tg_gateway` data source

pub mod connection_actions;
pub mod gateway;
pub mod registry;
pub mod state;
pub mod validate;

pub use registry::{get_data_source_schema, get_registry, get_resource_schema};
pub use state::{id_parts, ResourceData};

use crate::ibm::client::TransitGatewayClient;
use anyhow::Result;
use registry::SchemaDef;
use serde_json::{Map, Value};
use std::time::Duration;

/// Create timeout when neither the schema nor the caller sets one
const FALLBACK_CREATE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Dispatches host operations to the resource and data source handlers
#[derive(Clone)]
pub struct Provider {
    client: TransitGatewayClient,
    create_timeout: Option<Duration>,
}

impl Provider {
    pub fn new(client: TransitGatewayClient) -> Self {
        Self {
            client,
            create_timeout: None,
        }
    }

    /// Override the schema's create timeout
    pub fn with_create_timeout(mut self, timeout: Duration) -> Self {
        self.create_timeout = Some(timeout);
        self
    }

    pub fn client(&self) -> &TransitGatewayClient {
        &self.client
    }

    /// Create a resource from configuration
    pub async fn create(&self, resource: &str, config: Map<String, Value>) -> Result<ResourceData> {
        let schema = resource_schema(resource)?;
        validate::validate_config(resource, schema, &config)?;

        let timeout = self
            .create_timeout
            .or_else(|| schema.create_timeout())
            .unwrap_or(FALLBACK_CREATE_TIMEOUT);

        tracing::info!("create: resource={}", resource);
        let mut d = ResourceData::from_config(config);

        match resource {
            connection_actions::RESOURCE_NAME => {
                connection_actions::create(&self.client, &mut d, timeout).await?
            },
            _ => return Err(anyhow::anyhow!("Unknown resource: {}", resource)),
        }

        Ok(d)
    }

    /// Refresh resource state. State without an id is returned unchanged.
    pub async fn read(&self, resource: &str, mut d: ResourceData) -> Result<ResourceData> {
        resource_schema(resource)?;
        if d.is_gone() {
            return Ok(d);
        }

        tracing::info!("read: resource={}, id={}", resource, d.id());

        match resource {
            connection_actions::RESOURCE_NAME => connection_actions::read(&self.client, &mut d).await?,
            _ => return Err(anyhow::anyhow!("Unknown resource: {}", resource)),
        }

        Ok(d)
    }

    /// Delete a resource
    pub async fn delete(&self, resource: &str, mut d: ResourceData) -> Result<ResourceData> {
        resource_schema(resource)?;
        tracing::info!("delete: resource={}, id={}", resource, d.id());

        match resource {
            connection_actions::RESOURCE_NAME => connection_actions::delete(&mut d)?,
            _ => return Err(anyhow::anyhow!("Unknown resource: {}", resource)),
        }

        Ok(d)
    }

    /// Import an existing object by id
    pub async fn import(&self, resource: &str, id: &str) -> Result<ResourceData> {
        let schema = resource_schema(resource)?;
        if !schema.importable {
            anyhow::bail!("Resource {} does not support import", resource);
        }

        tracing::info!("import: resource={}, id={}", resource, id);
        let mut d = ResourceData::default();

        match resource {
            connection_actions::RESOURCE_NAME => {
                connection_actions::import(&self.client, &mut d, id).await?
            },
            _ => return Err(anyhow::anyhow!("Unknown resource: {}", resource)),
        }

        Ok(d)
    }

    /// Read a data source from configuration
    pub async fn read_data_source(
        &self,
        data_source: &str,
        config: Map<String, Value>,
    ) -> Result<ResourceData> {
        let Some(schema) = get_data_source_schema(data_source) else {
            return Err(anyhow::anyhow!("Unknown data source: {}", data_source));
        };
        validate::validate_config(data_source, schema, &config)?;

        tracing::info!("read: data_source={}", data_source);
        let mut d = ResourceData::from_config(config);

        match data_source {
            gateway::DATA_SOURCE_NAME => gateway::read(&self.client, &mut d).await?,
            _ => return Err(anyhow::anyhow!("Unknown data source: {}", data_source)),
        }

        Ok(d)
    }
}

fn resource_schema(resource: &str) -> Result<&'static SchemaDef> {
    get_resource_schema(resource).ok_or_else(|| anyhow::anyhow!("Unknown resource: {}", resource))
}
