//! Configuration Management
//!
//! Handles persistent configuration storage for tgctl and resolution of the
//! effective endpoint, API version and credentials.

use crate::ibm::auth::DEFAULT_IAM_URL;
use crate::ibm::client::{DEFAULT_API_VERSION, DEFAULT_SERVICE_URL, PRIVATE_SERVICE_URL};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variables checked for the API key, in order
pub const API_KEY_ENV_VARS: &[&str] = &["IC_API_KEY", "IBMCLOUD_API_KEY"];

/// Transit Gateway endpoint override
pub const TG_ENDPOINT_ENV_VAR: &str = "IBMCLOUD_TG_API_ENDPOINT";

/// IAM endpoint override
pub const IAM_ENDPOINT_ENV_VAR: &str = "IBMCLOUD_IAM_API_ENDPOINT";

/// Which service endpoint family to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Public or private endpoints
    #[serde(default)]
    pub visibility: Visibility,
    /// Explicit Transit Gateway endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Explicit IAM endpoint
    #[serde(default)]
    pub iam_endpoint: Option<String>,
    /// API version date
    #[serde(default)]
    pub api_version: Option<String>,
    /// Create timeout in seconds
    #[serde(default)]
    pub create_timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tgctl").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Effective Transit Gateway endpoint (env > config > visibility default)
    pub fn effective_endpoint(&self) -> String {
        non_empty_env(TG_ENDPOINT_ENV_VAR)
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| match self.visibility {
                Visibility::Public => DEFAULT_SERVICE_URL.to_string(),
                Visibility::Private => PRIVATE_SERVICE_URL.to_string(),
            })
    }

    /// Effective IAM endpoint (env > config > visibility default)
    pub fn effective_iam_endpoint(&self) -> String {
        non_empty_env(IAM_ENDPOINT_ENV_VAR)
            .or_else(|| self.iam_endpoint.clone())
            .unwrap_or_else(|| match self.visibility {
                Visibility::Public => DEFAULT_IAM_URL.to_string(),
                Visibility::Private => "https://private.iam.cloud.ibm.com".to_string(),
            })
    }

    pub fn effective_api_version(&self) -> String {
        self.api_version
            .clone()
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string())
    }

    pub fn create_timeout(&self) -> Option<Duration> {
        self.create_timeout_secs.map(Duration::from_secs)
    }

    /// Set visibility and save
    pub fn set_visibility(&mut self, visibility: Visibility) -> Result<()> {
        self.visibility = visibility;
        self.save()
    }
}

/// API key from the environment. Never read from or written to the config file.
pub fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS.iter().find_map(|var| non_empty_env(var))
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}
