//! IBM Cloud API interaction module
//!
//! This module provides the pieces needed to talk to the Transit Gateway
//! API: IAM authentication, the HTTP client, response models, and the
//! REST operations themselves.
//!
//! # Module Structure
//!
//! - [`auth`] - API key to bearer token exchange with caching
//! - [`client`] - Main Transit Gateway client and URL helpers
//! - [`http`] - HTTP utilities and the [`http::ApiError`] type
//! - [`models`] - Serde models for gateways, connections and prefix filters
//! - [`transit`] - List/get/action operations
//!
//! # Example
//!
//! ```ignore
//! use tgctl::ibm::{auth::IamCredentials, client::TransitGatewayClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let creds = IamCredentials::from_api_key("my-key", tgctl::ibm::auth::DEFAULT_IAM_URL)?;
//!     let client = TransitGatewayClient::new(creds, tgctl::ibm::client::DEFAULT_SERVICE_URL, "2024-07-16")?;
//!     let gateways = client.list_transit_gateways().await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod models;
pub mod transit;
