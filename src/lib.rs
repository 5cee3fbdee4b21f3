//! IBM Cloud Transit Gateway resource handlers
//!
//! - [`ibm`] - IAM-authenticated Transit Gateway REST client
//! - [`provider`] - `ibm_tg_connection_actions` resource and `ibm_tg_gateway` data source
//! - [`config`] - Endpoint and timeout configuration

pub mod config;
pub mod ibm;
pub mod provider;

/// Version injected at compile time via TGCTL_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("TGCTL_VERSION") {
    Some(v) => v,
    None => "dev",
};
