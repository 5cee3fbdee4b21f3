//! Transit Gateway Client
//!
//! Main client for the Transit Gateway API, combining IAM authentication
//! and HTTP functionality.

use super::auth::IamCredentials;
use super::http::{is_unauthorized, IbmHttpClient};
use anyhow::{Context, Result};
use serde_json::Value;

/// Public Transit Gateway endpoint
pub const DEFAULT_SERVICE_URL: &str = "https://transit.cloud.ibm.com/v1";

/// Private Transit Gateway endpoint
pub const PRIVATE_SERVICE_URL: &str = "https://private.transit.cloud.ibm.com/v1";

/// API version date sent with every request
pub const DEFAULT_API_VERSION: &str = "2024-07-16";

/// Page size for list calls
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Main Transit Gateway client
#[derive(Clone)]
pub struct TransitGatewayClient {
    pub credentials: IamCredentials,
    pub http: IbmHttpClient,
    service_url: String,
    version: String,
}

impl TransitGatewayClient {
    /// Create a new client against `service_url`
    pub fn new(credentials: IamCredentials, service_url: &str, version: &str) -> Result<Self> {
        url::Url::parse(service_url)
            .with_context(|| format!("Invalid Transit Gateway endpoint: {}", service_url))?;

        let http = IbmHttpClient::new()?;

        Ok(Self {
            credentials,
            http,
            service_url: service_url.trim_end_matches('/').to_string(),
            version: version.to_string(),
        })
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token(&self.http).await
    }

    /// Make a GET request
    ///
    /// A 401 drops the cached token and retries once with a fresh one.
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        match self.http.get(url, &token).await {
            Err(err) if is_unauthorized(&err) => {
                tracing::debug!("401 from {}, refreshing IAM token", url);
                let token = self.credentials.refresh_token(&self.http).await?;
                self.http.get(url, &token).await
            },
            result => result,
        }
    }

    /// Make a POST request, retried once with a fresh token on 401
    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        let token = self.get_token().await?;
        match self.http.post(url, &token, body).await {
            Err(err) if is_unauthorized(&err) => {
                tracing::debug!("401 from {}, refreshing IAM token", url);
                let token = self.credentials.refresh_token(&self.http).await?;
                self.http.post(url, &token, body).await
            },
            result => result,
        }
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build an API URL from already-encoded path segments plus the version query
    pub fn api_url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}/{}?version={}",
            self.service_url,
            path.trim_start_matches('/'),
            urlencoding::encode(&self.version)
        );
        for (key, value) in query {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// `transit_gateways[/{id}]`
    pub fn gateway_path(&self, gateway_id: Option<&str>) -> String {
        match gateway_id {
            Some(id) => format!("transit_gateways/{}", urlencoding::encode(id)),
            None => "transit_gateways".to_string(),
        }
    }

    /// `transit_gateways/{gateway_id}/connections[/{id}]`
    pub fn connection_path(&self, gateway_id: &str, connection_id: Option<&str>) -> String {
        let base = format!("{}/connections", self.gateway_path(Some(gateway_id)));
        match connection_id {
            Some(id) => format!("{}/{}", base, urlencoding::encode(id)),
            None => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TransitGatewayClient {
        TransitGatewayClient::new(
            IamCredentials::from_token("t"),
            "https://transit.cloud.ibm.com/v1/",
            DEFAULT_API_VERSION,
        )
        .unwrap()
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        assert_eq!(client().service_url(), DEFAULT_SERVICE_URL);
    }

    #[test]
    fn test_api_url_has_version_and_query() {
        let c = client();
        let url = c.api_url(&c.gateway_path(None), &[("limit", "50")]);
        assert_eq!(
            url,
            "https://transit.cloud.ibm.com/v1/transit_gateways?version=2024-07-16&limit=50"
        );
    }

    #[test]
    fn test_connection_path_encodes_ids() {
        let c = client();
        assert_eq!(
            c.connection_path("gw 1", Some("c/2")),
            "transit_gateways/gw%201/connections/c%2F2"
        );
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        assert!(TransitGatewayClient::new(
            IamCredentials::from_token("t"),
            "not a url",
            DEFAULT_API_VERSION
        )
        .is_err());
    }
}
