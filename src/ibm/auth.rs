//! IBM Cloud IAM Authentication
//!
//! Exchanges an API key for a bearer token at the IAM token endpoint and
//! caches it until shortly before it expires.

use super::http::{sanitize_for_log, IbmHttpClient};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Public IAM endpoint
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";

/// Grant type for API key exchange
const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// TTL used when IAM does not report `expires_in`
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Where tokens come from
#[derive(Clone)]
enum TokenSource {
    /// Exchange an API key at `{iam_url}/identity/token`
    ApiKey { api_key: String, iam_url: String },
    /// A pre-issued bearer token, used as-is
    Static(String),
}

/// IAM credentials holder with token caching
#[derive(Clone)]
pub struct IamCredentials {
    source: TokenSource,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl IamCredentials {
    /// Credentials that exchange `api_key` at the given IAM endpoint
    pub fn from_api_key(api_key: &str, iam_url: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            anyhow::bail!("IAM API key is empty. Set IC_API_KEY or IBMCLOUD_API_KEY");
        }

        Ok(Self {
            source: TokenSource::ApiKey {
                api_key: api_key.to_string(),
                iam_url: iam_url.trim_end_matches('/').to_string(),
            },
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Credentials backed by an already issued bearer token
    pub fn from_token(token: &str) -> Self {
        Self {
            source: TokenSource::Static(token.to_string()),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for API calls
    pub async fn get_token(&self, http: &IbmHttpClient) -> Result<String> {
        let (api_key, iam_url) = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::ApiKey { api_key, iam_url } => (api_key, iam_url),
        };

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached IAM token expired, fetching new token");
            }
        }

        let url = format!("{}/identity/token", iam_url);
        tracing::debug!("POST {}", url);

        let response = http
            .inner()
            .post(&url)
            .header("Accept", "application/json")
            .form(&[("grant_type", APIKEY_GRANT_TYPE), ("apikey", api_key.as_str())])
            .send()
            .await
            .context("Failed to send IAM token request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read IAM token response")?;

        if !status.is_success() {
            tracing::error!("IAM error: {} - {}", status, sanitize_for_log(&body));
            anyhow::bail!("Failed to get IAM access token: {}", status);
        }

        let token: IamTokenResponse =
            serde_json::from_str(&body).context("Failed to parse IAM token response")?;

        let ttl = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.access_token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New IAM token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token.access_token)
    }

    /// Drop the cached token and fetch a new one. Static tokens are returned as-is.
    pub async fn refresh_token(&self, http: &IbmHttpClient) -> Result<String> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        self.get_token(http).await
    }
}
