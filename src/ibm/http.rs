//! HTTP utilities for IBM Cloud REST API calls

use anyhow::{Context, Result};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// A non-success response from the API.
///
/// Carries the status and the raw body so handlers can report
/// the response alongside their own context, and so a 404 can be told
/// apart from every other failure.
#[derive(Debug, Clone, Error)]
#[error("API request failed: {status} ({method} {path})\n{body}")]
pub struct ApiError {
    pub status: StatusCode,
    pub method: Method,
    pub path: String,
    pub body: String,
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }
}

/// True when `error` (or anything it wraps) is an API 404
pub fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ApiError>()
        .map(ApiError::is_not_found)
        .unwrap_or(false)
}

/// True when `error` (or anything it wraps) is an API 401
pub fn is_unauthorized(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ApiError>()
        .map(ApiError::is_unauthorized)
        .unwrap_or(false)
}

/// HTTP client wrapper for IBM Cloud API calls
#[derive(Clone)]
pub struct IbmHttpClient {
    client: Client,
    correlation_id: String,
}

impl IbmHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("tgctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            correlation_id: uuid::Uuid::new_v4().to_string(),
        })
    }

    /// Access the underlying reqwest client (used for the IAM token exchange)
    pub(crate) fn inner(&self) -> &Client {
        &self.client
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, token: &str) -> Result<Value> {
        self.send(Method::GET, url, token, None).await
    }

    /// Make a POST request with an optional JSON body
    pub async fn post(&self, url: &str, token: &str, body: Option<&Value>) -> Result<Value> {
        self.send(Method::POST, url, token, body).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        token: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .header("X-Correlation-Id", &self.correlation_id);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Only the log line is sanitized; the error keeps the full body
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&response_body));
            return Err(ApiError {
                status,
                method,
                path: request_path(url),
                body: response_body,
            }
            .into());
        }

        // 202/204 with no content
        if response_body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_body).context("Failed to parse response JSON")
    }
}

/// Path portion of a URL, without the query string
fn request_path(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.split('?').next().unwrap_or(url).to_string())
}

/// Format an API error for display
pub fn format_api_error(error: &anyhow::Error) -> String {
    let Some(api_error) = error.downcast_ref::<ApiError>() else {
        return format!("{:#}", error);
    };

    match api_error.status.as_u16() {
        401 => "Authentication failed. Check IC_API_KEY / IBMCLOUD_API_KEY.".to_string(),
        403 => "Permission denied. Check your IAM access policies.".to_string(),
        404 => "Resource not found.".to_string(),
        409 => "Resource conflict. The connection may not be pending approval.".to_string(),
        429 => "Rate limit exceeded. Please try again later.".to_string(),
        500 | 503 => "Transit Gateway service temporarily unavailable. Please try again."
            .to_string(),
        _ => format!("{:#}", error),
    }
}
