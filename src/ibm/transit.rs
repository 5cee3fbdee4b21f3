//! Transit Gateway API operations
//!
//! One function per REST operation the handlers need. List calls follow
//! `next.start` until the collection is exhausted, and fail rather than
//! return a partial list if it never is.

use super::client::{TransitGatewayClient, DEFAULT_PAGE_LIMIT};
use super::models::{
    ConnectionAction, TransitConnection, TransitConnectionCollection, TransitGateway,
    TransitGatewayCollection,
};
use anyhow::{Context, Result};
use serde_json::json;

/// Upper bound on pages followed for one list call
const MAX_PAGES: usize = 1000;

impl TransitGatewayClient {
    /// `GET /transit_gateways`, all pages
    pub async fn list_transit_gateways(&self) -> Result<Vec<TransitGateway>> {
        let path = self.gateway_path(None);
        let mut all_items = Vec::new();
        let mut start: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let url = self.page_url(&path, start.as_deref());
            let response = self.get(&url).await?;
            let page: TransitGatewayCollection = serde_json::from_value(response)
                .context("Failed to parse transit gateway collection")?;

            all_items.extend(page.transit_gateways);

            start = page.next.and_then(|n| n.start_token());
            if start.is_none() {
                break;
            }
        }

        if let Some(start) = start {
            anyhow::bail!(
                "Transit gateway listing exceeded {} pages, stopped at start={}",
                MAX_PAGES,
                start
            );
        }

        tracing::debug!("Listed {} transit gateways", all_items.len());
        Ok(all_items)
    }

    /// `GET /transit_gateways/{id}`
    pub async fn get_transit_gateway(&self, gateway_id: &str) -> Result<TransitGateway> {
        let url = self.api_url(&self.gateway_path(Some(gateway_id)), &[]);
        let response = self.get(&url).await?;
        serde_json::from_value(response).context("Failed to parse transit gateway")
    }

    /// `GET /transit_gateways/{gateway_id}/connections`, all pages
    pub async fn list_transit_gateway_connections(
        &self,
        gateway_id: &str,
    ) -> Result<Vec<TransitConnection>> {
        let path = self.connection_path(gateway_id, None);
        let mut all_items = Vec::new();
        let mut start: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let url = self.page_url(&path, start.as_deref());
            let response = self.get(&url).await?;
            let page: TransitConnectionCollection = serde_json::from_value(response)
                .context("Failed to parse transit gateway connection collection")?;

            all_items.extend(page.connections);

            start = page.next.and_then(|n| n.start_token());
            if start.is_none() {
                break;
            }
        }

        if let Some(start) = start {
            anyhow::bail!(
                "Connection listing for transit gateway {} exceeded {} pages, stopped at start={}",
                gateway_id,
                MAX_PAGES,
                start
            );
        }

        tracing::debug!(
            "Listed {} connections for transit gateway {}",
            all_items.len(),
            gateway_id
        );
        Ok(all_items)
    }

    /// `GET /transit_gateways/{gateway_id}/connections/{id}`
    pub async fn get_transit_gateway_connection(
        &self,
        gateway_id: &str,
        connection_id: &str,
    ) -> Result<TransitConnection> {
        let url = self.api_url(&self.connection_path(gateway_id, Some(connection_id)), &[]);
        let response = self.get(&url).await?;
        serde_json::from_value(response).context("Failed to parse transit gateway connection")
    }

    /// `POST /transit_gateways/{gateway_id}/connections/{id}/actions`
    ///
    /// The service answers 204 with no body; nothing is returned.
    pub async fn create_transit_gateway_connection_actions(
        &self,
        gateway_id: &str,
        connection_id: &str,
        action: ConnectionAction,
    ) -> Result<()> {
        let path = format!(
            "{}/actions",
            self.connection_path(gateway_id, Some(connection_id))
        );
        let url = self.api_url(&path, &[]);
        let body = json!({ "action": action.as_str() });

        tracing::info!(
            "connection action: gateway={}, connection={}, action={}",
            gateway_id,
            connection_id,
            action.as_str()
        );

        self.post(&url, Some(&body)).await?;
        Ok(())
    }

    fn page_url(&self, path: &str, start: Option<&str>) -> String {
        let limit = DEFAULT_PAGE_LIMIT.to_string();
        match start {
            Some(start) => self.api_url(path, &[("limit", limit.as_str()), ("start", start)]),
            None => self.api_url(path, &[("limit", limit.as_str())]),
        }
    }
}
