//! `ibm_tg_connection_actions` resource
//!
//! Approves or rejects a cross-account connection request. The action is a
//! one-shot directive with no identity of its own, so create and delete
//! both leave the id empty.

use super::state::{build_id, id_parts, ResourceData};
use crate::ibm::client::TransitGatewayClient;
use crate::ibm::http::is_not_found;
use crate::ibm::models::ConnectionAction;
use anyhow::{Context, Result};
use std::time::Duration;

pub const RESOURCE_NAME: &str = "ibm_tg_connection_actions";

pub const TG_GATEWAY_ID: &str = "gateway";
pub const TG_CONNECTION_ID: &str = "connection_id";
pub const TG_CONNECTION_ACTION: &str = "action";
pub const TG_REQUEST_STATUS: &str = "request_status";
pub const RELATED_CRN: &str = "related_crn";

/// Issue the action. Does not wait for the connection to change state.
pub async fn create(
    client: &TransitGatewayClient,
    d: &mut ResourceData,
    timeout: Duration,
) -> Result<()> {
    let gateway_id = d.require_str(TG_GATEWAY_ID)?.to_string();
    let connection_id = d.require_str(TG_CONNECTION_ID)?.to_string();
    let action: ConnectionAction = d.require_str(TG_CONNECTION_ACTION)?.parse()?;

    let call =
        client.create_transit_gateway_connection_actions(&gateway_id, &connection_id, action);

    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.context("XAC connection action err")?,
        Err(_) => anyhow::bail!(
            "XAC connection action err: timed out after {}s (gateway {}, connection {})",
            timeout.as_secs(),
            gateway_id,
            connection_id
        ),
    }

    d.set_id("");
    Ok(())
}

/// Refresh informational attributes from the connection and its gateway.
///
/// A connection that no longer exists clears the id instead of failing.
pub async fn read(client: &TransitGatewayClient, d: &mut ResourceData) -> Result<()> {
    let parts = id_parts(d.id())?;
    let gateway_id = parts[0].to_string();
    let id = parts[1].to_string();

    let instance = match client
        .get_transit_gateway_connection(&gateway_id, &id)
        .await
    {
        Ok(instance) => instance,
        Err(err) if is_not_found(&err) => {
            tracing::info!(
                "Transit gateway connection {} on {} not found, clearing id",
                id,
                gateway_id
            );
            d.set_id("");
            return Ok(());
        },
        Err(err) => {
            return Err(err.context(format!("Error Getting Transit Gateway Connection ({})", id)))
        },
    };

    if let Some(request_status) = instance.request_status {
        d.set(TG_REQUEST_STATUS, request_status);
    }
    d.set(TG_CONNECTION_ID, instance.id.unwrap_or(id));
    d.set(TG_GATEWAY_ID, gateway_id.as_str());

    let tgw = client
        .get_transit_gateway(&gateway_id)
        .await
        .with_context(|| format!("Error Getting Transit Gateway ({})", gateway_id))?;
    if let Some(crn) = tgw.crn {
        d.set(RELATED_CRN, crn);
    }

    Ok(())
}

/// Nothing to undo remotely; only the local identity is dropped
pub fn delete(d: &mut ResourceData) -> Result<()> {
    d.set_id("");
    Ok(())
}

/// Adopt an existing connection by `<gateway>/<connection>` id, then read it
pub async fn import(client: &TransitGatewayClient, d: &mut ResourceData, id: &str) -> Result<()> {
    let parts = id_parts(id)?;
    d.set_id(build_id(&parts));
    d.set(TG_GATEWAY_ID, parts[0]);
    d.set(TG_CONNECTION_ID, parts[1]);
    read(client, d).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ibm::auth::IamCredentials;
    use serde_json::json;

    fn offline_client() -> TransitGatewayClient {
        // Port 9 (discard) is never contacted by these tests
        TransitGatewayClient::new(
            IamCredentials::from_token("t"),
            "http://127.0.0.1:9/v1",
            "2024-07-16",
        )
        .unwrap()
    }

    #[test]
    fn test_delete_clears_id() {
        let mut d = ResourceData::default();
        d.set_id("gw/conn");
        delete(&mut d).unwrap();
        assert!(d.is_gone());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_action_before_calling_api() {
        let config = json!({ "gateway": "gw", "connection_id": "c", "action": "accept" });
        let mut d = ResourceData::from_config(config.as_object().unwrap().clone());
        let err = create(&offline_client(), &mut d, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("approve, reject"));
    }

    #[tokio::test]
    async fn test_read_rejects_malformed_id() {
        let mut d = ResourceData::default();
        d.set_id("no-separator");
        assert!(read(&offline_client(), &mut d).await.is_err());
    }
}
