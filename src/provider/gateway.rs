//! `ibm_tg_gateway` data source
//!
//! Looks a gateway up by name and flattens its connections, including each
//! connection's prefix filters, into state.

use super::state::ResourceData;
use crate::ibm::client::TransitGatewayClient;
use crate::ibm::models::{format_timestamp, PrefixFilter, TransitConnection, TransitGateway};
use anyhow::{Context, Result};
use serde_json::{Map, Value};

pub const DATA_SOURCE_NAME: &str = "ibm_tg_gateway";

pub const TG_NAME: &str = "name";
pub const TG_CRN: &str = "crn";
pub const TG_LOCATION: &str = "location";
pub const TG_CREATED_AT: &str = "created_at";
pub const TG_UPDATED_AT: &str = "updated_at";
pub const TG_GLOBAL: &str = "global";
pub const TG_STATUS: &str = "status";
pub const TG_RESOURCE_GROUP: &str = "resource_group";
pub const TG_CONNECTIONS: &str = "connections";

pub const ID: &str = "id";
pub const TG_NETWORK_TYPE: &str = "network_type";
pub const TG_NETWORK_ID: &str = "network_id";
pub const TG_NETWORK_ACCOUNT_ID: &str = "network_account_id";
pub const TG_BASE_CONNECTION_ID: &str = "base_connection_id";
pub const TG_BASE_NETWORK_TYPE: &str = "base_network_type";
pub const TG_LOCAL_BGP_ASN: &str = "local_bgp_asn";
pub const TG_LOCAL_GATEWAY_IP: &str = "local_gateway_ip";
pub const TG_LOCAL_TUNNEL_IP: &str = "local_tunnel_ip";
pub const TG_REMOTE_BGP_ASN: &str = "remote_bgp_asn";
pub const TG_REMOTE_GATEWAY_IP: &str = "remote_gateway_ip";
pub const TG_REMOTE_TUNNEL_IP: &str = "remote_tunnel_ip";
pub const TG_ZONE: &str = "zone";
pub const TG_MTU: &str = "mtu";
pub const TG_PREFIX_FILTERS: &str = "prefix_filters";
pub const TG_PREFIX_FILTERS_DEFAULT: &str = "prefix_filters_default";

pub const TG_ACTION: &str = "action";
pub const TG_BEFORE: &str = "before";
pub const TG_PREFIX: &str = "prefix";
pub const TG_GE: &str = "ge";
pub const TG_LE: &str = "le";

/// Resolve the gateway named in `d`, then read its connections.
///
/// State is only written once every call has succeeded.
pub async fn read(client: &TransitGatewayClient, d: &mut ResourceData) -> Result<()> {
    let gw_name = d.require_str(TG_NAME)?.to_string();

    let gateways = client
        .list_transit_gateways()
        .await
        .context("Error while listing transit gateways")?;

    let Some(tgw) = gateways.iter().find(|tgw| tgw.name == gw_name) else {
        anyhow::bail!(
            "Couldn't find any gateway with the specified name: ({})",
            gw_name
        );
    };

    let mut staged = d.clone();
    apply_gateway(&mut staged, tgw);
    read_connections(client, &mut staged).await?;

    *d = staged;
    Ok(())
}

/// Copy gateway scalars into state, id included
pub fn apply_gateway(d: &mut ResourceData, tgw: &TransitGateway) {
    d.set_id(tgw.id.as_str());
    d.set(TG_NAME, tgw.name.as_str());

    if let Some(crn) = &tgw.crn {
        d.set(TG_CRN, crn.as_str());
    }
    if let Some(location) = &tgw.location {
        d.set(TG_LOCATION, location.as_str());
    }
    if let Some(created_at) = &tgw.created_at {
        d.set(TG_CREATED_AT, format_timestamp(created_at));
    }
    if let Some(updated_at) = &tgw.updated_at {
        d.set(TG_UPDATED_AT, format_timestamp(updated_at));
    }
    if let Some(global) = tgw.global {
        d.set(TG_GLOBAL, global);
    }
    if let Some(status) = &tgw.status {
        d.set(TG_STATUS, status.as_str());
    }
    if let Some(rg_id) = tgw.resource_group.as_ref().and_then(|rg| rg.id.as_ref()) {
        d.set(TG_RESOURCE_GROUP, rg_id.as_str());
    }
}

/// List connections of the gateway whose id is in `d` into `connections`
pub async fn read_connections(client: &TransitGatewayClient, d: &mut ResourceData) -> Result<()> {
    let gateway_id = d.id().to_string();
    tracing::debug!("tgGatewayId: {}", gateway_id);

    let instances = client
        .list_transit_gateway_connections(&gateway_id)
        .await
        .with_context(|| {
            format!(
                "Error while listing transit gateway connections ({})",
                gateway_id
            )
        })?;

    let connections: Vec<Value> = instances
        .iter()
        .map(|instance| Value::Object(flatten_connection(instance)))
        .collect();

    d.set(TG_CONNECTIONS, connections);
    Ok(())
}

/// Flatten one connection. Absent fields produce no entry;
/// `prefix_filters` is always present.
pub fn flatten_connection(instance: &TransitConnection) -> Map<String, Value> {
    let mut tg_conn = Map::new();

    let strings = [
        (ID, &instance.id),
        (TG_NAME, &instance.name),
        (TG_NETWORK_TYPE, &instance.network_type),
        (TG_NETWORK_ID, &instance.network_id),
        (TG_NETWORK_ACCOUNT_ID, &instance.network_account_id),
        (TG_BASE_CONNECTION_ID, &instance.base_connection_id),
        (TG_BASE_NETWORK_TYPE, &instance.base_network_type),
        (TG_LOCAL_GATEWAY_IP, &instance.local_gateway_ip),
        (TG_LOCAL_TUNNEL_IP, &instance.local_tunnel_ip),
        (TG_REMOTE_GATEWAY_IP, &instance.remote_gateway_ip),
        (TG_REMOTE_TUNNEL_IP, &instance.remote_tunnel_ip),
        (TG_STATUS, &instance.status),
        (TG_PREFIX_FILTERS_DEFAULT, &instance.prefix_filters_default),
    ];
    for (key, value) in strings {
        if let Some(value) = value {
            tg_conn.insert(key.to_string(), Value::from(value.as_str()));
        }
    }

    let ints = [
        (TG_LOCAL_BGP_ASN, instance.local_bgp_asn),
        (TG_REMOTE_BGP_ASN, instance.remote_bgp_asn),
        (TG_MTU, instance.mtu),
    ];
    for (key, value) in ints {
        if let Some(value) = value {
            tg_conn.insert(key.to_string(), Value::from(value));
        }
    }

    if let Some(zone) = instance.zone.as_ref().and_then(|z| z.name.as_ref()) {
        tg_conn.insert(TG_ZONE.to_string(), Value::from(zone.as_str()));
    }
    if let Some(created_at) = &instance.created_at {
        tg_conn.insert(TG_CREATED_AT.to_string(), Value::from(format_timestamp(created_at)));
    }
    if let Some(updated_at) = &instance.updated_at {
        tg_conn.insert(TG_UPDATED_AT.to_string(), Value::from(format_timestamp(updated_at)));
    }

    let prefix_filters: Vec<Value> = instance
        .prefix_filters
        .iter()
        .map(|pf| Value::Object(flatten_prefix_filter(pf)))
        .collect();
    tg_conn.insert(TG_PREFIX_FILTERS.to_string(), Value::Array(prefix_filters));

    tg_conn
}

/// Flatten one prefix filter, skipping absent fields
pub fn flatten_prefix_filter(prefix_filter: &PrefixFilter) -> Map<String, Value> {
    let mut tg_prefix_filter = Map::new();

    let strings = [
        (ID, &prefix_filter.id),
        (TG_ACTION, &prefix_filter.action),
        (TG_PREFIX, &prefix_filter.prefix),
        (TG_BEFORE, &prefix_filter.before),
    ];
    for (key, value) in strings {
        if let Some(value) = value {
            tg_prefix_filter.insert(key.to_string(), Value::from(value.as_str()));
        }
    }

    if let Some(ge) = prefix_filter.ge {
        tg_prefix_filter.insert(TG_GE.to_string(), Value::from(ge));
    }
    if let Some(le) = prefix_filter.le {
        tg_prefix_filter.insert(TG_LE.to_string(), Value::from(le));
    }
    if let Some(created_at) = &prefix_filter.created_at {
        tg_prefix_filter.insert(TG_CREATED_AT.to_string(), Value::from(format_timestamp(created_at)));
    }
    if let Some(updated_at) = &prefix_filter.updated_at {
        tg_prefix_filter.insert(TG_UPDATED_AT.to_string(), Value::from(format_timestamp(updated_at)));
    }

    tg_prefix_filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ibm::models::{ResourceGroupReference, ZoneReference};
    use serde_json::json;

    #[test]
    fn test_empty_connection_only_has_prefix_filters() {
        let flat = flatten_connection(&TransitConnection::default());
        assert_eq!(Value::Object(flat), json!({ "prefix_filters": [] }));
    }

    #[test]
    fn test_full_connection_flattens_every_field() {
        let conn: TransitConnection = serde_json::from_value(json!({
            "id": "c1",
            "name": "vpc-conn",
            "network_type": "gre_tunnel",
            "network_id": "crn:v1:vpc",
            "network_account_id": "acct",
            "base_connection_id": "base",
            "base_network_type": "classic",
            "local_bgp_asn": 64490,
            "local_gateway_ip": "192.168.100.1",
            "local_tunnel_ip": "192.168.129.2",
            "remote_bgp_asn": 65010,
            "remote_gateway_ip": "10.242.63.12",
            "remote_tunnel_ip": "192.168.129.1",
            "zone": { "name": "us-south-1" },
            "mtu": 9000,
            "status": "attached",
            "created_at": "2021-03-01T10:00:00Z",
            "updated_at": "2021-03-02T10:00:00.5Z",
            "prefix_filters_default": "permit",
            "prefix_filters": [{
                "id": "pf1",
                "action": "deny",
                "before": "pf2",
                "prefix": "10.0.0.0/16",
                "ge": 17,
                "le": 24,
                "created_at": "2021-03-01T10:00:00Z"
            }]
        }))
        .unwrap();

        let flat = flatten_connection(&conn);
        assert_eq!(flat["zone"], "us-south-1");
        assert_eq!(flat["mtu"], 9000);
        assert_eq!(flat["local_bgp_asn"], 64490);
        assert_eq!(flat["created_at"], "2021-03-01T10:00:00.000Z");
        assert_eq!(flat["updated_at"], "2021-03-02T10:00:00.500Z");
        assert_eq!(flat["prefix_filters_default"], "permit");
        assert_eq!(flat.len(), 20);

        let pf = flat["prefix_filters"][0].as_object().unwrap();
        assert_eq!(pf["before"], "pf2");
        assert_eq!(pf["ge"], 17);
        assert_eq!(pf["le"], 24);
        assert!(!pf.contains_key("updated_at"));
    }

    #[test]
    fn test_prefix_filter_optional_bounds_absent() {
        let pf = PrefixFilter {
            id: Some("pf1".to_string()),
            action: Some("permit".to_string()),
            prefix: Some("10.0.0.0/8".to_string()),
            ..Default::default()
        };
        let flat = flatten_prefix_filter(&pf);
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        for key in [TG_BEFORE, TG_GE, TG_LE, TG_UPDATED_AT, TG_CREATED_AT] {
            assert!(!flat.contains_key(key));
        }
    }

    #[test]
    fn test_apply_gateway_copies_scalars() {
        let tgw = TransitGateway {
            id: "gw-id".to_string(),
            name: "gw".to_string(),
            crn: Some("crn:v1:tg".to_string()),
            location: Some("us-south".to_string()),
            global: Some(true),
            status: Some("available".to_string()),
            created_at: Some("2021-03-01T10:00:00Z".parse().unwrap()),
            updated_at: None,
            resource_group: Some(ResourceGroupReference {
                id: Some("rg".to_string()),
                href: None,
            }),
        };
        let mut d = ResourceData::default();
        apply_gateway(&mut d, &tgw);

        assert_eq!(d.id(), "gw-id");
        assert_eq!(
            d.to_json(),
            json!({
                "id": "gw-id",
                "name": "gw",
                "crn": "crn:v1:tg",
                "location": "us-south",
                "global": true,
                "status": "available",
                "created_at": "2021-03-01T10:00:00.000Z",
                "resource_group": "rg"
            })
        );
    }

    #[test]
    fn test_zone_without_name_is_skipped() {
        let conn = TransitConnection {
            zone: Some(ZoneReference { name: None }),
            ..Default::default()
        };
        assert!(!flatten_connection(&conn).contains_key(TG_ZONE));
    }
}
