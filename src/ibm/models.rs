//! Transit Gateway API response models
//!
//! Only the fields the handlers read are modelled. Every field the service
//! may omit is an `Option`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Render a timestamp the way state stores it: UTC, millisecond precision
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ResourceGroupReference {
    pub id: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ZoneReference {
    pub name: Option<String>,
}

/// Link to the next page of a collection
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PaginationNext {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
}

impl PaginationNext {
    /// The `start` token, falling back to parsing it out of `href`
    pub fn start_token(&self) -> Option<String> {
        if let Some(start) = &self.start {
            return Some(start.clone());
        }
        let href = url::Url::parse(self.href.as_deref()?).ok()?;
        href.query_pairs()
            .find(|(k, _)| k == "start")
            .map(|(_, v)| v.into_owned())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TransitGateway {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub crn: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub global: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resource_group: Option<ResourceGroupReference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitGatewayCollection {
    #[serde(default)]
    pub transit_gateways: Vec<TransitGateway>,
    #[serde(default)]
    pub next: Option<PaginationNext>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PrefixFilter {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub ge: Option<i64>,
    #[serde(default)]
    pub le: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TransitConnection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub network_type: Option<String>,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub network_account_id: Option<String>,
    #[serde(default)]
    pub base_connection_id: Option<String>,
    #[serde(default)]
    pub base_network_type: Option<String>,
    #[serde(default)]
    pub local_bgp_asn: Option<i64>,
    #[serde(default)]
    pub local_gateway_ip: Option<String>,
    #[serde(default)]
    pub local_tunnel_ip: Option<String>,
    #[serde(default)]
    pub remote_bgp_asn: Option<i64>,
    #[serde(default)]
    pub remote_gateway_ip: Option<String>,
    #[serde(default)]
    pub remote_tunnel_ip: Option<String>,
    #[serde(default)]
    pub zone: Option<ZoneReference>,
    #[serde(default)]
    pub mtu: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub request_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub prefix_filters: Vec<PrefixFilter>,
    #[serde(default)]
    pub prefix_filters_default: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitConnectionCollection {
    #[serde(default)]
    pub connections: Vec<TransitConnection>,
    #[serde(default)]
    pub next: Option<PaginationNext>,
}

/// Cross-account connection directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionAction {
    Approve,
    Reject,
}

impl ConnectionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl std::str::FromStr for ConnectionAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(anyhow::anyhow!(
                "expected action to be one of [approve, reject], got {}",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timestamp_format_uses_millis() {
        let ts: DateTime<Utc> = "2021-03-01T10:00:00Z".parse().unwrap();
        assert_eq!(format_timestamp(&ts), "2021-03-01T10:00:00.000Z");
    }

    #[test]
    fn test_connection_tolerates_missing_fields() {
        let conn: TransitConnection = serde_json::from_value(json!({})).unwrap();
        assert_eq!(conn, TransitConnection::default());
    }

    #[test]
    fn test_next_start_from_href() {
        let next = PaginationNext {
            href: Some(
                "https://transit.cloud.ibm.com/v1/transit_gateways?start=abc&limit=50".to_string(),
            ),
            start: None,
        };
        assert_eq!(next.start_token().as_deref(), Some("abc"));
    }

    #[test]
    fn test_connection_action_parse() {
        assert_eq!("approve".parse::<ConnectionAction>().unwrap(), ConnectionAction::Approve);
        assert_eq!("reject".parse::<ConnectionAction>().unwrap(), ConnectionAction::Reject);
        assert!("Approve".parse::<ConnectionAction>().is_err());
    }
}
