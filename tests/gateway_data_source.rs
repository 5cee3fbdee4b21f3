//! Integration tests for the ibm_tg_gateway data source

use serde_json::{json, Map, Value};
use tgctl::ibm::auth::IamCredentials;
use tgctl::ibm::client::TransitGatewayClient;
use tgctl::provider::Provider;
use tokio_test::assert_err;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> Provider {
    let client = TransitGatewayClient::new(
        IamCredentials::from_token("test-token"),
        &format!("{}/v1", server.uri()),
        "2024-07-16",
    )
    .expect("client should build");
    Provider::new(client)
}

fn name_config(name: &str) -> Map<String, Value> {
    let mut config = Map::new();
    config.insert("name".to_string(), Value::from(name));
    config
}

async fn mount_gateways(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/transit_gateways"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transit_gateways": [
                {
                    "id": "gw-other",
                    "name": "other-gateway",
                    "crn": "crn:v1:other",
                    "location": "eu-de",
                    "global": false,
                    "status": "available",
                    "created_at": "2020-01-01T00:00:00Z"
                },
                {
                    "id": "gw-1",
                    "name": "my-gateway",
                    "crn": "crn:v1:bluemix:public:transit:dal03:a/123::gateway:gw-1",
                    "location": "us-south",
                    "global": true,
                    "status": "available",
                    "created_at": "2021-03-01T10:00:00Z",
                    "updated_at": "2021-03-02T11:30:00.250Z",
                    "resource_group": {"id": "rg-1", "href": "https://resource-controller/rg-1"}
                }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_unknown_gateway_name_is_not_found() {
    let server = MockServer::start().await;
    mount_gateways(&server).await;

    // No connections mock: a lookup miss must not reach the connections call
    Mock::given(method("GET"))
        .and(path("/v1/transit_gateways/gw-1/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"connections": []})))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .read_data_source("ibm_tg_gateway", name_config("missing-gateway"))
        .await
        .unwrap_err();

    assert!(err
        .to_string()
        .contains("Couldn't find any gateway with the specified name: (missing-gateway)"));
}

#[tokio::test]
async fn test_matching_gateway_copies_scalars_and_reads_connections() {
    let server = MockServer::start().await;
    mount_gateways(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/transit_gateways/gw-1/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "connections": [
                {
                    "id": "conn-1",
                    "name": "vpc-connection",
                    "network_type": "vpc",
                    "network_id": "crn:v1:vpc:1",
                    "status": "attached",
                    "created_at": "2021-03-01T10:05:00Z",
                    "prefix_filters_default": "permit",
                    "prefix_filters": [
                        {
                            "id": "pf-1",
                            "action": "deny",
                            "prefix": "10.10.0.0/16",
                            "le": 24,
                            "created_at": "2021-03-01T10:06:00Z"
                        }
                    ]
                },
                {
                    "id": "conn-2",
                    "name": "gre",
                    "network_type": "gre_tunnel",
                    "base_connection_id": "conn-1",
                    "local_bgp_asn": 64490,
                    "remote_bgp_asn": 65010,
                    "zone": {"name": "us-south-1"},
                    "mtu": 9000
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let d = provider_for(&server)
        .read_data_source("ibm_tg_gateway", name_config("my-gateway"))
        .await
        .expect("read should succeed");

    assert_eq!(d.id(), "gw-1");
    let state = d.to_json();
    assert_eq!(state["name"], "my-gateway");
    assert_eq!(state["crn"], "crn:v1:bluemix:public:transit:dal03:a/123::gateway:gw-1");
    assert_eq!(state["location"], "us-south");
    assert_eq!(state["global"], true);
    assert_eq!(state["status"], "available");
    assert_eq!(state["created_at"], "2021-03-01T10:00:00.000Z");
    assert_eq!(state["updated_at"], "2021-03-02T11:30:00.250Z");
    assert_eq!(state["resource_group"], "rg-1");

    let connections = state["connections"].as_array().unwrap();
    assert_eq!(connections.len(), 2);

    let first = connections[0].as_object().unwrap();
    assert_eq!(first["id"], "conn-1");
    assert_eq!(first["prefix_filters_default"], "permit");
    let pf = first["prefix_filters"][0].as_object().unwrap();
    assert_eq!(pf["action"], "deny");
    assert_eq!(pf["le"], 24);
    assert!(!pf.contains_key("ge"));
    assert!(!pf.contains_key("before"));

    let second = connections[1].as_object().unwrap();
    assert_eq!(second["zone"], "us-south-1");
    assert_eq!(second["mtu"], 9000);
    assert_eq!(second["prefix_filters"], json!([]));
    assert!(!second.contains_key("status"));
    assert!(!second.contains_key("created_at"));
}

#[tokio::test]
async fn test_connections_failure_leaves_state_untouched() {
    let server = MockServer::start().await;
    mount_gateways(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/transit_gateways/gw-1/connections"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let result = provider_for(&server)
        .read_data_source("ibm_tg_gateway", name_config("my-gateway"))
        .await;

    let err = assert_err!(result);
    let message = format!("{:#}", err);
    assert!(message.contains("Error while listing transit gateway connections (gw-1)"));
    assert!(message.contains("unavailable"));
}

#[tokio::test]
async fn test_list_gateways_failure_is_wrapped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/transit_gateways"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .read_data_source("ibm_tg_gateway", name_config("my-gateway"))
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("Error while listing transit gateways"));
}

#[tokio::test]
async fn test_duplicate_names_take_first_listed_gateway() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/transit_gateways"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transit_gateways": [
                {"id": "a", "name": "gw", "location": "us-south"},
                {"id": "b", "name": "gw", "location": "eu-de"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/transit_gateways/a/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"connections": []})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/transit_gateways/b/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"connections": []})))
        .expect(0)
        .mount(&server)
        .await;

    let d = provider_for(&server)
        .read_data_source("ibm_tg_gateway", name_config("gw"))
        .await
        .expect("read should succeed");

    assert_eq!(d.id(), "a");
    assert_eq!(d.get_str("location"), Some("us-south"));
}
