use super::*;

use stagehand_protocols::workflow::ServiceAttributes;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ResourceManagerConfig {
    let address = server.address();
    ResourceManagerConfig {
        name: "remote".to_string(),
        host: address.ip().to_string(),
        port: address.port(),
        version: "v2.0.0".to_string(),
        root_path: "/".to_string(),
    }
}

fn request() -> ReservationRequest {
    let mut request = ReservationRequest::base("bb1", "alice", &ServiceAttributes::default());
    request.srv_type = "SBB".to_string();
    request.attributes.flavor = "small".to_string();
    request
}

#[tokio::test]
async fn reserve_succeeds_on_200() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2.0.0/ephemeralservice/reserve"))
        .and(body_partial_json(serde_json::json!({
            "name": "bb1",
            "user": "alice",
            "srv_type": "SBB"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let manager = RemoteResourceManager::new(&config_for(&server));
    assert_eq!(manager.reserve(&request()).await, 0);
}

#[tokio::test]
async fn reserve_fails_on_non_200() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2.0.0/ephemeralservice/reserve"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(serde_json::json!({"message": "no flavor left"})),
        )
        .mount(&server)
        .await;

    let manager = RemoteResourceManager::new(&config_for(&server));
    assert_eq!(manager.reserve(&request()).await, -1);
}

#[tokio::test]
async fn reserve_fails_on_connect_error() {
    // Nothing listens here.
    let config = ResourceManagerConfig {
        name: "remote".to_string(),
        host: "127.0.0.1".to_string(),
        port: 1,
        version: "v2.0.0".to_string(),
        root_path: "/".to_string(),
    };
    let manager = RemoteResourceManager::new(&config);
    assert_eq!(manager.reserve(&request()).await, -1);
}

#[tokio::test]
async fn locations_parse_from_the_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2.0.0/location/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "part0"},
            {"name": "part1"}
        ])))
        .mount(&server)
        .await;

    let manager = RemoteResourceManager::new(&config_for(&server));
    let locations = manager.usable_locations().await;
    let names: Vec<&str> = locations.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["part0", "part1"]);
}

#[tokio::test]
async fn flavors_parse_from_the_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2.0.0/ephemeralservice/flavors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "small", "cores": 4, "msize": "16Gi", "ssize": "100Gi"},
            {"name": "large"}
        ])))
        .mount(&server)
        .await;

    let manager = RemoteResourceManager::new(&config_for(&server));
    let flavors = manager.usable_flavors().await;
    assert_eq!(flavors.len(), 2);
    assert_eq!(flavors[0].name, "small");
    assert_eq!(flavors[0].cores, Some(4));
    assert_eq!(flavors[1].cores, None);
}

#[tokio::test]
async fn failing_listings_degrade_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2.0.0/location/list"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"message": "boom"})),
        )
        .mount(&server)
        .await;
    // No flavors route mounted at all: 404.

    let manager = RemoteResourceManager::new(&config_for(&server));
    assert!(manager.usable_locations().await.is_empty());
    assert!(manager.usable_flavors().await.is_empty());
}

#[tokio::test]
async fn root_path_is_respected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rm/v2.0.0/location/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"name": "p"}])))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.root_path = "/rm/".to_string();
    let manager = RemoteResourceManager::new(&config);
    assert_eq!(manager.usable_locations().await.len(), 1);
}
