// Integration tests for `HttpFetcher` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nodemon::data::NodeStatus;
use nodemon::{
    DisplayState, FetchError, HttpFetcher, NodeConfig, PostState, Scheduler, StatusFetcher,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn node_for(server: &MockServer, name: &str) -> NodeConfig {
    let port = server.address().port();
    let mut node = NodeConfig::new(name, "127.0.0.1");
    node.public_port = port;
    node.private_port = port;
    node
}

/// A node whose ports have nothing listening.
fn unreachable_node(name: &str) -> NodeConfig {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut node = NodeConfig::new(name, "127.0.0.1");
    node.public_port = port;
    node.private_port = port;
    node
}

fn fetcher(timeout: Duration) -> HttpFetcher {
    HttpFetcher::builder().timeout(timeout).build().unwrap()
}

async fn mount_json(server: &MockServer, endpoint: &str, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_healthy_node(server: &MockServer) {
    mount_json(server, "/v1/node/version", json!({ "versionString": { "value": "v1.7.2" } }))
        .await;
    mount_json(
        server,
        "/v1/node/status",
        json!({
            "status": {
                "connectedPeers": "31",
                "isSynced": true,
                "syncedLayer": { "number": 50210 },
                "topLayer": { "number": 50212 },
                "verifiedLayer": { "number": 50209 }
            }
        }),
    )
    .await;
    mount_json(server, "/v1/smesher/issmeshing", json!({ "isSmeshing": true })).await;
    mount_json(
        server,
        "/v1/smesher/postsetupstatus",
        json!({
            "status": {
                "state": "STATE_COMPLETE",
                "opts": { "numUnits": 16 }
            }
        }),
    )
    .await;
    mount_json(
        server,
        "/v1/smesher/eligibilities",
        json!({ "eligibilities": [ { "layer": 50300 }, { "layer": 50410 } ] }),
    )
    .await;
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_status_builds_full_record() {
    let server = MockServer::start().await;
    mount_healthy_node(&server).await;

    let record = fetcher(Duration::from_secs(5))
        .fetch_status(&node_for(&server, "node-1"))
        .await
        .unwrap();

    assert_eq!(record.name, "node-1");
    assert_eq!(record.version, "v1.7.2");
    assert_eq!(record.host, "127.0.0.1");
    assert_eq!(record.connected_peers, 31);
    assert!(record.synced);
    assert_eq!(record.top_layer, 50212);
    assert_eq!(record.verified_layer, 50209);
    assert_eq!(record.synced_layer, 50210);
    assert!(record.smeshing);
    assert_eq!(record.post_state, PostState::Complete);
    assert_eq!(record.space_units, 16);
    assert_eq!(record.size_gib, 1024);
    assert_eq!(record.assigned_layers_count, 2);
}

// ── Failure modes ───────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_fails_whole_node() {
    let server = MockServer::start().await;
    mount_healthy_node(&server).await;

    // Outranks the default priority of the healthy mock.
    Mock::given(method("POST"))
        .and(path("/v1/smesher/issmeshing"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;

    let err = fetcher(Duration::from_secs(5))
        .fetch_status(&node_for(&server, "node-1"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        FetchError::Status {
            endpoint: "/v1/smesher/issmeshing".to_string(),
            status: 500,
        }
    );
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    mount_healthy_node(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/node/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .with_priority(1)
        .mount(&server)
        .await;

    let err = fetcher(Duration::from_secs(5))
        .fetch_status(&node_for(&server, "node-1"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, FetchError::Decode { ref endpoint, .. } if endpoint == "/v1/node/version"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_slow_node_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = fetcher(Duration::from_millis(200))
        .fetch_status(&node_for(&server, "slow"))
        .await
        .unwrap_err();

    assert_eq!(err, FetchError::Timeout);
}

#[tokio::test]
async fn test_refused_connection() {
    let err = fetcher(Duration::from_secs(2))
        .fetch_status(&unreachable_node("down"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Connection(_)), "unexpected error: {err:?}");
}

// ── End to end ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_pass_with_one_unreachable_node() {
    let server = MockServer::start().await;
    mount_healthy_node(&server).await;

    let nodes: Arc<[NodeConfig]> = vec![
        unreachable_node("down"),
        node_for(&server, "up"),
    ]
    .into();
    let (writer, reader) = DisplayState::channel(&nodes);
    let mut scheduler = Scheduler::new(
        nodes,
        Arc::new(fetcher(Duration::from_secs(2))),
        writer,
        Duration::from_secs(120),
    );

    let summary = scheduler.run_once().await;
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);

    let state = reader.read();
    assert!(state.is_ready());
    assert_eq!(state.rows().len(), 1);
    assert_eq!(state.rows()[0].values.get(0), Some("up"));
    assert_eq!(state.rows()[0].key.index(), 1);
    assert_eq!(state.node_health()[0].status(), NodeStatus::Stale);
    assert_eq!(state.node_health()[1].status(), NodeStatus::Ok);
}
