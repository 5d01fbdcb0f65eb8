//! HTTP status client for nodes exposing a JSON API gateway.
//!
//! ## Endpoints
//!
//! Public API (`public_port`):
//! - `POST /v1/node/version`: node software version
//! - `POST /v1/node/status`: peers, sync flag, layer numbers
//!
//! Private API (`private_port`):
//! - `POST /v1/smesher/issmeshing`: smeshing flag
//! - `POST /v1/smesher/postsetupstatus`: proof-of-space state and space units
//! - `POST /v1/smesher/eligibilities`: layers assigned to this node
//!
//! All five requests for a node are issued concurrently; any failing request
//! fails the whole node fetch. The gateway encodes 64-bit integers as JSON
//! strings, so counters accept either form.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use super::{size_gib, FetchError, PostState, StatusFetcher, StatusRecord};
use crate::config::{NodeConfig, DEFAULT_TIMEOUT};

/// Status fetcher backed by the node's HTTP/JSON gateway.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    description: String,
}

impl HttpFetcher {
    /// Create a new builder for configuring the fetcher.
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::default()
    }

    /// The deadline applied to each node fetch.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn call<T: DeserializeOwned>(&self, base: &str, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", base, path);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                endpoint: path.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.json().await.map_err(|e| FetchError::Decode {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn fetch_all_endpoints(&self, node: &NodeConfig) -> Result<StatusRecord, FetchError> {
        let public = node.public_url();
        let private = node.private_url();

        let (version, status, smeshing, post, eligibilities) = tokio::try_join!(
            self.call::<VersionResponse>(&public, "/v1/node/version"),
            self.call::<NodeStatusResponse>(&public, "/v1/node/status"),
            self.call::<IsSmeshingResponse>(&private, "/v1/smesher/issmeshing"),
            self.call::<PostSetupStatusResponse>(&private, "/v1/smesher/postsetupstatus"),
            self.call::<EligibilitiesResponse>(&private, "/v1/smesher/eligibilities"),
        )?;

        let space_units = post.status.opts.map(|o| o.num_units).unwrap_or(0);

        Ok(StatusRecord {
            name: node.name.clone(),
            version: version.version_string.value,
            host: node.host.clone(),
            connected_peers: status.status.connected_peers,
            synced: status.status.is_synced,
            top_layer: status.status.top_layer.number,
            verified_layer: status.status.verified_layer.number,
            synced_layer: status.status.synced_layer.number,
            smeshing: smeshing.is_smeshing,
            post_state: post.status.state,
            space_units,
            size_gib: size_gib(space_units),
            assigned_layers_count: u32::try_from(eligibilities.eligibilities.len())
                .unwrap_or(u32::MAX),
        })
    }
}

#[async_trait]
impl StatusFetcher for HttpFetcher {
    async fn fetch_status(&self, node: &NodeConfig) -> Result<StatusRecord, FetchError> {
        tokio::time::timeout(self.timeout, self.fetch_all_endpoints(node))
            .await
            .map_err(|_| FetchError::Timeout)?
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpFetcher`].
#[derive(Debug, Default)]
pub struct HttpFetcherBuilder {
    timeout: Option<Duration>,
}

impl HttpFetcherBuilder {
    /// Set the per-node deadline (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> Result<HttpFetcher, FetchError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(HttpFetcher {
            client,
            timeout,
            description: format!("http (timeout {}s)", timeout.as_secs_f64()),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionResponse {
    version_string: StringValue,
}

#[derive(Debug, Deserialize)]
struct StringValue {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct NodeStatusResponse {
    status: NodeStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct NodeStatus {
    #[serde(deserialize_with = "lenient_u64")]
    connected_peers: u64,
    is_synced: bool,
    synced_layer: LayerNumber,
    top_layer: LayerNumber,
    verified_layer: LayerNumber,
}

#[derive(Debug, Default, Deserialize)]
struct LayerNumber {
    #[serde(default)]
    number: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IsSmeshingResponse {
    #[serde(default)]
    is_smeshing: bool,
}

#[derive(Debug, Deserialize)]
struct PostSetupStatusResponse {
    status: PostSetupStatus,
}

#[derive(Debug, Deserialize)]
struct PostSetupStatus {
    #[serde(default)]
    state: PostState,
    #[serde(default)]
    opts: Option<PostSetupOpts>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostSetupOpts {
    #[serde(default)]
    num_units: u32,
}

#[derive(Debug, Deserialize)]
struct EligibilitiesResponse {
    #[serde(default)]
    eligibilities: Vec<serde_json::Value>,
}

/// Accept a u64 encoded either as a JSON number or a decimal string.
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(u64),
        Str(String),
    }

    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let fetcher = HttpFetcher::builder().build().unwrap();
        assert_eq!(fetcher.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(fetcher.description(), "http (timeout 10s)");
    }

    #[test]
    fn test_node_status_accepts_string_counters() {
        let status: NodeStatusResponse = serde_json::from_str(
            r#"{"status":{"connectedPeers":"42","isSynced":true,
                "syncedLayer":{"number":10},"topLayer":{"number":12},"verifiedLayer":{"number":9}}}"#,
        )
        .unwrap();
        assert_eq!(status.status.connected_peers, 42);
        assert!(status.status.is_synced);
        assert_eq!(status.status.top_layer.number, 12);
    }

    #[test]
    fn test_node_status_missing_fields_default() {
        let status: NodeStatusResponse = serde_json::from_str(r#"{"status":{}}"#).unwrap();
        assert_eq!(status.status.connected_peers, 0);
        assert!(!status.status.is_synced);
        assert_eq!(status.status.synced_layer.number, 0);
    }

    #[test]
    fn test_post_status_without_opts() {
        let post: PostSetupStatusResponse =
            serde_json::from_str(r#"{"status":{"state":"STATE_IN_PROGRESS"}}"#).unwrap();
        assert_eq!(post.status.state, PostState::InProgress);
        assert!(post.status.opts.is_none());
    }
}
