//! The remote HTTP resource manager client.

use std::time::Duration;

use async_trait::async_trait;

use stagehand_config::ResourceManagerConfig;
use stagehand_protocols::resource::ResourceManagerDriver;
use stagehand_protocols::workflow::{Flavor, Location, ReservationRequest};

/// Per-call client timeout. Reservation can take a while on a busy
/// cluster; anything beyond this is treated as failure.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Driver talking to the remote resource-manager HTTP API.
pub struct RemoteResourceManager {
    client: reqwest::Client,
    reserve_url: String,
    location_url: String,
    flavors_url: String,
}

impl RemoteResourceManager {
    pub fn new(config: &ResourceManagerConfig) -> Self {
        let root = config.root_path.trim_end_matches('/');
        let base = format!(
            "http://{}:{}{}/{}",
            config.host, config.port, root, config.version
        );
        Self {
            client: reqwest::Client::builder()
                .timeout(CLIENT_TIMEOUT)
                .build()
                .unwrap_or_default(),
            reserve_url: format!("{base}/ephemeralservice/reserve"),
            location_url: format!("{base}/location/list"),
            flavors_url: format!("{base}/ephemeralservice/flavors"),
        }
    }

    /// GET a JSON list; any failure degrades to an empty list.
    async fn get_list<T: serde::de::DeserializeOwned>(&self, url: &str) -> Vec<T> {
        tracing::debug!(url, "GET");
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(url, error = %e, "cannot reach the resource manager");
                return Vec::new();
            }
        };
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(url, status, body = %body.trim(), "resource manager reported an error");
            return Vec::new();
        }
        match response.json().await {
            Ok(list) => list,
            Err(e) => {
                tracing::error!(url, error = %e, "malformed resource manager answer");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ResourceManagerDriver for RemoteResourceManager {
    fn id(&self) -> &str {
        "remote"
    }

    async fn reserve(&self, request: &ReservationRequest) -> i32 {
        tracing::debug!(url = %self.reserve_url, service = %request.name, "POST reservation");
        let response = match self.client.post(&self.reserve_url).json(request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(url = %self.reserve_url, error = %e,
                    "cannot reach the resource manager");
                return -1;
            }
        };

        if response.status().is_success() {
            tracing::info!(service = %request.name, "reservation successful");
            return 0;
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        // Surface whatever the upstream put in its error body; it usually
        // names the resource that was short.
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["message"].as_str().map(String::from))
            .unwrap_or(body);
        tracing::error!(service = %request.name, status, message = %message.trim(),
            "reservation failed");
        -1
    }

    async fn usable_locations(&self) -> Vec<Location> {
        self.get_list(&self.location_url).await
    }

    async fn usable_flavors(&self) -> Vec<Flavor> {
        self.get_list(&self.flavors_url).await
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
