//! Locator for assets hosted on a CDN or any remote HTTP server

use super::{raw_location, Locator};
use crate::asset::AssetDeclaration;
use crate::error::{DandelionError, DandelionResult};
use crate::request::RequestContext;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Serves `cdn` locations; contents are fetched over HTTP(S)
#[derive(Clone)]
pub struct RemoteLocator {
    agent: ureq::Agent,
    timeout: Duration,
}

impl RemoteLocator {
    pub const KIND: &'static str = "cdn";

    /// Create a locator whose fetches give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        // The agent's own timeout only bounds the blocking worker; callers
        // see the tokio timeout first.
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout * 2))
            .build()
            .into();
        Self { agent, timeout }
    }
}

impl std::fmt::Debug for RemoteLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteLocator")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Protocol-relative locations are fetched over HTTPS
fn fetch_url(location: &str) -> String {
    if location.starts_with("//") {
        format!("https:{location}")
    } else {
        location.to_string()
    }
}

#[async_trait]
impl Locator for RemoteLocator {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn is_caching_forced(&self) -> bool {
        true
    }

    fn location_for(&self, asset: &AssetDeclaration, _request: &RequestContext) -> String {
        raw_location(asset, Self::KIND).to_string()
    }

    async fn content_for(
        &self,
        asset: &AssetDeclaration,
        _request: &RequestContext,
    ) -> DandelionResult<Vec<u8>> {
        let url = fetch_url(raw_location(asset, Self::KIND));
        debug!("Fetching {} from {}", asset.to_log(), url);

        let agent = self.agent.clone();
        let target = url.clone();
        let task = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ureq::Error> {
            let mut response = agent.get(target.as_str()).call()?;
            response.body_mut().read_to_vec()
        });

        match tokio::time::timeout(self.timeout, task).await {
            Err(_) => Err(DandelionError::FetchTimeout {
                asset: asset.to_log(),
                location: url,
                timeout_ms: self.timeout.as_millis() as u64,
            }),
            Ok(Err(join)) => Err(DandelionError::Internal(format!(
                "remote fetch task failed: {join}"
            ))),
            Ok(Ok(result)) => {
                result.map_err(|e| DandelionError::fetch(asset.to_log(), url, e.to_string()))
            }
        }
    }
}
