//! HTTP client for the Overpass API.
//!
//! One POST per import run. Transport errors, non-success statuses and
//! undecodable bodies all surface as `UpstreamUnavailable`; retrying is left
//! to the caller.

use std::time::{Duration, Instant};

use log::{info, warn};
use reqwest::Client;
use tokio::runtime::Runtime;

use crate::error::{ImportError, Result};
use crate::fragment::{parse_overpass_response, Fragment};
use crate::pipeline::FragmentSource;
use crate::query::AreaQuery;
use crate::UpstreamConfig;

/// Async Overpass client
pub struct OverpassClient {
    client: Client,
    endpoint: String,
    query_timeout_secs: u32,
}

impl OverpassClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("track-stitcher/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ImportError::Config {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            query_timeout_secs: config.query_timeout_secs,
        })
    }

    /// Run the query and decode every returned way
    pub async fn fetch_fragments(&self, query: &AreaQuery) -> Result<Vec<Fragment>> {
        let ql = query.to_overpass_ql(self.query_timeout_secs);
        let start = Instant::now();

        info!(
            "[OverpassClient] Querying {} for region '{}'",
            self.endpoint,
            query.region()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(ql)
            .send()
            .await
            .map_err(|e| {
                warn!("[OverpassClient] Request error: {}", e);
                ImportError::upstream(format!("Request error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("[OverpassClient] HTTP {} from {}", status, self.endpoint);
            return Err(ImportError::UpstreamUnavailable {
                message: format!("HTTP {}", status),
                status_code: Some(status.as_u16()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ImportError::upstream(format!("Body read error: {}", e)))?;
        let fragments = parse_overpass_response(&body)?;

        info!(
            "[OverpassClient] {} elements in {:.2}s",
            fragments.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(fragments)
    }
}

/// Blocking adapter: runs [`OverpassClient`] on its own tokio runtime
pub struct BlockingOverpassSource {
    runtime: Runtime,
    client: OverpassClient,
}

impl BlockingOverpassSource {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| ImportError::Config {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        Ok(Self {
            runtime,
            client: OverpassClient::new(config)?,
        })
    }
}

impl FragmentSource for BlockingOverpassSource {
    fn fetch_fragments(&self, query: &AreaQuery) -> Result<Vec<Fragment>> {
        self.runtime.block_on(self.client.fetch_fragments(query))
    }
}
