//! Snapshot hydration over HTTP
//!
//! [`SnapshotClient`] performs the startup `GET /api/snapshot` and the
//! best-effort clear calls. The fetched snapshot is applied through
//! [`PanelStore::apply_snapshot`](crate::PanelStore::apply_snapshot), the
//! same routine that handles `snapshot` envelopes, so the two sources are
//! interchangeable and last writer wins.

use devconsole_config::ConsoleSection;
use devconsole_core::{Error, Result, Snapshot};
use devconsole_stream::Endpoints;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the snapshot and clear endpoints
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl SnapshotClient {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, endpoints })
    }

    pub fn from_section(section: &ConsoleSection) -> Result<Self> {
        Self::new(
            Endpoints::new(&section.base_url)?,
            Duration::from_millis(section.http_timeout_ms),
        )
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// `GET {base}/api/snapshot`
    pub async fn fetch_snapshot(&self) -> Result<Snapshot> {
        let url = self.endpoints.snapshot_url()?;
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Http(format!("GET {} failed: {}", url, e)))?
            .error_for_status()
            .map_err(|e| Error::Http(format!("GET {} failed: {}", url, e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("GET {} body: {}", url, e)))?;
        Snapshot::from_json(&body)
    }

    /// Best-effort hydration: `None` when the fetch fails for any reason
    pub async fn try_fetch_snapshot(&self) -> Option<Snapshot> {
        match self.fetch_snapshot().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "Snapshot fetch failed, starting empty");
                None
            }
        }
    }

    /// `POST {base}/api/clear` or `POST {base}/api/clear/{panel}`
    pub async fn clear(&self, panel: Option<&str>) -> Result<()> {
        let url = self.endpoints.clear_url(panel)?;
        self.http
            .post(url.clone())
            .send()
            .await
            .map_err(|e| Error::Http(format!("POST {} failed: {}", url, e)))?
            .error_for_status()
            .map_err(|e| Error::Http(format!("POST {} failed: {}", url, e)))?;
        Ok(())
    }

    /// Clear every panel in `panels` (all when `None`), swallowing failures
    pub async fn clear_best_effort(&self, panels: Option<&[String]>) {
        let targets: Vec<Option<&str>> = match panels {
            None => vec![None],
            Some(names) => names.iter().map(|n| Some(n.as_str())).collect(),
        };
        for panel in targets {
            if let Err(e) = self.clear(panel).await {
                debug!(panel = panel.unwrap_or("*"), error = %e, "Clear request failed");
            }
        }
    }
}
