//! Server endpoint URLs derived from the configured base URL

use devconsole_config::constants::{CLEAR_PATH, SNAPSHOT_PATH, STREAM_PATH};
use devconsole_core::{Error, Result};
use url::Url;

/// The console's server endpoints.
///
/// The base may carry a path prefix (`https://app.example.com/_debug`); every
/// endpoint is resolved below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Parse and normalize a base URL. Only `http` and `https` are accepted.
    pub fn new(base_url: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidEndpoint {
            url: base_url.to_string(),
            reason,
        };

        let mut base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
        }

        base.set_query(None);
        base.set_fragment(None);
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self { base })
    }

    /// The normalized base (always ends with `/`)
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `{base}/ws`, with `wss` for an `https` base and `ws` otherwise
    pub fn stream_url(&self) -> Result<Url> {
        let mut url = self.resolve(STREAM_PATH)?;
        let scheme = if self.base.scheme() == "https" {
            "wss"
        } else {
            "ws"
        };
        url.set_scheme(scheme).map_err(|()| Error::InvalidEndpoint {
            url: self.base.to_string(),
            reason: format!("cannot switch scheme to {}", scheme),
        })?;
        Ok(url)
    }

    /// `GET {base}/api/snapshot`
    pub fn snapshot_url(&self) -> Result<Url> {
        self.resolve(SNAPSHOT_PATH)
    }

    /// `POST {base}/api/clear` or `POST {base}/api/clear/{panel}`
    pub fn clear_url(&self, panel: Option<&str>) -> Result<Url> {
        let mut url = self.resolve(CLEAR_PATH)?;
        if let Some(panel) = panel {
            url.path_segments_mut()
                .map_err(|()| Error::InvalidEndpoint {
                    url: self.base.to_string(),
                    reason: "base cannot carry a path".to_string(),
                })?
                .push(panel);
        }
        Ok(url)
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|e| Error::InvalidEndpoint {
            url: self.base.to_string(),
            reason: e.to_string(),
        })
    }
}
