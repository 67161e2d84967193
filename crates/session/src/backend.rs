use std::env;
use std::path::PathBuf;

use serde::Serialize;
use url::Url;

use crate::error::BackendError;

pub const DEV_SERVER_URL_ENV: &str = "GEOMAP_DEV_SERVER_URL";
pub const ASSET_DIR_ENV: &str = "GEOMAP_ASSET_DIR";
pub const DEFAULT_ASSET_DIR: &str = "frontend/build";

/// Where the browser-side engine bundle is served from.
///
/// Chosen once by whoever constructs the host and handed to every session;
/// nothing reads it from process-wide state later.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RenderBackend {
    /// Live-reloading development server.
    DevServer { url: Url },
    /// Prebuilt assets on disk.
    Bundled { asset_dir: PathBuf },
}

impl Default for RenderBackend {
    fn default() -> Self {
        RenderBackend::Bundled {
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
        }
    }
}

impl RenderBackend {
    /// Dev server when `GEOMAP_DEV_SERVER_URL` is set, else bundled assets
    /// from `GEOMAP_ASSET_DIR` (default `frontend/build`).
    pub fn from_env() -> Result<Self, BackendError> {
        let dev_url = env::var(DEV_SERVER_URL_ENV).ok();
        let asset_dir = env::var(ASSET_DIR_ENV).ok();
        Self::from_vars(dev_url.as_deref(), asset_dir.as_deref())
    }

    pub fn from_vars(dev_url: Option<&str>, asset_dir: Option<&str>) -> Result<Self, BackendError> {
        let dev_url = dev_url.map(str::trim).filter(|s| !s.is_empty());
        if let Some(raw) = dev_url {
            let url = Url::parse(raw).map_err(|e| BackendError::InvalidDevServerUrl {
                url: raw.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(RenderBackend::DevServer { url });
        }
        let asset_dir = asset_dir
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ASSET_DIR);
        Ok(RenderBackend::Bundled {
            asset_dir: PathBuf::from(asset_dir),
        })
    }

    pub fn is_dev_server(&self) -> bool {
        matches!(self, RenderBackend::DevServer { .. })
    }
}
