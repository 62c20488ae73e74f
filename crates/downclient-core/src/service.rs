// ── Download operations ──
//
// The outward operations built on the registry and the configuration:
// connection test, download submission, and torrent lookup.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use downclient_api::{AddTorrent, Error as ApiError, QbitClient, Torrent, validate_torrent_url};
use downclient_config::{ConfigScope, DownclientConfig};

use crate::error::CoreError;
use crate::registry::ClientRegistry;

/// Outcome of [`DownloadService::test_connection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub reason: String,
}

impl ConnectionReport {
    fn ok() -> Self {
        Self {
            success: true,
            reason: String::new(),
        }
    }

    fn failed(err: &ApiError) -> Self {
        let reason = match err {
            ApiError::LoginUnauthorized => "Unauthorized".to_owned(),
            ApiError::LoginIpBlocked => "IP blocked. Too many login attempts.".to_owned(),
            other => other.to_string(),
        };
        Self {
            success: false,
            reason,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadService {
    registry: Arc<ClientRegistry>,
}

impl DownloadService {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    fn config(&self) -> &DownclientConfig {
        self.registry.config()
    }

    /// Try the stored credentials against the daemon.
    ///
    /// Incomplete configuration is an error. Daemon-side failures are
    /// reported in the returned [`ConnectionReport`]. The login runs on a
    /// client of its own, so the shared session is left alone.
    pub async fn test_connection<S>(&self, scope: &S) -> Result<ConnectionReport, CoreError>
    where
        S: ConfigScope + Sync + ?Sized,
    {
        let credentials = self.config().credentials(scope)?;
        let client = QbitClient::new(credentials, self.registry.transport())?;

        match client.login().await {
            Ok(_) => {
                info!(base_url = %client.base_url(), "connection test succeeded");
                Ok(ConnectionReport::ok())
            }
            Err(e) => {
                warn!(error = %e, "connection test failed");
                Ok(ConnectionReport::failed(&e))
            }
        }
    }

    /// Submit a download using the configured category.
    ///
    /// `rename` is only forwarded when renaming is enabled in the
    /// configuration.
    pub async fn start_download<S>(
        &self,
        scope: &S,
        url: &str,
        rename: Option<&str>,
    ) -> Result<(), CoreError>
    where
        S: ConfigScope + Sync + ?Sized,
    {
        let category = self.config().get_category(scope);
        self.submit(scope, url, category, rename).await
    }

    /// [`start_download`](Self::start_download) with an explicit category
    /// in place of the configured one.
    pub async fn start_download_in<S>(
        &self,
        scope: &S,
        url: &str,
        category: &str,
        rename: Option<&str>,
    ) -> Result<(), CoreError>
    where
        S: ConfigScope + Sync + ?Sized,
    {
        self.submit(scope, url, Some(category.to_owned()), rename)
            .await
    }

    async fn submit<S>(
        &self,
        scope: &S,
        url: &str,
        category: Option<String>,
        rename: Option<&str>,
    ) -> Result<(), CoreError>
    where
        S: ConfigScope + Sync + ?Sized,
    {
        // Reject before the registry gets a chance to log in.
        validate_torrent_url(url)?;

        let mut request = AddTorrent::with_url(url);
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            request = request.category(category);
        }
        if let Some(rename) = rename {
            if self.config().get_rename_torrents(scope) {
                request = request.rename(rename);
            } else {
                debug!("renaming disabled, name not sent");
            }
        }

        let client = self.registry.require_client(scope).await?;
        client.add_torrent(&request).await?;
        Ok(())
    }

    /// Properties of the torrent with the given info hash.
    pub async fn torrent<S>(&self, scope: &S, hash: &str) -> Result<Torrent, CoreError>
    where
        S: ConfigScope + Sync + ?Sized,
    {
        let client = self.registry.require_client(scope).await?;
        Ok(client.torrent_properties(hash).await?)
    }
}
