// ── Client registry ──
//
// Owns the one shared daemon client for the process. The client is built
// and logged in on first use with a valid configuration, then handed out
// as-is until `reset()`.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use downclient_api::{QbitClient, TransportConfig};
use downclient_config::{ConfigScope, DownclientConfig};

use crate::error::CoreError;

/// Lazily-initialized holder of the shared [`QbitClient`].
pub struct ClientRegistry {
    config: Arc<DownclientConfig>,
    transport: TransportConfig,
    client: Mutex<Option<Arc<QbitClient>>>,
}

impl ClientRegistry {
    pub fn new(config: Arc<DownclientConfig>, transport: TransportConfig) -> Self {
        Self {
            config,
            transport,
            client: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Arc<DownclientConfig> {
        &self.config
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// The shared client, building it on first use.
    ///
    /// - Already built: returned without looking at the configuration.
    /// - Configuration incomplete: `Ok(None)`.
    /// - Otherwise a client is built from the stored credentials and logged
    ///   in before it is cached. A failed login is returned and nothing is
    ///   cached, so the next call tries again.
    ///
    /// Concurrent first calls are serialized; only one performs the login.
    pub async fn get_client<S>(&self, scope: &S) -> Result<Option<Arc<QbitClient>>, CoreError>
    where
        S: ConfigScope + Sync + ?Sized,
    {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref() {
            return Ok(Some(Arc::clone(client)));
        }

        if !self.config.is_valid(scope) {
            debug!("download client not configured, no client built");
            return Ok(None);
        }

        let credentials = self.config.credentials(scope)?;
        let client = QbitClient::new(credentials, &self.transport)?;
        client.login().await?;
        info!(base_url = %client.base_url(), "download client connected");

        let client = Arc::new(client);
        *slot = Some(Arc::clone(&client));
        Ok(Some(client))
    }

    /// Like [`get_client`](Self::get_client), but a missing configuration
    /// is [`CoreError::NotConfigured`].
    pub async fn require_client<S>(&self, scope: &S) -> Result<Arc<QbitClient>, CoreError>
    where
        S: ConfigScope + Sync + ?Sized,
    {
        self.get_client(scope).await?.ok_or(CoreError::NotConfigured)
    }

    /// Drop the cached client; the next call builds a fresh one.
    pub async fn reset(&self) {
        if self.client.lock().await.take().is_some() {
            debug!("cached download client dropped");
        }
    }

    pub async fn is_initialized(&self) -> bool {
        self.client.lock().await.is_some()
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}
