//! Wiring from global flags to the config file and the download service.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use downclient_api::TlsMode;
use downclient_config::{FileScope, default_config_path};
use downclient_core::{ClientRegistry, DownclientConfig, DownloadService, TransportConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// `--config` / `DOWNCLIENT_CONFIG`, else the platform config dir.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(default_config_path)
}

pub fn open_scope(global: &GlobalOpts) -> Result<FileScope, CliError> {
    let path = config_path(global);
    tracing::debug!(path = %path.display(), "opening config");
    Ok(FileScope::open(path)?)
}

pub fn transport(global: &GlobalOpts) -> TransportConfig {
    let tls = if global.insecure {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };
    TransportConfig::default()
        .with_timeout(Duration::from_secs(global.timeout))
        .with_tls(tls)
}

pub fn build_service(global: &GlobalOpts) -> DownloadService {
    let config = Arc::new(DownclientConfig::new());
    let registry = ClientRegistry::new(config, transport(global));
    DownloadService::new(Arc::new(registry))
}
