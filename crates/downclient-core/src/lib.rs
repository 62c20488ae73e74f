// downclient-core: shared services between the daemon client and the CLI.

pub mod error;
pub mod poller;
pub mod registry;
pub mod service;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use poller::{DEFAULT_POLL_INTERVAL, ProgressPoller};
pub use registry::ClientRegistry;
pub use service::{ConnectionReport, DownloadService};

pub use downclient_api::{AddTorrent, QbitClient, Torrent, TransportConfig};
pub use downclient_config::{ConfigScope, DownclientConfig};
