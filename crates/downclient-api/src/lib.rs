// downclient-api: Async Rust client for the qBittorrent WebUI API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod torrents;
pub mod transport;

pub use auth::{AuthState, Credentials, SESSION_COOKIE, Session};
pub use client::QbitClient;
pub use error::Error;
pub use models::{AddTorrent, Torrent};
pub use torrents::validate_torrent_url;
pub use transport::{TlsMode, TransportConfig};
