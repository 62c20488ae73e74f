//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use downclient_api::Error as ApiError;
use downclient_config::ConfigError;
use downclient_core::CoreError;

use crate::cli::Setting;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CONFIG: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Download client {label} not set")]
    #[diagnostic(
        code(downclient::not_configured),
        help("Run: downclient config set {setting} <VALUE>")
    )]
    MissingSetting { label: String, setting: String },

    #[error("Download client is not configured")]
    #[diagnostic(
        code(downclient::not_configured),
        help(
            "Store the daemon URL and credentials first:\n  \
             downclient config set base-url http://localhost:8080\n  \
             downclient config set username admin\n  \
             downclient config set password"
        )
    )]
    NotConfigured,

    #[error("Could not read or write the config file: {message}")]
    #[diagnostic(code(downclient::config))]
    ConfigFile { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the daemon at {url}")]
    #[diagnostic(
        code(downclient::connection_failed),
        help(
            "Check that qBittorrent is running with the WebUI enabled.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS error: {message}")]
    #[diagnostic(
        code(downclient::tls_error),
        help("If the WebUI uses a self-signed certificate, pass --insecure (-k).")
    )]
    TlsError { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(downclient::timeout),
        help("Increase timeout with --timeout or check daemon responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(downclient::auth_failed),
        help(
            "Verify the stored credentials with: downclient config show\n\
             Update them with: downclient config set username|password"
        )
    )]
    AuthFailed { message: String },

    #[error("IP blocked. Too many login attempts.")]
    #[diagnostic(
        code(downclient::ip_blocked),
        help(
            "The daemon bans an address after repeated failed logins.\n\
             Wait for the ban to expire, or restart qBittorrent, then fix the credentials."
        )
    )]
    IpBlocked,

    #[error("Connection test failed: {reason}")]
    #[diagnostic(code(downclient::test_failed))]
    TestFailed { reason: String, auth: bool },

    // ── Torrents ─────────────────────────────────────────────────────
    #[error("Torrent '{hash}' not found")]
    #[diagnostic(
        code(downclient::not_found),
        help("Check the info hash; the daemon shows it under Properties > General.")
    )]
    NotFound { hash: String },

    #[error("Unsupported torrent URL: {url}")]
    #[diagnostic(
        code(downclient::invalid_url),
        help("Accepted forms: http://, https://, magnet:, bc://bt/")
    )]
    InvalidUrl { url: String },

    #[error("The daemon rejected the torrent at {url}")]
    #[diagnostic(
        code(downclient::torrent_rejected),
        help("The URL must point at a valid .torrent file.")
    )]
    TorrentRejected { url: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Daemon API error: {message}")]
    #[diagnostic(code(downclient::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(downclient::validation))]
    Validation { field: String, reason: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render JSON output: {0}")]
    #[diagnostic(code(downclient::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingSetting { .. } | Self::NotConfigured | Self::ConfigFile { .. } => {
                exit_code::CONFIG
            }
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::IpBlocked => exit_code::AUTH,
            Self::TestFailed { auth, .. } => {
                if *auth {
                    exit_code::AUTH
                } else {
                    exit_code::CONNECTION
                }
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidUrl { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::TorrentRejected { .. }
            | Self::ApiError { .. }
            | Self::Io(_)
            | Self::Json(_) => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Misconfigured { field } => CliError::MissingSetting {
                label: field.label().to_owned(),
                setting: Setting::from_key(field).cli_name().to_owned(),
            },
            other => CliError::ConfigFile {
                message: other.to_string(),
            },
        }
    }
}

// ── ApiError → CliError mapping ──────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Configuration { field } => CliError::MissingSetting {
                label: field.to_owned(),
                setting: field.replace(' ', "-"),
            },
            ApiError::LoginIpBlocked => CliError::IpBlocked,
            ApiError::LoginFailed { .. } | ApiError::LoginUnauthorized => CliError::AuthFailed {
                message: err.to_string(),
            },
            ApiError::TorrentNotFound { hash } => CliError::NotFound { hash },
            ApiError::TorrentFileInvalid { url } => CliError::TorrentRejected { url },
            ApiError::UrlInvalid { url } => CliError::InvalidUrl { url },
            ApiError::Transport(e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                CliError::ConnectionFailed {
                    url,
                    source: Box::new(e),
                }
            }
            ApiError::InvalidUrl(e) => CliError::Validation {
                field: "base-url".into(),
                reason: e.to_string(),
            },
            ApiError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            ApiError::Tls(message) => CliError::TlsError { message },
            ApiError::Api { .. } | ApiError::Deserialization { .. } => CliError::ApiError {
                message: err.to_string(),
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(e) => e.into(),
            CoreError::Config(e) => e.into(),
            CoreError::NotConfigured => CliError::NotConfigured,
        }
    }
}
