use thiserror::Error;

/// Top-level error type for the `downclient-api` crate.
///
/// Covers every failure mode of the daemon client: missing configuration,
/// the login outcomes, per-operation rejections, transport and decoding.
/// `downclient-core` wraps these without changing their meaning.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// A required credential is empty. Raised before any network I/O.
    #[error("Download client {field} not set")]
    Configuration { field: &'static str },

    // ── Authentication ──────────────────────────────────────────────
    /// The daemon answered the login with HTTP 403: too many failed
    /// attempts, the client IP is banned.
    #[error("Too many login attempts -- IP is blocked")]
    LoginIpBlocked,

    /// Login answered with a non-success status other than 403.
    #[error("Login failed (HTTP {status}): {reason}")]
    LoginFailed { status: u16, reason: String },

    /// The daemon accepted the request but issued no session cookie, or
    /// a privileged call reported the session as invalid (401/403).
    #[error("Unauthorized -- credentials rejected or session invalidated")]
    LoginUnauthorized,

    // ── Operations ──────────────────────────────────────────────────
    /// The queried torrent hash is unknown to the daemon.
    #[error("Torrent {hash} not found")]
    TorrentNotFound { hash: String },

    /// The daemon rejected the submitted torrent (HTTP 415).
    #[error("Torrent file or URL is not valid: {url}")]
    TorrentFileInvalid { url: String },

    /// The URL does not use an accepted scheme. Raised before any network I/O.
    #[error("Unsupported torrent URL: {url}")]
    UrlInvalid { url: String },

    /// Any other non-success answer from a privileged operation.
    #[error("Daemon API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

impl Error {
    /// Returns `true` for login and session failures that a fresh login
    /// might resolve. An IP block is excluded: retrying makes it worse.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::LoginUnauthorized | Self::LoginFailed { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::TorrentNotFound { .. } | Self::Api { status: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Returns `true` for errors detected locally, before any request was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::UrlInvalid { .. } | Self::InvalidUrl(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_block_is_not_an_auth_retry_candidate() {
        assert!(!Error::LoginIpBlocked.is_auth_error());
        assert!(Error::LoginUnauthorized.is_auth_error());
        assert!(
            Error::LoginFailed {
                status: 500,
                reason: "Internal Server Error".into()
            }
            .is_auth_error()
        );
    }

    #[test]
    fn not_found_covers_missing_torrents() {
        let err = Error::TorrentNotFound {
            hash: "8c212779b4abde7c6bc608063a0d008b7e40ce32".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_transient());
        assert!(err.to_string().contains("8c212779b4abde7c6bc608063a0d008b7e40ce32"));
    }

    #[test]
    fn local_errors_are_flagged() {
        assert!(Error::Configuration { field: "password" }.is_local());
        assert!(
            Error::UrlInvalid {
                url: "ftp://example.org/a.torrent".into()
            }
            .is_local()
        );
        assert!(!Error::LoginIpBlocked.is_local());
        assert!(Error::Timeout { timeout_secs: 30 }.is_transient());
    }
}
