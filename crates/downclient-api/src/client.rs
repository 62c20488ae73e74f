// Daemon HTTP client
//
// Wraps `reqwest::Client` with endpoint construction, the cached session
// token, and the authorised-call combinator. Endpoint adapters live in
// `torrents.rs` as inherent methods so this module stays focused on
// session mechanics.

use std::future::Future;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{COOKIE, HeaderValue, REFERER};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, warn};
use url::Url;

use crate::auth::{AuthState, Credentials, SESSION_COOKIE, Session};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Session-managing client for one qBittorrent daemon.
///
/// Starts unauthenticated. [`login`](Self::login) caches the `SID` cookie;
/// privileged calls go through [`authorised`](Self::authorised), which logs
/// in lazily when no token is cached, and report invalidated sessions via
/// [`check_bad_login`](Self::check_bad_login).
pub struct QbitClient {
    http: reqwest::Client,
    credentials: Credentials,
    timeout: Duration,
    session: RwLock<Session>,
}

impl QbitClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(credentials: Credentials, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            credentials,
            timeout: transport.timeout,
            session: RwLock::new(Session::default()),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// `timeout` must be the timeout `http` was built with; it is reported
    /// in [`Error::Timeout`].
    pub fn with_client(http: reqwest::Client, credentials: Credentials, timeout: Duration) -> Self {
        Self {
            http,
            credentials,
            timeout,
            session: RwLock::new(Session::default()),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The daemon base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        self.credentials.base_url()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Session state ────────────────────────────────────────────────

    pub fn auth_state(&self) -> AuthState {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }

    /// Snapshot of the cached token, taken under the session lock.
    pub fn session_token(&self) -> Option<SecretString> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token()
            .cloned()
    }

    fn store_session(&self, token: SecretString) {
        self.session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .establish(token);
    }

    fn clear_session(&self) {
        let dropped = self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .invalidate();
        if dropped {
            debug!("session token cleared");
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/v2/{path}`.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let full = format!("{}/api/v2/{path}", self.credentials.base_url());
        Ok(Url::parse(&full)?)
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Log in with the configured credentials and cache the session token.
    ///
    /// - 403: [`Error::LoginIpBlocked`], never retried here.
    /// - other non-success: [`Error::LoginFailed`].
    /// - success without a non-empty `SID` cookie: [`Error::LoginUnauthorized`].
    ///
    /// Incomplete credentials fail with [`Error::Configuration`] before
    /// any request is sent.
    pub async fn login(&self) -> Result<SecretString, Error> {
        self.credentials.validate()?;

        let url = self.endpoint("auth/login")?;
        debug!("logging in at {}", url);

        let form = [
            ("username", self.credentials.username()),
            ("password", self.credentials.password().expose_secret()),
        ];

        let resp = self
            .send(
                self.http
                    .post(url)
                    .header(REFERER, self.credentials.base_url())
                    .form(&form),
            )
            .await?;

        let status = resp.status();
        if status == StatusCode::FORBIDDEN {
            error!("too many login attempts, IP is blocked");
            return Err(Error::LoginIpBlocked);
        }
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or_default().to_owned();
            error!(status = status.as_u16(), %reason, "failed to send login");
            return Err(Error::LoginFailed {
                status: status.as_u16(),
                reason,
            });
        }

        let Some(token) = resp
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .filter(|cookie| !cookie.value().is_empty())
            .map(|cookie| SecretString::from(cookie.value().to_owned()))
        else {
            warn!("login answered without a session cookie");
            return Err(Error::LoginUnauthorized);
        };

        self.store_session(token.clone());
        debug!("login successful");
        Ok(token)
    }

    /// Run a privileged operation with a session token.
    ///
    /// Uses the cached token when present; otherwise performs exactly one
    /// [`login`](Self::login) first, whose error is returned unchanged and
    /// stops `op` from running. A 401/403 seen by `op` itself is not retried.
    pub async fn authorised<T, F, Fut>(&self, op: F) -> Result<T, Error>
    where
        F: FnOnce(SecretString) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let token = match self.session_token() {
            Some(token) => token,
            None => {
                debug!("no cached session, logging in");
                self.login().await?
            }
        };
        op(token).await
    }

    /// Inspect the status of a privileged response. 401 and 403 clear the
    /// session and fail with [`Error::LoginUnauthorized`].
    pub fn check_bad_login(&self, status: StatusCode) -> Result<(), Error> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = status.as_u16(), "session rejected by daemon");
            self.clear_session();
            return Err(Error::LoginUnauthorized);
        }
        Ok(())
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// `Cookie` header carrying the session token.
    pub(crate) fn session_cookie(token: &SecretString) -> Result<HeaderValue, Error> {
        HeaderValue::from_str(&format!("{SESSION_COOKIE}={}", token.expose_secret()))
            .map_err(|_| Error::LoginUnauthorized)
    }

    /// Send a request with the session cookie attached.
    pub(crate) async fn send_authorised(
        &self,
        builder: reqwest::RequestBuilder,
        token: &SecretString,
    ) -> Result<reqwest::Response, Error> {
        self.send(builder.header(COOKIE, Self::session_cookie(token)?))
            .await
    }

    /// Send a request, mapping client-side timeouts to [`Error::Timeout`].
    pub(crate) async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, Error> {
        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                Error::Transport(e)
            }
        })
    }
}

impl std::fmt::Debug for QbitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QbitClient")
            .field("base_url", &self.credentials.base_url())
            .field("auth_state", &self.auth_state())
            .finish_non_exhaustive()
    }
}
