use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Name of the session cookie issued by the daemon on login.
pub const SESSION_COOKIE: &str = "SID";

/// Login material for one daemon.
///
/// The base URL is kept without a trailing slash so endpoint paths can be
/// appended directly.
#[derive(Debug, Clone)]
pub struct Credentials {
    base_url: String,
    username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<SecretString>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            base_url,
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    /// Fail with [`Error::Configuration`] naming the first empty field,
    /// checked in order base URL, username, password.
    pub fn validate(&self) -> Result<(), Error> {
        if self.base_url.is_empty() {
            return Err(Error::Configuration { field: "base url" });
        }
        if self.username.is_empty() {
            return Err(Error::Configuration { field: "username" });
        }
        if self.password.expose_secret().is_empty() {
            return Err(Error::Configuration { field: "password" });
        }
        Ok(())
    }
}

/// Whether the client currently holds a trusted session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

/// The cached session: either a token trusted for privileged calls, or nothing.
#[derive(Debug, Default)]
pub struct Session {
    token: Option<SecretString>,
}

impl Session {
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub fn state(&self) -> AuthState {
        if self.token.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    /// `Unauthenticated -> Authenticated` (or token refresh).
    pub fn establish(&mut self, token: SecretString) {
        self.token = Some(token);
    }

    /// `Authenticated -> Unauthenticated`. Returns whether a token was dropped.
    pub fn invalidate(&mut self) -> bool {
        self.token.take().is_some()
    }
}
