// ── Core error types ──
//
// Daemon and configuration errors pass through unchanged so callers can
// match on the exact kind (IP block vs. rejected credentials, missing
// field). The only error native to this crate is the "not configured"
// signal from the registry.

use thiserror::Error;

use downclient_api::Error as ApiError;
use downclient_config::{ConfigError, ConfigKey};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Download client is not configured")]
    NotConfigured,
}

impl CoreError {
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_auth_error())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_not_found())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_transient())
    }

    /// Missing setting, whichever layer noticed it.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured
                | Self::Config(ConfigError::Misconfigured { .. })
                | Self::Api(ApiError::Configuration { .. })
        )
    }

    /// The required setting reported missing, when known.
    pub fn missing_field(&self) -> Option<ConfigKey> {
        match self {
            Self::Config(ConfigError::Misconfigured { field }) => Some(*field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_their_message() {
        let err = CoreError::from(ApiError::LoginUnauthorized);
        assert_eq!(err.to_string(), ApiError::LoginUnauthorized.to_string());
        assert!(err.is_auth_error());
        assert!(!CoreError::from(ApiError::LoginIpBlocked).is_auth_error());
        assert!(!err.is_config_error());
    }

    #[test]
    fn config_errors_are_classified() {
        let err = CoreError::from(ConfigError::Misconfigured {
            field: ConfigKey::Password,
        });
        assert!(err.is_config_error());
        assert_eq!(err.missing_field(), Some(ConfigKey::Password));
        assert_eq!(err.to_string(), "Download client password not set");

        assert!(CoreError::NotConfigured.is_config_error());
        assert_eq!(CoreError::NotConfigured.missing_field(), None);
    }

    #[test]
    fn not_found_passes_through() {
        let err = CoreError::from(ApiError::TorrentNotFound {
            hash: "abc".into(),
        });
        assert!(err.is_not_found());
        assert!(!err.is_transient());
    }
}
