//! Download client configuration.
//!
//! A string-keyed option store behind the [`ConfigScope`] trait, and the
//! [`DownclientConfig`] facade that reads and writes the download client
//! settings through a caller-supplied scope. The facade holds no settings
//! of its own beyond a read-through cache.

mod store;

use std::borrow::Cow;

use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;
use tracing::debug;

use downclient_api::Credentials;

pub use store::{FileScope, MemoryScope, default_config_path};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Download client {} not set", .field.label())]
    Misconfigured { field: ConfigKey },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Keys ────────────────────────────────────────────────────────────

/// Settings recognized by the download client, with their persisted names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter, EnumString)]
pub enum ConfigKey {
    #[strum(serialize = "downclient_base_url")]
    BaseUrl,
    #[strum(serialize = "downclient_username")]
    Username,
    #[strum(serialize = "downclient_password")]
    Password,
    #[strum(serialize = "downclient_category")]
    Category,
    /// Boolean, stored as `"1"` / `"0"`.
    #[strum(serialize = "downclient_rename_torrents")]
    RenameTorrents,
}

impl ConfigKey {
    /// Human-readable name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::BaseUrl => "base url",
            Self::Username => "username",
            Self::Password => "password",
            Self::Category => "category",
            Self::RenameTorrents => "rename torrents",
        }
    }

    /// Fields that must be non-empty before the client may log in, in
    /// the order they are checked.
    pub const REQUIRED: [ConfigKey; 3] = [Self::BaseUrl, Self::Username, Self::Password];
}

// ── Backing store ───────────────────────────────────────────────────

/// A handle onto the persistent string key/value store.
///
/// Reads never fail: an unreadable or absent key is `None`. Writes may
/// fail when the backing medium does.
pub trait ConfigScope {
    /// Identity of the backing store. Handles onto the same store share
    /// an id; distinct stores never do.
    fn id(&self) -> Cow<'_, str>;
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError>;
}

// ── Facade ──────────────────────────────────────────────────────────

/// Typed accessors for the download client settings.
///
/// Values read from a scope are cached per scope id and key; writes go
/// through to the scope and refresh the cache.
#[derive(Debug, Default)]
pub struct DownclientConfig {
    cache: DashMap<(String, ConfigKey), String>,
}

impl DownclientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<S: ConfigScope + ?Sized>(&self, scope: &S, key: ConfigKey) -> Option<String> {
        let slot = (scope.id().into_owned(), key);
        if let Some(cached) = self.cache.get(&slot) {
            return Some(cached.value().clone());
        }
        let value = scope.get(key.as_ref())?;
        self.cache.insert(slot, value.clone());
        Some(value)
    }

    pub fn set<S: ConfigScope + ?Sized>(
        &self,
        scope: &mut S,
        key: ConfigKey,
        value: &str,
    ) -> Result<(), ConfigError> {
        scope.set(key.as_ref(), value)?;
        self.cache
            .insert((scope.id().into_owned(), key), value.to_owned());
        debug!(key = %key, "config value updated");
        Ok(())
    }

    /// Drop every cached value; the next read goes to the scope.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    fn get_non_empty<S: ConfigScope + ?Sized>(&self, scope: &S, key: ConfigKey) -> Option<String> {
        self.get(scope, key).filter(|v| !v.is_empty())
    }

    // ── Validation ──────────────────────────────────────────────────

    /// True iff base url, username, and password are all non-empty.
    pub fn is_valid<S: ConfigScope + ?Sized>(&self, scope: &S) -> bool {
        self.raise_if_invalid(scope).is_ok()
    }

    /// Fail with [`ConfigError::Misconfigured`] naming the first missing
    /// required field.
    pub fn raise_if_invalid<S: ConfigScope + ?Sized>(&self, scope: &S) -> Result<(), ConfigError> {
        match ConfigKey::REQUIRED
            .into_iter()
            .find(|key| self.get_non_empty(scope, *key).is_none())
        {
            Some(field) => Err(ConfigError::Misconfigured { field }),
            None => Ok(()),
        }
    }

    /// Gate on [`raise_if_invalid`](Self::raise_if_invalid), then build the
    /// login material.
    pub fn credentials<S: ConfigScope + ?Sized>(&self, scope: &S) -> Result<Credentials, ConfigError> {
        self.raise_if_invalid(scope)?;
        let base_url = self.get_base_url(scope).unwrap_or_default();
        let username = self.get_username(scope).unwrap_or_default();
        let password = self
            .get(scope, ConfigKey::Password)
            .unwrap_or_default();
        Ok(Credentials::new(base_url, username, password))
    }

    // ── Typed accessors ─────────────────────────────────────────────

    pub fn get_base_url<S: ConfigScope + ?Sized>(&self, scope: &S) -> Option<String> {
        self.get(scope, ConfigKey::BaseUrl)
    }

    /// Stored without trailing `/`.
    pub fn set_base_url<S: ConfigScope + ?Sized>(
        &self,
        scope: &mut S,
        base_url: &str,
    ) -> Result<(), ConfigError> {
        self.set(scope, ConfigKey::BaseUrl, base_url.trim_end_matches('/'))
    }

    pub fn get_username<S: ConfigScope + ?Sized>(&self, scope: &S) -> Option<String> {
        self.get(scope, ConfigKey::Username)
    }

    pub fn set_username<S: ConfigScope + ?Sized>(
        &self,
        scope: &mut S,
        username: &str,
    ) -> Result<(), ConfigError> {
        self.set(scope, ConfigKey::Username, username)
    }

    pub fn get_password<S: ConfigScope + ?Sized>(&self, scope: &S) -> Option<SecretString> {
        self.get(scope, ConfigKey::Password).map(SecretString::from)
    }

    pub fn set_password<S: ConfigScope + ?Sized>(
        &self,
        scope: &mut S,
        password: &SecretString,
    ) -> Result<(), ConfigError> {
        self.set(scope, ConfigKey::Password, password.expose_secret())
    }

    /// Category attached to new downloads, if one is configured.
    pub fn get_category<S: ConfigScope + ?Sized>(&self, scope: &S) -> Option<String> {
        self.get_non_empty(scope, ConfigKey::Category)
    }

    pub fn set_category<S: ConfigScope + ?Sized>(
        &self,
        scope: &mut S,
        category: &str,
    ) -> Result<(), ConfigError> {
        self.set(scope, ConfigKey::Category, category)
    }

    /// `"1"` is true; anything else, or no value, is false.
    pub fn get_rename_torrents<S: ConfigScope + ?Sized>(&self, scope: &S) -> bool {
        self.get(scope, ConfigKey::RenameTorrents).as_deref() == Some("1")
    }

    pub fn set_rename_torrents<S: ConfigScope + ?Sized>(
        &self,
        scope: &mut S,
        rename_torrents: bool,
    ) -> Result<(), ConfigError> {
        let value = if rename_torrents { "1" } else { "0" };
        self.set(scope, ConfigKey::RenameTorrents, value)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::cell::Cell;
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    /// Scope that counts reads, to observe the cache.
    #[derive(Default)]
    struct CountingScope {
        values: HashMap<String, String>,
        reads: Cell<usize>,
    }

    impl ConfigScope for CountingScope {
        fn id(&self) -> Cow<'_, str> {
            Cow::Borrowed("counting")
        }

        fn get(&self, key: &str) -> Option<String> {
            self.reads.set(self.reads.get() + 1);
            self.values.get(key).cloned()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
            self.values.insert(key.to_owned(), value.to_owned());
            Ok(())
        }
    }

    fn configured() -> (DownclientConfig, MemoryScope) {
        let config = DownclientConfig::new();
        let mut scope = MemoryScope::new();
        config.set_base_url(&mut scope, "http://qbit.local:8080").unwrap();
        config.set_username(&mut scope, "admin").unwrap();
        config
            .set_password(&mut scope, &SecretString::from("adminadmin".to_owned()))
            .unwrap();
        (config, scope)
    }

    #[test]
    fn keys_use_persisted_names() {
        let names: Vec<String> = ConfigKey::iter().map(|k| k.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "downclient_base_url",
                "downclient_username",
                "downclient_password",
                "downclient_category",
                "downclient_rename_torrents",
            ]
        );
        assert_eq!(
            "downclient_category".parse::<ConfigKey>().unwrap(),
            ConfigKey::Category
        );
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let config = DownclientConfig::new();
        let mut scope = MemoryScope::new();

        config.set_base_url(&mut scope, "http://host/").unwrap();
        assert_eq!(scope.get("downclient_base_url").as_deref(), Some("http://host"));

        let stored = config.get_base_url(&scope).unwrap();
        config.set_base_url(&mut scope, &stored).unwrap();
        assert_eq!(config.get_base_url(&scope).as_deref(), Some("http://host"));
    }

    #[test]
    fn rename_torrents_is_encoded_as_digits() {
        let config = DownclientConfig::new();
        let mut scope = MemoryScope::new();

        assert!(!config.get_rename_torrents(&scope));

        config.set_rename_torrents(&mut scope, true).unwrap();
        assert_eq!(scope.get("downclient_rename_torrents").as_deref(), Some("1"));
        assert!(config.get_rename_torrents(&scope));

        config.set_rename_torrents(&mut scope, false).unwrap();
        assert_eq!(scope.get("downclient_rename_torrents").as_deref(), Some("0"));
        assert!(!config.get_rename_torrents(&scope));
    }

    #[test]
    fn category_round_trips_and_empty_means_none() {
        let config = DownclientConfig::new();
        let mut scope = MemoryScope::new();
        assert_eq!(config.get_category(&scope), None);

        config.set_category(&mut scope, "audiobooks").unwrap();
        assert_eq!(config.get_category(&scope).as_deref(), Some("audiobooks"));

        config.set_category(&mut scope, "").unwrap();
        assert_eq!(config.get_category(&scope), None);
    }

    #[test]
    fn complete_config_is_valid() {
        let (config, scope) = configured();
        assert!(config.is_valid(&scope));
        assert!(config.raise_if_invalid(&scope).is_ok());

        let creds = config.credentials(&scope).unwrap();
        assert_eq!(creds.base_url(), "http://qbit.local:8080");
        assert_eq!(creds.username(), "admin");
        assert_eq!(creds.password().expose_secret(), "adminadmin");
    }

    #[test]
    fn first_missing_field_is_reported() {
        // Every subset of the three required fields left empty.
        for mask in 1_u8..8 {
            let config = DownclientConfig::new();
            let mut scope = MemoryScope::new();
            let values = ["http://host", "admin", "secret"];
            let mut expected = None;
            for (bit, key) in ConfigKey::REQUIRED.into_iter().enumerate() {
                if mask & (1 << bit) == 0 {
                    scope.set(key.as_ref(), values[bit]).unwrap();
                } else {
                    if bit % 2 == 0 {
                        scope.set(key.as_ref(), "").unwrap();
                    }
                    expected.get_or_insert(key);
                }
            }

            assert!(!config.is_valid(&scope));
            match config.raise_if_invalid(&scope) {
                Err(ConfigError::Misconfigured { field }) => {
                    assert_eq!(Some(field), expected, "mask {mask:03b}");
                }
                other => panic!("expected Misconfigured, got {other:?}"),
            }
            assert!(config.credentials(&scope).is_err());
        }
    }

    #[test]
    fn misconfigured_message_names_the_field() {
        let err = ConfigError::Misconfigured {
            field: ConfigKey::BaseUrl,
        };
        assert_eq!(err.to_string(), "Download client base url not set");
    }

    #[test]
    fn reads_are_cached_until_invalidated() {
        let config = DownclientConfig::new();
        let mut scope = CountingScope::default();
        scope.values.insert("downclient_username".into(), "admin".into());

        assert_eq!(config.get_username(&scope).as_deref(), Some("admin"));
        assert_eq!(config.get_username(&scope).as_deref(), Some("admin"));
        assert_eq!(scope.reads.get(), 1);

        // Changed behind the facade's back: still served from cache.
        scope.values.insert("downclient_username".into(), "root".into());
        assert_eq!(config.get_username(&scope).as_deref(), Some("admin"));

        config.invalidate();
        assert_eq!(config.get_username(&scope).as_deref(), Some("root"));
        assert_eq!(scope.reads.get(), 2);
    }

    #[test]
    fn scopes_do_not_share_cached_values() {
        let (config, configured) = configured();
        assert!(config.is_valid(&configured));

        let empty = MemoryScope::new();
        assert_eq!(config.get_base_url(&empty), None);
        assert!(!config.is_valid(&empty));
        assert!(matches!(
            config.credentials(&empty),
            Err(ConfigError::Misconfigured {
                field: ConfigKey::BaseUrl
            })
        ));

        let mut other = MemoryScope::new();
        config.set_username(&mut other, "guest").unwrap();
        assert_eq!(config.get_username(&other).as_deref(), Some("guest"));
        assert_eq!(config.get_username(&configured).as_deref(), Some("admin"));
    }

    #[test]
    fn cloned_scope_is_a_separate_store() {
        let (config, original) = configured();
        let mut copy = original.clone();
        config.set_username(&mut copy, "guest").unwrap();

        assert_eq!(config.get_username(&original).as_deref(), Some("admin"));
        assert_eq!(config.get_username(&copy).as_deref(), Some("guest"));
    }

    #[test]
    fn writes_refresh_the_cache() {
        let config = DownclientConfig::new();
        let mut scope = CountingScope::default();

        config.set_username(&mut scope, "admin").unwrap();
        assert_eq!(config.get_username(&scope).as_deref(), Some("admin"));
        assert_eq!(scope.reads.get(), 0);
    }
}
