// Concrete option stores.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use tracing::debug;

use crate::{ConfigError, ConfigScope};

// ── Memory ──────────────────────────────────────────────────────────

static NEXT_MEMORY_SCOPE: AtomicU64 = AtomicU64::new(0);

/// Process-local scope. Nothing survives the process.
///
/// Every instance, clones included, has its own identity.
#[derive(Debug)]
pub struct MemoryScope {
    id: u64,
    values: HashMap<String, String>,
}

impl MemoryScope {
    pub fn new() -> Self {
        Self {
            id: NEXT_MEMORY_SCOPE.fetch_add(1, Ordering::Relaxed),
            values: HashMap::new(),
        }
    }
}

impl Default for MemoryScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryScope {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            ..Self::new()
        }
    }
}

impl ConfigScope for MemoryScope {
    fn id(&self) -> Cow<'_, str> {
        Cow::Owned(format!("memory:{}", self.id))
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// ── File ────────────────────────────────────────────────────────────

/// Canonical config file location.
pub fn default_config_path() -> PathBuf {
    ProjectDirs::from("com", "downclient", "downclient").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("downclient");
    p
}

/// Flat TOML file of string options. Every write rewrites the file.
#[derive(Debug, Clone)]
pub struct FileScope {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileScope {
    /// Load the file at `path`. A missing file is an empty scope; it is
    /// created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let values: BTreeMap<String, String> = Figment::new()
            .merge(Serialized::defaults(BTreeMap::<String, String>::new()))
            .merge(Toml::file(&path))
            .extract()?;
        debug!(path = %path.display(), keys = values.len(), "config file loaded");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, toml_str)?;
        Ok(())
    }
}

impl ConfigScope for FileScope {
    fn id(&self) -> Cow<'_, str> {
        Cow::Owned(format!("file:{}", self.path.display()))
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let previous = self.values.insert(key.to_owned(), value.to_owned());
        if let Err(e) = self.save() {
            match previous {
                Some(old) => self.values.insert(key.to_owned(), old),
                None => self.values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let scope = FileScope::open(dir.path().join("absent.toml")).unwrap();
        assert_eq!(scope.get("downclient_base_url"), None);
        assert!(!scope.path().exists());
    }

    #[test]
    fn writes_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut scope = FileScope::open(&path).unwrap();
        scope.set("downclient_base_url", "http://qbit:8080").unwrap();
        scope.set("downclient_rename_torrents", "1").unwrap();

        let reopened = FileScope::open(&path).unwrap();
        assert_eq!(
            reopened.get("downclient_base_url").as_deref(),
            Some("http://qbit:8080")
        );
        assert_eq!(reopened.get("downclient_rename_torrents").as_deref(), Some("1"));

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("downclient_base_url = \"http://qbit:8080\""));
    }

    #[test]
    fn hand_written_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "downclient_username = \"admin\"\n").unwrap();

        let scope = FileScope::open(&path).unwrap();
        assert_eq!(scope.get("downclient_username").as_deref(), Some("admin"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "downclient_username = [1, 2").unwrap();

        assert!(matches!(FileScope::open(&path), Err(ConfigError::Figment(_))));
    }

    #[test]
    fn memory_scope_overwrites() {
        let mut scope = MemoryScope::new();
        scope.set("k", "a").unwrap();
        scope.set("k", "b").unwrap();
        assert_eq!(scope.get("k").as_deref(), Some("b"));
    }

    #[test]
    fn scope_ids_follow_the_backing_store() {
        let dir = tempfile::tempdir().unwrap();
        let a = FileScope::open(dir.path().join("a.toml")).unwrap();
        let a_again = FileScope::open(dir.path().join("a.toml")).unwrap();
        let b = FileScope::open(dir.path().join("b.toml")).unwrap();
        assert_eq!(a.id(), a_again.id());
        assert_ne!(a.id(), b.id());

        let memory = MemoryScope::new();
        assert_ne!(memory.id(), MemoryScope::new().id());
        assert_ne!(memory.id(), memory.clone().id());
    }
}
