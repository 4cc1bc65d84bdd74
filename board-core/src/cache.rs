//! Local fallback cache for encoded snapshots.
//!
//! A small key-value store on the local filesystem. It is written on every
//! save hand-off and on clear, and read only when the remote load fails; it
//! is never treated as authoritative while the remote is reachable.

use std::path::{Path, PathBuf};

use crate::error::BoardResult;

/// Fixed cache key for the single shared whiteboard.
pub const BOARD_CACHE_KEY: &str = "whiteboard";

/// File-backed key-value cache of encoded snapshots.
#[derive(Debug, Clone)]
pub struct LocalCache {
    data_dir: PathBuf,
}

impl LocalCache {
    /// Open a cache rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BoardError::Cache`] if the directory cannot be created.
    pub fn open(data_dir: impl Into<PathBuf>) -> BoardResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    /// Write an encoded snapshot under `key`.
    ///
    /// Failures are logged and swallowed: losing the fallback copy must never
    /// interrupt drawing.
    pub fn write(&self, key: &str, encoded: &str) {
        let path = self.path(key);
        if let Err(e) = std::fs::write(&path, encoded) {
            tracing::warn!(key, path = %path.display(), "Failed to write snapshot cache: {e}");
        }
    }

    /// Read the encoded snapshot stored under `key`, if any.
    #[must_use]
    pub fn read(&self, key: &str) -> Option<String> {
        let path = self.path(key);
        match std::fs::read_to_string(&path) {
            Ok(encoded) => Some(encoded),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, path = %path.display(), "Failed to read snapshot cache: {e}");
                None
            }
        }
    }

    /// Remove the entry stored under `key`, if any.
    pub fn remove(&self, key: &str) {
        let path = self.path(key);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(key, path = %path.display(), "Failed to remove snapshot cache: {e}");
            }
        }
    }

    /// Directory this cache stores its entries in.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.snapshot", sanitize_key(key)))
    }
}

/// Sanitize a cache key for use as a filename.
///
/// Replaces any character that is not alphanumeric, `-`, or `_` with `_`.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = LocalCache::open(dir.path()).expect("cache");

        cache.write(BOARD_CACHE_KEY, "data:image/png;base64,AAAA");
        assert_eq!(
            cache.read(BOARD_CACHE_KEY).as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn read_missing_key_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = LocalCache::open(dir.path()).expect("cache");
        assert!(cache.read("nothing-here").is_none());
    }

    #[test]
    fn write_overwrites_previous_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = LocalCache::open(dir.path()).expect("cache");

        cache.write(BOARD_CACHE_KEY, "first");
        cache.write(BOARD_CACHE_KEY, "second");
        assert_eq!(cache.read(BOARD_CACHE_KEY).as_deref(), Some("second"));
    }

    #[test]
    fn remove_deletes_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = LocalCache::open(dir.path()).expect("cache");

        cache.write(BOARD_CACHE_KEY, "payload");
        cache.remove(BOARD_CACHE_KEY);
        assert!(cache.read(BOARD_CACHE_KEY).is_none());
    }

    #[test]
    fn keys_are_sanitized_for_filenames() {
        assert_eq!(sanitize_key("simple"), "simple");
        assert_eq!(sanitize_key("has/slash"), "has_slash");
        assert_eq!(sanitize_key("has space"), "has_space");
        assert_eq!(sanitize_key("a.b"), "a_b");
    }
}
