//! Content-addressed image cache.
//!
//! Entries live at `<dir>/<sha256-hex(url)>.bin` and never expire. Writes go to a
//! temp file in the same directory and are published with a rename, so a reader
//! sees either no entry or a complete one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_CACHE_DIR: &str = "cache_images";

const ENTRY_EXTENSION: &str = "bin";
const TEMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write cache entry {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where the cache lives. Passed in explicitly; nothing is created until `ImageCache::open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub directory: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
}

impl ImageCache {
    /// Creates the cache directory if needed. Idempotent.
    pub fn open(config: &CacheConfig) -> Result<Self, CacheError> {
        fs::create_dir_all(&config.directory).map_err(|source| CacheError::CreateDir {
            path: config.directory.clone(),
            source,
        })?;
        Ok(Self {
            dir: config.directory.clone(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex-encoded SHA-256 of the URL string.
    pub fn key(url: &str) -> String {
        hex::encode(Sha256::digest(url.as_bytes()))
    }

    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{ENTRY_EXTENSION}", Self::key(url)))
    }

    /// Returns the cached bytes for `url`. Missing, empty or unreadable entries are misses.
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(url);
        match fs::read(&path) {
            Ok(data) if !data.is_empty() => Some(data),
            Ok(_) => None,
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Stores `bytes` for `url` via temp file + rename.
    ///
    /// If the rename cannot be performed the temp file is copied over the entry
    /// instead; only that fallback path can expose a partially written entry.
    pub fn put(&self, url: &str, bytes: &[u8]) -> Result<(), CacheError> {
        let key = Self::key(url);
        let target = self.entry_path(url);
        let write_err = |source| CacheError::Write {
            path: target.clone(),
            source,
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(&key)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.dir)
            .map_err(write_err)?;
        tmp.write_all(bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        match tmp.persist(&target) {
            Ok(_) => {
                debug!(key = %key, bytes = bytes.len(), "Cache entry published");
                Ok(())
            }
            Err(e) => {
                warn!(
                    path = %target.display(),
                    error = %e.error,
                    "Atomic rename failed, falling back to copy"
                );
                // The temp file is removed when `e.file` drops.
                fs::copy(e.file.path(), &target).map_err(write_err)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_in(dir: &Path) -> ImageCache {
        ImageCache::open(&CacheConfig {
            directory: dir.to_path_buf(),
        })
        .expect("open cache")
    }

    #[test]
    fn test_key_is_sha256_hex_of_url() {
        assert_eq!(
            ImageCache::key(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        let key = ImageCache::key("https://example.com/a.png");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_put_then_get_returns_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path());
        let url = "https://example.com/cat.jpg";

        assert!(cache.get(url).is_none());
        cache.put(url, b"\x89PNG fake image bytes").unwrap();
        assert_eq!(cache.get(url).as_deref(), Some(&b"\x89PNG fake image bytes"[..]));
        assert!(cache.entry_path(url).ends_with(format!("{}.bin", ImageCache::key(url))));
    }

    #[test]
    fn test_put_overwrites_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path());
        cache.put("u", b"first").unwrap();
        cache.put("u", b"second").unwrap();
        assert_eq!(cache.get("u").unwrap(), b"second");
    }

    #[test]
    fn test_put_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path());
        cache.put("https://example.com/a", b"data").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".bin"));
    }

    #[test]
    fn test_interrupted_write_is_not_visible() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path());
        let url = "https://example.com/partial.png";

        // A crash between temp write and rename leaves only the temp file behind.
        let orphan = dir.path().join(format!("{}abc123.tmp", ImageCache::key(url)));
        fs::write(&orphan, b"half of an ima").unwrap();

        assert!(cache.get(url).is_none());
    }

    #[test]
    fn test_empty_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path());
        fs::write(cache.entry_path("u"), b"").unwrap();
        assert!(cache.get("u").is_none());
    }

    #[test]
    fn test_open_creates_nested_directory_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let config = CacheConfig {
            directory: nested.clone(),
        };
        ImageCache::open(&config).unwrap();
        ImageCache::open(&config).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_open_fails_when_path_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        fs::write(&file, b"x").unwrap();
        let err = ImageCache::open(&CacheConfig { directory: file }).unwrap_err();
        assert!(matches!(err, CacheError::CreateDir { .. }));
    }
}
