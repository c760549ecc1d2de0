//! Content memoization keyed by unit file identity
//!
//! Used only when `reload_every_request` is disabled. A cache entry is keyed
//! by the resolved unit path and the SHA-256 of the unit file's bytes, so
//! editing a unit invalidates its entry implicitly; `invalidate`/`clear`
//! exist for explicit invalidation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct CacheEntry {
    file_digest: String,
    content: String,
}

/// Cross-request cache of successful source output
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// SHA-256 of a unit file's bytes, hex encoded
    pub fn digest(bytes: &[u8]) -> String {
        format!("{:x}", Sha256::digest(bytes))
    }

    /// Cached content for a unit, if the file's digest still matches
    pub async fn get(&self, path: &Path, file_digest: &str) -> Option<String> {
        let entries = self.entries.lock().await;
        entries
            .get(path)
            .filter(|entry| entry.file_digest == file_digest)
            .map(|entry| entry.content.clone())
    }

    /// Store the output of a successful execution
    pub async fn insert(&self, path: &Path, file_digest: String, content: String) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            path.to_path_buf(),
            CacheEntry {
                file_digest,
                content,
            },
        );
    }

    /// Drop the entry for one unit
    pub async fn invalidate(&self, path: &Path) {
        self.entries.lock().await.remove(path);
    }

    /// Drop all entries
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hit_requires_matching_digest() {
        let cache = ContentCache::new();
        let path = Path::new("/opt/units/cctv.src");
        let digest = ContentCache::digest(b"unit v1");

        cache
            .insert(path, digest.clone(), "#EXTINF:-1,Chan1\nhttp://x/1".to_string())
            .await;

        assert!(cache.get(path, &digest).await.is_some());
        // The unit file changed on disk, so the entry no longer applies.
        assert!(cache.get(path, &ContentCache::digest(b"unit v2")).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_drops_the_entry() {
        let cache = ContentCache::new();
        let path = Path::new("/opt/units/cctv.src");
        let digest = ContentCache::digest(b"unit v1");

        cache.insert(path, digest.clone(), "content".to_string()).await;
        cache.invalidate(path).await;
        assert!(cache.get(path, &digest).await.is_none());
    }
}
