// src/cache/mod.rs - Comparison result cache behind a batched get/set capability
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const CACHE_KEY_PREFIX: &str = "match:";

/// Batched multi-get / multi-set over serialized match results. Values are
/// JSON-encoded `MatchResult`s; entries are permanent once written and are
/// never mutated, so a racing duplicate write of the same pair is harmless.
#[async_trait]
pub trait ComparisonCache: Send + Sync {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>>;
    async fn set_many(&self, entries: &[(String, String)]) -> Result<()>;
}

/// Cache key for an ordered description pair.
///
/// The descriptions are length-delimited before hashing: concatenating them
/// with a separator would let ("a:b", "c") and ("a", "b:c") collide, and
/// descriptions can contain any separator character.
pub fn pair_cache_key(desc_a: &str, desc_b: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update((desc_a.len() as u64).to_le_bytes());
    hasher.update(desc_a.as_bytes());
    hasher.update((desc_b.len() as u64).to_le_bytes());
    hasher.update(desc_b.as_bytes());
    format!("{}{}", CACHE_KEY_PREFIX, hex::encode(hasher.finalize()))
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, String>,
    hits: usize,
    misses: usize,
}

impl CacheState {
    fn get_many(&mut self, keys: &[String]) -> Vec<Option<String>> {
        let results: Vec<Option<String>> =
            keys.iter().map(|k| self.entries.get(k).cloned()).collect();
        let hits = results.iter().filter(|r| r.is_some()).count();
        self.hits += hits;
        self.misses += keys.len() - hits;
        results
    }

    fn set_many(&mut self, entries: &[(String, String)]) {
        for (key, value) in entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            (self.hits as f64 / (self.hits + self.misses) as f64) * 100.0
        }
    }
}

/// Process-local cache. Default for tests and for runs without a cache file.
#[derive(Default)]
pub struct InMemoryComparisonCache {
    state: Mutex<CacheState>,
}

impl InMemoryComparisonCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// (hits, misses) so far.
    pub async fn stats(&self) -> (usize, usize) {
        let state = self.state.lock().await;
        (state.hits, state.misses)
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ComparisonCache for InMemoryComparisonCache {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let mut state = self.state.lock().await;
        let results = state.get_many(keys);
        debug!(
            "Cache read: {}/{} hits (running hit rate {:.1}%)",
            results.iter().filter(|r| r.is_some()).count(),
            keys.len(),
            state.hit_rate()
        );
        Ok(results)
    }

    async fn set_many(&self, entries: &[(String, String)]) -> Result<()> {
        let mut state = self.state.lock().await;
        state.set_many(entries);
        Ok(())
    }
}

/// Cache persisted as one JSON object on disk, loaded whole at startup and
/// flushed at the end of a run, so comparison results written by one run are
/// reused by every later run.
pub struct FileComparisonCache {
    path: PathBuf,
    state: Mutex<CacheState>,
}

impl FileComparisonCache {
    /// Opens `path`. A missing file starts the cache empty; a present but
    /// unreadable file is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read comparison cache {}", path.display()))?;
            serde_json::from_str::<HashMap<String, String>>(&raw)
                .with_context(|| format!("Failed to parse comparison cache {}", path.display()))?
        } else {
            HashMap::new()
        };

        info!(
            "Comparison cache loaded: {} entries from {}",
            entries.len(),
            path.display()
        );

        Ok(Self {
            path,
            state: Mutex::new(CacheState {
                entries,
                ..Default::default()
            }),
        })
    }

    /// Writes the cache back to disk atomically (temp file + rename).
    pub async fn flush(&self) -> Result<()> {
        let state = self.state.lock().await;
        let serialized = serde_json::to_string(&state.entries)
            .context("Failed to serialize comparison cache")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to move cache into place at {}", self.path.display()))?;

        info!(
            "Comparison cache flushed: {} entries to {}",
            state.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    pub async fn stats(&self) -> (usize, usize) {
        let state = self.state.lock().await;
        (state.hits, state.misses)
    }

    pub async fn hit_rate(&self) -> f64 {
        self.state.lock().await.hit_rate()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ComparisonCache for FileComparisonCache {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let mut state = self.state.lock().await;
        Ok(state.get_many(keys))
    }

    async fn set_many(&self, entries: &[(String, String)]) -> Result<()> {
        let mut state = self.state.lock().await;
        state.set_many(entries);
        Ok(())
    }
}
