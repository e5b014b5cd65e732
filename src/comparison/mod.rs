// src/comparison/mod.rs - Cache-augmented comparison of description pairs
pub mod parser;
pub mod prompt;

use anyhow::{Context, Result};
use log::{debug, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::cache::{pair_cache_key, ComparisonCache};
use crate::llm::ModelService;
use crate::matching::classify::SIMILAR_CONFIDENCE_THRESHOLD;
use crate::models::matching::MatchResult;

/// Details text for results synthesized when the model call itself fails.
pub const COMPARISON_ERROR_DETAILS: &str = "comparison error";

/// Identifier of one pair inside a batch prompt: 1-based list-A item number
/// and 1-based candidate number for that item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairId {
    pub item: usize,
    pub candidate: usize,
}

/// One unit of cacheable, model-evaluable work.
#[derive(Debug, Clone)]
pub struct ComparisonPair {
    pub id: PairId,
    pub desc_a: String,
    pub desc_b: String,
}

/// Resolves description pairs to match results, consulting the cache in one
/// batched read before issuing a single model call for the misses, and
/// persisting every freshly parsed result back.
pub struct CachedComparator {
    cache: Arc<dyn ComparisonCache>,
    model: Arc<dyn ModelService>,
    model_calls: AtomicUsize,
}

impl CachedComparator {
    pub fn new(cache: Arc<dyn ComparisonCache>, model: Arc<dyn ModelService>) -> Self {
        Self {
            cache,
            model,
            model_calls: AtomicUsize::new(0),
        }
    }

    /// Number of model-service calls issued so far.
    pub fn model_calls(&self) -> usize {
        self.model_calls.load(Ordering::Relaxed)
    }

    /// Resolves `pairs` in order. `None` means the model response carried no
    /// parseable line for that pair; callers must treat it as "no comparison
    /// result available", never as a match or a mismatch.
    pub async fn compare(&self, pairs: &[ComparisonPair]) -> Result<Vec<Option<MatchResult>>> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = pairs
            .iter()
            .map(|p| pair_cache_key(&p.desc_a, &p.desc_b))
            .collect();
        let cached = self
            .cache
            .get_many(&keys)
            .await
            .context("Failed to read comparison cache")?;

        let mut results: Vec<Option<MatchResult>> = vec![None; pairs.len()];
        let mut miss_indices: Vec<usize> = Vec::new();

        for (i, entry) in cached.into_iter().enumerate() {
            match entry {
                Some(raw) => match serde_json::from_str::<MatchResult>(&raw) {
                    Ok(result) => results[i] = Some(result),
                    Err(e) => {
                        warn!("Discarding unreadable cache entry for {}: {}", keys[i], e);
                        miss_indices.push(i);
                    }
                },
                None => miss_indices.push(i),
            }
        }

        if miss_indices.is_empty() {
            debug!("All {} pairs served from cache", pairs.len());
            return Ok(results);
        }

        let miss_pairs: Vec<ComparisonPair> =
            miss_indices.iter().map(|&i| pairs[i].clone()).collect();
        let request = prompt::build_comparison_prompt(&miss_pairs);

        self.model_calls.fetch_add(1, Ordering::Relaxed);
        let completion = match self.model.generate(&request).await {
            Ok(text) => text,
            Err(e) => {
                // Transport failure is batch-scoped: the uncached pairs get a
                // conservative synthetic result, cached pairs stay as resolved.
                warn!(
                    "Model call failed for {} pairs, synthesizing error results: {:#}",
                    miss_pairs.len(),
                    e
                );
                for &i in &miss_indices {
                    results[i] = Some(MatchResult {
                        is_match: false,
                        details: COMPARISON_ERROR_DETAILS.to_string(),
                        confidence_percentage: None,
                    });
                }
                return Ok(results);
            }
        };

        let parsed = parser::parse_comparison_response(&completion);
        debug!(
            "Parsed {}/{} comparison lines from model response",
            parsed.len(),
            miss_pairs.len()
        );

        let mut to_cache: Vec<(String, String)> = Vec::new();
        for &i in &miss_indices {
            let pair = &pairs[i];
            match parsed.get(&pair.id) {
                Some(line) => {
                    let result = MatchResult {
                        is_match: line.confidence >= SIMILAR_CONFIDENCE_THRESHOLD,
                        details: line.details.clone(),
                        confidence_percentage: Some(line.confidence),
                    };
                    let serialized = serde_json::to_string(&result)
                        .context("Failed to serialize match result for cache")?;
                    to_cache.push((keys[i].clone(), serialized));
                    results[i] = Some(result);
                }
                None => {
                    warn!(
                        "No parseable result for Item {}.{} ('{}' vs '{}'), leaving pair unresolved",
                        pair.id.item, pair.id.candidate, pair.desc_a, pair.desc_b
                    );
                }
            }
        }

        if !to_cache.is_empty() {
            self.cache
                .set_many(&to_cache)
                .await
                .context("Failed to persist comparison results")?;
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryComparisonCache;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedModel {
        responses: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(String::from).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl ModelService for ScriptedModel {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(String::new())
            } else {
                Ok(responses.remove(0))
            }
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ModelService for FailingModel {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    fn pair(item: usize, candidate: usize, a: &str, b: &str) -> ComparisonPair {
        ComparisonPair {
            id: PairId { item, candidate },
            desc_a: a.to_string(),
            desc_b: b.to_string(),
        }
    }

    #[tokio::test]
    async fn parses_and_persists_fresh_results() {
        let cache = Arc::new(InMemoryComparisonCache::new());
        let model = Arc::new(ScriptedModel::new(vec![
            "Item 1.1: 72%. Same function, different wording.",
        ]));
        let comparator = CachedComparator::new(cache.clone(), model.clone());

        let pairs = vec![pair(1, 1, "Waterfront Vacation Property", "Beachfront Holiday Property")];
        let results = comparator.compare(&pairs).await.unwrap();

        let result = results[0].as_ref().unwrap();
        assert!(result.is_match);
        assert_eq!(result.confidence_percentage, Some(72));
        assert_eq!(result.details, "Same function, different wording.");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn second_compare_is_served_from_cache() {
        let cache = Arc::new(InMemoryComparisonCache::new());
        let model = Arc::new(ScriptedModel::new(vec!["Item 1.1: 90%. Same place."]));
        let comparator = CachedComparator::new(cache, model.clone());

        let pairs = vec![pair(1, 1, "Marina Facility", "Coastal Boating Center")];
        let first = comparator.compare(&pairs).await.unwrap();
        let second = comparator.compare(&pairs).await.unwrap();

        assert_eq!(model.calls(), 1);
        assert_eq!(comparator.model_calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn transport_failure_synthesizes_error_results() {
        let cache = Arc::new(InMemoryComparisonCache::new());
        let comparator = CachedComparator::new(cache.clone(), Arc::new(FailingModel));

        let pairs = vec![
            pair(1, 1, "Golf Course Clubhouse", "Country Club Pavilion"),
            pair(2, 1, "Shopping Mall", "Industrial Warehouse"),
        ];
        let results = comparator.compare(&pairs).await.unwrap();

        for result in &results {
            let result = result.as_ref().unwrap();
            assert!(!result.is_match);
            assert_eq!(result.details, COMPARISON_ERROR_DETAILS);
            assert_eq!(result.confidence_percentage, None);
        }
        // Synthetic results are never persisted
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn failure_still_honors_previously_cached_pairs() {
        let cache = Arc::new(InMemoryComparisonCache::new());
        let cached_result = MatchResult {
            is_match: true,
            details: "Same marina.".to_string(),
            confidence_percentage: Some(85),
        };
        cache
            .set_many(&[(
                pair_cache_key("Marina Facility", "Coastal Boating Center"),
                serde_json::to_string(&cached_result).unwrap(),
            )])
            .await
            .unwrap();

        let comparator = CachedComparator::new(cache, Arc::new(FailingModel));
        let pairs = vec![
            pair(1, 1, "Marina Facility", "Coastal Boating Center"),
            pair(2, 1, "Shopping Mall", "Industrial Warehouse"),
        ];
        let results = comparator.compare(&pairs).await.unwrap();

        assert_eq!(results[0].as_ref().unwrap(), &cached_result);
        assert_eq!(
            results[1].as_ref().unwrap().details,
            COMPARISON_ERROR_DETAILS
        );
    }

    #[tokio::test]
    async fn unparseable_lines_leave_pairs_unresolved() {
        let cache = Arc::new(InMemoryComparisonCache::new());
        let model = Arc::new(ScriptedModel::new(vec![
            "Item 1.1: 66%. Close enough.\nI am not sure about the second one.",
        ]));
        let comparator = CachedComparator::new(cache.clone(), model);

        let pairs = vec![
            pair(1, 1, "Historic Restaurant Building", "Vintage Dining Establishment"),
            pair(2, 1, "Gardens and Recreation Area", "Medical Office Building"),
        ];
        let results = comparator.compare(&pairs).await.unwrap();

        assert!(results[0].is_some());
        assert!(results[1].is_none());
        // Only the parsed pair was persisted
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn empty_miss_set_skips_model_entirely() {
        let cache = Arc::new(InMemoryComparisonCache::new());
        let result = MatchResult {
            is_match: false,
            details: "Different categories.".to_string(),
            confidence_percentage: Some(20),
        };
        cache
            .set_many(&[(
                pair_cache_key("Retail Store", "Golf Course Clubhouse"),
                serde_json::to_string(&result).unwrap(),
            )])
            .await
            .unwrap();

        let model = Arc::new(ScriptedModel::new(vec![]));
        let comparator = CachedComparator::new(cache, model.clone());
        let results = comparator
            .compare(&[pair(1, 1, "Retail Store", "Golf Course Clubhouse")])
            .await
            .unwrap();

        assert_eq!(results[0].as_ref().unwrap(), &result);
        assert_eq!(model.calls(), 0);
    }
}
