/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Segment profile cache.
//!
//! Profiles are cached per (ticker, segment, years) for the lifetime of the cache
//! instance. The cache is injected into the allocator, so tests and concurrent callers
//! each decide whether to share one.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ipv_engine::cache::{CacheConfig, CacheHelper, InMemoryProfileCache, SegmentKey};
//!
//! let cache = InMemoryProfileCache::new();
//! let helper = CacheHelper::new(CacheConfig::default());
//! let key = SegmentKey::new("aapl", "iPhone", 5);
//!
//! if let Some(profile) = helper.get(&cache, &key).into_option() {
//!   // reuse profile
//! }
//! ```

use ipv_models::{normalize_segment_name, SegmentFinancialProfile};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Cache policy for the allocator
#[derive(Debug, Clone)]
pub struct CacheConfig {
  /// Enable caching
  pub enable_cache: bool,
  /// Force refresh (bypass cache reads, but still write)
  pub force_refresh: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { enable_cache: true, force_refresh: false }
  }
}

impl CacheConfig {
  /// Builder: set enable_cache
  pub fn with_enabled(mut self, enabled: bool) -> Self {
    self.enable_cache = enabled;
    self
  }

  /// Builder: set force_refresh
  pub fn with_force_refresh(mut self, force: bool) -> Self {
    self.force_refresh = force;
    self
  }
}

/// Result of a cache get operation
#[derive(Debug)]
pub enum CacheResult<T> {
  /// Cache hit with data
  Hit(T),
  /// Nothing cached under the key
  Miss,
  /// Cache disabled or force refresh
  Skipped,
}

impl<T> CacheResult<T> {
  pub fn is_hit(&self) -> bool {
    matches!(self, CacheResult::Hit(_))
  }

  /// Returns true if cache was actually checked (not skipped)
  pub fn was_checked(&self) -> bool {
    !matches!(self, CacheResult::Skipped)
  }

  pub fn into_option(self) -> Option<T> {
    match self {
      CacheResult::Hit(data) => Some(data),
      _ => None,
    }
  }
}

/// Value-typed cache key. Tickers are uppercased and segment names normalized, so
/// "aapl"/"i-Phone" and "AAPL"/"iphone" share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentKey {
  pub ticker: String,
  pub segment: String,
  pub years: usize,
}

impl SegmentKey {
  pub fn new(ticker: &str, segment: &str, years: usize) -> Self {
    Self { ticker: ticker.to_uppercase(), segment: normalize_segment_name(segment), years }
  }
}

impl fmt::Display for SegmentKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}_{}_{}", self.ticker, self.segment.to_uppercase(), self.years)
  }
}

/// Storage for derived segment profiles
pub trait ProfileCache: Send + Sync {
  fn get(&self, key: &SegmentKey) -> Option<Arc<SegmentFinancialProfile>>;

  fn insert(&self, key: SegmentKey, profile: Arc<SegmentFinancialProfile>);

  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn clear(&self);
}

/// Process-local cache guarded by a read/write lock
#[derive(Debug, Default)]
pub struct InMemoryProfileCache {
  entries: RwLock<HashMap<SegmentKey, Arc<SegmentFinancialProfile>>>,
}

impl InMemoryProfileCache {
  pub fn new() -> Self {
    Self::default()
  }
}

impl ProfileCache for InMemoryProfileCache {
  fn get(&self, key: &SegmentKey) -> Option<Arc<SegmentFinancialProfile>> {
    // A poisoned lock still holds complete entries; inserts are single statements
    let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
    entries.get(key).cloned()
  }

  fn insert(&self, key: SegmentKey, profile: Arc<SegmentFinancialProfile>) {
    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
    entries.insert(key, profile);
  }

  fn len(&self) -> usize {
    self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  fn clear(&self) {
    self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
  }
}

/// Applies a [`CacheConfig`] to cache reads and writes and logs hits and misses
#[derive(Debug, Clone, Default)]
pub struct CacheHelper {
  config: CacheConfig,
}

impl CacheHelper {
  pub fn new(config: CacheConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &CacheConfig {
    &self.config
  }

  /// Check if caching is effectively enabled (enabled and not force refresh for reads)
  pub fn is_read_enabled(&self) -> bool {
    self.config.enable_cache && !self.config.force_refresh
  }

  pub fn is_write_enabled(&self) -> bool {
    self.config.enable_cache
  }

  pub fn get(
    &self,
    cache: &dyn ProfileCache,
    key: &SegmentKey,
  ) -> CacheResult<Arc<SegmentFinancialProfile>> {
    if !self.is_read_enabled() {
      return CacheResult::Skipped;
    }

    match cache.get(key) {
      Some(profile) => {
        info!("Cache hit for segment profile {}", key);
        CacheResult::Hit(profile)
      }
      None => {
        debug!("Cache miss for segment profile {}", key);
        CacheResult::Miss
      }
    }
  }

  /// Store a profile; returns false when writes are disabled
  pub fn set(
    &self,
    cache: &dyn ProfileCache,
    key: SegmentKey,
    profile: Arc<SegmentFinancialProfile>,
  ) -> bool {
    if !self.is_write_enabled() {
      return false;
    }

    debug!("Cached segment profile {}", key);
    cache.insert(key, profile);
    true
  }
}
