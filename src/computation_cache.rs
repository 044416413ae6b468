//! Result cache for fractal dimension estimates.
//!
//! Estimates are keyed by a content hash of everything that determines them:
//! the samples, the sampling rate, the preprocessing steps and the estimator
//! settings. A repeated request with identical inputs returns the stored
//! result instead of sweeping the scales again. Eviction is least-recently-used
//! with a bounded capacity, and entries older than the configured maximum age
//! are recomputed.
//!
//! Each entry also keeps the exact configuration, sample count and sampling
//! rate it was computed for, plus an independent checksum of the samples. A
//! lookup only counts as a hit when all of them match, so a hash collision is
//! recomputed rather than served.

use crate::config::{AnalysisConfig, EstimatorConfig, PreprocessingConfig};
use crate::errors::FractalResult;
use crate::estimator::estimate;
use crate::preprocessing::{preprocess, FilterKind, FilterSpec};
use crate::results::FractalDimensionResult;
use crate::signal::Signal;
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Default number of cached estimates
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Default maximum age for cached estimates (30 minutes)
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30 * 60);

/// Cache statistics for monitoring
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests served from the cache
    pub hits: usize,
    /// Requests that had to compute
    pub misses: usize,
    /// Entries dropped to make room
    pub evictions: usize,
    /// Entries dropped because they outlived the maximum age
    pub expirations: usize,
}

impl CacheStats {
    /// Fraction of requests served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EstimateKey {
    data_hash: u64,
    config_hash: u64,
}

impl EstimateKey {
    fn new(signal: &Signal, preprocessing: &PreprocessingConfig, estimator: &EstimatorConfig) -> Self {
        Self {
            data_hash: hash_data(signal.samples()),
            config_hash: hash_config(signal.sampling_rate(), preprocessing, estimator),
        }
    }
}

/// Inputs an entry was computed for, compared in full on every lookup.
#[derive(Debug, Clone, PartialEq)]
struct EntryFingerprint {
    len: usize,
    sampling_rate_bits: u64,
    sample_checksum: u64,
    preprocessing: PreprocessingConfig,
    estimator: EstimatorConfig,
}

impl EntryFingerprint {
    fn new(signal: &Signal, preprocessing: &PreprocessingConfig, estimator: &EstimatorConfig) -> Self {
        let mut preprocessing = *preprocessing;
        // Corner count and phase of an inactive filter do not change the result
        if preprocessing.filter.is_none() {
            preprocessing.filter = FilterSpec::default();
        }
        Self {
            len: signal.len(),
            sampling_rate_bits: canonical_bits(signal.sampling_rate()),
            sample_checksum: checksum_data(signal.samples()),
            preprocessing,
            estimator: *estimator,
        }
    }
}

struct CacheEntry {
    value: FractalDimensionResult,
    fingerprint: EntryFingerprint,
    timestamp: Instant,
}

struct CacheState {
    entries: LruCache<EstimateKey, CacheEntry>,
    stats: CacheStats,
}

/// Thread-safe LRU cache of fractal dimension estimates.
pub struct EstimateCache {
    state: Mutex<CacheState>,
    max_age: Option<Duration>,
}

impl Default for EstimateCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for EstimateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EstimateCache")
            .field("len", &state.entries.len())
            .field("capacity", &state.entries.cap())
            .field("max_age", &self.max_age)
            .field("stats", &state.stats)
            .finish()
    }
}

impl EstimateCache {
    /// Create a cache holding at most `capacity` estimates (at least one),
    /// expiring entries after [`DEFAULT_MAX_AGE`].
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
            max_age: Some(DEFAULT_MAX_AGE),
        }
    }

    /// Replace the maximum entry age; `None` keeps entries until evicted.
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Preprocess and estimate `signal`, reusing a cached result when the same
    /// signal was analyzed with the same configuration before.
    ///
    /// Errors are returned to the caller and never cached.
    ///
    /// # Example
    /// ```rust
    /// use seismic_fractal::{AnalysisConfig, EstimateCache, EstimatorConfig, Signal};
    ///
    /// let cache = EstimateCache::default();
    /// let samples: Vec<f64> = (0..512).map(|i| (i as f64 * 0.3).sin()).collect();
    /// let signal = Signal::new(samples, 100.0).unwrap();
    /// let config = AnalysisConfig::new(EstimatorConfig::higuchi());
    ///
    /// let first = cache.get_or_estimate(&signal, &config).unwrap();
    /// let second = cache.get_or_estimate(&signal, &config).unwrap();
    /// assert_eq!(first, second);
    /// assert_eq!(cache.stats().hits, 1);
    /// ```
    pub fn get_or_estimate(
        &self,
        signal: &Signal,
        config: &AnalysisConfig,
    ) -> FractalResult<FractalDimensionResult> {
        self.get_or_compute(signal, &config.preprocessing, &config.estimator, || {
            let prepared = preprocess(signal, &config.preprocessing)?;
            estimate(&prepared, &config.estimator)
        })
    }

    /// Return the cached estimate for these inputs, or compute and store it.
    ///
    /// `compute` must produce the estimate for exactly these inputs; it runs
    /// without holding the cache lock.
    pub(crate) fn get_or_compute<F>(
        &self,
        signal: &Signal,
        preprocessing: &PreprocessingConfig,
        estimator: &EstimatorConfig,
        compute: F,
    ) -> FractalResult<FractalDimensionResult>
    where
        F: FnOnce() -> FractalResult<FractalDimensionResult>,
    {
        let key = EstimateKey::new(signal, preprocessing, estimator);
        let fingerprint = EntryFingerprint::new(signal, preprocessing, estimator);

        {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let expired = match state.entries.get(&key) {
                Some(entry) if entry.fingerprint != fingerprint => {
                    // Colliding key; the fresh result replaces the entry on insert
                    log::debug!("estimate cache key collision, recomputing");
                    false
                }
                Some(entry) if !self.is_expired(entry) => {
                    let value = entry.value.clone();
                    state.stats.hits += 1;
                    return Ok(value);
                }
                Some(_) => true,
                None => false,
            };
            if expired {
                state.entries.pop(&key);
                state.stats.expirations += 1;
            }
            state.stats.misses += 1;
        }

        let value = compute()?;

        let mut guard = self.state.lock();
        let state = &mut *guard;
        let entry = CacheEntry {
            value: value.clone(),
            fingerprint,
            timestamp: Instant::now(),
        };
        if let Some((evicted, _)) = state.entries.push(key, entry) {
            if evicted != key {
                state.stats.evictions += 1;
                log::debug!("estimate cache full, evicted least recently used entry");
            }
        }
        Ok(value)
    }

    /// Snapshot of the statistics
    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats
    }

    /// Number of cached estimates
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether the cache holds no estimates
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached estimates
    pub fn capacity(&self) -> usize {
        self.state.lock().entries.cap().get()
    }

    /// Drop every entry and reset the statistics
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.stats = CacheStats::default();
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.max_age
            .is_some_and(|max_age| entry.timestamp.elapsed() >= max_age)
    }
}

/// Canonical bit pattern: all NaNs hash alike and -0.0 hashes as 0.0.
fn canonical_bits(value: f64) -> u64 {
    if value.is_nan() {
        f64::NAN.to_bits()
    } else if value == 0.0 {
        0.0_f64.to_bits()
    } else {
        value.to_bits()
    }
}

fn hash_data(data: &[f64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    data.len().hash(&mut hasher);
    for &value in data {
        canonical_bits(value).hash(&mut hasher);
    }
    hasher.finish()
}

/// Sample digest independent of [`hash_data`], stored alongside each entry.
fn checksum_data(data: &[f64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    0x5eed_u64.hash(&mut hasher);
    for &value in data.iter().rev() {
        canonical_bits(value).hash(&mut hasher);
    }
    data.len().hash(&mut hasher);
    hasher.finish()
}

fn hash_config(
    sampling_rate: f64,
    preprocessing: &PreprocessingConfig,
    estimator: &EstimatorConfig,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    canonical_bits(sampling_rate).hash(&mut hasher);

    preprocessing.detrend.hash(&mut hasher);
    let filter = &preprocessing.filter;
    match filter.kind {
        FilterKind::None => 0u8.hash(&mut hasher),
        FilterKind::Lowpass { freq } => {
            1u8.hash(&mut hasher);
            canonical_bits(freq).hash(&mut hasher);
        }
        FilterKind::Highpass { freq } => {
            2u8.hash(&mut hasher);
            canonical_bits(freq).hash(&mut hasher);
        }
        FilterKind::Bandpass { freq_min, freq_max } => {
            3u8.hash(&mut hasher);
            canonical_bits(freq_min).hash(&mut hasher);
            canonical_bits(freq_max).hash(&mut hasher);
        }
    }
    // Corner count and phase only matter when a filter runs
    if !filter.is_none() {
        filter.corners.hash(&mut hasher);
        filter.zerophase.hash(&mut hasher);
    }

    estimator.method.hash(&mut hasher);
    canonical_bits(estimator.scale_range.min).hash(&mut hasher);
    canonical_bits(estimator.scale_range.max).hash(&mut hasher);
    estimator.num_scales.hash(&mut hasher);
    hasher.finish()
}
