//! # Seismic Fractal Analyzer
//!
//! [`SeismicFractalAnalyzer`] keeps a registry of named traces and runs the
//! full pipeline (preprocessing, then estimation) on them. Results are memoized
//! in an [`EstimateCache`], so re-running an analysis with unchanged inputs is
//! a lookup rather than a recomputation.
//!
//! ## Usage Example
//!
//! ```rust
//! use seismic_fractal::{AnalysisConfig, EstimatorConfig, SeismicFractalAnalyzer, Signal};
//! use seismic_fractal::errors::FractalAnalysisError;
//!
//! # fn main() -> Result<(), FractalAnalysisError> {
//! let mut analyzer = SeismicFractalAnalyzer::new();
//! let samples: Vec<f64> = (0..2048).map(|i| (i as f64 * 0.05).sin()).collect();
//! analyzer.add_trace("BHZ".to_string(), Signal::new(samples, 40.0)?);
//!
//! let config = AnalysisConfig::new(EstimatorConfig::higuchi());
//! let result = analyzer.analyze("BHZ", &config)?;
//! println!("D = {:.3} (R² = {:.3})", result.dimension, result.r_squared());
//! # Ok(())
//! # }
//! ```

use crate::computation_cache::{CacheStats, EstimateCache};
use crate::config::AnalysisConfig;
use crate::errors::{FractalAnalysisError, FractalResult};
use crate::results::FractalDimensionResult;
use crate::signal::Signal;
use std::collections::BTreeMap;

/// Registry of named traces with cached fractal analysis.
#[derive(Debug, Default)]
pub struct SeismicFractalAnalyzer {
    traces: BTreeMap<String, Signal>,
    cache: EstimateCache,
}

impl SeismicFractalAnalyzer {
    /// Create an analyzer with the default cache capacity
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer whose cache holds at most `capacity` results
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            traces: BTreeMap::new(),
            cache: EstimateCache::new(capacity),
        }
    }

    /// Add a trace, replacing any trace with the same name
    ///
    /// # Returns
    /// `true` if a new trace was inserted, `false` if an existing one was replaced
    pub fn add_trace(&mut self, name: String, signal: Signal) -> bool {
        log::debug!(
            "adding trace {} ({} samples at {} Hz)",
            name,
            signal.len(),
            signal.sampling_rate()
        );
        self.traces.insert(name, signal).is_none()
    }

    /// Remove a trace
    ///
    /// # Returns
    /// `true` if the trace was removed, `false` if it didn't exist
    pub fn remove_trace(&mut self, name: &str) -> bool {
        self.traces.remove(name).is_some()
    }

    /// Names of all registered traces, sorted
    pub fn trace_names(&self) -> Vec<String> {
        self.traces.keys().cloned().collect()
    }

    /// Registered trace by name
    pub fn trace(&self, name: &str) -> Option<&Signal> {
        self.traces.get(name)
    }

    /// Number of registered traces
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Whether no traces are registered
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Preprocess and estimate the trace called `name`.
    ///
    /// # Errors
    /// `TraceNotFound` for an unknown name; otherwise any error of
    /// [`crate::preprocess`] or [`crate::estimate`].
    pub fn analyze(&self, name: &str, config: &AnalysisConfig) -> FractalResult<FractalDimensionResult> {
        let signal = self
            .traces
            .get(name)
            .ok_or_else(|| FractalAnalysisError::TraceNotFound {
                name: name.to_string(),
            })?;
        self.analyze_signal(signal, config)
    }

    /// Analyze every registered trace with the same configuration.
    ///
    /// A failing trace does not stop the others; each entry carries its own result.
    pub fn analyze_all(
        &self,
        config: &AnalysisConfig,
    ) -> BTreeMap<String, FractalResult<FractalDimensionResult>> {
        #[cfg(feature = "parallel")]
        let results: BTreeMap<String, FractalResult<FractalDimensionResult>> = {
            use rayon::prelude::*;
            self.traces
                .par_iter()
                .map(|(name, signal)| (name.clone(), self.analyze_signal(signal, config)))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let results: BTreeMap<String, FractalResult<FractalDimensionResult>> = self
            .traces
            .iter()
            .map(|(name, signal)| (name.clone(), self.analyze_signal(signal, config)))
            .collect();

        for (name, result) in &results {
            if let Err(e) = result {
                log::warn!("analysis of trace {} failed: {}", name, e);
            }
        }
        results
    }

    /// Cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop all cached results
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn analyze_signal(&self, signal: &Signal, config: &AnalysisConfig) -> FractalResult<FractalDimensionResult> {
        self.cache.get_or_estimate(signal, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EstimatorConfig, PreprocessingConfig};
    use crate::preprocessing::DetrendMethod;

    fn sine(n: usize, step: f64) -> Signal {
        Signal::new((0..n).map(|i| (i as f64 * step).sin()).collect(), 20.0).unwrap()
    }

    #[test]
    fn test_add_replace_remove() {
        let mut analyzer = SeismicFractalAnalyzer::new();
        assert!(analyzer.is_empty());
        assert!(analyzer.add_trace("B".to_string(), sine(128, 0.1)));
        assert!(analyzer.add_trace("A".to_string(), sine(128, 0.2)));
        assert!(!analyzer.add_trace("A".to_string(), sine(256, 0.2)));

        assert_eq!(analyzer.trace_names(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(analyzer.trace("A").map(Signal::len), Some(256));

        assert!(analyzer.remove_trace("B"));
        assert!(!analyzer.remove_trace("B"));
        assert_eq!(analyzer.len(), 1);
    }

    #[test]
    fn test_unknown_trace() {
        let analyzer = SeismicFractalAnalyzer::new();
        match analyzer.analyze("missing", &AnalysisConfig::default()) {
            Err(FractalAnalysisError::TraceNotFound { name }) => assert_eq!(name, "missing"),
            other => panic!("Expected TraceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_analysis_hits_cache() {
        let mut analyzer = SeismicFractalAnalyzer::new();
        analyzer.add_trace("Z".to_string(), sine(1024, 0.37));
        let config = AnalysisConfig::new(EstimatorConfig::higuchi());

        let first = analyzer.analyze("Z", &config).unwrap();
        let second = analyzer.analyze("Z", &config).unwrap();
        assert_eq!(first, second);

        let stats = analyzer.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);

        // Different preprocessing is a different result
        let demeaned = config.with_preprocessing(PreprocessingConfig {
            detrend: DetrendMethod::Demean,
            ..PreprocessingConfig::none()
        });
        analyzer.analyze("Z", &demeaned).unwrap();
        assert_eq!(analyzer.cache_stats().misses, 2);

        analyzer.clear_cache();
        assert_eq!(analyzer.cache_stats(), CacheStats::default());
    }

    #[test]
    fn test_analyze_all_keeps_failures_per_trace() {
        let mut analyzer = SeismicFractalAnalyzer::with_cache_capacity(4);
        analyzer.add_trace("good".to_string(), sine(1024, 0.37));
        analyzer.add_trace("flat".to_string(), Signal::new(vec![0.0; 1024], 20.0).unwrap());
        analyzer.add_trace("short".to_string(), sine(8, 0.37));

        let results = analyzer.analyze_all(&AnalysisConfig::default());
        assert_eq!(results.len(), 3);
        assert!(results["good"].is_ok());
        assert!(matches!(
            results["flat"],
            Err(FractalAnalysisError::InsufficientData { .. })
        ));
        assert!(matches!(
            results["short"],
            Err(FractalAnalysisError::InvalidSignal { .. })
        ));
    }
}
