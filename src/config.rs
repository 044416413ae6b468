//! # Analysis Configuration
//!
//! Configuration structures for the estimator and the preprocessing pipeline,
//! with presets matching the defaults of the interactive seismogram tool.

use crate::errors::{
    validate_scale_range, validate_signal_length, FractalAnalysisError, FractalResult,
    MIN_SIGNAL_LENGTH,
};
use crate::box_counting::resolves;
use crate::preprocessing::{DetrendMethod, FilterSpec};
use crate::signal::Signal;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default smallest box side for box-counting (normalized units)
pub const DEFAULT_MIN_BOX_SIZE: f64 = 0.001;
/// Default largest box side for box-counting (normalized units)
pub const DEFAULT_MAX_BOX_SIZE: f64 = 0.5;
/// Default number of box sizes
pub const DEFAULT_BOX_STEPS: usize = 20;
/// Default largest Higuchi interval
pub const DEFAULT_HIGUCHI_KMAX: f64 = 32.0;
/// Default number of Higuchi intervals before de-duplication
pub const DEFAULT_HIGUCHI_STEPS: usize = 16;

/// Fractal dimension estimation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DimensionMethod {
    /// Box-counting over the normalized graph of the signal
    BoxCounting,
    /// Higuchi curve-length method
    Higuchi,
}

impl DimensionMethod {
    /// All supported methods
    pub const ALL: [DimensionMethod; 2] = [DimensionMethod::BoxCounting, DimensionMethod::Higuchi];

    /// Human readable name
    pub fn name(&self) -> &'static str {
        match self {
            DimensionMethod::BoxCounting => "box-counting",
            DimensionMethod::Higuchi => "Higuchi",
        }
    }
}

impl fmt::Display for DimensionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive range of scales swept by the estimator
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScaleRange {
    /// Smallest scale
    pub min: f64,
    /// Largest scale
    pub max: f64,
}

impl ScaleRange {
    /// Create a range; validation happens when it is used.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Configuration of a single fractal dimension estimate
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EstimatorConfig {
    /// Estimation method
    pub method: DimensionMethod,
    /// Range of scales to sweep
    pub scale_range: ScaleRange,
    /// Number of log-spaced scales to generate
    pub num_scales: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::box_counting()
    }
}

impl EstimatorConfig {
    /// Box-counting with box sides 0.001..0.5 over 20 steps
    pub fn box_counting() -> Self {
        Self {
            method: DimensionMethod::BoxCounting,
            scale_range: ScaleRange::new(DEFAULT_MIN_BOX_SIZE, DEFAULT_MAX_BOX_SIZE),
            num_scales: DEFAULT_BOX_STEPS,
        }
    }

    /// Higuchi with intervals 1..32 over 16 steps
    pub fn higuchi() -> Self {
        Self {
            method: DimensionMethod::Higuchi,
            scale_range: ScaleRange::new(1.0, DEFAULT_HIGUCHI_KMAX),
            num_scales: DEFAULT_HIGUCHI_STEPS,
        }
    }

    /// Replace the scale range
    pub fn with_scale_range(mut self, min: f64, max: f64) -> Self {
        self.scale_range = ScaleRange::new(min, max);
        self
    }

    /// Replace the number of scales
    pub fn with_num_scales(mut self, num_scales: usize) -> Self {
        self.num_scales = num_scales;
        self
    }

    /// Check every precondition of an estimate against `signal`.
    ///
    /// Box sizes are fractions of the normalized bounding box, so they must lie
    /// between the normalized sample spacing `1/(n-1)` and 1. Higuchi intervals must be at least 1 and at most half the
    /// signal length so every sub-series has at least two samples.
    pub fn validate(&self, signal: &Signal) -> FractalResult<()> {
        validate_signal_length(signal.samples(), MIN_SIGNAL_LENGTH)?;

        if self.num_scales < 2 {
            return Err(FractalAnalysisError::InvalidParameter {
                parameter: "num_scales".to_string(),
                value: self.num_scales as f64,
                constraint: "at least 2".to_string(),
            });
        }

        let ScaleRange { min, max } = self.scale_range;
        validate_scale_range(min, max)?;

        match self.method {
            DimensionMethod::BoxCounting => {
                if max > 1.0 {
                    return Err(FractalAnalysisError::InvalidScaleRange {
                        min,
                        max,
                        constraint: "box sizes must not exceed 1 (normalized units)".to_string(),
                    });
                }
                if !resolves(min, signal.len()) {
                    return Err(FractalAnalysisError::InvalidScaleRange {
                        min,
                        max,
                        constraint: format!(
                            "box sizes must not be below the sample spacing 1/{} (normalized units)",
                            signal.len() - 1
                        ),
                    });
                }
            }
            DimensionMethod::Higuchi => {
                let k_limit = (signal.len() / 2) as f64;
                if min < 1.0 || max > k_limit {
                    return Err(FractalAnalysisError::InvalidScaleRange {
                        min,
                        max,
                        constraint: format!("Higuchi intervals must lie in [1, {}]", k_limit),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Preprocessing applied before estimation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreprocessingConfig {
    /// Detrending applied first
    pub detrend: DetrendMethod,
    /// Filter applied after detrending
    pub filter: FilterSpec,
}

impl PreprocessingConfig {
    /// No detrending, no filtering
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether this configuration leaves the signal untouched
    pub fn is_identity(&self) -> bool {
        self.detrend == DetrendMethod::None && self.filter.is_none()
    }
}

/// Full configuration of one analysis: preprocessing followed by estimation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisConfig {
    /// Preprocessing steps
    pub preprocessing: PreprocessingConfig,
    /// Estimator settings
    pub estimator: EstimatorConfig,
}

impl AnalysisConfig {
    /// Estimate with `estimator` on the raw signal
    pub fn new(estimator: EstimatorConfig) -> Self {
        Self {
            preprocessing: PreprocessingConfig::none(),
            estimator,
        }
    }

    /// Replace the preprocessing steps
    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(n: usize) -> Signal {
        Signal::new((0..n).map(|i| (i as f64 * 0.3).sin()).collect(), 100.0).unwrap()
    }

    #[test]
    fn test_presets_validate_on_typical_trace() {
        let trace = signal(4096);
        assert!(EstimatorConfig::box_counting().validate(&trace).is_ok());
        assert!(EstimatorConfig::higuchi().validate(&trace).is_ok());
    }

    #[test]
    fn test_short_signal_is_invalid() {
        let result = EstimatorConfig::box_counting().validate(&signal(MIN_SIGNAL_LENGTH - 1));
        assert!(matches!(result, Err(FractalAnalysisError::InvalidSignal { .. })));
    }

    #[test]
    fn test_num_scales_below_two() {
        let config = EstimatorConfig::box_counting().with_num_scales(1);
        assert!(matches!(
            config.validate(&signal(256)),
            Err(FractalAnalysisError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_box_counting_rejects_boxes_larger_than_unit() {
        let config = EstimatorConfig::box_counting().with_scale_range(0.01, 2.0);
        assert!(matches!(
            config.validate(&signal(256)),
            Err(FractalAnalysisError::InvalidScaleRange { .. })
        ));
    }

    #[test]
    fn test_box_counting_rejects_boxes_below_sample_spacing() {
        // 1/511 > 0.001, so the default range is too fine for 512 samples
        assert!(matches!(
            EstimatorConfig::box_counting().validate(&signal(512)),
            Err(FractalAnalysisError::InvalidScaleRange { .. })
        ));
        assert!(EstimatorConfig::box_counting()
            .with_scale_range(1.0 / 511.0, 0.5)
            .validate(&signal(512))
            .is_ok());
        assert!(matches!(
            EstimatorConfig::box_counting()
                .with_scale_range(1e-15, 0.5)
                .validate(&signal(1024)),
            Err(FractalAnalysisError::InvalidScaleRange { .. })
        ));
    }

    #[test]
    fn test_higuchi_interval_limits() {
        let trace = signal(64);
        let too_large = EstimatorConfig::higuchi().with_scale_range(1.0, 40.0);
        assert!(matches!(
            too_large.validate(&trace),
            Err(FractalAnalysisError::InvalidScaleRange { .. })
        ));

        let below_one = EstimatorConfig::higuchi().with_scale_range(0.5, 8.0);
        assert!(matches!(
            below_one.validate(&trace),
            Err(FractalAnalysisError::InvalidScaleRange { .. })
        ));

        assert!(EstimatorConfig::higuchi()
            .with_scale_range(1.0, 32.0)
            .validate(&trace)
            .is_ok());
    }

    #[test]
    fn test_inverted_range() {
        let config = EstimatorConfig::box_counting().with_scale_range(0.5, 0.1);
        assert!(matches!(
            config.validate(&signal(256)),
            Err(FractalAnalysisError::InvalidScaleRange { .. })
        ));
    }

    #[test]
    fn test_default_preprocessing_is_identity() {
        assert!(PreprocessingConfig::default().is_identity());
        assert_eq!(AnalysisConfig::default().estimator, EstimatorConfig::box_counting());
        assert_eq!(DimensionMethod::Higuchi.to_string(), "Higuchi");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "preprocessing": {
                "detrend": "Linear",
                "filter": { "kind": { "Bandpass": { "freq_min": 0.1, "freq_max": 1.0 } }, "corners": 4, "zerophase": false }
            },
            "estimator": {
                "method": "Higuchi",
                "scale_range": { "min": 1.0, "max": 16.0 },
                "num_scales": 10
            }
        }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.preprocessing.detrend, DetrendMethod::Linear);
        assert_eq!(config.estimator.method, DimensionMethod::Higuchi);
        assert_eq!(config.estimator.num_scales, 10);
    }
}
