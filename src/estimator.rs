//! Fractal dimension estimator.
//!
//! The estimate follows the same shape for every method:
//!
//! 1. generate `num_scales` log-spaced scales from `min` to `max` (ascending);
//! 2. measure the signal at each scale (box count or Higuchi curve length);
//! 3. drop scales whose measure is undefined or non-positive, failing with
//!    [`FractalAnalysisError::InsufficientData`] if fewer than two remain;
//! 4. fit `ln M(s) = a + b ln s` by ordinary least squares;
//! 5. report `D = -b`, since both the box count and the curve length fall off
//!    as `s^-D`.
//!
//! The computation is a pure function of its inputs: calling it twice with the
//! same signal and configuration yields bit-identical results.

use crate::box_counting::NormalizedGraph;
use crate::config::{DimensionMethod, EstimatorConfig, ScaleRange};
use crate::errors::{FractalAnalysisError, FractalResult};
use crate::higuchi::{curve_length, integer_intervals};
use crate::math_utils::{float_ops, log_spaced, ols_regression};
use crate::results::{FractalDimensionResult, ScaleMeasurement};
use crate::signal::Signal;

/// R² below which a fit is logged as poor
pub const POOR_FIT_R_SQUARED: f64 = 0.9;

/// Estimate the fractal dimension of `signal` with the given configuration.
///
/// # Errors
/// - `InvalidSignal` if the signal is shorter than [`crate::MIN_SIGNAL_LENGTH`]
/// - `InvalidScaleRange` for non-positive, inverted or unsupported ranges
/// - `InvalidParameter` if `num_scales < 2`
/// - `InsufficientData` if fewer than two scales yield a usable measure
///
/// # Example
/// ```rust
/// use seismic_fractal::{estimate, EstimatorConfig, Signal};
///
/// let samples: Vec<f64> = (0..1024).map(|i| i as f64 * 0.5).collect();
/// let signal = Signal::new(samples, 100.0).unwrap();
/// let result = estimate(&signal, &EstimatorConfig::higuchi()).unwrap();
/// assert!((result.dimension - 1.0).abs() < 1e-6);
/// ```
pub fn estimate(signal: &Signal, config: &EstimatorConfig) -> FractalResult<FractalDimensionResult> {
    config.validate(signal)?;

    let scales = generate_scales(config);
    let measures = measure_scales(signal, config.method, &scales);

    let mut measurements = Vec::with_capacity(scales.len());
    let mut discarded_scales = 0;
    for (&scale, measure) in scales.iter().zip(measures) {
        match measure {
            Some(measure) if float_ops::safe_ln(measure).is_some() => {
                measurements.push(ScaleMeasurement { scale, measure })
            }
            other => {
                discarded_scales += 1;
                log::debug!(
                    "{}: discarding scale {} with unusable measure {:?}",
                    config.method,
                    scale,
                    other
                );
            }
        }
    }

    if measurements.len() < 2 {
        return Err(FractalAnalysisError::InsufficientData {
            required: 2,
            actual: measurements.len(),
        });
    }

    let (log_scales, log_measures): (Vec<f64>, Vec<f64>) = measurements
        .iter()
        .map(|m| (m.log_scale(), m.log_measure()))
        .unzip();
    let regression = ols_regression(&log_scales, &log_measures)?;
    let dimension = -regression.slope;

    log::debug!(
        "{} estimate over {} scales: D = {:.4}, R² = {:.4} ({} discarded)",
        config.method,
        measurements.len(),
        dimension,
        regression.r_squared,
        discarded_scales
    );
    if regression.r_squared < POOR_FIT_R_SQUARED {
        log::warn!(
            "{} fit is poor (R² = {:.3}); the signal may not scale as a power law over [{}, {}]",
            config.method,
            regression.r_squared,
            config.scale_range.min,
            config.scale_range.max
        );
    }

    Ok(FractalDimensionResult {
        method: config.method,
        dimension,
        regression,
        measurements,
        discarded_scales,
    })
}

/// Estimate with explicit arguments instead of an [`EstimatorConfig`].
pub fn estimate_fractal_dimension(
    signal: &Signal,
    method: DimensionMethod,
    scale_range: (f64, f64),
    num_scales: usize,
) -> FractalResult<FractalDimensionResult> {
    let config = EstimatorConfig {
        method,
        scale_range: ScaleRange::new(scale_range.0, scale_range.1),
        num_scales,
    };
    estimate(signal, &config)
}

/// Ascending scales swept by `config`; Higuchi intervals are rounded to distinct integers.
pub fn generate_scales(config: &EstimatorConfig) -> Vec<f64> {
    let ScaleRange { min, max } = config.scale_range;
    let scales = log_spaced(min, max, config.num_scales);
    match config.method {
        DimensionMethod::BoxCounting => scales,
        DimensionMethod::Higuchi => integer_intervals(&scales)
            .into_iter()
            .map(|k| k as f64)
            .collect(),
    }
}

/// Measure at every scale, in order; `None` marks an undefined measure.
fn measure_scales(signal: &Signal, method: DimensionMethod, scales: &[f64]) -> Vec<Option<f64>> {
    match method {
        DimensionMethod::BoxCounting => {
            let times = signal.times();
            match NormalizedGraph::new(&times, signal.samples()) {
                Some(graph) => sweep(scales, |s| graph.count_boxes(s)),
                None => {
                    log::debug!("box-counting: zero amplitude range, every box count is undefined");
                    vec![None; scales.len()]
                }
            }
        }
        DimensionMethod::Higuchi => {
            let samples = signal.samples();
            sweep(scales, |k| curve_length(samples, k as usize))
        }
    }
}

#[cfg(feature = "parallel")]
fn sweep<F>(scales: &[f64], measure: F) -> Vec<Option<f64>>
where
    F: Fn(f64) -> Option<f64> + Sync,
{
    use rayon::prelude::*;
    scales.par_iter().map(|&s| measure(s)).collect()
}

#[cfg(not(feature = "parallel"))]
fn sweep<F>(scales: &[f64], measure: F) -> Vec<Option<f64>>
where
    F: Fn(f64) -> Option<f64>,
{
    scales.iter().map(|&s| measure(s)).collect()
}
