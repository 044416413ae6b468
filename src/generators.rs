//! Synthetic signals with known fractal dimension for testing and validation.
//!
//! ## Available Generators
//!
//! - **Straight line**: smooth curve, D = 1
//! - **Weierstrass–Mandelbrot function**: deterministic curve with
//!   prescribed dimension 1 < D < 2
//! - **White noise**: uniform i.i.d. samples, D ≈ 2
//! - **Random walk**: cumulative Gaussian steps, D ≈ 1.5
//!
//! Random generators take an explicit seed and use ChaCha20, so the same seed
//! yields the same series on every platform.

use crate::errors::{validate_parameter, FractalAnalysisError, FractalResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration of a Weierstrass–Mandelbrot curve
///
/// ```text
/// W(t) = Σ_{n=0}^{terms-1} λ^{-(2-D) n} cos(2π λ^n t),   t = i / length
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeierstrassConfig {
    /// Target dimension, strictly between 1 and 2
    pub dimension: f64,
    /// Frequency ratio between consecutive terms (> 1)
    pub lambda: f64,
    /// Number of terms in the sum
    pub terms: usize,
    /// Number of samples over [0, 1)
    pub length: usize,
}

impl Default for WeierstrassConfig {
    fn default() -> Self {
        Self {
            dimension: 1.5,
            lambda: 2.0,
            terms: 12,
            length: 4096,
        }
    }
}

impl WeierstrassConfig {
    /// Default curve with the given target dimension
    pub fn with_dimension(dimension: f64) -> Self {
        Self {
            dimension,
            ..Self::default()
        }
    }

    fn validate(&self) -> FractalResult<()> {
        if !(self.dimension > 1.0 && self.dimension < 2.0) {
            return Err(FractalAnalysisError::InvalidParameter {
                parameter: "dimension".to_string(),
                value: self.dimension,
                constraint: "(1, 2)".to_string(),
            });
        }
        if !(self.lambda > 1.0 && self.lambda.is_finite()) {
            return Err(FractalAnalysisError::InvalidParameter {
                parameter: "lambda".to_string(),
                value: self.lambda,
                constraint: "finite and greater than 1".to_string(),
            });
        }
        validate_parameter(self.terms as f64, 1.0, f64::MAX, "terms")?;
        validate_parameter(self.length as f64, 2.0, f64::MAX, "length")
    }
}

/// `intercept + slope * i` for `i` in `0..len`.
pub fn straight_line(len: usize, slope: f64, intercept: f64) -> FractalResult<Vec<f64>> {
    validate_parameter(slope, f64::MIN, f64::MAX, "slope")?;
    validate_parameter(intercept, f64::MIN, f64::MAX, "intercept")?;
    Ok((0..len).map(|i| intercept + slope * i as f64).collect())
}

/// Sample the Weierstrass–Mandelbrot function described by `config`.
///
/// # Example
/// ```rust
/// use seismic_fractal::generators::{weierstrass_mandelbrot, WeierstrassConfig};
///
/// let curve = weierstrass_mandelbrot(&WeierstrassConfig::with_dimension(1.3)).unwrap();
/// assert_eq!(curve.len(), 4096);
/// ```
pub fn weierstrass_mandelbrot(config: &WeierstrassConfig) -> FractalResult<Vec<f64>> {
    config.validate()?;

    let hurst = 2.0 - config.dimension;
    let components: Vec<(f64, f64)> = (0..config.terms)
        .map(|n| {
            let frequency = config.lambda.powi(n as i32);
            (frequency.powf(-hurst), 2.0 * PI * frequency)
        })
        .collect();

    let series: Vec<f64> = (0..config.length)
        .map(|i| {
            let t = i as f64 / config.length as f64;
            components
                .iter()
                .map(|&(amplitude, angular)| amplitude * (angular * t).cos())
                .sum()
        })
        .collect();

    if series.iter().any(|v| !v.is_finite()) {
        return Err(FractalAnalysisError::NumericalError {
            reason: "Weierstrass sum overflowed".to_string(),
            operation: Some("weierstrass_mandelbrot".to_string()),
        });
    }
    Ok(series)
}

/// Independent samples uniform in [-1, 1).
pub fn white_noise(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

/// Cumulative sum of standard normal steps, starting at 0.
pub fn random_walk(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut spare = None;
    let mut position = 0.0;

    (0..len)
        .map(|i| {
            if i > 0 {
                position += standard_normal(&mut rng, &mut spare);
            }
            position
        })
        .collect()
}

/// Box–Muller transform, keeping the second variate for the next call.
fn standard_normal<R: Rng>(rng: &mut R, spare: &mut Option<f64>) -> f64 {
    if let Some(z) = spare.take() {
        return z;
    }
    // gen::<f64>() is in [0, 1); shift away from 0 for the log
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    let radius = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * PI * u2;
    *spare = Some(radius * theta.sin());
    radius * theta.cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_straight_line() {
        let line = straight_line(5, 2.0, -1.0).unwrap();
        assert_eq!(line, vec![-1.0, 1.0, 3.0, 5.0, 7.0]);
        assert!(straight_line(5, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_weierstrass_starts_at_sum_of_amplitudes() {
        let config = WeierstrassConfig {
            dimension: 1.5,
            lambda: 2.0,
            terms: 4,
            length: 64,
        };
        let curve = weierstrass_mandelbrot(&config).unwrap();
        assert_eq!(curve.len(), 64);
        // cos(0) = 1 for every term: 1 + 2^-0.5 + 2^-1 + 2^-1.5
        let expected: f64 = (0..4).map(|n| 2f64.powf(-0.5 * n as f64)).sum();
        assert_approx_eq!(curve[0], expected, 1e-12);
    }

    #[test]
    fn test_weierstrass_rejects_bad_parameters() {
        for dimension in [1.0, 2.0, 0.5, f64::NAN] {
            assert!(weierstrass_mandelbrot(&WeierstrassConfig::with_dimension(dimension)).is_err());
        }
        let bad_lambda = WeierstrassConfig {
            lambda: 1.0,
            ..WeierstrassConfig::default()
        };
        assert!(matches!(
            weierstrass_mandelbrot(&bad_lambda),
            Err(FractalAnalysisError::InvalidParameter { .. })
        ));
        let no_terms = WeierstrassConfig {
            terms: 0,
            ..WeierstrassConfig::default()
        };
        assert!(weierstrass_mandelbrot(&no_terms).is_err());
    }

    #[test]
    fn test_white_noise_is_seeded_and_bounded() {
        let a = white_noise(1000, 7);
        let b = white_noise(1000, 7);
        let c = white_noise(1000, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|&x| (-1.0..1.0).contains(&x)));
        let mean = a.iter().sum::<f64>() / a.len() as f64;
        assert!(mean.abs() < 0.1);
    }

    #[test]
    fn test_random_walk_steps_are_standard_normal() {
        let walk = random_walk(20_000, 42);
        assert_eq!(walk[0], 0.0);
        assert_eq!(walk, random_walk(20_000, 42));

        let steps: Vec<f64> = walk.windows(2).map(|w| w[1] - w[0]).collect();
        let mean = steps.iter().sum::<f64>() / steps.len() as f64;
        let variance = steps.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / steps.len() as f64;
        assert!(mean.abs() < 0.05);
        assert_approx_eq!(variance, 1.0, 0.05);
    }
}
