//! Mathematical utility functions and constants for fractal analysis.
//!
//! Regression on log-log data, log-spaced scale generation and a handful of
//! safe floating-point helpers shared by the estimators and preprocessing.

use crate::errors::{FractalAnalysisError, FractalResult};
use crate::results::RegressionResult;

/// Arithmetic mean (NaN for empty input)
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Minimum and maximum of a slice, `None` when empty.
pub fn min_max(data: &[f64]) -> Option<(f64, f64)> {
    if data.is_empty() {
        return None;
    }
    Some(
        data.iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            }),
    )
}

/// Numerical constants used across the crate
pub mod constants {
    /// Minimum acceptable variance to avoid division by zero
    pub const MIN_VARIANCE: f64 = 1e-15;

    /// Minimum positive value for log operations
    pub const MIN_LOG_VALUE: f64 = 1e-300;

    /// Slack applied before rounding ratios up, so exact multiples are not pushed over
    pub const ROUNDING_SLACK: f64 = 1e-9;
}

/// Safe floating point comparison functions
pub mod float_ops {
    /// Check if a floating point number is approximately zero with custom epsilon
    #[inline]
    pub fn approx_zero_eps(x: f64, epsilon: f64) -> bool {
        x.abs() < epsilon
    }

    /// Safe logarithm that checks for positive arguments and finite inputs
    pub fn safe_ln(x: f64) -> Option<f64> {
        if x > super::constants::MIN_LOG_VALUE && x.is_finite() {
            Some(x.ln())
        } else {
            None
        }
    }
}

/// Generate `count` values between `min` and `max` evenly spaced on a log axis.
///
/// The sequence is ascending and its end points are exactly `min` and `max`.
/// Callers validate the range; this only requires `count >= 2`.
///
/// # Example
/// ```rust
/// use seismic_fractal::math_utils::log_spaced;
///
/// let scales = log_spaced(1.0, 100.0, 3);
/// assert_eq!(scales.len(), 3);
/// assert!((scales[1] - 10.0).abs() < 1e-9);
/// ```
pub fn log_spaced(min: f64, max: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let ln_min = min.ln();
            let step = (max.ln() - ln_min) / (count - 1) as f64;
            (0..count)
                .map(|i| match i {
                    0 => min,
                    i if i == count - 1 => max,
                    i => (ln_min + step * i as f64).exp(),
                })
                .collect()
        }
    }
}

/// Ordinary Least Squares fit of `y = intercept + slope * x` with R².
///
/// Data are centered before accumulating sums to avoid cancellation when the
/// predictor is large relative to its spread. Two points are enough for a fit;
/// the slope standard error is only reported with three or more.
///
/// R² is `1 - SS_res / SS_tot`; when the response is constant the fit is exact
/// and R² is reported as 1.0.
///
/// # Errors
/// - `InsufficientData` if fewer than two points or mismatched lengths
/// - `NumericalError` for non-finite input or a constant predictor
///
/// # Example
/// ```rust
/// use seismic_fractal::math_utils::ols_regression;
///
/// let x = vec![1.0, 2.0, 3.0, 4.0];
/// let y = vec![2.0, 4.0, 6.0, 8.0];
/// let fit = ols_regression(&x, &y).unwrap();
/// assert!((fit.slope - 2.0).abs() < 1e-12);
/// assert!((fit.r_squared - 1.0).abs() < 1e-12);
/// ```
pub fn ols_regression(x: &[f64], y: &[f64]) -> FractalResult<RegressionResult> {
    if x.len() != y.len() || x.len() < 2 {
        return Err(FractalAnalysisError::InsufficientData {
            required: 2,
            actual: x.len().min(y.len()),
        });
    }

    if !x.iter().chain(y).all(|v| v.is_finite()) {
        return Err(FractalAnalysisError::NumericalError {
            reason: "Non-finite values in regression data".to_string(),
            operation: Some("ols_regression".to_string()),
        });
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (sxy, sxx, syy) = x.iter().zip(y).fold((0.0, 0.0, 0.0), |(sxy, sxx, syy), (xi, yi)| {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        (sxy + dx * dy, sxx + dx * dx, syy + dy * dy)
    });

    if float_ops::approx_zero_eps(sxx, constants::MIN_VARIANCE) {
        return Err(FractalAnalysisError::NumericalError {
            reason: "Predictor variable has zero variance (constant values)".to_string(),
            operation: Some("ols_regression".to_string()),
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let rss: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| {
            let residual = yi - (intercept + slope * xi);
            residual * residual
        })
        .sum();

    let r_squared = if float_ops::approx_zero_eps(syy, constants::MIN_VARIANCE) {
        1.0
    } else {
        (1.0 - rss / syy).clamp(0.0, 1.0)
    };

    let standard_error = if x.len() > 2 {
        Some((rss / (n - 2.0) / sxx).sqrt())
    } else {
        None
    };

    if !slope.is_finite() || !intercept.is_finite() {
        return Err(FractalAnalysisError::NumericalError {
            reason: "Non-finite regression coefficients computed".to_string(),
            operation: Some("ols_regression".to_string()),
        });
    }

    Ok(RegressionResult {
        slope,
        intercept,
        r_squared,
        standard_error,
        num_points: x.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_log_spaced_endpoints_and_ratio() {
        let scales = log_spaced(0.001, 0.5, 20);
        assert_eq!(scales.len(), 20);
        assert_eq!(scales[0], 0.001);
        assert_eq!(scales[19], 0.5);

        // Constant ratio between neighbours
        let ratio = scales[1] / scales[0];
        for pair in scales.windows(2) {
            assert!(pair[1] > pair[0]);
            assert_approx_eq!(pair[1] / pair[0], ratio, 1e-9);
        }
    }

    #[test]
    fn test_log_spaced_degenerate_counts() {
        assert!(log_spaced(1.0, 2.0, 0).is_empty());
        assert_eq!(log_spaced(1.0, 2.0, 1), vec![1.0]);
        assert_eq!(log_spaced(1.0, 2.0, 2), vec![1.0, 2.0]);
    }

    #[test]
    fn test_ols_perfect_fit() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|xi| 3.0 - 0.5 * xi).collect();
        let fit = ols_regression(&x, &y).unwrap();

        assert_approx_eq!(fit.slope, -0.5, 1e-12);
        assert_approx_eq!(fit.intercept, 3.0, 1e-12);
        assert_approx_eq!(fit.r_squared, 1.0, 1e-12);
        assert_approx_eq!(fit.standard_error.unwrap(), 0.0, 1e-12);
        assert_eq!(fit.num_points, 10);
    }

    #[test]
    fn test_ols_two_points_has_no_standard_error() {
        let fit = ols_regression(&[0.0, 1.0], &[1.0, 3.0]).unwrap();
        assert_approx_eq!(fit.slope, 2.0);
        assert_approx_eq!(fit.intercept, 1.0);
        assert!(fit.standard_error.is_none());
    }

    #[test]
    fn test_ols_noisy_r_squared_below_one() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![1.1, 1.9, 3.2, 3.8, 5.1];
        let fit = ols_regression(&x, &y).unwrap();
        assert!(fit.r_squared > 0.95 && fit.r_squared < 1.0);
        assert!(fit.standard_error.unwrap() > 0.0);
    }

    #[test]
    fn test_ols_constant_response() {
        let fit = ols_regression(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 1.0);
    }

    #[test]
    fn test_ols_errors() {
        assert!(matches!(
            ols_regression(&[1.0], &[1.0]),
            Err(FractalAnalysisError::InsufficientData { required: 2, actual: 1 })
        ));
        assert!(matches!(
            ols_regression(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(FractalAnalysisError::InsufficientData { .. })
        ));
        assert!(matches!(
            ols_regression(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(FractalAnalysisError::NumericalError { .. })
        ));
        assert!(matches!(
            ols_regression(&[1.0, f64::NAN], &[1.0, 2.0]),
            Err(FractalAnalysisError::NumericalError { .. })
        ));
    }

    #[test]
    fn test_safe_ln_and_min_max() {
        assert!(float_ops::safe_ln(0.0).is_none());
        assert!(float_ops::safe_ln(-1.0).is_none());
        assert_approx_eq!(float_ops::safe_ln(std::f64::consts::E).unwrap(), 1.0);

        assert_eq!(min_max(&[3.0, -1.0, 2.0]), Some((-1.0, 3.0)));
        assert_eq!(min_max(&[]), None);
        assert!(mean(&[]).is_nan());
        assert_approx_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }
}
