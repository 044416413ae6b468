//! Error types and validation functions for fractal dimension estimation.
//!
//! Every failure in this crate is an input-validation failure: the computation is
//! pure and local, so nothing here is retryable. Errors are surfaced to the caller
//! as-is and are meant to be shown to the user.

use thiserror::Error;

/// Minimum number of samples for a meaningful fractal dimension estimate.
pub const MIN_SIGNAL_LENGTH: usize = 16;

/// Error types for signal preparation and fractal dimension estimation.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FractalAnalysisError {
    /// The signal cannot be analysed (too short, non-finite samples, bad sampling rate).
    #[error("Invalid signal: {reason}")]
    InvalidSignal {
        /// Why the signal was rejected
        reason: String,
    },

    /// The requested scale range is non-positive, inverted or outside what the method supports.
    #[error("Invalid scale range [{min}, {max}]: {constraint}")]
    InvalidScaleRange {
        /// Lower bound as supplied
        min: f64,
        /// Upper bound as supplied
        max: f64,
        /// Constraint that was violated
        constraint: String,
    },

    /// Too few valid (scale, measure) pairs remain for the regression.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required points
        required: usize,
        /// Points actually available
        actual: usize,
    },

    /// Invalid parameter value for estimator or preprocessing configuration.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Numerical computation failed (degenerate regression, non-finite output).
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
        /// Operation that failed
        operation: Option<String>,
    },

    /// Named trace is not registered with the analyzer.
    #[error("Trace not found: {name}")]
    TraceNotFound {
        /// Name that was looked up
        name: String,
    },
}

/// Result type for fractal analysis operations.
pub type FractalResult<T> = Result<T, FractalAnalysisError>;

/// Validates that a signal is long enough to be analysed.
///
/// # Example
/// ```rust
/// use seismic_fractal::errors::validate_signal_length;
///
/// assert!(validate_signal_length(&[0.0; 32], 16).is_ok());
/// assert!(validate_signal_length(&[0.0; 8], 16).is_err());
/// ```
pub fn validate_signal_length(data: &[f64], min_required: usize) -> FractalResult<()> {
    if data.len() < min_required {
        return Err(FractalAnalysisError::InvalidSignal {
            reason: format!(
                "signal has {} samples, at least {} are required",
                data.len(),
                min_required
            ),
        });
    }
    Ok(())
}

/// Validates that a parameter is within expected bounds (inclusive).
///
/// # Example
/// ```rust
/// use seismic_fractal::errors::validate_parameter;
///
/// assert!(validate_parameter(0.5, 0.0, 1.0, "fraction").is_ok());
/// assert!(validate_parameter(1.5, 0.0, 1.0, "fraction").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> FractalResult<()> {
    if value.is_nan() {
        return Err(FractalAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if min.is_nan() || max.is_nan() || min > max {
        return Err(FractalAnalysisError::NumericalError {
            reason: format!(
                "Invalid bounds for parameter {}: min={}, max={}",
                name, min, max
            ),
            operation: None,
        });
    }

    if value < min || value > max {
        Err(FractalAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates that all samples are finite, reporting the first offending index.
///
/// # Example
/// ```rust
/// use seismic_fractal::errors::validate_all_finite;
///
/// assert!(validate_all_finite(&[1.0, 2.0, 3.0], "trace").is_ok());
/// assert!(validate_all_finite(&[1.0, f64::NAN, 3.0], "trace").is_err());
/// ```
pub fn validate_all_finite(data: &[f64], name: &str) -> FractalResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        let value_desc = if value.is_nan() {
            "NaN"
        } else if value.is_sign_positive() {
            "Infinity"
        } else {
            "-Infinity"
        };

        return Err(FractalAnalysisError::InvalidSignal {
            reason: format!(
                "{} contains non-finite value at index {}: {}",
                name, i, value_desc
            ),
        });
    }

    Ok(())
}

/// Validates a `[min, max]` scale range: both finite and positive, `min < max`.
pub fn validate_scale_range(min: f64, max: f64) -> FractalResult<()> {
    let violated = if !min.is_finite() || !max.is_finite() {
        Some("bounds must be finite")
    } else if min <= 0.0 || max <= 0.0 {
        Some("bounds must be positive")
    } else if min >= max {
        Some("min must be strictly less than max")
    } else {
        None
    };

    match violated {
        Some(constraint) => Err(FractalAnalysisError::InvalidScaleRange {
            min,
            max,
            constraint: constraint.to_string(),
        }),
        None => Ok(()),
    }
}
