//! # Estimation Results
//!
//! Output structures of the fractal dimension estimator. Everything a presenter
//! needs to draw the log-log scatter, overlay the fitted line and print the
//! dimension with its R² lives here.

use crate::config::DimensionMethod;
use crate::errors::{FractalAnalysisError, FractalResult};
use statrs::distribution::{ContinuousCDF, StudentsT};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One point of the estimation sweep: a scale and the measure observed at it.
///
/// For box-counting the scale is the box side in normalized units and the
/// measure the number of boxes; for Higuchi the scale is the interval `k`
/// and the measure the mean curve length `L(k)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScaleMeasurement {
    /// Scale value
    pub scale: f64,
    /// Measure observed at that scale (always positive in a result)
    pub measure: f64,
}

impl ScaleMeasurement {
    /// Natural log of the scale (regression abscissa)
    pub fn log_scale(&self) -> f64 {
        self.scale.ln()
    }

    /// Natural log of the measure (regression ordinate)
    pub fn log_measure(&self) -> f64 {
        self.measure.ln()
    }
}

/// Linear fit of `ln M(s)` against `ln s`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegressionResult {
    /// Fitted slope
    pub slope: f64,
    /// Fitted intercept
    pub intercept: f64,
    /// Coefficient of determination in [0, 1]
    pub r_squared: f64,
    /// Standard error of the slope, only available with three or more points
    pub standard_error: Option<f64>,
    /// Number of points in the fit
    pub num_points: usize,
}

impl RegressionResult {
    /// Evaluate the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Final output of a fractal dimension estimate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FractalDimensionResult {
    /// Method that produced the estimate
    pub method: DimensionMethod,
    /// Estimated fractal dimension
    pub dimension: f64,
    /// Log-log regression the dimension was derived from
    pub regression: RegressionResult,
    /// Valid (scale, measure) pairs used in the fit, ascending in scale
    pub measurements: Vec<ScaleMeasurement>,
    /// Number of generated scales dropped because their measure was undefined or non-positive
    pub discarded_scales: usize,
}

impl FractalDimensionResult {
    /// Goodness of fit of the log-log regression.
    pub fn r_squared(&self) -> f64 {
        self.regression.r_squared
    }

    /// `(ln s, ln M(s))` pairs for a scatter plot.
    pub fn log_log_points(&self) -> Vec<(f64, f64)> {
        self.measurements
            .iter()
            .map(|m| (m.log_scale(), m.log_measure()))
            .collect()
    }

    /// Fitted line evaluated at every `ln s` of the scatter, for overlaying.
    pub fn fitted_line(&self) -> Vec<(f64, f64)> {
        self.measurements
            .iter()
            .map(|m| {
                let x = m.log_scale();
                (x, self.regression.predict(x))
            })
            .collect()
    }

    /// Student-t confidence interval for the dimension at `level` (e.g. 0.95).
    ///
    /// Needs at least three regression points so the slope has a standard error.
    pub fn dimension_confidence_interval(&self, level: f64) -> FractalResult<(f64, f64)> {
        if !(level > 0.0 && level < 1.0) {
            return Err(FractalAnalysisError::InvalidParameter {
                parameter: "confidence_level".to_string(),
                value: level,
                constraint: "(0, 1)".to_string(),
            });
        }

        let std_error = self
            .regression
            .standard_error
            .ok_or(FractalAnalysisError::InsufficientData {
                required: 3,
                actual: self.regression.num_points,
            })?;

        let df = (self.regression.num_points - 2) as f64;
        let t_dist = StudentsT::new(0.0, 1.0, df).map_err(|e| {
            FractalAnalysisError::NumericalError {
                reason: format!("Student-t distribution unavailable: {}", e),
                operation: Some("dimension_confidence_interval".to_string()),
            }
        })?;
        let t_critical = t_dist.inverse_cdf(1.0 - (1.0 - level) / 2.0);
        let half_width = t_critical * std_error;

        Ok((self.dimension - half_width, self.dimension + half_width))
    }
}
