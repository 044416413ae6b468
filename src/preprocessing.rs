//! Seismogram preprocessing: detrending and Butterworth filtering.
//!
//! Mirrors the preparation a seismologist applies before looking at signal
//! complexity: remove the mean or a linear trend, then optionally low-, high-
//! or band-pass the trace. Output always has the same length as the input.

use crate::config::PreprocessingConfig;
use crate::errors::{FractalAnalysisError, FractalResult};
use crate::math_utils::{constants, float_ops, mean};
use crate::signal::Signal;
use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of filter corners (poles), as used by common seismology toolkits
pub const DEFAULT_CORNERS: usize = 4;
/// Largest supported number of corners
pub const MAX_CORNERS: usize = 8;
/// Default lowpass corner frequency in Hz
pub const DEFAULT_LOWPASS_FREQ: f64 = 1.0;
/// Default highpass corner frequency in Hz
pub const DEFAULT_HIGHPASS_FREQ: f64 = 0.1;

/// Trend removal applied before filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DetrendMethod {
    /// Leave the signal as is
    #[default]
    None,
    /// Subtract the mean
    Demean,
    /// Subtract the least-squares line through the samples
    Linear,
}

/// Filter response
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FilterKind {
    /// No filtering
    #[default]
    None,
    /// Keep frequencies below `freq` (Hz)
    Lowpass {
        /// Corner frequency in Hz
        freq: f64,
    },
    /// Keep frequencies above `freq` (Hz)
    Highpass {
        /// Corner frequency in Hz
        freq: f64,
    },
    /// Keep frequencies between `freq_min` and `freq_max` (Hz)
    Bandpass {
        /// Lower corner frequency in Hz
        freq_min: f64,
        /// Upper corner frequency in Hz
        freq_max: f64,
    },
}

/// Butterworth filter specification
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterSpec {
    /// Response type and corner frequencies
    pub kind: FilterKind,
    /// Filter order; must be even, between 2 and 8
    pub corners: usize,
    /// Run the filter forward and backward for zero phase shift
    pub zerophase: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self::new(FilterKind::None)
    }
}

impl FilterSpec {
    /// Filter of the given kind with default corners and causal (single pass) response
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            corners: DEFAULT_CORNERS,
            zerophase: false,
        }
    }

    /// Lowpass at `freq` Hz
    pub fn lowpass(freq: f64) -> Self {
        Self::new(FilterKind::Lowpass { freq })
    }

    /// Highpass at `freq` Hz
    pub fn highpass(freq: f64) -> Self {
        Self::new(FilterKind::Highpass { freq })
    }

    /// Bandpass between `freq_min` and `freq_max` Hz
    pub fn bandpass(freq_min: f64, freq_max: f64) -> Self {
        Self::new(FilterKind::Bandpass { freq_min, freq_max })
    }

    /// Set the zero-phase flag
    pub fn with_zerophase(mut self, zerophase: bool) -> Self {
        self.zerophase = zerophase;
        self
    }

    /// Set the number of corners
    pub fn with_corners(mut self, corners: usize) -> Self {
        self.corners = corners;
        self
    }

    /// Whether this spec leaves the signal untouched
    pub fn is_none(&self) -> bool {
        self.kind == FilterKind::None
    }

    /// Check corner frequencies against the Nyquist frequency and the corner count.
    pub fn validate(&self, sampling_rate: f64) -> FractalResult<()> {
        if self.is_none() {
            return Ok(());
        }

        if self.corners < 2 || self.corners > MAX_CORNERS || self.corners % 2 != 0 {
            return Err(FractalAnalysisError::InvalidParameter {
                parameter: "corners".to_string(),
                value: self.corners as f64,
                constraint: format!("even number between 2 and {}", MAX_CORNERS),
            });
        }

        let nyquist = 0.5 * sampling_rate;
        match self.kind {
            FilterKind::None => Ok(()),
            FilterKind::Lowpass { freq } | FilterKind::Highpass { freq } => {
                validate_corner_frequency(freq, nyquist, "freq")
            }
            FilterKind::Bandpass { freq_min, freq_max } => {
                validate_corner_frequency(freq_min, nyquist, "freq_min")?;
                validate_corner_frequency(freq_max, nyquist, "freq_max")?;
                if freq_min >= freq_max {
                    return Err(FractalAnalysisError::InvalidParameter {
                        parameter: "freq_min".to_string(),
                        value: freq_min,
                        constraint: format!("less than freq_max ({})", freq_max),
                    });
                }
                Ok(())
            }
        }
    }
}

fn validate_corner_frequency(freq: f64, nyquist: f64, name: &str) -> FractalResult<()> {
    if !freq.is_finite() || freq <= 0.0 || freq >= nyquist {
        return Err(FractalAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value: freq,
            constraint: format!("(0, {}) Hz (below Nyquist)", nyquist),
        });
    }
    Ok(())
}

/// Apply detrending then filtering, returning a new signal of the same length.
///
/// # Example
/// ```rust
/// use seismic_fractal::{preprocess, PreprocessingConfig, Signal};
/// use seismic_fractal::preprocessing::{DetrendMethod, FilterSpec};
///
/// let trace = Signal::new((0..512).map(|i| i as f64 * 0.01).collect(), 20.0).unwrap();
/// let config = PreprocessingConfig {
///     detrend: DetrendMethod::Linear,
///     filter: FilterSpec::lowpass(1.0),
/// };
/// let cleaned = preprocess(&trace, &config).unwrap();
/// assert_eq!(cleaned.len(), trace.len());
/// ```
pub fn preprocess(signal: &Signal, config: &PreprocessingConfig) -> FractalResult<Signal> {
    if config.is_identity() {
        return Ok(signal.clone());
    }

    config.filter.validate(signal.sampling_rate())?;

    let detrended = detrend(signal.samples(), config.detrend);
    let filtered = apply_filter(&detrended, signal.sampling_rate(), &config.filter)?;

    log::debug!(
        "Preprocessed {} samples: detrend={:?}, filter={:?}",
        filtered.len(),
        config.detrend,
        config.filter.kind
    );

    // Re-validates finiteness; an unstable filter surfaces here instead of in the estimator
    Signal::new(filtered, signal.sampling_rate())
}

/// Remove a trend from the samples.
pub fn detrend(data: &[f64], method: DetrendMethod) -> Vec<f64> {
    match method {
        DetrendMethod::None => data.to_vec(),

        DetrendMethod::Demean => {
            if data.is_empty() {
                return Vec::new();
            }
            let m = mean(data);
            data.iter().map(|&x| x - m).collect()
        }

        DetrendMethod::Linear => {
            if data.len() < 2 {
                return detrend(data, DetrendMethod::Demean);
            }

            // Fit y = a + b*i on centered indices
            let n = data.len() as f64;
            let mean_i = (n - 1.0) / 2.0;
            let mean_y = mean(data);
            let (sxy, sxx) = data
                .iter()
                .enumerate()
                .fold((0.0, 0.0), |(sxy, sxx), (i, &y)| {
                    let di = i as f64 - mean_i;
                    (sxy + di * (y - mean_y), sxx + di * di)
                });

            if float_ops::approx_zero_eps(sxx, constants::MIN_VARIANCE) {
                return detrend(data, DetrendMethod::Demean);
            }

            let slope = sxy / sxx;
            data.iter()
                .enumerate()
                .map(|(i, &y)| y - (mean_y + slope * (i as f64 - mean_i)))
                .collect()
        }
    }
}

/// Normalized second-order section coefficients (a0 = 1).
#[derive(Debug, Clone, Copy)]
struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SectionResponse {
    Lowpass,
    Highpass,
}

/// Bilinear-transform biquad with frequency prewarping at the corner.
fn compute_biquad_coeffs(response: SectionResponse, freq: f64, sampling_rate: f64, q: f64) -> BiquadCoeffs {
    let w0 = 2.0 * PI * freq / sampling_rate;
    let alpha = w0.sin() / (2.0 * q);
    let cos_w0 = w0.cos();

    let (b, a) = match response {
        SectionResponse::Lowpass => {
            let half = (1.0 - cos_w0) / 2.0;
            (
                [half, 1.0 - cos_w0, half],
                [1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha],
            )
        }
        SectionResponse::Highpass => {
            let half = (1.0 + cos_w0) / 2.0;
            (
                [half, -(1.0 + cos_w0), half],
                [1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha],
            )
        }
    };

    let a0 = a[0];
    BiquadCoeffs {
        b0: b[0] / a0,
        b1: b[1] / a0,
        b2: b[2] / a0,
        a1: a[1] / a0,
        a2: a[2] / a0,
    }
}

/// Quality factors of the second-order sections of an order-`corners` Butterworth filter.
fn butterworth_section_qs(corners: usize) -> Vec<f64> {
    let order = corners as f64;
    (0..corners / 2)
        .map(|k| {
            let theta = PI * (2 * k + 1) as f64 / (2.0 * order);
            1.0 / (2.0 * theta.cos())
        })
        .collect()
}

/// Direct-form II biquad, one pass.
fn biquad_process(data: &[f64], c: &BiquadCoeffs) -> Vec<f64> {
    let mut out = Vec::with_capacity(data.len());
    let mut w1 = 0.0_f64;
    let mut w2 = 0.0_f64;
    for &x in data {
        let w0 = x - c.a1 * w1 - c.a2 * w2;
        out.push(c.b0 * w0 + c.b1 * w1 + c.b2 * w2);
        w2 = w1;
        w1 = w0;
    }
    out
}

fn butterworth_sections(
    response: SectionResponse,
    freq: f64,
    sampling_rate: f64,
    corners: usize,
) -> Vec<BiquadCoeffs> {
    butterworth_section_qs(corners)
        .into_iter()
        .map(|q| compute_biquad_coeffs(response, freq, sampling_rate, q))
        .collect()
}

/// Filter `data` sampled at `sampling_rate` Hz according to `spec`.
///
/// Bandpass is realized as a highpass at `freq_min` followed by a lowpass at
/// `freq_max`. With `zerophase` the cascade runs forward and then backward.
pub fn apply_filter(data: &[f64], sampling_rate: f64, spec: &FilterSpec) -> FractalResult<Vec<f64>> {
    spec.validate(sampling_rate)?;

    let sections = match spec.kind {
        FilterKind::None => return Ok(data.to_vec()),
        FilterKind::Lowpass { freq } => {
            butterworth_sections(SectionResponse::Lowpass, freq, sampling_rate, spec.corners)
        }
        FilterKind::Highpass { freq } => {
            butterworth_sections(SectionResponse::Highpass, freq, sampling_rate, spec.corners)
        }
        FilterKind::Bandpass { freq_min, freq_max } => {
            let mut sections =
                butterworth_sections(SectionResponse::Highpass, freq_min, sampling_rate, spec.corners);
            sections.extend(butterworth_sections(
                SectionResponse::Lowpass,
                freq_max,
                sampling_rate,
                spec.corners,
            ));
            sections
        }
    };

    let run_cascade = |input: Vec<f64>| {
        sections
            .iter()
            .fold(input, |acc, coeffs| biquad_process(&acc, coeffs))
    };

    let mut out = run_cascade(data.to_vec());
    if spec.zerophase {
        out.reverse();
        out = run_cascade(out);
        out.reverse();
    }

    Ok(out)
}
