//! Uniformly sampled seismic trace handed over by the loader/preprocessor.

use crate::errors::{validate_all_finite, FractalAnalysisError, FractalResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered sequence of finite samples with a fixed sampling interval.
///
/// Construction guarantees every sample is finite and the sampling rate is
/// positive; the length requirement depends on the estimator and is checked there.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "SignalParts"))]
pub struct Signal {
    samples: Vec<f64>,
    sampling_rate: f64,
}

impl Signal {
    /// Create a signal from samples and a sampling rate in Hz.
    ///
    /// # Example
    /// ```rust
    /// use seismic_fractal::Signal;
    ///
    /// let signal = Signal::new(vec![0.0, 1.0, 0.5, -0.2], 100.0).unwrap();
    /// assert_eq!(signal.len(), 4);
    /// assert!(Signal::new(vec![f64::NAN], 100.0).is_err());
    /// ```
    pub fn new(samples: Vec<f64>, sampling_rate: f64) -> FractalResult<Self> {
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(FractalAnalysisError::InvalidSignal {
                reason: format!(
                    "sampling rate must be positive and finite, got {}",
                    sampling_rate
                ),
            });
        }
        validate_all_finite(&samples, "signal")?;

        Ok(Self {
            samples,
            sampling_rate,
        })
    }

    /// Samples in acquisition order.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sampling rate in Hz.
    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Sampling interval in seconds.
    pub fn delta(&self) -> f64 {
        1.0 / self.sampling_rate
    }

    /// Nyquist frequency in Hz.
    pub fn nyquist(&self) -> f64 {
        0.5 * self.sampling_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the signal has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample times in seconds relative to the first sample.
    pub fn times(&self) -> Vec<f64> {
        let delta = self.delta();
        (0..self.samples.len()).map(|i| i as f64 * delta).collect()
    }

    /// Total duration covered by the samples in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len().saturating_sub(1) as f64 * self.delta()
    }

    /// Peak-to-peak amplitude (0.0 for an empty signal).
    pub fn peak_to_peak(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let (min, max) = self
            .samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        max - min
    }

    /// Consume the signal, returning its samples.
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// Unchecked wire form of a [`Signal`]; deserialization goes through [`Signal::new`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct SignalParts {
    samples: Vec<f64>,
    sampling_rate: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<SignalParts> for Signal {
    type Error = FractalAnalysisError;

    fn try_from(parts: SignalParts) -> FractalResult<Self> {
        Signal::new(parts.samples, parts.sampling_rate)
    }
}
