//! # Seismic Fractal Analysis
//!
//! Fractal dimension estimation for seismograms.
//!
//! A seismogram, already decoded to samples and a sampling rate, is optionally
//! detrended and band-limited, then its fractal dimension is estimated from
//! the power-law scaling of a measure across scales. Every estimate carries the
//! log-log regression it came from (slope, intercept, R²) and the scale/measure
//! pairs, ready to plot.
//!
//! ## Key Features
//!
//! - **Box-counting**: boxes needed to cover the normalized graph, `N(s) ∝ s^-D`
//! - **Higuchi**: mean curve length at interval `k`, `L(k) ∝ k^-D`
//! - **Preprocessing**: demean or linear detrend, Butterworth lowpass, highpass
//!   and bandpass filters with optional zero phase
//! - **Caching**: content-addressed LRU cache of estimates
//! - **Synthetic signals**: Weierstrass–Mandelbrot curves, noise and random walks
//!   with known dimension
//!
//! ## Quick Start
//!
//! ```rust
//! use seismic_fractal::generators::{weierstrass_mandelbrot, WeierstrassConfig};
//! use seismic_fractal::{estimate, EstimatorConfig, Signal};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let samples = weierstrass_mandelbrot(&WeierstrassConfig::with_dimension(1.5))?;
//!     let signal = Signal::new(samples, 100.0)?;
//!
//!     let config = EstimatorConfig::higuchi().with_scale_range(4.0, 64.0);
//!     let result = estimate(&signal, &config)?;
//!     println!("{}: D = {:.3}, R² = {:.3}", result.method, result.dimension, result.r_squared());
//!
//!     for (ln_s, ln_m) in result.log_log_points() {
//!         println!("{:8.4} {:8.4}", ln_s, ln_m);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! [`estimate`] is a pure function of a [`Signal`] and an [`EstimatorConfig`].
//! [`preprocess`] turns one signal into another. The [`SeismicFractalAnalyzer`]
//! ties both together over a registry of named traces and memoizes results in
//! an [`EstimateCache`].
//!
//! ## Features
//!
//! - `parallel` (default): sweep scales and analyze traces on rayon
//! - `serde`: serialize configurations and results

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analyzer;
pub mod box_counting;
pub mod computation_cache;
pub mod config;
pub mod errors;
pub mod estimator;
pub mod generators;
pub mod higuchi;
pub mod math_utils;
pub mod preprocessing;
pub mod results;
pub mod signal;

pub use analyzer::SeismicFractalAnalyzer;
pub use computation_cache::{CacheStats, EstimateCache};
pub use config::{AnalysisConfig, DimensionMethod, EstimatorConfig, PreprocessingConfig, ScaleRange};
pub use errors::{FractalAnalysisError, FractalResult, MIN_SIGNAL_LENGTH};
pub use estimator::{estimate, estimate_fractal_dimension};
pub use generators::{random_walk, straight_line, weierstrass_mandelbrot, white_noise, WeierstrassConfig};
pub use preprocessing::{preprocess, DetrendMethod, FilterKind, FilterSpec};
pub use results::{FractalDimensionResult, RegressionResult, ScaleMeasurement};
pub use signal::Signal;
