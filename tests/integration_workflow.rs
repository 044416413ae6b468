//! End-to-end workflow: register traces, preprocess, estimate, reuse cached results.

use seismic_fractal::{
    weierstrass_mandelbrot, white_noise, AnalysisConfig, DetrendMethod, EstimatorConfig,
    FilterSpec, FractalAnalysisError, PreprocessingConfig, SeismicFractalAnalyzer, Signal,
    WeierstrassConfig,
};

const SAMPLING_RATE: f64 = 100.0;

fn higuchi_config() -> AnalysisConfig {
    AnalysisConfig::new(
        EstimatorConfig::higuchi()
            .with_scale_range(4.0, 64.0)
            .with_num_scales(12),
    )
}

#[test]
fn test_linear_detrend_recovers_dimension_of_trended_curve() {
    let curve = weierstrass_mandelbrot(&WeierstrassConfig::with_dimension(1.5)).unwrap();
    let n = curve.len() as f64;
    let trended: Vec<f64> = curve
        .iter()
        .enumerate()
        .map(|(i, w)| w + 200.0 * i as f64 / n)
        .collect();

    let mut analyzer = SeismicFractalAnalyzer::new();
    analyzer.add_trace("trended".to_string(), Signal::new(trended, SAMPLING_RATE).unwrap());

    let raw = analyzer.analyze("trended", &higuchi_config()).unwrap();
    let detrended_config = higuchi_config().with_preprocessing(PreprocessingConfig {
        detrend: DetrendMethod::Linear,
        ..PreprocessingConfig::none()
    });
    let detrended = analyzer.analyze("trended", &detrended_config).unwrap();

    assert!(
        raw.dimension < detrended.dimension,
        "raw D = {}, detrended D = {}",
        raw.dimension,
        detrended.dimension
    );
    assert!(
        (detrended.dimension - 1.5).abs() < 0.1,
        "detrended D = {}",
        detrended.dimension
    );
}

#[test]
fn test_lowpass_smooths_noise() {
    let mut analyzer = SeismicFractalAnalyzer::new();
    analyzer.add_trace(
        "noise".to_string(),
        Signal::new(white_noise(4096, 5), SAMPLING_RATE).unwrap(),
    );
    let config = AnalysisConfig::new(EstimatorConfig::higuchi());

    let raw = analyzer.analyze("noise", &config).unwrap();
    let smoothed = analyzer
        .analyze(
            "noise",
            &config.with_preprocessing(PreprocessingConfig {
                detrend: DetrendMethod::Demean,
                filter: FilterSpec::lowpass(5.0),
            }),
        )
        .unwrap();

    assert!(
        smoothed.dimension < raw.dimension - 0.3,
        "raw D = {}, lowpassed D = {}",
        raw.dimension,
        smoothed.dimension
    );
}

#[test]
fn test_bandpass_zerophase_pipeline_runs() {
    let mut analyzer = SeismicFractalAnalyzer::new();
    analyzer.add_trace(
        "HHZ".to_string(),
        Signal::new(white_noise(4096, 9), SAMPLING_RATE).unwrap(),
    );
    let config = AnalysisConfig {
        preprocessing: PreprocessingConfig {
            detrend: DetrendMethod::Linear,
            filter: FilterSpec::bandpass(0.5, 10.0).with_zerophase(true),
        },
        estimator: EstimatorConfig::box_counting(),
    };

    let result = analyzer.analyze("HHZ", &config).unwrap();
    assert!(result.dimension > 1.0 && result.dimension < 2.0);
    assert!(!result.measurements.is_empty());
}

#[test]
fn test_analyze_all_and_cache_reuse() {
    let mut analyzer = SeismicFractalAnalyzer::with_cache_capacity(16);
    for (i, d) in [1.3, 1.5, 1.7].iter().enumerate() {
        let curve = weierstrass_mandelbrot(&WeierstrassConfig::with_dimension(*d)).unwrap();
        analyzer.add_trace(format!("STA{}", i), Signal::new(curve, SAMPLING_RATE).unwrap());
    }
    analyzer.add_trace("DEAD".to_string(), Signal::new(vec![0.0; 2048], SAMPLING_RATE).unwrap());

    let config = higuchi_config();
    let first = analyzer.analyze_all(&config);
    assert_eq!(
        first.keys().cloned().collect::<Vec<_>>(),
        analyzer.trace_names()
    );
    assert!(matches!(
        first["DEAD"],
        Err(FractalAnalysisError::InsufficientData { .. })
    ));

    let dims: Vec<f64> = (0..3)
        .map(|i| first[&format!("STA{}", i)].as_ref().unwrap().dimension)
        .collect();
    assert!(dims[0] < dims[1] && dims[1] < dims[2], "{:?}", dims);

    let misses_after_first = analyzer.cache_stats().misses;
    let second = analyzer.analyze_all(&config);
    let stats = analyzer.cache_stats();

    // Failed analyses are not cached, successful ones are reused
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.misses, misses_after_first + 1);
    for i in 0..3 {
        let name = format!("STA{}", i);
        assert_eq!(first[&name], second[&name]);
    }
}

#[test]
fn test_replacing_a_trace_invalidates_its_result() {
    let mut analyzer = SeismicFractalAnalyzer::new();
    let config = higuchi_config();

    analyzer.add_trace(
        "X".to_string(),
        Signal::new(white_noise(2048, 1), SAMPLING_RATE).unwrap(),
    );
    let before = analyzer.analyze("X", &config).unwrap();

    analyzer.add_trace(
        "X".to_string(),
        Signal::new(white_noise(2048, 2), SAMPLING_RATE).unwrap(),
    );
    let after = analyzer.analyze("X", &config).unwrap();

    assert_ne!(before, after);
    assert_eq!(analyzer.cache_stats().hits, 0);
}
