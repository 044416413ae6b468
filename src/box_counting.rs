//! Box-counting measure over the graph of a sampled signal.
//!
//! Time and amplitude are both normalized to [0, 1] so one box side applies to
//! both axes. The graph is the piecewise-linear curve through the samples; in
//! each column of width `s` it spans from its lowest to its highest point
//! (samples inside the column plus the curve's values on the column edges),
//! and covering that span takes `ceil(span / s)` boxes, at least one.

use crate::math_utils::{constants, min_max};

/// Signal graph normalized to the unit square.
#[derive(Debug, Clone)]
pub struct NormalizedGraph {
    t: Vec<f64>,
    y: Vec<f64>,
}

impl NormalizedGraph {
    /// Normalize `samples` taken at uniform `times`.
    ///
    /// Returns `None` when the graph cannot be normalized: fewer than two
    /// samples, or zero peak-to-peak amplitude (every box count is then undefined).
    pub fn new(times: &[f64], samples: &[f64]) -> Option<Self> {
        if times.len() != samples.len() || samples.len() < 2 {
            return None;
        }

        let (t_min, t_max) = min_max(times)?;
        let (y_min, y_max) = min_max(samples)?;
        let t_range = t_max - t_min;
        let y_range = y_max - y_min;

        if t_range <= 0.0 || y_range <= 0.0 {
            return None;
        }

        Some(Self {
            t: times.iter().map(|&t| (t - t_min) / t_range).collect(),
            y: samples.iter().map(|&y| (y - y_min) / y_range).collect(),
        })
    }

    /// Number of vertices of the graph.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Whether the graph has no vertices (never true for a constructed graph).
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Smallest box side the graph resolves: the normalized sample spacing.
    pub fn min_box_size(&self) -> f64 {
        1.0 / self.t.len().saturating_sub(1).max(1) as f64
    }

    /// Number of boxes of side `box_size` needed to cover the graph.
    ///
    /// Returns `None` for a non-positive or non-finite box size, and for boxes
    /// narrower than the sample spacing (the column count is bounded by the
    /// number of samples).
    pub fn count_boxes(&self, box_size: f64) -> Option<f64> {
        if !box_size.is_finite() || box_size <= 0.0 || !resolves(box_size, self.len()) {
            return None;
        }

        let columns = ((1.0 / box_size - constants::ROUNDING_SLACK).ceil() as usize).max(1);
        let mut col_min = vec![f64::INFINITY; columns];
        let mut col_max = vec![f64::NEG_INFINITY; columns];

        let column_of = |t: f64| ((t / box_size) as usize).min(columns - 1);

        for (&t, &y) in self.t.iter().zip(&self.y) {
            let c = column_of(t);
            col_min[c] = col_min[c].min(y);
            col_max[c] = col_max[c].max(y);
        }

        // Curve values on the interior column edges belong to both neighbours.
        let mut segment = 0;
        for edge in 1..columns {
            let t_edge = edge as f64 * box_size;
            while segment + 2 < self.t.len() && self.t[segment + 1] < t_edge {
                segment += 1;
            }
            let (t0, t1) = (self.t[segment], self.t[segment + 1]);
            let (y0, y1) = (self.y[segment], self.y[segment + 1]);
            let frac = if t1 > t0 {
                ((t_edge - t0) / (t1 - t0)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let y_edge = y0 + frac * (y1 - y0);

            for c in [edge - 1, edge] {
                col_min[c] = col_min[c].min(y_edge);
                col_max[c] = col_max[c].max(y_edge);
            }
        }

        let count: usize = col_min
            .iter()
            .zip(&col_max)
            .filter(|(lo, hi)| lo <= hi)
            .map(|(lo, hi)| {
                let boxes = ((hi - lo) / box_size - constants::ROUNDING_SLACK).ceil();
                (boxes as usize).max(1)
            })
            .sum();

        Some(count as f64)
    }
}

/// Whether boxes of side `box_size` are at least as wide as the normalized
/// spacing of `len` uniformly spaced samples.
pub fn resolves(box_size: f64, len: usize) -> bool {
    box_size * len.saturating_sub(1) as f64 >= 1.0 - constants::ROUNDING_SLACK
}

/// Box count of the graph of `samples` (taken at `times`) at box side `box_size`.
///
/// `None` means the measure is undefined for this signal or scale.
pub fn box_count(times: &[f64], samples: &[f64], box_size: f64) -> Option<f64> {
    NormalizedGraph::new(times, samples)?.count_boxes(box_size)
}
