//! Per-segment summary statistics derived from decoded elevations and
//! sequential distances.

pub const DERIVED_COLUMNS: [&str; 12] = [
    "distances",
    "elevation_start",
    "elevation_end",
    "elevation_max",
    "elevation_min",
    "elevation_mean",
    "elevation_change",
    "gradient_segment",
    "gradient_mean",
    "gradient_median",
    "gradient_p75",
    "gradient_max",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentMetrics {
    /// Segment distance in meters (API-reported when available, otherwise geodesic).
    pub distance: f64,
    pub elevation_start: f64,
    pub elevation_end: f64,
    pub elevation_max: f64,
    pub elevation_min: f64,
    pub elevation_mean: f64,
    pub elevation_change: f64,
    /// `elevation_change / distance`; NaN for zero-length segments.
    pub gradient_segment: f64,
    pub gradient_mean: f64,
    pub gradient_median: f64,
    pub gradient_p75: f64,
    pub gradient_max: f64,
}

impl SegmentMetrics {
    /// `elevations` must be non-empty; `distances` holds one entry per
    /// consecutive vertex pair.
    pub fn derive(elevations: &[f64], distances: &[f64], segment_distance: f64) -> Self {
        let elevation_start = elevations.first().copied().unwrap_or(f64::NAN);
        let elevation_end = elevations.last().copied().unwrap_or(f64::NAN);
        let elevation_max = elevations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let elevation_min = elevations.iter().copied().fold(f64::INFINITY, f64::min);
        let elevation_mean = mean(elevations);
        let elevation_change = elevation_max - elevation_min;

        let mut abs_gradients: Vec<f64> = pair_gradients(elevations, distances)
            .into_iter()
            .filter(|g| g.is_finite())
            .map(f64::abs)
            .collect();
        abs_gradients.sort_by(f64::total_cmp);

        Self {
            distance: segment_distance,
            elevation_start,
            elevation_end,
            elevation_max,
            elevation_min,
            elevation_mean,
            elevation_change,
            gradient_segment: segment_gradient(elevation_change, segment_distance),
            gradient_mean: mean(&abs_gradients),
            gradient_median: quantile_sorted(&abs_gradients, 0.5),
            gradient_p75: quantile_sorted(&abs_gradients, 0.75),
            gradient_max: abs_gradients.last().copied().unwrap_or(f64::NAN),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.gradient_segment.is_nan()
    }

    /// Values in [`DERIVED_COLUMNS`] order.
    pub fn values(&self) -> [f64; 12] {
        [
            self.distance,
            self.elevation_start,
            self.elevation_end,
            self.elevation_max,
            self.elevation_min,
            self.elevation_mean,
            self.elevation_change,
            self.gradient_segment,
            self.gradient_mean,
            self.gradient_median,
            self.gradient_p75,
            self.gradient_max,
        ]
    }
}

/// Rise over run for each consecutive vertex pair. A zero-length pair has no
/// defined gradient and yields NaN.
pub fn pair_gradients(elevations: &[f64], distances: &[f64]) -> Vec<f64> {
    elevations
        .windows(2)
        .zip(distances)
        .map(|(pair, &d)| {
            if d > 0.0 {
                (pair[1] - pair[0]) / d
            } else {
                f64::NAN
            }
        })
        .collect()
}

pub fn segment_gradient(elevation_change: f64, distance: f64) -> f64 {
    if distance > 0.0 {
        elevation_change / distance
    } else {
        f64::NAN
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Linear interpolation between order statistics of an ascending slice.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}
