//! Correction of implausible per-segment gradients.
//!
//! Short segments amplify elevation-sampling noise: a couple of meters of
//! error over a ten meter segment reads as a 20% climb. Flagged segments get
//! the gradient of their neighbourhood instead, computed from centered rolling
//! means of elevation change and distance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SmoothingError {
    #[error("smoothing window must be an odd number >= 1, got {0}")]
    InvalidWindow(usize),
    #[error(
        "series lengths differ: {gradients} gradients, {elevation_changes} elevation changes, {distances} distances"
    )]
    LengthMismatch {
        gradients: usize,
        elevation_changes: usize,
        distances: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SmoothingOptions {
    /// Append a `gradient_smooth` column to the table.
    #[serde(default)]
    pub enabled: bool,
    /// Segments at or below this length (meters) are candidates.
    #[serde(default = "default_distance_cutoff")]
    pub distance_cutoff: f64,
    /// Gradients (ratio) above this value are candidates.
    #[serde(default = "default_gradient_cutoff")]
    pub gradient_cutoff: f64,
    /// Number of segments in the centered window.
    #[serde(default = "default_window")]
    pub window: usize,
}

fn default_distance_cutoff() -> f64 {
    50.0
}

fn default_gradient_cutoff() -> f64 {
    0.1
}

fn default_window() -> usize {
    3
}

impl Default for SmoothingOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            distance_cutoff: default_distance_cutoff(),
            gradient_cutoff: default_gradient_cutoff(),
            window: default_window(),
        }
    }
}

impl SmoothingOptions {
    pub fn validate(&self) -> Result<(), SmoothingError> {
        if self.window == 0 || self.window % 2 == 0 {
            return Err(SmoothingError::InvalidWindow(self.window));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedGradient {
    pub values: Vec<f64>,
    /// Segments (0-based rows) replaced by their windowed gradient.
    pub flagged: Vec<usize>,
    /// Rows left undefined (NaN or infinite) that received the mean fallback.
    pub fallback_rows: Vec<usize>,
    pub fallback: Option<f64>,
}

/// Centered moving average over `window` values. Near the edges the window is
/// truncated to the neighbours that exist, so no value is padded with zeros.
pub fn centered_rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let half = window / 2;
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(values.len());
            let slice = &values[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

pub fn smooth_with_cutoffs(
    gradient_segment: &[f64],
    elevation_change: &[f64],
    distances: &[f64],
    options: &SmoothingOptions,
) -> Result<SmoothedGradient, SmoothingError> {
    options.validate()?;
    let n = gradient_segment.len();
    if elevation_change.len() != n || distances.len() != n {
        return Err(SmoothingError::LengthMismatch {
            gradients: n,
            elevation_changes: elevation_change.len(),
            distances: distances.len(),
        });
    }

    let flagged: Vec<usize> = (0..n)
        .filter(|&i| {
            gradient_segment[i] > options.gradient_cutoff && distances[i] <= options.distance_cutoff
        })
        .collect();

    let mut values = gradient_segment.to_vec();
    if !flagged.is_empty() {
        let change_mean = centered_rolling_mean(elevation_change, options.window);
        let distance_mean = centered_rolling_mean(distances, options.window);
        for &i in &flagged {
            let smoothed = change_mean[i] / distance_mean[i];
            values[i] = if distance_mean[i] > 0.0 && smoothed.is_finite() {
                smoothed
            } else {
                f64::NAN
            };
        }
        tracing::debug!("smoothed {} anomalous gradient(s)", flagged.len());
    }

    let fallback_rows: Vec<usize> = (0..n).filter(|&i| !values[i].is_finite()).collect();
    let fallback = if fallback_rows.is_empty() {
        None
    } else {
        let defined: Vec<f64> = gradient_segment
            .iter()
            .copied()
            .filter(|g| g.is_finite())
            .collect();
        let fill = if defined.is_empty() {
            f64::NAN
        } else {
            defined.iter().sum::<f64>() / defined.len() as f64
        };
        for &i in &fallback_rows {
            values[i] = fill;
        }
        tracing::info!(
            "gradient smoothing left {} segment(s) undefined; replaced with mean gradient {fill:.4}",
            fallback_rows.len()
        );
        Some(fill)
    };

    Ok(SmoothedGradient {
        values,
        flagged,
        fallback_rows,
        fallback,
    })
}
