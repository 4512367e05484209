//! Image quality scoring
//!
//! Pixel-level quality metrics for generated images, used to decide whether
//! a render is good enough to publish.

pub mod scorer;

pub use scorer::QualityScorer;

use serde::{Deserialize, Serialize};

/// Minimum weighted score a generated image must reach to be accepted.
pub const ACCEPTANCE_THRESHOLD: f64 = 0.6;

/// Raw metric values straight from pixel analysis, before calibration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawMetrics {
    pub sharpness: f64,
    pub contrast: f64,
    pub detail: f64,
    pub noise: f64,
}

/// Metrics scaled to `[0, 1]`, higher is better for every field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NormalizedScores {
    pub sharpness: f64,
    pub contrast: f64,
    pub detail: f64,
    pub noise: f64,
}

/// Quality assessment for a single image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityReport {
    pub raw: RawMetrics,
    pub normalized: NormalizedScores,
    pub quality_score: f64,
}

impl QualityReport {
    /// Sentinel report for images that cannot be read or decoded.
    pub fn zero() -> Self {
        Self {
            raw: RawMetrics {
                sharpness: 0.0,
                contrast: 0.0,
                detail: 0.0,
                noise: 0.0,
            },
            normalized: NormalizedScores {
                sharpness: 0.0,
                contrast: 0.0,
                detail: 0.0,
                noise: 0.0,
            },
            quality_score: 0.0,
        }
    }

    pub fn is_acceptable(&self) -> bool {
        self.quality_score >= ACCEPTANCE_THRESHOLD
    }
}
