use super::{NormalizedScores, QualityReport, RawMetrics};
use crate::{Error, Result};
use image::{DynamicImage, GrayImage};
use std::path::Path;
use std::time::Duration;

// Calibration ceilings; raw values at or above a ceiling normalize to 1.0.
const MAX_SHARPNESS: f64 = 1000.0;
const MAX_CONTRAST: f64 = 100.0;
const MAX_DETAIL: f64 = 50.0;
const MAX_NOISE: f64 = 30.0;

// Metric weights; must sum to 1.0.
const WEIGHT_SHARPNESS: f64 = 0.3;
const WEIGHT_CONTRAST: f64 = 0.2;
const WEIGHT_DETAIL: f64 = 0.3;
const WEIGHT_NOISE: f64 = 0.2;

// Hysteresis thresholds on Sobel gradient magnitude.
const EDGE_WEAK_THRESHOLD: f64 = 100.0;
const EDGE_STRONG_THRESHOLD: f64 = 200.0;

/// Scores images on sharpness, contrast, detail and noise. Every scoring
/// entry point is total: unreadable input produces a zero report, never an
/// error.
pub struct QualityScorer {
    http: reqwest::Client,
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityScorer {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");
        Self { http }
    }

    /// Score an image file on disk.
    pub fn score_file(&self, path: &Path) -> QualityReport {
        match image::open(path) {
            Ok(image) => self.score_image(&image),
            Err(e) => {
                tracing::warn!("Could not decode {}: {}", path.display(), e);
                QualityReport::zero()
            }
        }
    }

    /// Score a decoded image. Metrics run on the grayscale projection.
    pub fn score_image(&self, image: &DynamicImage) -> QualityReport {
        let gray = image.to_luma8();
        if gray.width() == 0 || gray.height() == 0 {
            return QualityReport::zero();
        }

        let raw = RawMetrics {
            sharpness: laplacian_variance(&gray),
            contrast: intensity_stddev(&gray),
            detail: edge_density(&gray),
            noise: noise_level(&gray),
        };
        build_report(raw)
    }

    /// Download and score each candidate URL, returning the index and score
    /// of the best one. Candidates that fail to download score zero.
    pub async fn select_best(&self, urls: &[String]) -> (usize, f64) {
        let mut best_index = 0;
        let mut best_score = 0.0;

        for (index, url) in urls.iter().enumerate() {
            let score = match self.fetch_image(url).await {
                Ok(image) => self.score_image(&image).quality_score,
                Err(e) => {
                    tracing::warn!("Skipping candidate {}: {}", url, e);
                    0.0
                }
            };
            tracing::debug!("Candidate {} scored {:.3}", index, score);

            if score > best_score {
                best_index = index;
                best_score = score;
            }
        }

        (best_index, best_score)
    }

    /// Split a 2x2 preview grid into its quadrants, row-major.
    pub fn split_grid(&self, grid: &DynamicImage) -> [DynamicImage; 4] {
        let cell_width = grid.width() / 2;
        let cell_height = grid.height() / 2;

        [
            grid.crop_imm(0, 0, cell_width, cell_height),
            grid.crop_imm(cell_width, 0, cell_width, cell_height),
            grid.crop_imm(0, cell_height, cell_width, cell_height),
            grid.crop_imm(cell_width, cell_height, cell_width, cell_height),
        ]
    }

    /// Index of the highest-scoring quadrant of a 2x2 preview grid. Ties and
    /// degenerate grids resolve to the first quadrant.
    pub fn best_quadrant(&self, grid: &DynamicImage) -> usize {
        let mut best_index = 0;
        let mut best_score = f64::NEG_INFINITY;

        for (index, quadrant) in self.split_grid(grid).iter().enumerate() {
            let score = self.score_image(quadrant).quality_score;
            if score > best_score {
                best_index = index;
                best_score = score;
            }
        }

        best_index
    }

    async fn fetch_image(&self, url: &str) -> Result<DynamicImage> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::ImageApi(format!(
                "Candidate download failed (status {})",
                response.status()
            )));
        }
        let bytes = response.bytes().await?;
        Ok(image::load_from_memory(&bytes)?)
    }
}

fn build_report(raw: RawMetrics) -> QualityReport {
    let normalized = NormalizedScores {
        sharpness: clip(raw.sharpness / MAX_SHARPNESS),
        contrast: clip(raw.contrast / MAX_CONTRAST),
        detail: clip(raw.detail / MAX_DETAIL),
        // Noise is inverted: a noisy image scores low.
        noise: 1.0 - clip(raw.noise / MAX_NOISE),
    };

    let quality_score = WEIGHT_SHARPNESS * normalized.sharpness
        + WEIGHT_CONTRAST * normalized.contrast
        + WEIGHT_DETAIL * normalized.detail
        + WEIGHT_NOISE * normalized.noise;

    QualityReport {
        raw,
        normalized,
        quality_score,
    }
}

fn clip(value: f64) -> f64 {
    value.min(1.0)
}

/// Variance of the 4-neighbour Laplacian response over interior pixels.
/// Crisp edges produce large responses, blur flattens them.
fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return 0.0;
    }

    let mut responses = Vec::with_capacity(((width - 2) * (height - 2)) as usize);
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let center = gray.get_pixel(x, y)[0] as f64;
            let neighbours = gray.get_pixel(x, y - 1)[0] as f64
                + gray.get_pixel(x, y + 1)[0] as f64
                + gray.get_pixel(x - 1, y)[0] as f64
                + gray.get_pixel(x + 1, y)[0] as f64;
            responses.push(neighbours - 4.0 * center);
        }
    }

    variance(&responses)
}

/// Population standard deviation of grayscale intensity.
fn intensity_stddev(gray: &GrayImage) -> f64 {
    let values: Vec<f64> = gray.pixels().map(|p| p[0] as f64).collect();
    variance(&values).sqrt()
}

/// Mean of a two-threshold edge map valued 0/255 per pixel. Strong Sobel
/// responses are edges outright; weak responses only count when connected
/// to a strong one through other weak pixels.
fn edge_density(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return 0.0;
    }
    let total = (width * height) as usize;

    let at = |x: u32, y: u32| gray.get_pixel(x, y)[0] as f64;
    let mut magnitude = vec![0.0f64; total];
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2.0 * at(x - 1, y)
                - at(x - 1, y + 1);
            let gy = at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2.0 * at(x, y - 1)
                - at(x + 1, y - 1);
            magnitude[(y * width + x) as usize] = gx.hypot(gy);
        }
    }

    let mut edges = vec![false; total];
    let mut stack = Vec::new();
    for (index, &value) in magnitude.iter().enumerate() {
        if value >= EDGE_STRONG_THRESHOLD {
            edges[index] = true;
            stack.push(index);
        }
    }
    while let Some(index) = stack.pop() {
        let x = (index % width as usize) as i64;
        let y = (index / width as usize) as i64;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let neighbour = ny as usize * width as usize + nx as usize;
                if !edges[neighbour] && magnitude[neighbour] >= EDGE_WEAK_THRESHOLD {
                    edges[neighbour] = true;
                    stack.push(neighbour);
                }
            }
        }
    }

    let edge_pixels = edges.iter().filter(|&&edge| edge).count();
    edge_pixels as f64 * 255.0 / total as f64
}

/// Mean absolute difference between the image and a median-filtered copy.
/// Clean renders barely change under the filter; noisy ones change a lot.
fn noise_level(gray: &GrayImage) -> f64 {
    let denoised = median_filter_3x3(gray);
    let total: f64 = gray
        .pixels()
        .zip(denoised.pixels())
        .map(|(original, filtered)| (original[0] as f64 - filtered[0] as f64).abs())
        .sum();
    total / (gray.width() as f64 * gray.height() as f64)
}

fn median_filter_3x3(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut filtered = GrayImage::new(width, height);
    let mut window = [0u8; 9];

    for y in 0..height {
        for x in 0..width {
            let mut n = 0;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                    let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                    window[n] = gray.get_pixel(sx, sy)[0];
                    n += 1;
                }
            }
            window.sort_unstable();
            filtered.put_pixel(x, y, image::Luma([window[4]]));
        }
    }

    filtered
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}
