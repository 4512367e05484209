//! Asynchronous image generation
//!
//! Submits render jobs to the image API, polls them to a terminal state,
//! downloads the result and scores it before handing an outcome back to the
//! pipeline. Failures surface as values so the pipeline can fall back.

pub mod client;
pub mod mock;

pub use client::MidjourneyClient;
pub use mock::MockImageClient;

use crate::quality::QualityReport;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Lifecycle of a submitted render job. Only polling advances it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Success,
    Failed,
    TimedOut,
}

/// A job accepted by the image service.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub job_id: String,
    pub submitted_at: DateTime<Utc>,
    pub status: JobStatus,
}

impl GenerationJob {
    pub fn new(job_id: String) -> Self {
        Self {
            job_id,
            submitted_at: Utc::now(),
            status: JobStatus::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != JobStatus::Pending
    }
}

/// Result of one full generate cycle.
#[derive(Debug, Clone)]
pub enum ImageOutcome {
    /// Image downloaded and accepted by the quality gate.
    Success {
        path: PathBuf,
        report: QualityReport,
    },
    /// Image downloaded but scored below the acceptance threshold. The file
    /// is kept on disk for inspection.
    LowQuality {
        path: PathBuf,
        report: QualityReport,
    },
    /// No usable image was produced.
    Failed { reason: String },
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Run the full submit/poll/download/score cycle for `prompt`, saving
    /// the image under a filename derived from `base_name`.
    async fn generate(&self, prompt: &str, base_name: &str) -> ImageOutcome;
}
