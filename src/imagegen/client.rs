use super::{GenerationJob, ImageGenerationService, ImageOutcome, JobStatus};
use crate::models::{ImagineRequest, ImagineResponse, TaskStatusResponse};
use crate::quality::QualityScorer;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_retry::{strategy::FixedInterval, Retry};
use uuid::Uuid;

const ASPECT_RATIO: &str = "4:5";
const NEGATIVE_PROMPT: &str = "text, watermark, low quality, pixelated, blurry";

/// Poll budget: one immediate check plus retries on the fixed interval.
const MAX_POLL_ATTEMPTS: usize = 30;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Marker error driving the retry loop while a job is not yet terminal.
struct StillPending;

pub struct MidjourneyClient {
    client: Client,
    api_key: String,
    base_url: String,
    output_dir: PathBuf,
    poll_interval: Duration,
    scorer: QualityScorer,
}

impl MidjourneyClient {
    pub fn new(api_key: String, base_url: String, output_dir: PathBuf) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url,
            output_dir,
            poll_interval: DEFAULT_POLL_INTERVAL,
            scorer: QualityScorer::new(),
        }
    }

    /// Override the delay between status checks. The poll budget stays the
    /// same, only the spacing changes.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    async fn submit(&self, prompt: &str) -> Result<GenerationJob> {
        let request = ImagineRequest {
            prompt: prompt.to_string(),
            aspect_ratio: ASPECT_RATIO.to_string(),
            negative_prompt: NEGATIVE_PROMPT.to_string(),
        };

        tracing::debug!("Submitting render job");
        let response = self
            .client
            .post(format!("{}/v1/midjourney/imagine", self.base_url))
            .header("X-API-KEY", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(Error::ImageApi(format!(
                "Submission rejected (status {}): {}",
                status, error_text
            )));
        }

        let body: ImagineResponse = response.json().await?;
        let job_id = body
            .task_id
            .ok_or_else(|| Error::ImageApi("No taskId in submission response".to_string()))?;

        Ok(GenerationJob::new(job_id))
    }

    async fn poll_status(&self, job_id: &str) -> Result<TaskStatusResponse> {
        let response = self
            .client
            .get(format!("{}/v1/midjourney/task/{}", self.base_url, job_id))
            .header("X-API-KEY", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::ImageApi(format!(
                "Status check failed (status {})",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Poll until the job reaches a terminal state, updating `job` in place.
    /// Transport errors and non-terminal statuses both consume an attempt;
    /// the remote side may still be rendering. Returns `None` when the poll
    /// budget runs out.
    async fn poll_until_terminal(&self, job: &mut GenerationJob) -> Option<TaskStatusResponse> {
        let strategy = FixedInterval::new(self.poll_interval).take(MAX_POLL_ATTEMPTS - 1);
        let job_id = job.job_id.clone();

        let outcome = Retry::spawn(strategy, move || {
            let job_id = job_id.clone();
            async move {
                match self.poll_status(&job_id).await {
                    Ok(status) => match status.status.as_deref() {
                        Some("SUCCESS") | Some("FAILED") => Ok(status),
                        other => {
                            tracing::debug!("Job {} still rendering (status {:?})", job_id, other);
                            Err(StillPending)
                        }
                    },
                    Err(e) => {
                        tracing::warn!("Status check for job {} failed: {}", job_id, e);
                        Err(StillPending)
                    }
                }
            }
        })
        .await;

        match outcome {
            Ok(status) => {
                job.status = if status.status.as_deref() == Some("SUCCESS") {
                    JobStatus::Success
                } else {
                    JobStatus::Failed
                };
                Some(status)
            }
            Err(StillPending) => {
                job.status = JobStatus::TimedOut;
                None
            }
        }
    }

    async fn download(&self, url: &str, base_name: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let filename = format!("{}_{}.png", base_name, Uuid::new_v4());
        let path = self.output_dir.join(filename);

        let mut response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::ImageApi(format!(
                "Image download failed (status {})",
                response.status()
            )));
        }

        let mut file = tokio::fs::File::create(&path).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(path)
    }
}

#[async_trait]
impl ImageGenerationService for MidjourneyClient {
    async fn generate(&self, prompt: &str, base_name: &str) -> ImageOutcome {
        let mut job = match self.submit(prompt).await {
            Ok(job) => job,
            Err(e) => {
                tracing::error!("Render submission failed: {}", e);
                return ImageOutcome::Failed {
                    reason: format!("Submission failed: {}", e),
                };
            }
        };
        tracing::info!("Submitted render job {}", job.job_id);

        let status = match self.poll_until_terminal(&mut job).await {
            Some(status) => status,
            None => {
                tracing::error!(
                    "Job {} not finished after {} status checks",
                    job.job_id,
                    MAX_POLL_ATTEMPTS
                );
                return ImageOutcome::Failed {
                    reason: format!(
                        "Job {} timed out after {} status checks",
                        job.job_id, MAX_POLL_ATTEMPTS
                    ),
                };
            }
        };

        if job.status == JobStatus::Failed {
            let reason = status.error.unwrap_or_else(|| "unknown error".to_string());
            tracing::error!("Job {} failed: {}", job.job_id, reason);
            return ImageOutcome::Failed {
                reason: format!("Render failed: {}", reason),
            };
        }

        let image_url = match status.image_url {
            Some(url) => url,
            None => {
                tracing::error!("Job {} finished without an image URL", job.job_id);
                return ImageOutcome::Failed {
                    reason: "No image URL in finished job".to_string(),
                };
            }
        };

        let path = match self.download(&image_url, base_name).await {
            Ok(path) => path,
            Err(e) => {
                tracing::error!("Download for job {} failed: {}", job.job_id, e);
                return ImageOutcome::Failed {
                    reason: format!("Image download failed: {}", e),
                };
            }
        };
        tracing::info!("Image saved to {}", path.display());

        let report = self.scorer.score_file(&path);
        if report.is_acceptable() {
            tracing::info!("Image accepted (score {:.3})", report.quality_score);
            ImageOutcome::Success { path, report }
        } else {
            tracing::warn!(
                "Image below acceptance threshold (score {:.3}), keeping {} for inspection",
                report.quality_score,
                path.display()
            );
            ImageOutcome::LowQuality { path, report }
        }
    }
}
