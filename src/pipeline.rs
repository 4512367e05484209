//! Content generation pipeline
//!
//! Sequences caption writing, image-prompt derivation, image generation and
//! the quality gate into one package per run. Generation failures degrade to
//! fallback images, and a run only reports an error when even the fallback
//! library is empty.

use crate::composer::PromptComposer;
use crate::config::{Config, CredentialReport};
use crate::fallback::FallbackLibrary;
use crate::imagegen::{ImageGenerationService, ImageOutcome, MidjourneyClient};
use crate::models::{ContentPackage, ContentStatus, GenerationRequest};
use crate::text::{OpenAiTextClient, TextGenerationService};
use chrono::Utc;
use tracing::{error, info, warn};

/// Coordinates the text, image and fallback services for a single post.
pub struct Pipeline {
    text: Box<dyn TextGenerationService>,
    imagegen: Box<dyn ImageGenerationService>,
    composer: PromptComposer,
    fallback: FallbackLibrary,
}

/// Injectable service bundle used to construct [`Pipeline`] in tests/harnesses.
pub struct PipelineServices {
    pub text: Box<dyn TextGenerationService>,
    pub imagegen: Box<dyn ImageGenerationService>,
    pub composer: PromptComposer,
    pub fallback: FallbackLibrary,
}

impl Pipeline {
    /// Build a pipeline from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses
    /// that need to inject mocks.
    pub fn with_services(services: PipelineServices) -> Self {
        Self {
            text: services.text,
            imagegen: services.imagegen,
            composer: services.composer,
            fallback: services.fallback,
        }
    }

    /// Build a pipeline from configuration and the caller's credential probe.
    /// Unverified credentials only get a warning here: every downstream
    /// failure already degrades to canned text or fallback images.
    pub fn new(config: &Config, credentials: CredentialReport) -> Self {
        if !credentials.text_api {
            warn!("Text API credentials unverified; captions will use canned text");
        }
        if !credentials.image_api {
            warn!("Image API credentials missing; runs will use fallback images");
        }

        let text = OpenAiTextClient::new(
            config.openai_api_key.clone(),
            config.chat_model.clone(),
            config.openai_api_url.clone(),
        );
        let imagegen = MidjourneyClient::new(
            config.midjourney_api_key.clone(),
            config.midjourney_api_url.clone(),
            config.generated_dir.clone(),
        );

        Self::with_services(PipelineServices {
            text: Box::new(text),
            imagegen: Box::new(imagegen),
            composer: PromptComposer::new(),
            fallback: FallbackLibrary::new(config.fallback_dir.clone()),
        })
    }

    /// Compose a direct image prompt for a topic, skipping the caption
    /// round-trip. Useful for embedders that bring their own captions.
    pub fn compose_prompt(&self, topic: &str) -> String {
        self.composer.compose(topic)
    }

    /// Generate one content package. A missing topic is drawn uniformly
    /// from the catalog.
    pub async fn run(&self, topic: Option<&str>) -> ContentPackage {
        let topic = match topic {
            Some(topic) => topic.to_string(),
            None => self.composer.random_topic(),
        };
        self.execute(&GenerationRequest::for_topic(topic)).await
    }

    /// Generate a package for an explicit request. A request-supplied prompt
    /// replaces the caption-derived one.
    pub async fn execute(&self, request: &GenerationRequest) -> ContentPackage {
        let topic = &request.topic;
        info!("Generating content for topic: {}", topic);

        let caption = self.text.generate_caption(topic).await;
        info!("Generated caption ({} chars)", caption.len());

        let image_prompt = match &request.prompt {
            Some(prompt) => prompt.clone(),
            None => self.text.generate_image_prompt(&caption).await,
        };
        info!("Image prompt: {}", image_prompt);

        let base_name = format!("{}_{}", topic_slug(topic), Utc::now().timestamp());

        match self.imagegen.generate(&image_prompt, &base_name).await {
            ImageOutcome::Success { path, report } => {
                info!(
                    "Image accepted (score {:.3}): {}",
                    report.quality_score,
                    path.display()
                );
                ContentPackage {
                    status: ContentStatus::Success,
                    topic: topic.clone(),
                    caption,
                    image_path: Some(path),
                    image_prompt,
                    quality: Some(report),
                    error: None,
                }
            }
            ImageOutcome::LowQuality { path, report } => {
                warn!(
                    "Image scored {:.3}, keeping {} and using a fallback",
                    report.quality_score,
                    path.display()
                );
                let reason = format!(
                    "Generated image scored {:.3}, below the acceptance threshold",
                    report.quality_score
                );
                self.fall_back(topic, caption, image_prompt, reason)
            }
            ImageOutcome::Failed { reason } => {
                warn!("Image generation failed: {}", reason);
                self.fall_back(topic, caption, image_prompt, reason)
            }
        }
    }

    /// Substitute a library image. The original failure reason rides along
    /// in the package for observability.
    fn fall_back(
        &self,
        topic: &str,
        caption: String,
        image_prompt: String,
        reason: String,
    ) -> ContentPackage {
        match self.fallback.pick() {
            Some(path) => {
                info!("Using fallback image: {}", path.display());
                ContentPackage {
                    status: ContentStatus::PartialSuccess,
                    topic: topic.to_string(),
                    caption,
                    image_path: Some(path),
                    image_prompt,
                    quality: None,
                    error: Some(reason),
                }
            }
            None => {
                error!("No fallback images available");
                ContentPackage {
                    status: ContentStatus::Error,
                    topic: topic.to_string(),
                    caption,
                    image_path: None,
                    image_prompt,
                    quality: None,
                    error: Some(format!("{}; no fallback images available", reason)),
                }
            }
        }
    }
}

fn topic_slug(topic: &str) -> String {
    topic
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagegen::MockImageClient;
    use crate::quality::{NormalizedScores, QualityReport, RawMetrics};
    use crate::text::MockTextClient;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const TEST_CAPTION: &str = "📊 Datos que mueven mercados #NexoGlobal";
    const TEST_PROMPT: &str = "Corporate analytics dashboard --ar 4:5";

    fn passing_report() -> QualityReport {
        QualityReport {
            raw: RawMetrics {
                sharpness: 900.0,
                contrast: 80.0,
                detail: 45.0,
                noise: 6.0,
            },
            normalized: NormalizedScores {
                sharpness: 0.9,
                contrast: 0.8,
                detail: 0.9,
                noise: 0.8,
            },
            quality_score: 0.86,
        }
    }

    fn build_pipeline(
        text: MockTextClient,
        imagegen: MockImageClient,
        fallback_dir: &std::path::Path,
    ) -> Pipeline {
        Pipeline::with_services(PipelineServices {
            text: Box::new(text),
            imagegen: Box::new(imagegen),
            composer: PromptComposer::new(),
            fallback: FallbackLibrary::new(fallback_dir),
        })
    }

    fn seeded_fallback_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("reserva.png"), b"png bytes").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_accepted_image_yields_success_package() {
        let fallback_dir = TempDir::new().unwrap();
        let text = MockTextClient::new()
            .with_caption_response(TEST_CAPTION.to_string())
            .with_prompt_response(TEST_PROMPT.to_string());
        let imagegen = MockImageClient::new().with_outcome(ImageOutcome::Success {
            path: PathBuf::from("generated/analisis_de_mercados_1.png"),
            report: passing_report(),
        });

        let pipeline = build_pipeline(text, imagegen, fallback_dir.path());
        let package = pipeline.run(Some("análisis de mercados")).await;

        assert_eq!(package.status, ContentStatus::Success);
        assert_eq!(package.topic, "análisis de mercados");
        assert_eq!(package.caption, TEST_CAPTION);
        assert_eq!(package.image_prompt, TEST_PROMPT);
        assert_eq!(
            package.image_path,
            Some(PathBuf::from("generated/analisis_de_mercados_1.png"))
        );
        assert!(package.quality.is_some());
        assert!(package.error.is_none());
    }

    #[tokio::test]
    async fn test_low_quality_image_falls_back_to_library() {
        let fallback_dir = seeded_fallback_dir();
        let text = MockTextClient::new().with_caption_response(TEST_CAPTION.to_string());
        let imagegen = MockImageClient::new().with_outcome(ImageOutcome::LowQuality {
            path: PathBuf::from("generated/blurry.png"),
            report: QualityReport::zero(),
        });

        let pipeline = build_pipeline(text, imagegen, fallback_dir.path());
        let package = pipeline.run(Some("estrategia global")).await;

        assert_eq!(package.status, ContentStatus::PartialSuccess);
        assert_eq!(
            package.image_path,
            Some(fallback_dir.path().join("reserva.png"))
        );
        assert_eq!(package.caption, TEST_CAPTION);
        assert!(package.quality.is_none());
        let error = package.error.unwrap();
        assert!(error.contains("below the acceptance threshold"));
    }

    #[tokio::test]
    async fn test_generation_failure_falls_back_to_library() {
        let fallback_dir = seeded_fallback_dir();
        let imagegen = MockImageClient::new().with_outcome(ImageOutcome::Failed {
            reason: "Submission failed: boom".to_string(),
        });

        let pipeline = build_pipeline(MockTextClient::new(), imagegen, fallback_dir.path());
        let package = pipeline.run(Some("comercio internacional")).await;

        assert_eq!(package.status, ContentStatus::PartialSuccess);
        assert!(package.image_path.is_some());
        assert_eq!(package.error.as_deref(), Some("Submission failed: boom"));
    }

    #[tokio::test]
    async fn test_failure_with_empty_library_is_an_error() {
        let fallback_dir = TempDir::new().unwrap();
        let imagegen = MockImageClient::new().with_outcome(ImageOutcome::Failed {
            reason: "Render failed: content policy violation".to_string(),
        });

        let pipeline = build_pipeline(MockTextClient::new(), imagegen, fallback_dir.path());
        let package = pipeline.run(Some("comercio internacional")).await;

        assert_eq!(package.status, ContentStatus::Error);
        assert!(package.image_path.is_none());
        assert!(!package.caption.is_empty());
        let error = package.error.unwrap();
        assert!(error.contains("content policy violation"));
        assert!(error.contains("no fallback images available"));
    }

    #[tokio::test]
    async fn test_run_without_topic_picks_from_catalog() {
        let fallback_dir = seeded_fallback_dir();
        let imagegen = MockImageClient::new().with_outcome(ImageOutcome::Failed {
            reason: "offline".to_string(),
        });

        let pipeline = build_pipeline(MockTextClient::new(), imagegen, fallback_dir.path());
        let package = pipeline.run(None).await;

        let composer = PromptComposer::new();
        assert!(composer.topics().any(|topic| topic == package.topic));
    }

    #[tokio::test]
    async fn test_explicit_prompt_skips_derivation() {
        let fallback_dir = seeded_fallback_dir();
        let text = MockTextClient::new().with_caption_response(TEST_CAPTION.to_string());
        let text_probe = text.clone();
        let imagegen = MockImageClient::new().with_outcome(ImageOutcome::Success {
            path: PathBuf::from("generated/custom.png"),
            report: passing_report(),
        });
        let imagegen_probe = imagegen.clone();

        let pipeline = build_pipeline(text, imagegen, fallback_dir.path());
        let request =
            GenerationRequest::with_prompt("estrategia global", "boardroom at dawn --ar 4:5");
        let package = pipeline.execute(&request).await;

        assert_eq!(package.image_prompt, "boardroom at dawn --ar 4:5");
        assert_eq!(
            imagegen_probe.get_last_prompt().as_deref(),
            Some("boardroom at dawn --ar 4:5")
        );
        assert_eq!(text_probe.get_caption_calls(), 1);
        assert_eq!(text_probe.get_prompt_calls(), 0);
    }

    #[test]
    fn test_topic_slug_replaces_separators() {
        assert_eq!(
            topic_slug("análisis de mercados"),
            "análisis_de_mercados"
        );
        assert_eq!(topic_slug("a/b c"), "a_b_c");
    }
}
