//! Data models and structures
//!
//! Defines the content package produced by the pipeline and the
//! request/response payloads exchanged with the text and image APIs.

use crate::quality::QualityReport;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Overall outcome of a pipeline run.
///
/// `PartialSuccess` means the caption is real but the image came from the
/// fallback library instead of the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Success,
    PartialSuccess,
    Error,
}

/// Finished post: caption, image and quality data bundled together.
#[derive(Debug, Clone, Serialize)]
pub struct ContentPackage {
    pub status: ContentStatus,
    pub topic: String,
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    pub image_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One content request. Immutable once constructed; `prompt` overrides the
/// caption-derived image prompt when present.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: String,
    pub prompt: Option<String>,
}

impl GenerationRequest {
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            prompt: None,
        }
    }

    pub fn with_prompt(topic: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            prompt: Some(prompt.into()),
        }
    }
}

// Chat completion API request/response models
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

// Image generation API request/response models
#[derive(Debug, Serialize)]
pub struct ImagineRequest {
    pub prompt: String,
    pub aspect_ratio: String,
    pub negative_prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct ImagineResponse {
    #[serde(rename = "taskId")]
    pub task_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TaskStatusResponse {
    pub status: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub error: Option<String>,
}
