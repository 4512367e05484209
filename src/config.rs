//! Runtime configuration and startup credential checks
//!
//! Configuration is read once from the environment. Missing API keys do not
//! stop startup: the pipeline degrades to canned captions and fallback
//! images, which is exactly what the credential report makes visible.

use crate::models::{ChatCompletionRequest, ChatMessage};
use std::path::PathBuf;
use std::time::Duration;

const PROBE_MODEL: &str = "gpt-3.5-turbo";
const PROBE_MAX_TOKENS: u32 = 5;
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_api_url: String,
    pub midjourney_api_key: String,
    pub midjourney_api_url: String,
    pub chat_model: String,
    pub generated_dir: PathBuf,
    pub fallback_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            midjourney_api_key: std::env::var("MIDJOURNEY_API_KEY").unwrap_or_default(),
            midjourney_api_url: std::env::var("MIDJOURNEY_API_URL")
                .unwrap_or_else(|_| "https://api.goapi.ai".to_string()),
            chat_model: std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            generated_dir: std::env::var("GENERATED_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("generated")),
            fallback_dir: std::env::var("FALLBACK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("fallback")),
        }
    }
}

/// Result of the one-time startup credential probe. Owned by whoever runs
/// the pipeline; nothing validates credentials again after this.
#[derive(Debug, Clone, Copy)]
pub struct CredentialReport {
    pub text_api: bool,
    pub image_api: bool,
}

impl CredentialReport {
    /// Probe the text API with a minimal completion request. The image key
    /// is only checked for presence, a live probe would bill a render.
    pub async fn probe(config: &Config) -> Self {
        let text_api = probe_text_api(config).await;

        let image_api = !config.midjourney_api_key.is_empty();
        if image_api {
            tracing::info!("Image API key present, skipping live probe");
        } else {
            tracing::warn!("Image API key missing; runs will use fallback images");
        }

        Self { text_api, image_api }
    }
}

async fn probe_text_api(config: &Config) -> bool {
    if config.openai_api_key.is_empty() {
        tracing::warn!("Text API key missing; captions will use canned text");
        return false;
    }

    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Could not build probe client: {}", e);
            return false;
        }
    };

    let request = ChatCompletionRequest {
        model: PROBE_MODEL.to_string(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: Some("test".to_string()),
        }],
        temperature: 0.0,
        max_tokens: PROBE_MAX_TOKENS,
    };

    let response = client
        .post(format!("{}/v1/chat/completions", config.openai_api_url))
        .header("Authorization", format!("Bearer {}", config.openai_api_key))
        .json(&request)
        .send()
        .await;

    match response {
        Ok(response) if response.status().is_success() => {
            tracing::info!("Text API credentials verified");
            true
        }
        Ok(response) => {
            tracing::warn!("Text API probe rejected (status {})", response.status());
            false
        }
        Err(e) => {
            tracing::warn!("Text API probe failed: {}", e);
            false
        }
    }
}
