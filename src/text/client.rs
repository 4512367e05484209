use super::TextGenerationService;
use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use rand::prelude::*;
use reqwest::Client;
use std::time::Duration;

const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f32 = 0.7;
const HASHTAG_SAMPLE_SIZE: usize = 8;

/// Prompt used when image-prompt derivation fails. Already carries the
/// Instagram aspect ratio.
const CANNED_IMAGE_PROMPT: &str = "Modern business visualization, corporate professional \
     environment, market analysis dashboard, clean design, strategic planning, realistic, \
     4k detailed --ar 4:5";

/// Sampled into captions the model returns without any hashtag.
const HASHTAG_POOL: &[&str] = &[
    "#InteligenciaComercial",
    "#ComercioInternacional",
    "#NexoGlobal",
    "#ConsultoríaEstrategica",
    "#MercadosGlobales",
    "#ExportaciónMX",
    "#NegociosInternacionales",
    "#AnálisisDeMercado",
    "#EstrategiaGlobal",
    "#DatosParaDecidir",
    "#CrecimientoEmpresarial",
    "#VisiónGlobal",
];

pub struct OpenAiTextClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiTextClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            model,
            base_url,
        }
    }

    async fn chat_completion(&self, system: String, user: String) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(system),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(user),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        tracing::debug!("Sending chat completion request");
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(Error::TextApi(format!(
                "API error (status {}): {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| Error::TextApi("No content in completion response".to_string()))
    }
}

#[async_trait]
impl TextGenerationService for OpenAiTextClient {
    async fn generate_caption(&self, topic: &str) -> String {
        let user = prompts::render(prompts::CAPTION_USER, &[("topic", topic)]);

        match self
            .chat_completion(prompts::CAPTION_SYSTEM.to_string(), user)
            .await
        {
            Ok(caption) => ensure_hashtags(caption.trim().to_string()),
            Err(e) => {
                tracing::error!("Caption generation failed, using canned caption: {}", e);
                canned_caption(topic)
            }
        }
    }

    async fn generate_image_prompt(&self, caption: &str) -> String {
        let user = prompts::render(prompts::IMAGE_PROMPT_USER, &[("caption", caption)]);

        match self
            .chat_completion(prompts::IMAGE_PROMPT_SYSTEM.to_string(), user)
            .await
        {
            Ok(prompt) => ensure_aspect_ratio(prompt.trim().to_string()),
            Err(e) => {
                tracing::error!("Image prompt generation failed, using canned prompt: {}", e);
                CANNED_IMAGE_PROMPT.to_string()
            }
        }
    }
}

/// Append a random sample from the hashtag pool when the model forgot them.
fn ensure_hashtags(caption: String) -> String {
    if caption.split_whitespace().any(|word| word.starts_with('#')) {
        return caption;
    }

    let mut rng = thread_rng();
    let tags: Vec<&str> = HASHTAG_POOL
        .choose_multiple(&mut rng, HASHTAG_SAMPLE_SIZE)
        .copied()
        .collect();

    format!("{}\n\n{}", caption, tags.join(" "))
}

fn ensure_aspect_ratio(prompt: String) -> String {
    if prompt.contains("--ar") {
        prompt
    } else {
        format!("{} --ar 4:5", prompt)
    }
}

fn canned_caption(topic: &str) -> String {
    format!(
        "🌐 Descubre las últimas tendencias en {} con Nexo Global\n\n\
         Nuestro equipo de expertos analiza constantemente los mercados internacionales \
         para ofrecerte la información más relevante y estratégica para tu negocio.\n\n\
         Contáctanos para conocer cómo podemos ayudarte a expandir tu empresa.\n\n\
         #InteligenciaComercial #ComercioInternacional #NexoGlobal #ConsultoríaEstrategica \
         #MercadosGlobales #ExportaciónMX #NegociosInternacionales #AnálisisDeMercado",
        topic
    )
}
