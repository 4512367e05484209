//! Caption and image-prompt generation
//!
//! Talks to a chat-completion API to write Spanish captions and derive
//! image prompts from them. Failures are absorbed into canned defaults so
//! a text outage never stops the pipeline.

pub mod client;
pub mod mock;

pub use client::OpenAiTextClient;
pub use mock::MockTextClient;

use async_trait::async_trait;

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Write an Instagram caption for the topic.
    async fn generate_caption(&self, topic: &str) -> String;

    /// Derive an image-generation prompt from a finished caption.
    async fn generate_image_prompt(&self, caption: &str) -> String;
}
