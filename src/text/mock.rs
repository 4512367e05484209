use super::TextGenerationService;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockTextClient {
    caption_responses: Arc<Mutex<Vec<String>>>,
    prompt_responses: Arc<Mutex<Vec<String>>>,
    caption_calls: Arc<Mutex<usize>>,
    prompt_calls: Arc<Mutex<usize>>,
}

impl MockTextClient {
    pub fn new() -> Self {
        Self {
            caption_responses: Arc::new(Mutex::new(Vec::new())),
            prompt_responses: Arc::new(Mutex::new(Vec::new())),
            caption_calls: Arc::new(Mutex::new(0)),
            prompt_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_caption_response(self, response: String) -> Self {
        self.caption_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_prompt_response(self, response: String) -> Self {
        self.prompt_responses.lock().unwrap().push(response);
        self
    }

    pub fn get_caption_calls(&self) -> usize {
        *self.caption_calls.lock().unwrap()
    }

    pub fn get_prompt_calls(&self) -> usize {
        *self.prompt_calls.lock().unwrap()
    }
}

impl Default for MockTextClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerationService for MockTextClient {
    async fn generate_caption(&self, topic: &str) -> String {
        let mut count = self.caption_calls.lock().unwrap();
        *count += 1;

        let responses = self.caption_responses.lock().unwrap();
        if responses.is_empty() {
            format!("Publicación de prueba sobre {} #NexoGlobal", topic)
        } else {
            responses[(*count - 1) % responses.len()].clone()
        }
    }

    async fn generate_image_prompt(&self, caption: &str) -> String {
        let mut count = self.prompt_calls.lock().unwrap();
        *count += 1;

        let responses = self.prompt_responses.lock().unwrap();
        if responses.is_empty() {
            format!("Business visualization for: {} --ar 4:5", caption)
        } else {
            responses[(*count - 1) % responses.len()].clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_caption_mentions_topic() {
        let client = MockTextClient::new();
        let caption = client.generate_caption("comercio internacional").await;

        assert!(caption.contains("comercio internacional"));
    }

    #[tokio::test]
    async fn test_mock_custom_responses_cycle() {
        let client = MockTextClient::new()
            .with_caption_response("Primera".to_string())
            .with_caption_response("Segunda".to_string());

        assert_eq!(client.generate_caption("t").await, "Primera");
        assert_eq!(client.generate_caption("t").await, "Segunda");
        assert_eq!(client.generate_caption("t").await, "Primera");
    }

    #[tokio::test]
    async fn test_mock_tracks_calls_separately() {
        let client = MockTextClient::new();

        client.generate_caption("t").await;
        client.generate_caption("t").await;
        client.generate_image_prompt("c").await;

        assert_eq!(client.get_caption_calls(), 2);
        assert_eq!(client.get_prompt_calls(), 1);
    }
}
