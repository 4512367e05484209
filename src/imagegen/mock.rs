use super::{ImageGenerationService, ImageOutcome};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockImageClient {
    outcomes: Arc<Mutex<Vec<ImageOutcome>>>,
    call_count: Arc<Mutex<usize>>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl MockImageClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_outcome(self, outcome: ImageOutcome) -> Self {
        self.outcomes.lock().unwrap().push(outcome);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

impl Default for MockImageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageClient {
    async fn generate(&self, prompt: &str, _base_name: &str) -> ImageOutcome {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());

        let outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            ImageOutcome::Failed {
                reason: "no mock outcome configured".to_string(),
            }
        } else {
            outcomes[(*count - 1) % outcomes.len()].clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityReport;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_mock_defaults_to_failure() {
        let client = MockImageClient::new();
        let outcome = client.generate("prompt", "base").await;

        assert!(matches!(outcome, ImageOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_mock_records_calls_and_prompts() {
        let client = MockImageClient::new().with_outcome(ImageOutcome::Success {
            path: PathBuf::from("/tmp/post.png"),
            report: QualityReport::zero(),
        });

        assert_eq!(client.get_call_count(), 0);
        assert!(client.get_last_prompt().is_none());

        let outcome = client.generate("boardroom at dawn", "base").await;

        assert!(matches!(outcome, ImageOutcome::Success { .. }));
        assert_eq!(client.get_call_count(), 1);
        assert_eq!(
            client.get_last_prompt().as_deref(),
            Some("boardroom at dawn")
        );
    }

    #[tokio::test]
    async fn test_mock_outcomes_cycle() {
        let client = MockImageClient::new()
            .with_outcome(ImageOutcome::Failed {
                reason: "first".to_string(),
            })
            .with_outcome(ImageOutcome::Failed {
                reason: "second".to_string(),
            });

        match client.generate("p", "b").await {
            ImageOutcome::Failed { reason } => assert_eq!(reason, "first"),
            other => panic!("unexpected outcome {:?}", other),
        }
        match client.generate("p", "b").await {
            ImageOutcome::Failed { reason } => assert_eq!(reason, "second"),
            other => panic!("unexpected outcome {:?}", other),
        }
        match client.generate("p", "b").await {
            ImageOutcome::Failed { reason } => assert_eq!(reason, "first"),
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
