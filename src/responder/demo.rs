//! Timer-based demo responder

use std::time::Duration;

use async_trait::async_trait;

use super::{ResponderError, ResponseGenerator};

/// Delay before the demo reply arrives.
pub const DEFAULT_RESPONSE_DELAY: Duration = Duration::from_millis(1500);

/// Build the canned reply for a submission.
pub fn demo_reply(assistant_name: &str, prompt: &str) -> String {
    format!(
        "Thank you for your message: \"{prompt}\". This is a demo response from **{assistant_name}**.

In a real implementation, this would connect to an AI service to provide intelligent responses. The interface supports:

- **Markdown formatting** for rich text
- Code syntax highlighting
- Smooth scrolling
- Auto-expanding input
- Clean, minimalistic design

Feel free to continue the conversation!"
    )
}

/// Waits a fixed delay, then answers with [`demo_reply`]. Never fails.
#[derive(Debug, Clone)]
pub struct DemoResponder {
    delay: Duration,
    assistant_name: String,
}

impl DemoResponder {
    pub fn new(delay: Duration, assistant_name: impl Into<String>) -> Self {
        Self {
            delay,
            assistant_name: assistant_name.into(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for DemoResponder {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSE_DELAY, "NoAI")
    }
}

#[async_trait]
impl ResponseGenerator for DemoResponder {
    async fn generate(&self, prompt: &str) -> Result<String, ResponderError> {
        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "demo responder waiting");
        tokio::time::sleep(self.delay).await;
        Ok(demo_reply(&self.assistant_name, prompt))
    }
}
