//! Response generation.
//!
//! The [`ResponseGenerator`] trait is the one seam where a real backend plugs
//! in. The store only assumes that `generate` eventually completes (or never
//! does); timeouts and retries belong to the implementation.

mod demo;

pub use demo::{demo_reply, DemoResponder, DEFAULT_RESPONSE_DELAY};

use async_trait::async_trait;

/// Errors a response generator can report.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ResponderError {
    #[error("response generation failed: {0}")]
    Failed(String),
    #[error("response generator is unavailable")]
    Unavailable,
}

/// Produces assistant content for a user submission.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ResponderError>;
}
