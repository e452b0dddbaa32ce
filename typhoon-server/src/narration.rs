//! Narration clients.
//!
//! Narration is advisory text only: [`narrate_or_fallback`] turns every
//! failure into the fixed fallback sentence so a turn never fails on it.
use std::time::Duration;
use thiserror::Error;
use typhoon_game::{NarrationPrompt, NarrationReply, describe_turn, fallback_narration};

#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("narration timed out after {0:?}")]
    Timeout(Duration),
    #[error("narration request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("narration service returned HTTP {0}")]
    Status(u16),
    #[error("narration reply was malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("narration reply was empty")]
    Empty,
}

#[async_trait::async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, prompt: &NarrationPrompt) -> Result<String, NarrationError>;
}

/// Ask `narrator` for text, substituting the fallback sentence on any failure.
pub async fn narrate_or_fallback(narrator: &dyn Narrator, prompt: &NarrationPrompt) -> String {
    match narrator.narrate(prompt).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            log::warn!("narration for turn {} was blank", prompt.turn);
            fallback_narration().to_string()
        }
        Err(err) => {
            log::warn!("narration for turn {} failed: {err}", prompt.turn);
            fallback_narration().to_string()
        }
    }
}

/// Offline narrator built from the engine's scene descriptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticNarrator;

#[async_trait::async_trait]
impl Narrator for StaticNarrator {
    async fn narrate(&self, prompt: &NarrationPrompt) -> Result<String, NarrationError> {
        Ok(describe_turn(prompt))
    }
}

/// Posts the prompt as JSON and expects `{ "narration": "..." }` back.
#[derive(Debug, Clone)]
pub struct HttpNarrator {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpNarrator {
    #[must_use]
    pub fn new(url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key,
            timeout,
        }
    }

    async fn request(&self, prompt: &NarrationPrompt) -> Result<String, NarrationError> {
        let mut request = self.client.post(&self.url).json(prompt);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NarrationError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        let reply: NarrationReply = serde_json::from_str(&body)?;
        let text = reply.narration.trim();
        if text.is_empty() {
            return Err(NarrationError::Empty);
        }
        Ok(text.to_string())
    }
}

#[async_trait::async_trait]
impl Narrator for HttpNarrator {
    async fn narrate(&self, prompt: &NarrationPrompt) -> Result<String, NarrationError> {
        tokio::time::timeout(self.timeout, self.request(prompt))
            .await
            .map_err(|_elapsed| NarrationError::Timeout(self.timeout))?
    }
}
