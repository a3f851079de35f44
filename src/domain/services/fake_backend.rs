use std::sync::Mutex;

use anyhow::anyhow;
use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::Backend;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;

/// Backend answering every completion with a canned reply, recording the
/// prompts it was sent. A failing backend also fails its health check.
pub struct FakeBackend {
    answer: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn answering(text: &str) -> BackendBox {
        return Box::new(FakeBackend {
            answer: Ok(text.to_string()),
            prompts: Mutex::new(vec![]),
        });
    }

    pub fn failing(message: &str) -> BackendBox {
        return Box::new(FakeBackend {
            answer: Err(message.to_string()),
            prompts: Mutex::new(vec![]),
        });
    }
}

#[async_trait]
impl Backend for FakeBackend {
    fn name(&self) -> BackendName {
        return BackendName::Ollama;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if let Err(message) = &self.answer {
            return Err(anyhow!(message.to_string()));
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<String>> {
        return Ok(vec!["fake-small".to_string(), "fake-large".to_string()]);
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion(&self, prompt: BackendPrompt) -> Result<BackendResponse> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.text);
        }

        match &self.answer {
            Ok(text) => return Ok(BackendResponse { text: text.to_string() }),
            Err(message) => return Err(anyhow!(message.to_string())),
        }
    }
}
