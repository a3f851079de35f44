#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    Ollama,
    OpenAI,
    Gemini,
    None,
}

impl BackendName {
    pub fn parse(text: &str) -> Option<BackendName> {
        return BackendName::iter().find(|e| return e.to_string() == text);
    }
}

pub struct BackendPrompt {
    pub text: String,
    pub json: bool,
}

impl BackendPrompt {
    pub fn new(text: String) -> BackendPrompt {
        return BackendPrompt { text, json: false };
    }

    /// Asks the model to answer with a single JSON object shaped like
    /// `shape`, and flags the request so backends can enable their JSON mode.
    pub fn expect_json(&mut self, shape: &str) {
        self.json = true;
        self.text += &format!(
            "\n\nRespond only with a JSON object in the following shape, without markdown fences:\n{shape}"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    pub text: String,
}

#[async_trait]
pub trait Backend {
    fn name(&self) -> BackendName;

    /// Used at startup to verify all configurations are available to work with
    /// the backend.
    async fn health_check(&self) -> Result<()>;

    /// Lists every model the backend can serve, sorted.
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Requests a single, non-streamed completion for the prompt.
    async fn get_completion(&self, prompt: BackendPrompt) -> Result<BackendResponse>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
