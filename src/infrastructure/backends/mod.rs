pub mod gemini;
pub mod ollama;
pub mod openai;

use anyhow::bail;
use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;

pub struct BackendManager {}

impl BackendManager {
    /// Builds the configured language-model backend. `none` disables
    /// language-model features and yields `Ok(None)`.
    pub fn get(config: &Config, client: reqwest::Client) -> Result<Option<BackendBox>> {
        let backend = config.get(ConfigKey::Backend);
        let Some(name) = BackendName::parse(&backend) else {
            bail!(format!("No backend implemented for {backend}"));
        };

        match name {
            BackendName::Ollama => return Ok(Some(Box::new(ollama::Ollama::new(client, config)))),
            BackendName::OpenAI => return Ok(Some(Box::new(openai::OpenAI::new(client, config)))),
            BackendName::Gemini => return Ok(Some(Box::new(gemini::Gemini::new(client, config)))),
            BackendName::None => return Ok(None),
        }
    }
}
