#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Model {
    name: String,
    supported_generation_methods: Vec<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ModelListResponse {
    models: Vec<Model>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ContentPart {
    text: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    parts: Vec<ContentPart>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

pub struct Gemini {
    client: reqwest::Client,
    url: String,
    token: String,
    model: String,
    timeout: String,
}

impl Gemini {
    pub fn new(client: reqwest::Client, config: &Config) -> Gemini {
        return Gemini {
            client,
            url: config.get(ConfigKey::GeminiURL),
            token: config.get(ConfigKey::GeminiToken),
            model: config.get(ConfigKey::Model),
            timeout: config.get(ConfigKey::BackendHealthCheckTimeout),
        };
    }

    /// Model names are addressed as `models/{name}`.
    fn model_path(&self) -> String {
        if self.model.starts_with("models/") {
            return self.model.to_string();
        }

        return format!("models/{}", self.model);
    }
}

#[async_trait]
impl Backend for Gemini {
    fn name(&self) -> BackendName {
        return BackendName::Gemini;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Gemini URL is not defined");
        }
        if self.token.is_empty() {
            bail!("Gemini API key is not defined");
        }

        let url = format!(
            "{url}/v1beta/{model}?key={key}",
            url = self.url,
            model = self.model_path(),
            key = self.token
        );

        let res = self
            .client
            .get(&url)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let status = match res {
            Ok(res) => res.status().as_u16(),
            Err(err) => {
                tracing::error!(error = ?err, "Gemini is not reachable");
                bail!("Gemini is not reachable");
            }
        };

        if status >= 400 {
            tracing::error!(status = status, "Gemini health check failed");
            bail!("Gemini health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<String>> {
        let res = self
            .client
            .get(format!(
                "{url}/v1beta/models?key={key}",
                url = self.url,
                key = self.token
            ))
            .send()
            .await?
            .json::<ModelListResponse>()
            .await?;

        let mut models: Vec<String> = res
            .models
            .iter()
            .filter(|model| {
                return model
                    .supported_generation_methods
                    .contains(&"generateContent".to_string());
            })
            .map(|model| {
                return model.name.to_string();
            })
            .collect();

        models.sort();

        return Ok(models);
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion(&self, prompt: BackendPrompt) -> Result<BackendResponse> {
        let req = CompletionRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![ContentPart { text: prompt.text }],
            }],
            generation_config: prompt.json.then(|| {
                return GenerationConfig {
                    response_mime_type: "application/json".to_string(),
                };
            }),
        };

        let res = self
            .client
            .post(format!(
                "{url}/v1beta/{model}:generateContent?key={key}",
                url = self.url,
                model = self.model_path(),
                key = self.token,
            ))
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Failed to make completion request to Gemini"
            );
            bail!(format!(
                "GenerateContentRequest to Gemini failed, {}",
                res.status().as_u16()
            ));
        }

        let ores = res.json::<GenerateContentResponse>().await?;
        tracing::debug!(body = ?ores, "Completion response");

        let text = ores
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                return candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| return part.text)
                    .collect::<String>();
            })
            .unwrap_or_default();

        if text.is_empty() {
            bail!("Gemini returned an empty completion");
        }

        return Ok(BackendResponse { text });
    }
}
