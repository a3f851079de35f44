#[cfg(test)]
#[path = "workflow_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::WorkflowReply;
use crate::domain::models::WorkflowRequest;
use crate::domain::models::PLACEHOLDER_WORKFLOW_URL;

/// Forwards chat input to an external workflow webhook.
pub struct WorkflowClient {
    client: reqwest::Client,
    url: String,
}

impl WorkflowClient {
    pub fn new(client: reqwest::Client, config: &Config) -> WorkflowClient {
        return WorkflowClient {
            client,
            url: config.get(ConfigKey::WorkflowURL),
        };
    }

    /// Fails when the webhook URL is missing or still the sample value.
    pub fn check_configured(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            bail!("Workflow webhook URL is not set. Provide it with --workflow-url or workflow-url in config.toml.");
        }
        if self.url.trim() == PLACEHOLDER_WORKFLOW_URL {
            bail!("Workflow webhook URL is still the placeholder. Replace it with your actual webhook URL.");
        }

        return Ok(());
    }

    pub async fn send(&self, chat_input: &str, session_id: &str) -> Result<WorkflowReply> {
        self.check_configured()?;

        let req = WorkflowRequest {
            chat_input: chat_input.to_string(),
            session_id: session_id.to_string(),
        };
        let res = self.client.post(self.url.trim()).json(&req).send().await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Workflow webhook failed");
            bail!(format!("HTTP error! status: {}", res.status().as_u16()));
        }

        let body = res.text().await?;
        tracing::debug!(length = body.len(), "Workflow webhook response");

        return Ok(WorkflowReply::parse(&body));
    }
}
