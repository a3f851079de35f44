#[cfg(test)]
#[path = "esmfold_test.rs"]
mod tests;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::is_valid_pdb;

/// Client for ESMFold-compatible structure prediction endpoints.
pub struct EsmFold {
    client: reqwest::Client,
    url: String,
}

impl EsmFold {
    pub fn new(client: reqwest::Client, config: &Config) -> EsmFold {
        return EsmFold {
            client,
            url: config.get(ConfigKey::EsmfoldURL),
        };
    }

    /// Predicts a structure for a one-letter amino acid sequence and returns
    /// it as PDB text. Rejected sequences and empty predictions yield `None`.
    pub async fn fold(&self, sequence: &str) -> Result<Option<String>> {
        let res = self
            .client
            .post(format!(
                "{}/foldSequence/v1/pdb/",
                self.url.trim_end_matches('/')
            ))
            .header("Content-Type", "text/plain")
            .body(sequence.to_string())
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                length = sequence.len(),
                "Structure prediction failed"
            );
            return Ok(None);
        }

        let pdb = res.text().await?;
        if !is_valid_pdb(&pdb) {
            tracing::error!(length = sequence.len(), "Structure prediction returned no atoms");
            return Ok(None);
        }

        return Ok(Some(pdb));
    }
}
