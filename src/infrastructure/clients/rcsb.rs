#[cfg(test)]
#[path = "rcsb_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use super::fetch_text;
use crate::configuration::Config;
use crate::configuration::ConfigKey;

const SEARCH_ROWS: u32 = 5;

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct SearchHit {
    identifier: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    result_set: Vec<SearchHit>,
}

/// RCSB PDB search and file download client.
pub struct Rcsb {
    client: reqwest::Client,
    search_url: String,
    files_url: String,
}

impl Rcsb {
    pub fn new(client: reqwest::Client, config: &Config) -> Rcsb {
        return Rcsb {
            client,
            search_url: config.get(ConfigKey::RcsbSearchURL),
            files_url: config.get(ConfigKey::RcsbFilesURL),
        };
    }

    /// Full-text search for entries. Returns the best matching PDB ID.
    pub async fn search(&self, text: &str) -> Result<Option<String>> {
        let query = json!({
            "query": {
                "type": "terminal",
                "service": "full_text",
                "parameters": { "value": text }
            },
            "return_type": "entry",
            "request_options": {
                "paginate": { "start": 0, "rows": SEARCH_ROWS }
            }
        });

        let res = self
            .client
            .post(format!(
                "{}/rcsbsearch/v2/query",
                self.search_url.trim_end_matches('/')
            ))
            .json(&query)
            .send()
            .await?;

        // Searches without hits answer with an empty 204.
        if res.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !res.status().is_success() {
            tracing::error!(text, status = res.status().as_u16(), "RCSB search failed");
            bail!(format!("RCSB search failed with status {}", res.status().as_u16()));
        }

        let body = res.json::<SearchResponse>().await?;
        if body.total_count == 0 {
            return Ok(None);
        }

        return Ok(body
            .result_set
            .into_iter()
            .next()
            .map(|hit| return hit.identifier.to_uppercase()));
    }

    pub fn file_url(&self, pdb_id: &str) -> String {
        return format!(
            "{}/view/{}.pdb",
            self.files_url.trim_end_matches('/'),
            pdb_id.to_uppercase()
        );
    }

    pub async fn download(&self, url: &str) -> Result<Option<String>> {
        return fetch_text(&self.client, url).await;
    }
}
