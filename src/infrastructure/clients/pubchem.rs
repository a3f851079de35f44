#[cfg(test)]
#[path = "pubchem_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use serde::Deserialize;

use super::fetch_text;
use super::join_url;
use crate::configuration::Config;
use crate::configuration::ConfigKey;

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct IdentifierList {
    #[serde(rename = "CID", default)]
    cid: Vec<u64>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct CidResponse {
    #[serde(rename = "IdentifierList")]
    identifier_list: Option<IdentifierList>,
}

/// PubChem PUG REST client for compound lookups.
pub struct PubChem {
    client: reqwest::Client,
    url: String,
}

impl PubChem {
    pub fn new(client: reqwest::Client, config: &Config) -> PubChem {
        return PubChem {
            client,
            url: config.get(ConfigKey::PubchemURL),
        };
    }

    /// First compound id registered for a name. Unknown names come back as
    /// 404 from PubChem and yield `None`.
    pub async fn find_cid(&self, name: &str) -> Result<Option<u64>> {
        let url = join_url(&self.url, &["compound", "name", name, "cids", "JSON"])?;
        let res = self.client.get(url).send().await?;

        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            tracing::error!(name, status = res.status().as_u16(), "PubChem lookup failed");
            bail!(format!("PubChem lookup failed with status {}", res.status().as_u16()));
        }

        let body = res.json::<CidResponse>().await?;
        let cid = body
            .identifier_list
            .and_then(|list| return list.cid.into_iter().find(|e| return *e > 0));

        return Ok(cid);
    }

    pub fn sdf_url(&self, cid: u64, three_d: bool) -> String {
        let url = format!("{}/compound/cid/{cid}/SDF", self.url.trim_end_matches('/'));
        if three_d {
            return format!("{url}?record_type=3d");
        }

        return url;
    }

    pub async fn download(&self, url: &str) -> Result<Option<String>> {
        return fetch_text(&self.client, url).await;
    }
}
