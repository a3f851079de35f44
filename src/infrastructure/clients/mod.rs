pub mod esmfold;
pub mod pubchem;
pub mod rcsb;
pub mod workflow;

use anyhow::anyhow;
use anyhow::Result;

/// Downloads a text resource. Non-success statuses are treated as "no
/// resource" rather than failures.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<Option<String>> {
    let res = client.get(url).send().await?;
    if !res.status().is_success() {
        tracing::debug!(url, status = res.status().as_u16(), "Download returned no content");
        return Ok(None);
    }

    return Ok(Some(res.text().await?));
}

/// Appends path segments to a base URL, percent-encoding each one.
pub fn join_url(base: &str, segments: &[&str]) -> Result<String> {
    let mut url = reqwest::Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| return anyhow!("{base} cannot be used as a base URL"))?
        .pop_if_empty()
        .extend(segments);

    return Ok(url.to_string());
}
