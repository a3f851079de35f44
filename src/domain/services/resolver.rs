#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;

use anyhow::Result;

use super::correction::correct_name;
use crate::configuration::Config;
use crate::domain::models::has_3d_coordinates;
use crate::domain::models::is_valid_pdb;
use crate::domain::models::is_valid_sdf;
use crate::domain::models::pdb_title;
use crate::domain::models::pubchem_page_url;
use crate::domain::models::rcsb_page_url;
use crate::domain::models::subject_of;
use crate::domain::models::BackendBox;
use crate::domain::models::ExternalId;
use crate::domain::models::StructureFormat;
use crate::domain::models::StructureLookup;
use crate::domain::models::StructurePayload;
use crate::infrastructure::clients::pubchem::PubChem;
use crate::infrastructure::clients::rcsb::Rcsb;

/// Turns free-text names into downloadable structures. Small molecules are
/// looked up in PubChem first, then proteins in the RCSB PDB.
pub struct StructureResolver {
    pubchem: PubChem,
    rcsb: Rcsb,
}

impl StructureResolver {
    pub fn new(client: reqwest::Client, config: &Config) -> StructureResolver {
        return StructureResolver {
            pubchem: PubChem::new(client.clone(), config),
            rcsb: Rcsb::new(client, config),
        };
    }

    /// Never fails. Errors from either database are logged and count as no
    /// match from that source.
    pub async fn resolve(&self, query: &str, backend: Option<&BackendBox>) -> StructureLookup {
        let subject = subject_of(query);
        let name = correct_name(backend, &subject).await;
        tracing::debug!(query, subject, name, "Resolving structure");

        match self.pubchem.find_cid(&name).await {
            Ok(Some(cid)) => {
                return StructureLookup {
                    format: Some(StructureFormat::Sdf),
                    url: Some(self.pubchem.sdf_url(cid, true)),
                    external_id: Some(ExternalId::Cid(cid)),
                    resolved_name: name,
                    original_name: subject,
                };
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(error = ?err, name, "PubChem lookup failed, trying RCSB");
            }
        }

        match self.rcsb.search(&name).await {
            Ok(Some(pdb_id)) => {
                return StructureLookup {
                    format: Some(StructureFormat::Pdb),
                    url: Some(self.rcsb.file_url(&pdb_id)),
                    external_id: Some(ExternalId::Pdb(pdb_id)),
                    resolved_name: name,
                    original_name: subject,
                };
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(error = ?err, name, "RCSB search failed");
            }
        }

        return StructureLookup::not_found(&name, &subject);
    }

    /// Downloads the structure a lookup points at. `Ok(None)` when the
    /// source has no usable record.
    pub async fn fetch(&self, lookup: &StructureLookup) -> Result<Option<StructurePayload>> {
        let (Some(format), Some(url), Some(external_id)) =
            (lookup.format, &lookup.url, &lookup.external_id)
        else {
            return Ok(None);
        };

        match format {
            StructureFormat::Sdf => {
                let ExternalId::Cid(cid) = external_id else {
                    return Ok(None);
                };
                let Some(data) = self.fetch_sdf(*cid, url).await? else {
                    return Ok(None);
                };

                return Ok(Some(StructurePayload {
                    format,
                    name: lookup.resolved_name.to_string(),
                    data,
                    external_id: external_id.clone(),
                    page_url: pubchem_page_url(*cid),
                    title: None,
                }));
            }
            StructureFormat::Pdb => {
                let Some(data) = self.fetch_pdb(url).await? else {
                    return Ok(None);
                };

                return Ok(Some(StructurePayload {
                    format,
                    name: lookup.resolved_name.to_string(),
                    title: pdb_title(&data),
                    data,
                    external_id: external_id.clone(),
                    page_url: rcsb_page_url(&external_id.to_string()),
                }));
            }
        }
    }

    /// Downloads an entry by accession. The entry title names it, falling
    /// back to the accession itself.
    pub async fn fetch_pdb_entry(&self, pdb_id: &str) -> Result<Option<StructurePayload>> {
        let pdb_id = pdb_id.trim().to_uppercase();
        let Some(data) = self.fetch_pdb(&self.rcsb.file_url(&pdb_id)).await? else {
            return Ok(None);
        };

        let title = pdb_title(&data);
        return Ok(Some(StructurePayload {
            format: StructureFormat::Pdb,
            name: title.clone().unwrap_or_else(|| return pdb_id.to_string()),
            title,
            data,
            page_url: rcsb_page_url(&pdb_id),
            external_id: ExternalId::Pdb(pdb_id),
        }));
    }

    async fn fetch_pdb(&self, url: &str) -> Result<Option<String>> {
        let data = self.rcsb.download(url).await?;

        return Ok(data.filter(|e| return is_valid_pdb(e)));
    }

    async fn fetch_sdf(&self, cid: u64, url: &str) -> Result<Option<String>> {
        if let Some(data) = self.pubchem.download(url).await? {
            if is_valid_sdf(&data) && has_3d_coordinates(&data) {
                return Ok(Some(data));
            }
        }

        tracing::debug!(cid, "No 3D conformer, falling back to the 2D record");
        let data = self.pubchem.download(&self.pubchem.sdf_url(cid, false)).await?;

        return Ok(data.filter(|e| return is_valid_sdf(e)));
    }
}
