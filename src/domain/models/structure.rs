use std::fmt;

use serde::Deserialize;
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StructureFormat {
    Pdb,
    Sdf,
}

/// A database accession: numeric PubChem CIDs or PDB ID strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalId {
    Cid(u64),
    Pdb(String),
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExternalId::Cid(cid) => return write!(f, "{cid}"),
            ExternalId::Pdb(id) => return write!(f, "{id}"),
        }
    }
}

/// Outcome of resolving a free-text name. A missing `format` means neither
/// database had a match; both names are kept for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureLookup {
    pub format: Option<StructureFormat>,
    pub url: Option<String>,
    pub external_id: Option<ExternalId>,
    pub resolved_name: String,
    pub original_name: String,
}

impl StructureLookup {
    pub fn not_found(resolved_name: &str, original_name: &str) -> StructureLookup {
        return StructureLookup {
            format: None,
            url: None,
            external_id: None,
            resolved_name: resolved_name.to_string(),
            original_name: original_name.to_string(),
        };
    }

    pub fn is_found(&self) -> bool {
        return self.format.is_some() && self.url.is_some();
    }

    pub fn was_corrected(&self) -> bool {
        return self.resolved_name != self.original_name;
    }
}

/// Downloaded structure text ready to attach to a layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructurePayload {
    pub format: StructureFormat,
    pub name: String,
    pub data: String,
    pub external_id: ExternalId,
    pub page_url: String,
    /// Entry title read from PDB records.
    pub title: Option<String>,
}

pub fn pubchem_page_url(cid: u64) -> String {
    return format!("https://pubchem.ncbi.nlm.nih.gov/compound/{cid}");
}

pub fn rcsb_page_url(pdb_id: &str) -> String {
    return format!(
        "https://www.rcsb.org/structure/{}",
        pdb_id.to_uppercase()
    );
}

/// Canonical PDB accession shape: a non-zero digit then three alphanumerics.
pub fn is_pdb_id(text: &str) -> bool {
    let chars = text.chars().collect::<Vec<char>>();
    if chars.len() != 4 {
        return false;
    }

    return matches!(chars[0], '1'..='9') && chars[1..].iter().all(|c| return c.is_ascii_alphanumeric());
}
