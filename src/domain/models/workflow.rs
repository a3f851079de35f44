#[cfg(test)]
#[path = "workflow_test.rs"]
mod tests;

use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::is_pdb_id;
use super::MessageContent;

/// The sample URL shipped in setup docs. Treated the same as no URL at all.
pub const PLACEHOLDER_WORKFLOW_URL: &str = "https://your-n8n-instance.com/webhook/your-webhook-id";

const PDB_AGENT: &str = "PDBAgent";
const UPDATE_CANVAS: &str = "update_canvas";

const NOT_PDB_IDS: &[&str] = &[
    "HTTP", "JSON", "HTML", "REST", "API", "URL", "POST", "GET", "PUT", "DELETE", "PDB", "RCSB",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRequest {
    pub chat_input: String,
    pub session_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredReply {
    pub response_text: String,
    pub agent_name: String,
    #[serde(default)]
    pub cmd: Option<String>,
    #[serde(default)]
    pub pdb_id: Option<String>,
    #[serde(default)]
    pub pdb_url: Option<String>,
    #[serde(default)]
    pub protein_name: Option<String>,
    #[serde(default, rename = "proteinDataPDB")]
    pub protein_data_pdb: Option<String>,
}

/// A structure the workflow asked to show on the canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanvasUpdate {
    pub pdb_id: String,
    pub name: Option<String>,
    pub url: Option<String>,
    /// Inline PDB text, when the workflow already downloaded it.
    pub data: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WorkflowReply {
    /// Agent replies carrying `responseText` and `agentName`.
    Structured(StructuredReply),
    /// Replies with a `message`, `response` or `output` field.
    Generic { text: String, cmd: Option<String> },
    /// Valid JSON of any other shape.
    Unrecognized(Value),
    /// Bodies that are not JSON.
    Text(String),
}

fn string_field(record: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    return record
        .get(key)
        .and_then(|e| return e.as_str())
        .map(|e| return e.to_string());
}

fn generic_text(record: &serde_json::Map<String, Value>) -> Option<String> {
    if let Some(message) = string_field(record, "message") {
        return Some(message);
    }

    match record.get("response") {
        Some(Value::String(text)) => return Some(text.to_string()),
        Some(Value::Array(parts)) => {
            let text = parts
                .iter()
                .map(|part| {
                    return part
                        .as_str()
                        .map(|e| return e.to_string())
                        .unwrap_or_else(|| return part.to_string());
                })
                .join("\n");
            return Some(text);
        }
        _ => {}
    }

    return string_field(record, "output");
}

impl WorkflowReply {
    pub fn parse(body: &str) -> WorkflowReply {
        let value = match serde_json::from_str::<Value>(body) {
            Ok(value) => value,
            Err(_) => return WorkflowReply::Text(body.to_string()),
        };

        // Some workflows wrap a single reply in an array.
        let value = match value {
            Value::Array(items) if items.len() == 1 && items[0].is_object() => items[0].clone(),
            other => other,
        };

        let record = match &value {
            Value::Object(record) => record,
            Value::String(text) => return WorkflowReply::Text(text.to_string()),
            _ => return WorkflowReply::Unrecognized(value),
        };

        let has_agent_reply = string_field(record, "responseText").is_some_and(|e| return !e.is_empty())
            && string_field(record, "agentName").is_some_and(|e| return !e.is_empty());
        if has_agent_reply {
            if let Ok(reply) = serde_json::from_value::<StructuredReply>(value.clone()) {
                return WorkflowReply::Structured(reply);
            }
        }

        if let Some(text) = generic_text(record) {
            return WorkflowReply::Generic {
                text,
                cmd: string_field(record, "cmd"),
            };
        }

        return WorkflowReply::Unrecognized(value);
    }

    pub fn content(&self) -> MessageContent {
        match self {
            WorkflowReply::Structured(reply) => return MessageContent::from(reply.response_text.as_str()),
            WorkflowReply::Generic { text, .. } => return MessageContent::from(text.as_str()),
            WorkflowReply::Unrecognized(Value::Object(record)) => {
                return MessageContent::Record(record.clone());
            }
            WorkflowReply::Unrecognized(value) => return MessageContent::from(value.to_string()),
            WorkflowReply::Text(text) => return MessageContent::from(text.as_str()),
        }
    }

    /// Returns the structure to show only when the reply explicitly asks for
    /// a canvas update and a valid PDB ID can be found.
    pub fn canvas_update(&self) -> Option<CanvasUpdate> {
        match self {
            WorkflowReply::Structured(reply) => {
                let signaled = reply.cmd.as_deref() == Some(UPDATE_CANVAS) || reply.agent_name == PDB_AGENT;
                if !signaled {
                    return None;
                }

                let pdb_id = reply
                    .pdb_id
                    .as_ref()
                    .map(|e| return e.trim().to_uppercase())
                    .filter(|e| return is_pdb_id(e))
                    .or_else(|| return first_pdb_id(&reply.response_text))?;

                return Some(CanvasUpdate {
                    pdb_id,
                    name: reply.protein_name.clone().filter(|e| return !e.trim().is_empty()),
                    url: reply.pdb_url.clone().filter(|e| return !e.trim().is_empty()),
                    data: reply
                        .protein_data_pdb
                        .clone()
                        .filter(|e| return !e.trim().is_empty()),
                });
            }
            WorkflowReply::Generic { text, cmd } => {
                if cmd.as_deref() != Some(UPDATE_CANVAS) {
                    return None;
                }

                return first_pdb_id(text).map(|pdb_id| {
                    return CanvasUpdate {
                        pdb_id,
                        name: None,
                        url: None,
                        data: None,
                    };
                });
            }
            _ => return None,
        }
    }
}

fn first_pdb_id(text: &str) -> Option<String> {
    return extract_pdb_ids(text).into_iter().find(|e| return is_pdb_id(e));
}

/// Best-effort scan for uppercase four character accession codes in free
/// text. Common protocol acronyms and single repeated characters are skipped.
pub fn extract_pdb_ids(text: &str) -> Vec<String> {
    return text
        .split(|c: char| return !(c.is_alphanumeric() || c == '_'))
        .filter(|word| {
            return word.len() == 4
                && word
                    .chars()
                    .all(|c| return c.is_ascii_uppercase() || c.is_ascii_digit());
        })
        .filter(|word| return !NOT_PDB_IDS.contains(word))
        .filter(|word| return !word.chars().all_equal())
        .unique()
        .map(|word| return word.to_string())
        .collect();
}
