#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(alias = "copilot")]
    Assistant,
}

/// Message bodies are plain text, or a structured record such as a table
/// returned by a workflow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Record(serde_json::Map<String, serde_json::Value>),
}

impl MessageContent {
    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(text) => return text.is_empty(),
            MessageContent::Record(record) => return record.is_empty(),
        }
    }
}

impl fmt::Display for MessageContent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MessageContent::Text(text) => return write!(f, "{text}"),
            MessageContent::Record(record) => {
                let text = serde_json::to_string_pretty(record).map_err(|_| return fmt::Error)?;
                return write!(f, "{text}");
            }
        }
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> MessageContent {
        return MessageContent::Text(text.to_string());
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> MessageContent {
        return MessageContent::Text(text);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub content: MessageContent,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization_layer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_loading: Option<bool>,
}

impl Message {
    pub fn is_loading(&self) -> bool {
        return self.is_loading.unwrap_or(false);
    }
}

/// The caller-provided half of a message; ids and timestamps are assigned
/// when it is appended to a session.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMessage {
    pub sender: Sender,
    pub content: MessageContent,
    pub is_loading: Option<bool>,
    pub visualization_layer_id: Option<String>,
}

impl NewMessage {
    pub fn user(text: &str) -> NewMessage {
        return NewMessage {
            sender: Sender::User,
            content: MessageContent::from(text),
            is_loading: None,
            visualization_layer_id: None,
        };
    }

    pub fn placeholder() -> NewMessage {
        return NewMessage {
            sender: Sender::Assistant,
            content: MessageContent::from(""),
            is_loading: Some(true),
            visualization_layer_id: None,
        };
    }

    pub fn into_message(self) -> Message {
        return Message {
            id: Uuid::new_v4().to_string(),
            sender: self.sender,
            content: self.content,
            timestamp: Utc::now(),
            visualization_layer_id: self.visualization_layer_id,
            is_loading: self.is_loading,
        };
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessagePatch {
    pub content: Option<MessageContent>,
    pub visualization_layer_id: Option<String>,
    pub is_loading: Option<bool>,
}

impl MessagePatch {
    /// The patch that settles a placeholder with its final answer.
    pub fn finalize(content: MessageContent) -> MessagePatch {
        return MessagePatch {
            content: Some(content),
            visualization_layer_id: None,
            is_loading: Some(false),
        };
    }

    pub fn apply(self, message: &mut Message) {
        if let Some(content) = self.content {
            message.content = content;
        }
        if let Some(layer_id) = self.visualization_layer_id {
            message.visualization_layer_id = Some(layer_id);
        }
        if let Some(is_loading) = self.is_loading {
            message.is_loading = Some(is_loading);
        }
    }
}
