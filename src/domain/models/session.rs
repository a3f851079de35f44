use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::Message;
use super::VisualizationLayer;

pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    #[serde(default)]
    pub chat_history: Vec<Message>,
    #[serde(default)]
    pub visualization_layers: Vec<VisualizationLayer>,
    #[serde(default)]
    pub active_layer_id: Option<String>,
}

impl ChatSession {
    pub fn new(title: &str) -> ChatSession {
        let now = Utc::now();
        return ChatSession {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            created_at: now,
            last_modified_at: now,
            chat_history: vec![],
            visualization_layers: vec![],
            active_layer_id: None,
        };
    }

    pub fn touch(&mut self) {
        self.last_modified_at = Utc::now();
    }

    pub fn message(&self, message_id: &str) -> Option<&Message> {
        return self.chat_history.iter().find(|e| return e.id == message_id);
    }

    pub fn message_mut(&mut self, message_id: &str) -> Option<&mut Message> {
        return self
            .chat_history
            .iter_mut()
            .find(|e| return e.id == message_id);
    }

    pub fn layer(&self, layer_id: &str) -> Option<&VisualizationLayer> {
        return self
            .visualization_layers
            .iter()
            .find(|e| return e.layer_id == layer_id);
    }

    pub fn layer_mut(&mut self, layer_id: &str) -> Option<&mut VisualizationLayer> {
        return self
            .visualization_layers
            .iter_mut()
            .find(|e| return e.layer_id == layer_id);
    }

    pub fn active_layer(&self) -> Option<&VisualizationLayer> {
        return self
            .active_layer_id
            .as_ref()
            .and_then(|layer_id| return self.layer(layer_id));
    }

    /// Points `active_layer_id` at the first layer whenever it does not name
    /// a layer in this session, or clears it when there are none.
    pub fn settle_active_layer(&mut self) {
        if self.active_layer().is_none() {
            self.active_layer_id = self
                .visualization_layers
                .first()
                .map(|e| return e.layer_id.to_string());
        }
    }
}
