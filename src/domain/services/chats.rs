#[cfg(test)]
#[path = "chats_test.rs"]
mod tests;

use anyhow::Result;
use uuid::Uuid;

use super::local_store::CHATS_KEY;
use super::LocalStore;
use crate::domain::models::ChatSession;
use crate::domain::models::LayerPatch;
use crate::domain::models::Message;
use crate::domain::models::MessagePatch;
use crate::domain::models::NewLayer;
use crate::domain::models::NewMessage;
use crate::domain::models::VisualizationLayer;
use crate::domain::models::DEFAULT_CHAT_TITLE;

pub const MAX_SESSIONS: usize = 50;

/// Sorts most recently modified first and drops everything past the cap.
pub fn prune_sessions(sessions: &mut Vec<ChatSession>) {
    sessions.sort_by(|a, b| return b.last_modified_at.cmp(&a.last_modified_at));
    sessions.truncate(MAX_SESSIONS);
}

/// Owns the session collection and the active session pointer. Every
/// mutation refreshes `lastModifiedAt`, prunes, and writes the collection
/// back to the local store.
///
/// Operations without a session id act on the active session. The `*_in`
/// variants target a specific session, so work started in one session keeps
/// landing there after the user switches away.
pub struct ChatState {
    store: LocalStore,
    sessions: Vec<ChatSession>,
    active_session_id: Option<String>,
}

impl ChatState {
    pub fn load(store: LocalStore) -> ChatState {
        let mut sessions = store.read::<Vec<ChatSession>>(CHATS_KEY).unwrap_or_default();
        prune_sessions(&mut sessions);
        for session in sessions.iter_mut() {
            session.settle_active_layer();
        }
        let active_session_id = sessions.first().map(|e| return e.id.to_string());

        return ChatState {
            store,
            sessions,
            active_session_id,
        };
    }

    pub fn sessions(&self) -> &[ChatSession] {
        return &self.sessions;
    }

    pub fn session(&self, session_id: &str) -> Option<&ChatSession> {
        return self.sessions.iter().find(|e| return e.id == session_id);
    }

    pub fn active_session_id(&self) -> Option<String> {
        return self.active_session_id.clone();
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        return self
            .active_session_id
            .as_ref()
            .and_then(|session_id| return self.session(session_id));
    }

    pub fn create_session(&mut self) -> String {
        let session = ChatSession::new(&format!(
            "{DEFAULT_CHAT_TITLE} {}",
            self.sessions.len() + 1
        ));
        let session_id = session.id.to_string();

        self.sessions.insert(0, session);
        self.active_session_id = Some(session_id.to_string());
        self.commit();

        return session_id;
    }

    /// Returns the active session id, creating a session when there is none.
    pub fn ensure_active_session(&mut self) -> String {
        if let Some(session) = self.active_session() {
            return session.id.to_string();
        }

        return self.create_session();
    }

    pub fn select_session(&mut self, session_id: &str) -> bool {
        if self.session(session_id).is_none() {
            return false;
        }

        self.active_session_id = Some(session_id.to_string());
        return true;
    }

    pub fn append_message(&mut self, message: NewMessage) -> Option<Message> {
        let session_id = self.active_session_id.clone()?;
        return self.append_message_in(&session_id, message);
    }

    pub fn append_message_in(&mut self, session_id: &str, message: NewMessage) -> Option<Message> {
        return self.mutate(session_id, |session| {
            let message = message.into_message();
            session.chat_history.push(message.clone());
            return Some(message);
        });
    }

    pub fn patch_message(&mut self, message_id: &str, patch: MessagePatch) -> bool {
        let Some(session_id) = self.active_session_id.clone() else {
            return false;
        };
        return self.patch_message_in(&session_id, message_id, patch);
    }

    pub fn patch_message_in(&mut self, session_id: &str, message_id: &str, patch: MessagePatch) -> bool {
        return self
            .mutate(session_id, |session| {
                let message = session.message_mut(message_id)?;
                patch.apply(message);
                return Some(());
            })
            .is_some();
    }

    /// Appends a layer and makes it the active one.
    pub fn add_layer(&mut self, layer: NewLayer) -> Option<VisualizationLayer> {
        let session_id = self.active_session_id.clone()?;
        return self.add_layer_in(&session_id, layer);
    }

    pub fn add_layer_in(&mut self, session_id: &str, layer: NewLayer) -> Option<VisualizationLayer> {
        return self.mutate(session_id, |session| {
            let layer = layer.into_layer();
            session.active_layer_id = Some(layer.layer_id.to_string());
            session.visualization_layers.push(layer.clone());
            return Some(layer);
        });
    }

    pub fn patch_layer(&mut self, layer_id: &str, patch: LayerPatch) -> bool {
        let Some(session_id) = self.active_session_id.clone() else {
            return false;
        };
        return self.patch_layer_in(&session_id, layer_id, patch);
    }

    pub fn patch_layer_in(&mut self, session_id: &str, layer_id: &str, patch: LayerPatch) -> bool {
        return self
            .mutate(session_id, |session| {
                let layer = session.layer_mut(layer_id)?;
                patch.apply(layer);
                return Some(());
            })
            .is_some();
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> bool {
        let Some(session_id) = self.active_session_id.clone() else {
            return false;
        };
        return self.remove_layer_in(&session_id, layer_id);
    }

    pub fn remove_layer_in(&mut self, session_id: &str, layer_id: &str) -> bool {
        return self
            .mutate(session_id, |session| {
                session.layer(layer_id)?;
                session
                    .visualization_layers
                    .retain(|e| return e.layer_id != layer_id);

                session.settle_active_layer();

                return Some(());
            })
            .is_some();
    }

    /// Points the active session at a layer, or at nothing. Unknown layer ids
    /// are rejected.
    pub fn set_active_layer(&mut self, layer_id: Option<&str>) -> bool {
        let Some(session_id) = self.active_session_id.clone() else {
            return false;
        };
        return self.set_active_layer_in(&session_id, layer_id);
    }

    pub fn set_active_layer_in(&mut self, session_id: &str, layer_id: Option<&str>) -> bool {
        return self
            .mutate(session_id, |session| {
                if let Some(layer_id) = layer_id {
                    session.layer(layer_id)?;
                }
                session.active_layer_id = layer_id.map(|e| return e.to_string());
                return Some(());
            })
            .is_some();
    }

    pub fn rename_session(&mut self, session_id: &str, title: &str) -> bool {
        return self
            .mutate(session_id, |session| {
                let title = title.trim();
                session.title = if title.is_empty() {
                    DEFAULT_CHAT_TITLE.to_string()
                } else {
                    title.to_string()
                };
                return Some(());
            })
            .is_some();
    }

    pub fn delete_session(&mut self, session_id: &str) -> bool {
        let count = self.sessions.len();
        self.sessions.retain(|e| return e.id != session_id);
        if self.sessions.len() == count {
            return false;
        }

        self.commit();
        return true;
    }

    /// Drops every session along with the persisted collection.
    pub fn clear(&mut self) {
        self.sessions.clear();
        self.active_session_id = None;

        if let Err(err) = self.store.remove(CHATS_KEY) {
            tracing::error!(error = ?err, "Failed to remove chat sessions");
        }
    }

    pub fn export_session(&self, session_id: &str) -> Option<String> {
        let session = self.session(session_id)?;
        match serde_json::to_string_pretty(session) {
            Ok(payload) => return Some(payload),
            Err(err) => {
                tracing::error!(session_id, error = ?err, "Failed to serialize session");
                return None;
            }
        }
    }

    /// Adds a previously exported session and makes it active. An id that
    /// already exists gets a fresh id and an "(Imported)" title suffix.
    pub fn import_session(&mut self, payload: &str) -> Result<String> {
        let mut session: ChatSession = serde_json::from_str(payload)?;
        if self.session(&session.id).is_some() {
            session.id = Uuid::new_v4().to_string();
            session.title = format!("{} (Imported)", session.title);
        }
        session.settle_active_layer();
        session.touch();

        let session_id = session.id.to_string();
        self.sessions.insert(0, session);
        self.active_session_id = Some(session_id.to_string());
        self.commit();

        return Ok(session_id);
    }

    fn mutate<T, F>(&mut self, session_id: &str, f: F) -> Option<T>
    where
        F: FnOnce(&mut ChatSession) -> Option<T>,
    {
        let session = self.sessions.iter_mut().find(|e| return e.id == session_id)?;
        let res = f(session)?;
        session.touch();
        self.commit();

        return Some(res);
    }

    fn commit(&mut self) {
        prune_sessions(&mut self.sessions);

        let active_exists = self
            .active_session_id
            .as_ref()
            .is_some_and(|session_id| return self.sessions.iter().any(|e| return &e.id == session_id));
        if !active_exists {
            self.active_session_id = self.sessions.first().map(|e| return e.id.to_string());
        }

        if let Err(err) = self.store.write(CHATS_KEY, &self.sessions) {
            tracing::error!(error = ?err, "Failed to persist chat sessions");
        }
    }
}
