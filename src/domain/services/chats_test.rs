use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use chrono::Utc;

use super::ChatState;
use super::MAX_SESSIONS;
use crate::domain::models::ChatSession;
use crate::domain::models::LayerPatch;
use crate::domain::models::LayerStatus;
use crate::domain::models::LayerType;
use crate::domain::models::MessageContent;
use crate::domain::models::MessagePatch;
use crate::domain::models::NewLayer;
use crate::domain::models::NewMessage;
use crate::domain::models::Storage;
use crate::domain::services::LocalStore;
use crate::infrastructure::storage::MemoryStorage;

fn empty_state() -> (ChatState, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::default());
    let state = ChatState::load(LocalStore::new(storage.clone()));
    return (state, storage);
}

fn stored_sessions(storage: &MemoryStorage) -> Result<Vec<ChatSession>> {
    let payload = storage.get_item("chats")?.unwrap_or_else(|| return "[]".to_string());
    return Ok(serde_json::from_str(&payload)?);
}

#[test]
fn it_starts_without_sessions() {
    let (mut state, _) = empty_state();

    assert!(state.sessions().is_empty());
    assert!(state.active_session().is_none());
    assert!(state.append_message(NewMessage::user("hi")).is_none());
    assert!(!state.patch_message("missing", MessagePatch::default()));
}

#[test]
fn it_creates_numbered_sessions() -> Result<()> {
    let (mut state, storage) = empty_state();

    let first = state.create_session();
    let second = state.create_session();

    assert_eq!(state.active_session_id(), Some(second.to_string()));
    assert_eq!(state.session(&first).unwrap().title, "New Chat 1");
    assert_eq!(state.session(&second).unwrap().title, "New Chat 2");
    assert_eq!(stored_sessions(&storage)?.len(), 2);

    return Ok(());
}

#[test]
fn it_reuses_the_active_session() {
    let (mut state, _) = empty_state();

    let session_id = state.ensure_active_session();
    assert_eq!(state.ensure_active_session(), session_id);
    assert_eq!(state.sessions().len(), 1);
}

#[test]
fn it_appends_and_patches_messages() -> Result<()> {
    let (mut state, storage) = empty_state();
    state.create_session();

    let placeholder = state.append_message(NewMessage::placeholder()).unwrap();
    assert!(state.patch_message(
        &placeholder.id,
        MessagePatch::finalize(MessageContent::from("Found it"))
    ));

    let session = state.active_session().unwrap();
    assert_eq!(session.chat_history.len(), 1);
    assert!(!session.chat_history[0].is_loading());
    assert_eq!(session.chat_history[0].id, placeholder.id);

    let stored = stored_sessions(&storage)?;
    assert_eq!(
        stored[0].chat_history[0].content,
        MessageContent::from("Found it")
    );

    return Ok(());
}

#[test]
fn it_keeps_writing_to_the_original_session() {
    let (mut state, _) = empty_state();
    let first = state.create_session();
    let placeholder = state
        .append_message_in(&first, NewMessage::placeholder())
        .unwrap();

    let second = state.create_session();
    assert!(state.patch_message_in(
        &first,
        &placeholder.id,
        MessagePatch::finalize(MessageContent::from("done"))
    ));

    assert!(state.session(&second).unwrap().chat_history.is_empty());
    assert_eq!(
        state.session(&first).unwrap().chat_history[0].content,
        MessageContent::from("done")
    );
}

#[test]
fn it_activates_added_layers() {
    let (mut state, _) = empty_state();
    state.create_session();

    let first = state
        .add_layer(NewLayer::pending("m1", "Loading...", LayerType::Molecule3d))
        .unwrap();
    let second = state
        .add_layer(NewLayer::pending("m2", "Loading...", LayerType::Protein3d))
        .unwrap();

    let session = state.active_session().unwrap();
    assert_eq!(session.visualization_layers.len(), 2);
    assert_eq!(session.active_layer_id, Some(second.layer_id.to_string()));

    assert!(state.set_active_layer(Some(&first.layer_id)));
    assert!(!state.set_active_layer(Some("missing")));
    assert_eq!(
        state.active_session().unwrap().active_layer_id,
        Some(first.layer_id.to_string())
    );

    assert!(state.set_active_layer(None));
    assert_eq!(state.active_session().unwrap().active_layer_id, None);
}

#[test]
fn it_patches_layers() {
    let (mut state, _) = empty_state();
    state.create_session();
    let layer = state
        .add_layer(NewLayer::pending("m1", "Loading...", LayerType::Molecule3d))
        .unwrap();

    assert!(state.patch_layer(&layer.layer_id, LayerPatch::error("No structure found")));
    assert!(!state.patch_layer("missing", LayerPatch::default()));

    let session = state.active_session().unwrap();
    assert_eq!(session.visualization_layers[0].status, LayerStatus::Error);
}

#[test]
fn it_repoints_the_active_layer_on_removal() {
    let (mut state, _) = empty_state();
    state.create_session();
    let first = state
        .add_layer(NewLayer::pending("m1", "A", LayerType::Molecule3d))
        .unwrap();
    let second = state
        .add_layer(NewLayer::pending("m2", "B", LayerType::Molecule3d))
        .unwrap();
    let third = state
        .add_layer(NewLayer::pending("m3", "C", LayerType::Molecule3d))
        .unwrap();

    assert!(state.remove_layer(&third.layer_id));
    assert_eq!(
        state.active_session().unwrap().active_layer_id,
        Some(first.layer_id.to_string())
    );

    state.set_active_layer(Some(&second.layer_id));
    assert!(state.remove_layer(&first.layer_id));
    assert_eq!(
        state.active_session().unwrap().active_layer_id,
        Some(second.layer_id.to_string())
    );

    assert!(state.remove_layer(&second.layer_id));
    assert!(!state.remove_layer(&second.layer_id));
    assert_eq!(state.active_session().unwrap().active_layer_id, None);
}

#[test]
fn it_renames_sessions() {
    let (mut state, _) = empty_state();
    let session_id = state.create_session();

    assert!(state.rename_session(&session_id, "Kinases"));
    assert_eq!(state.session(&session_id).unwrap().title, "Kinases");

    assert!(state.rename_session(&session_id, "   "));
    assert_eq!(state.session(&session_id).unwrap().title, "New Chat");

    assert!(!state.rename_session("missing", "Nope"));
}

#[test]
fn it_falls_back_to_the_latest_session_on_delete() {
    let (mut state, _) = empty_state();
    let first = state.create_session();
    let second = state.create_session();

    assert!(state.delete_session(&second));
    assert!(!state.delete_session(&second));
    assert_eq!(state.active_session_id(), Some(first.to_string()));

    assert!(state.delete_session(&first));
    assert_eq!(state.active_session_id(), None);
}

#[test]
fn it_clears_every_session() -> Result<()> {
    let (mut state, storage) = empty_state();
    state.create_session();
    state.create_session();

    state.clear();

    assert!(state.sessions().is_empty());
    assert_eq!(state.active_session_id(), None);
    assert_eq!(storage.get_item("chats")?, None);

    return Ok(());
}

#[test]
fn it_evicts_the_least_recently_modified() -> Result<()> {
    let storage = Arc::new(MemoryStorage::default());
    let now = Utc::now();
    let sessions = (0..MAX_SESSIONS)
        .map(|idx| {
            let mut session = ChatSession::new(&format!("Chat {idx}"));
            session.last_modified_at = now - Duration::minutes(idx as i64 + 1);
            return session;
        })
        .collect::<Vec<ChatSession>>();
    let oldest = sessions[MAX_SESSIONS - 1].id.to_string();
    storage.set_item("chats", &serde_json::to_string(&sessions)?)?;

    let mut state = ChatState::load(LocalStore::new(storage.clone()));
    assert_eq!(state.sessions().len(), MAX_SESSIONS);

    let newest = state.create_session();
    assert_eq!(state.sessions().len(), MAX_SESSIONS);
    assert!(state.session(&oldest).is_none());
    assert_eq!(state.sessions()[0].id, newest);
    assert_eq!(stored_sessions(&storage)?.len(), MAX_SESSIONS);

    return Ok(());
}

#[test]
fn it_orders_loaded_sessions_by_modification() -> Result<()> {
    let storage = Arc::new(MemoryStorage::default());
    let mut older = ChatSession::new("Older");
    older.last_modified_at = Utc::now() - Duration::hours(1);
    let newer = ChatSession::new("Newer");
    storage.set_item("chats", &serde_json::to_string(&vec![older, newer.clone()])?)?;

    let state = ChatState::load(LocalStore::new(storage));

    assert_eq!(state.sessions()[0].title, "Newer");
    assert_eq!(state.active_session_id(), Some(newer.id));

    return Ok(());
}

#[test]
fn it_exports_and_imports_sessions() -> Result<()> {
    let (mut state, _) = empty_state();
    let session_id = state.create_session();
    state.append_message(NewMessage::user("show caffeine"));

    let payload = state.export_session(&session_id).unwrap();
    assert!(state.export_session("missing").is_none());

    let imported = state.import_session(&payload)?;
    assert_ne!(imported, session_id);
    assert_eq!(state.active_session_id(), Some(imported.to_string()));

    let session = state.session(&imported).unwrap();
    assert_eq!(session.title, "New Chat 1 (Imported)");
    assert_eq!(session.chat_history.len(), 1);
    assert_eq!(state.sessions().len(), 2);

    let original = state.session(&session_id).unwrap();
    assert_eq!(original.title, "New Chat 1");
    assert_eq!(original.chat_history.len(), 1);

    return Ok(());
}

#[test]
fn it_imports_new_ids_as_is() -> Result<()> {
    let (mut state, _) = empty_state();
    let session = ChatSession::new("Shared");
    let payload = serde_json::to_string(&session)?;

    let imported = state.import_session(&payload)?;

    assert_eq!(imported, session.id);
    assert_eq!(state.session(&imported).unwrap().title, "Shared");

    return Ok(());
}

#[test]
fn it_clears_dangling_active_layers_on_import() -> Result<()> {
    let (mut state, storage) = empty_state();
    let mut session = ChatSession::new("Shared");
    session.active_layer_id = Some("ghost-layer".to_string());
    let payload = serde_json::to_string(&session)?;

    let imported = state.import_session(&payload)?;

    assert_eq!(state.session(&imported).unwrap().active_layer_id, None);
    assert_eq!(stored_sessions(&storage)?[0].active_layer_id, None);

    return Ok(());
}

#[test]
fn it_repoints_dangling_active_layers_on_load() -> Result<()> {
    let storage = Arc::new(MemoryStorage::default());
    let mut session = ChatSession::new("Shared");
    let layer = NewLayer::pending("m1", "Caffeine", LayerType::Molecule3d).into_layer();
    session.visualization_layers.push(layer.clone());
    session.active_layer_id = Some("ghost-layer".to_string());
    storage.set_item("chats", &serde_json::to_string(&vec![session])?)?;

    let state = ChatState::load(LocalStore::new(storage));

    let session = state.active_session().unwrap();
    assert_eq!(session.active_layer_id, Some(layer.layer_id.to_string()));
    assert_eq!(session.active_layer(), Some(&layer));

    return Ok(());
}

#[test]
fn it_rejects_invalid_imports() {
    let (mut state, _) = empty_state();

    assert!(state.import_session("{}").is_err());
    assert!(state.sessions().is_empty());
}
