use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;

use super::FileStorage;
use crate::domain::models::Storage;
use crate::domain::services::ChatState;
use crate::domain::services::LocalStore;

#[test]
fn it_round_trips_items() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = FileStorage::new(dir.path().join("nested"));

    assert_eq!(storage.get_item("chats")?, None);

    storage.set_item("chats", "[]")?;
    assert_eq!(storage.get_item("chats")?, Some("[]".to_string()));
    assert!(dir.path().join("nested/chats.json").exists());

    storage.set_item("chats", r#"[{"id": "1"}]"#)?;
    assert_eq!(storage.get_item("chats")?, Some(r#"[{"id": "1"}]"#.to_string()));

    return Ok(());
}

#[test]
fn it_removes_items() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = FileStorage::new(dir.path().to_path_buf());

    storage.remove_item("profile")?;
    storage.set_item("profile", "{}")?;
    storage.remove_item("profile")?;

    assert_eq!(storage.get_item("profile")?, None);

    return Ok(());
}

#[test]
fn it_rejects_path_like_keys() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = FileStorage::new(dir.path().to_path_buf());

    assert!(storage.set_item("../escape", "{}").is_err());
    assert!(storage.get_item("").is_err());

    return Ok(());
}

#[tokio::test]
async fn it_writes_through_while_the_lock_is_held() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(FileStorage::new(dir.path().to_path_buf()));
    let chats = Mutex::new(ChatState::load(LocalStore::new(storage.clone())));

    let mut state = chats.lock().await;
    let session_id = state.create_session();

    let payload = storage.get_item("chats")?.unwrap_or_default();
    assert!(payload.contains(&session_id));
    assert!(!dir.path().join("chats.json.tmp").exists());
    drop(state);

    let reloaded = ChatState::load(LocalStore::new(storage));
    assert_eq!(reloaded.active_session_id(), Some(session_id));

    return Ok(());
}
