use std::sync::Arc;

use super::ProfileState;
use crate::domain::models::format_gpu_time;
use crate::domain::services::LocalStore;
use crate::infrastructure::storage::MemoryStorage;

#[test]
fn it_defaults_the_profile() {
    let state = ProfileState::load(LocalStore::new(Arc::new(MemoryStorage::default())));

    assert_eq!(state.profile().display_name, "Researcher");
    assert_eq!(state.profile().estimated_gpu_usage, 0.0);
}

#[test]
fn it_persists_display_names() {
    let store = LocalStore::new(Arc::new(MemoryStorage::default()));
    let mut state = ProfileState::load(store.clone());

    state.update_display_name("  Rosalind ");
    assert_eq!(ProfileState::load(store.clone()).profile().display_name, "Rosalind");

    state.update_display_name("");
    assert_eq!(ProfileState::load(store).profile().display_name, "Researcher");
}

#[test]
fn it_accrues_and_resets_gpu_usage() {
    let store = LocalStore::new(Arc::new(MemoryStorage::default()));
    let mut state = ProfileState::load(store.clone());

    state.add_gpu_usage(30.0);
    state.add_gpu_usage(45.0);
    state.add_gpu_usage(-10.0);
    assert_eq!(state.profile().estimated_gpu_usage, 75.0);
    assert_eq!(ProfileState::load(store.clone()).profile().estimated_gpu_usage, 75.0);

    state.reset_gpu_usage();
    assert_eq!(ProfileState::load(store).profile().estimated_gpu_usage, 0.0);
}

#[test]
fn it_formats_gpu_time() {
    assert_eq!(format_gpu_time(0.0), "0 sec");
    assert_eq!(format_gpu_time(59.0), "59 sec");
    assert_eq!(format_gpu_time(90.0), "1.5 min");
    assert_eq!(format_gpu_time(3600.0), "1.00 hrs");
    assert_eq!(format_gpu_time(5400.0), "1.50 hrs");
}
