#[cfg(test)]
#[path = "profiles_test.rs"]
mod tests;

use super::local_store::PROFILE_KEY;
use super::LocalStore;
use crate::domain::models::Profile;
use crate::domain::models::DEFAULT_DISPLAY_NAME;

pub struct ProfileState {
    store: LocalStore,
    profile: Profile,
}

impl ProfileState {
    pub fn load(store: LocalStore) -> ProfileState {
        let profile = store.read::<Profile>(PROFILE_KEY).unwrap_or_default();
        return ProfileState { store, profile };
    }

    pub fn profile(&self) -> &Profile {
        return &self.profile;
    }

    /// An empty name resets to the default.
    pub fn update_display_name(&mut self, name: &str) {
        let name = name.trim();
        self.profile.display_name = if name.is_empty() {
            DEFAULT_DISPLAY_NAME.to_string()
        } else {
            name.to_string()
        };
        self.commit();
    }

    pub fn add_gpu_usage(&mut self, seconds: f64) {
        if !seconds.is_finite() || seconds <= 0.0 {
            return;
        }

        self.profile.estimated_gpu_usage += seconds;
        self.commit();
    }

    pub fn reset_gpu_usage(&mut self) {
        self.profile.estimated_gpu_usage = 0.0;
        self.commit();
    }

    fn commit(&self) {
        if let Err(err) = self.store.write(PROFILE_KEY, &self.profile) {
            tracing::error!(error = ?err, "Failed to persist profile");
        }
    }
}
