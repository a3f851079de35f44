use std::sync::Arc;
use std::sync::RwLock;

use anyhow::Result;
use tokio::sync::Mutex;

use super::ChatState;
use super::LocalStore;
use super::ProfileState;
use super::StructureResolver;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendBox;
use crate::domain::models::ResponderName;
use crate::domain::models::StorageRef;
use crate::infrastructure::backends::BackendManager;
use crate::infrastructure::clients::esmfold::EsmFold;
use crate::infrastructure::clients::workflow::WorkflowClient;

/// Everything a command needs, built once at startup and shared between
/// tasks behind an `Arc`.
pub struct AppContext {
    pub config: Config,
    pub resolver: StructureResolver,
    pub esmfold: EsmFold,
    pub workflow: WorkflowClient,
    pub chats: Mutex<ChatState>,
    pub profiles: Mutex<ProfileState>,
    client: reqwest::Client,
    backend: RwLock<Option<Arc<BackendBox>>>,
}

impl AppContext {
    pub fn new(config: Config, storage: StorageRef) -> Result<AppContext> {
        let client = reqwest::Client::new();
        let backend = BackendManager::get(&config, client.clone())?;
        let store = LocalStore::new(storage);

        return Ok(AppContext {
            resolver: StructureResolver::new(client.clone(), &config),
            esmfold: EsmFold::new(client.clone(), &config),
            workflow: WorkflowClient::new(client.clone(), &config),
            chats: Mutex::new(ChatState::load(store.clone())),
            profiles: Mutex::new(ProfileState::load(store)),
            backend: RwLock::new(backend.map(Arc::new)),
            client,
            config,
        });
    }

    /// The language-model backend, if one is configured.
    pub fn backend(&self) -> Option<Arc<BackendBox>> {
        return self
            .backend
            .read()
            .ok()
            .and_then(|backend| return backend.clone());
    }

    /// Rebuilds the backend from the current config, picking up a model
    /// change.
    pub fn reload_backend(&self) -> Result<()> {
        let backend = BackendManager::get(&self.config, self.client.clone())?;
        self.replace_backend(backend);

        return Ok(());
    }

    pub fn replace_backend(&self, backend: Option<BackendBox>) {
        if let Ok(mut current) = self.backend.write() {
            *current = backend.map(Arc::new);
        }
    }

    pub fn responder(&self) -> ResponderName {
        return ResponderName::parse(&self.config.get(ConfigKey::Responder))
            .unwrap_or(ResponderName::Assistant);
    }
}
