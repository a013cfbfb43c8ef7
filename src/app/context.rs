use crate::domain::{ContextConfig, RepositoryHandle};
use crate::ports::ForgePort;

/// Dependencies shared by the context views.
pub struct AppContext<F: ForgePort> {
    forge: F,
    repository: RepositoryHandle,
    settings: ContextConfig,
}

impl<F: ForgePort> AppContext<F> {
    pub fn new(forge: F, repository: RepositoryHandle, settings: ContextConfig) -> Self {
        Self { forge, repository, settings }
    }

    /// Get a reference to the forge client.
    pub fn forge(&self) -> &F {
        &self.forge
    }

    pub fn repository(&self) -> &RepositoryHandle {
        &self.repository
    }

    /// Limits and filters applied while gathering.
    pub fn settings(&self) -> &ContextConfig {
        &self.settings
    }
}
