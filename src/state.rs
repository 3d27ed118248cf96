//! Application state shared by every worker.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::pdf::DevisPdfGenerator;
use crate::storage::{DocumentStorage, LocalStorage, StorageError};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: Arc<dyn DocumentStorage>,
    pub generator: DevisPdfGenerator,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Arc<dyn DocumentStorage>) -> Self {
        Self {
            config,
            storage,
            generator: DevisPdfGenerator::new(),
        }
    }

    /// State backed by `config.output_dir`, created if missing.
    pub fn with_local_storage(config: AppConfig) -> Result<Self, StorageError> {
        let storage = LocalStorage::new(config.output_dir.clone());
        storage.ensure_root()?;
        log::info!("PDF output directory: {}", storage.root().display());
        Ok(Self::new(config, Arc::new(storage)))
    }
}
