use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::{SiteFiles, StorageConfig};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<StorageConfig>,
    pub files: Arc<SiteFiles>,
    pub admin_token: Arc<str>,
    pub cors_origin: Arc<str>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let storage = config.storage();
        Self {
            files: Arc::new(SiteFiles::new(
                storage.site_root.clone(),
                config.files.clone(),
            )),
            storage: Arc::new(storage),
            admin_token: Arc::from(config.admin.resolve_token()),
            cors_origin: Arc::from(config.server.cors_origin.as_str()),
        }
    }
}
