use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::locale::LocaleCookie;
use crate::portal::{BlobStore, RowStore};

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn RowStore>,
    pub blobs: Arc<dyn BlobStore>,
    /// Present when the row store is Postgres; used by the health check.
    pub database: Option<DatabaseManager>,
    pub locale_cookie: Arc<LocaleCookie>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn RowStore>, blobs: Arc<dyn BlobStore>) -> Self {
        let locale_cookie = Arc::new(config.locale_cookie());
        Self {
            config,
            store,
            blobs,
            database: None,
            locale_cookie,
        }
    }

    pub fn with_database(mut self, database: DatabaseManager) -> Self {
        self.database = Some(database);
        self
    }
}
