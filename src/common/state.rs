use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;

/// Handles shared by every request. Cloning is cheap: the connection is a
/// pool handle and the config sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}
