use crate::config::AppConfig;
use crate::db::dialect::Dialect;
use crate::db::pool::DbPool;
use crate::llm::LlmManager;

/// Shared application state: built once at startup, handed to every request
/// handler, torn down at process exit. Nothing in here mutates after
/// construction.
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub llm: LlmManager,
    pub dialect: Dialect,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool, llm: LlmManager, dialect: Dialect) -> Self {
        Self {
            config,
            db,
            llm,
            dialect,
        }
    }
}
