//! Handler types and dependencies

use std::sync::Arc;

use crate::storage::db::DbPool;
use crate::telegram::sessions::Sessions;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub sessions: Arc<Sessions>,
    /// Bot username resolved at startup, used to build invite deep links
    pub bot_username: Option<String>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(db_pool: Arc<DbPool>, sessions: Arc<Sessions>, bot_username: Option<String>) -> Self {
        Self {
            db_pool,
            sessions,
            bot_username,
        }
    }
}
