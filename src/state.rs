use crate::{db::DbPool, session::SessionStore};

/// Application context constructed at startup and handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub sessions: SessionStore,
}
