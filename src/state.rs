use std::sync::Arc;

use crate::db::{DbPool, OrmConn};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub sessions: Arc<SessionStore>,
}
