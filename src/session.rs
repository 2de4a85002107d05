//! Session storage behind one interface with two interchangeable
//! backends: an ephemeral in-process map and a persistent `sessions`
//! table. The backend is picked by `SESSION_BACKEND` at startup; no
//! ambient global state is involved.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::OrmConn;
use crate::entity::sessions::{ActiveModel as SessionActive, Entity as Sessions};
use crate::entity::users::Entity as Users;
use crate::error::{AppError, AppResult};
use crate::models::Role;

const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    Database,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

#[derive(Debug)]
pub struct DbSessionStore {
    orm: OrmConn,
}

/// The two backends, dispatched by enum rather than trait objects so
/// the async methods stay plain.
#[derive(Debug)]
pub enum SessionStore {
    Memory(MemorySessionStore),
    Database(DbSessionStore),
}

impl SessionStore {
    pub fn new(backend: SessionBackend, orm: OrmConn) -> Self {
        match backend {
            SessionBackend::Memory => SessionStore::Memory(MemorySessionStore::default()),
            SessionBackend::Database => SessionStore::Database(DbSessionStore { orm }),
        }
    }

    pub fn in_memory() -> Self {
        SessionStore::Memory(MemorySessionStore::default())
    }

    pub async fn create(&self, user_id: i32, username: &str, role: Role) -> AppResult<Uuid> {
        let token = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
        match self {
            SessionStore::Memory(store) => {
                store.sessions.write().await.insert(
                    token,
                    Session {
                        user_id,
                        username: username.to_string(),
                        role,
                        expires_at,
                    },
                );
            }
            SessionStore::Database(store) => {
                SessionActive {
                    id: Set(token),
                    user_id: Set(user_id),
                    expires_at: Set(expires_at.into()),
                    created_at: NotSet,
                }
                .insert(&store.orm)
                .await?;
            }
        }
        Ok(token)
    }

    /// Look up a session, treating expired entries as absent.
    pub async fn get(&self, token: Uuid) -> AppResult<Option<Session>> {
        let now = Utc::now();
        match self {
            SessionStore::Memory(store) => {
                let sessions = store.sessions.read().await;
                Ok(sessions.get(&token).filter(|s| !s.expired(now)).cloned())
            }
            SessionStore::Database(store) => {
                let Some(row) = Sessions::find_by_id(token).one(&store.orm).await? else {
                    return Ok(None);
                };
                let expires_at = row.expires_at.with_timezone(&Utc);
                if now > expires_at {
                    return Ok(None);
                }
                let Some(user) = row.find_related(Users).one(&store.orm).await? else {
                    return Ok(None);
                };
                let role = Role::from_str(&user.role)
                    .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
                Ok(Some(Session {
                    user_id: user.id,
                    username: user.username,
                    role,
                    expires_at,
                }))
            }
        }
    }

    pub async fn delete(&self, token: Uuid) -> AppResult<()> {
        match self {
            SessionStore::Memory(store) => {
                store.sessions.write().await.remove(&token);
            }
            SessionStore::Database(store) => {
                Sessions::delete_by_id(token).exec(&store.orm).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = SessionStore::in_memory();
        let token = store.create(1, "admin", Role::Staff).await.unwrap();

        let session = store.get(token).await.unwrap().expect("session");
        assert_eq!(session.user_id, 1);
        assert_eq!(session.username, "admin");
        assert_eq!(session.role, Role::Staff);

        store.delete(token).await.unwrap();
        assert!(store.get(token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_token_is_none() {
        let store = SessionStore::in_memory();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_sessions_are_absent() {
        let store = SessionStore::in_memory();
        let token = store.create(1, "owner", Role::Owner).await.unwrap();

        if let SessionStore::Memory(inner) = &store {
            inner
                .sessions
                .write()
                .await
                .get_mut(&token)
                .unwrap()
                .expires_at = Utc::now() - Duration::hours(1);
        }

        assert!(store.get(token).await.unwrap().is_none());
    }
}
