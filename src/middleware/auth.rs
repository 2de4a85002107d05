use axum::{extract::FromRequestParts, http::header};
use uuid::Uuid;

use crate::{error::AppError, models::Role, state::AppState};

/// The authenticated caller, resolved from an opaque bearer token via
/// the session store.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

/// Authorization is a plain `Result`; callers propagate the rejection
/// instead of using errors as control flow.
pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Staff)
}

pub fn ensure_owner(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Owner)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthenticated)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthenticated)?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthenticated);
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();
        let token = Uuid::parse_str(token).map_err(|_| AppError::Unauthenticated)?;

        let session = state
            .sessions
            .get(token)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        Ok(AuthUser {
            user_id: session.user_id,
            username: session.username,
            role: session.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff() -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "admin".into(),
            role: Role::Staff,
        }
    }

    #[test]
    fn ensure_role_accepts_matching_role() {
        assert!(ensure_staff(&staff()).is_ok());
    }

    #[test]
    fn ensure_role_rejects_mismatch() {
        assert!(matches!(ensure_owner(&staff()), Err(AppError::Forbidden)));
    }
}
