use axum::{extract::FromRequestParts, http::header};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Identity resolved from the `Authorization: Bearer <session token>` header
/// against the in-memory session store.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub token: Uuid,
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
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?
            .trim();

        let token = Uuid::parse_str(token).map_err(|_| AppError::Unauthorized)?;

        let user_id = state
            .sessions
            .user_id(token)
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser { user_id, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::http::Request;
    use sqlx::postgres::PgPoolOptions;

    use crate::session::SessionStore;

    fn test_state() -> AppState {
        // Lazy pool: never connects, the extractor only touches the session store.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        AppState {
            pool,
            sessions: SessionStore::new(Duration::from_secs(60)),
        }
    }

    async fn extract(state: &AppState, header: Option<&str>) -> Result<AuthUser, AppError> {
        let mut builder = Request::builder().uri("/api/cart");
        if let Some(value) = header {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).expect("request").into_parts();
        AuthUser::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let state = test_state();
        let err = extract(&state, None).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let state = test_state();
        let err = extract(&state, Some("Basic dXNlcjpwYXNz")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn malformed_token_is_unauthorized() {
        let state = test_state();
        let err = extract(&state, Some("Bearer not-a-token")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let state = test_state();
        let header = format!("Bearer {}", Uuid::new_v4());
        let err = extract(&state, Some(&header)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn live_session_token_resolves_the_user() {
        let state = test_state();
        let user_id = Uuid::new_v4();
        let token = state.sessions.create_session(user_id);

        let header = format!("Bearer {token}");
        let user = extract(&state, Some(&header)).await.expect("extract");
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.token, token);

        state.sessions.revoke(token);
        let err = extract(&state, Some(&header)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}
