use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use rand::Rng;
use uuid::Uuid;

use crate::{
    dto::auth::{LoginRequest, RegisterRequest, RegisterResponse, SessionResponse, VerifyRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    session::VerifyOutcome,
    state::AppState,
};

/// Stage a registration: nothing is written to the database until the
/// 6-digit code is confirmed through `verify`.
pub async fn register(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_lowercase();
    let phone = payload.phone.trim().to_string();
    let password = payload.password.trim().to_string();

    if name.is_empty() || email.is_empty() || phone.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let code = format!("{}", rand::thread_rng().gen_range(100_000..=999_999));
    let verification_token = state
        .sessions
        .put_pending(name, email.clone(), phone, password, code.clone());

    tracing::info!(email = %email, %verification_token, "verification code issued");

    Ok(ApiResponse::success(
        format!("Verification code: {code}"),
        RegisterResponse {
            verification_token,
            code,
        },
        Some(Meta::empty()),
    ))
}

/// Confirm a staged registration; on success the user row is created and a
/// session is established.
pub async fn verify(
    state: &AppState,
    payload: VerifyRequest,
) -> AppResult<ApiResponse<SessionResponse>> {
    let pending = match state
        .sessions
        .verify_pending(payload.verification_token, payload.code.trim())
    {
        VerifyOutcome::Missing => {
            return Err(AppError::BadRequest(
                "Verification expired or not found. Register again.".to_string(),
            ));
        }
        VerifyOutcome::WrongCode => {
            return Err(AppError::BadRequest("Invalid code".to_string()));
        }
        VerifyOutcome::Verified(pending) => pending,
    };

    let password_hash = hash_password(&pending.password)?;

    let user: User = sqlx::query_as(
        "INSERT INTO users (id, name, email, phone, password_hash) VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(pending.name.as_str())
    .bind(pending.email.as_str())
    .bind(pending.phone.as_str())
    .bind(password_hash)
    .fetch_one(&state.pool)
    .await
    .map_err(|err| match &err {
        // Someone registered the same email while this one sat pending.
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::BadRequest("Email is already taken".to_string())
        }
        _ => AppError::from(err),
    })?;

    let token = state.sessions.create_session(user.id);
    tracing::info!(user_id = %user.id, "user registered");

    Ok(ApiResponse::success(
        "Registration complete",
        SessionResponse { token, user },
        Some(Meta::empty()),
    ))
}

pub async fn login(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<SessionResponse>> {
    let email = payload.email.trim().to_lowercase();
    let password = payload.password.trim();

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let token = state.sessions.create_session(user.id);
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(ApiResponse::success(
        "Logged in",
        SessionResponse { token, user },
        Some(Meta::empty()),
    ))
}

pub fn logout(state: &AppState, user: &AuthUser) -> ApiResponse<serde_json::Value> {
    state.sessions.revoke(user.token);
    tracing::info!(user_id = %user.user_id, "user logged out");
    ApiResponse::message_only("Logged out")
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
