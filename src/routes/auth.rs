use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::auth::{LoginRequest, RegisterRequest, RegisterResponse, SessionResponse, VerifyRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify", post(verify))
        .route("/login", post(login))
        .route("/logout", get(logout_confirm).post(logout))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registration staged, verification code issued", body = ApiResponse<RegisterResponse>),
        (status = 400, description = "Missing fields or duplicate email"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<RegisterResponse>>> {
    let resp = auth_service::register(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "User created and logged in", body = ApiResponse<SessionResponse>),
        (status = 400, description = "Wrong code or expired registration"),
    ),
    tag = "Auth"
)]
pub async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> AppResult<Json<ApiResponse<SessionResponse>>> {
    let resp = auth_service::verify(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<SessionResponse>),
        (status = 400, description = "Invalid credentials"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<SessionResponse>>> {
    let resp = auth_service::login(&state, payload).await?;
    Ok(Json(resp))
}

// The GET step only confirms; the actual logout is POST so that a bare link
// cannot end the session.
#[utoipa::path(
    get,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout confirmation prompt", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not logged in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout_confirm(_user: AuthUser) -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::message_only(
        "POST to /api/auth/logout to end the session",
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not logged in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<ApiResponse<serde_json::Value>> {
    Json(auth_service::logout(&state, &user))
}
