use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::User;

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// The code rides along in the response the way the original storefront
/// showed it in a flash message; there is no delivery channel in scope.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub verification_token: Uuid,
    pub code: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct VerifyRequest {
    pub verification_token: Uuid,
    pub code: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: Uuid,
    pub user: User,
}
