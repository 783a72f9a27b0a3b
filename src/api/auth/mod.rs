//! Authentication API endpoints
//!
//! Registration, login and the current-token endpoint.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::auth::{LoginCredentials, RegisterCredentials};

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(get_current_user))
}

/// Registration request
///
/// `passwordHash` is accepted for clients of the legacy API, which sent the
/// plaintext password under that name.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    #[serde(alias = "passwordHash")]
    pub password: String,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(alias = "passwordHash")]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
}

/// Claims of the presented token
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub username: String,
    pub email: String,
    pub role: String,
    pub expires_at: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .credential_service
        .register(RegisterCredentials {
            username: request.username,
            email: request.email,
            password: request.password,
        })
        .await?;

    Ok(Json(MessageResponse {
        message: "User registered successfully.".to_string(),
    }))
}

/// POST /api/auth/login
///
/// Returns a signed token on success.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let issued = state
        .credential_service
        .login(LoginCredentials {
            email: request.email,
            password: request.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        expires_at: issued.expires_at().to_rfc3339(),
        token: issued.token,
    }))
}

/// GET /api/auth/me
pub async fn get_current_user(
    RequireUser(claims): RequireUser,
) -> Result<Json<CurrentUserResponse>, ApiError> {
    Ok(Json(CurrentUserResponse {
        expires_at: claims.expires_at().to_rfc3339(),
        username: claims.username,
        email: claims.email,
        role: claims.role,
    }))
}
