use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::services::auth_service::AuthService;
use crate::error::AppError;
use crate::server::AppState;
use crate::utils::extract::ApiJson;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let auth_service = AuthService::new(state.clone());

    let auth_result = auth_service.login(payload.username.trim(), &payload.password)?;

    Ok(Json(LoginResponse {
        success: true,
        token: auth_result.access_token,
        token_type: "Bearer".to_string(),
        expires_in: auth_result.expires_in,
    }))
}
