use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::domain::services::auth_service::AuthService;
use crate::error::AppError;
use crate::server::AppState;

/// Requires an admin Bearer token on every route that is not shopper-facing,
/// when `admin.require_auth` is on.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.admin.require_auth
        || is_public(request.method(), request.uri().path(), state.uploads.url_prefix())
    {
        return Ok(next.run(request).await);
    }

    // 从请求头获取令牌
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    // 验证令牌
    let auth_service = AuthService::new(state.clone());
    let admin = auth_service.validate_token(token)?;

    request.extensions_mut().insert(admin);

    Ok(next.run(request).await)
}

fn is_public(method: &Method, path: &str, uploads_prefix: &str) -> bool {
    if method == Method::OPTIONS || !path.starts_with("/api/") {
        return true;
    }
    if path.starts_with(uploads_prefix) {
        return true;
    }

    match *method {
        Method::GET | Method::HEAD => path == "/api/snacks" || path.starts_with("/api/snacks/"),
        Method::POST => matches!(
            path,
            "/api/orders/otp/send" | "/api/orders/place" | "/api/admin/login"
        ),
        _ => false,
    }
}
