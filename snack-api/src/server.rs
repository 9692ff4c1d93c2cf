use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::api::{admin, orders, snacks};
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::sms::SmsSender;
use crate::infrastructure::storage::UploadStore;
use crate::middleware::admin_auth;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: SqlitePool,
    pub sms: Arc<dyn SmsSender>,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(config: Config, db: SqlitePool, sms: Arc<dyn SmsSender>) -> Self {
        let uploads = UploadStore::new(&config.uploads);
        Self {
            config,
            db,
            sms,
            uploads,
        }
    }
}

pub async fn create_app(state: AppState) -> Result<Router, AppError> {
    state.uploads.ensure_dir().await?;

    let body_limit = state.config.uploads.max_body_bytes;
    let uploads_dir = state.uploads.dir().to_path_buf();
    let uploads_prefix = state.uploads.url_prefix().to_string();
    let app_state = Arc::new(state);

    // 健康检查路由
    let health_route = Router::new().route("/health", get(|| async { "OK" }));

    // API 路由
    let api_routes = Router::new()
        .nest("/snacks", snacks::routes())
        .nest("/orders", orders::routes())
        .nest("/admin", admin::routes());

    // 组合所有路由
    let app = Router::new()
        .nest("/api", api_routes)
        .merge(health_route)
        .nest_service(&uploads_prefix, ServeDir::new(uploads_dir))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            admin_auth::require_admin,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state);

    Ok(app)
}
