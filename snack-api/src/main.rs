use std::sync::Arc;

use anyhow::Context;

use snack_api::config::Config;
use snack_api::infrastructure::database::sqlite::init_sqlite;
use snack_api::infrastructure::sms::TextBeeClient;
use snack_api::logging::init_logging;
use snack_api::server::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 加载配置
    let config = Config::load().context("failed to load configuration")?;

    // 初始化日志
    init_logging(&config)?;

    tracing::info!("Starting snack API");

    if config.sms.api_key.is_empty() || config.sms.device_id.is_empty() {
        tracing::warn!("SMS gateway credentials missing, OTPs will only be logged");
    }
    if config.admin.require_auth && config.admin.jwt_secret == "change-me" {
        tracing::warn!("admin auth is enabled with the default JWT secret");
    }

    // 初始化数据库连接
    let db_pool = init_sqlite(&config).await.context("failed to open database")?;

    let sms = TextBeeClient::new(config.sms.clone()).context("failed to build SMS client")?;

    // 创建应用状态
    let app_state = AppState::new(config.clone(), db_pool, Arc::new(sms));

    // 创建并启动服务器
    let app = create_app(app_state).await?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Listening on {}", &addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
