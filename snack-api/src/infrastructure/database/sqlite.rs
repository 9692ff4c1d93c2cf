use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::Config;
use crate::error::AppError;

pub async fn init_sqlite(config: &Config) -> Result<SqlitePool, AppError> {
    tracing::info!(url = %config.database.url, "Initializing SQLite connection pool");

    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // 内存库每个连接都是独立的数据库
    let pool = if config.database.url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.database.max_connections)
    }
    .connect_with(options)
    .await?;

    // 运行迁移
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
