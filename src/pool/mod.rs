//! 连接池模块
//!
//! 为基表、投影视图与记录读写提供共享的SQLite连接池

use crate::config::DatabaseSettings;
use crate::error::{DynViewError, DynViewResult};
use rat_logger::info;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

/// 创建SQLite连接池
///
/// 内存数据库直接连接且连接永不回收（回收即丢库）；
/// 文件数据库在允许时自动创建父目录和文件
pub async fn open_sqlite_pool(settings: &DatabaseSettings) -> DynViewResult<SqlitePool> {
    let path = settings.path.as_str();

    // 特殊处理内存数据库：直接连接，不创建文件
    if path == ":memory:" {
        info!("连接SQLite内存数据库");
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DynViewError::ConnectionError { message: e.to_string() })?;
        return SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DynViewError::ConnectionError { message: e.to_string() });
    }

    // 检查数据库文件是否存在
    let file_exists = std::path::Path::new(path).exists();

    // 如果文件不存在且不允许创建，则返回错误
    if !file_exists && !settings.create_if_missing {
        return Err(DynViewError::ConnectionError {
            message: crate::i18n::tf("error.sqlite_file_not_found", &[("path", path)]),
        });
    }

    // 如果需要创建文件且文件不存在，则创建父目录
    if settings.create_if_missing && !file_exists {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(settings.create_if_missing);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| DynViewError::ConnectionError { message: e.to_string() })?;

    info!("连接SQLite数据库: 路径={}, 最大连接数={}", path, settings.max_connections);
    Ok(pool)
}
