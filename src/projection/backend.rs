//! 投影存储后端
//!
//! 视图合成器只依赖这个trait：执行一组DDL（作为单个事务）以及读取视图结构

use crate::error::{DynViewError, DynViewResult};
use async_trait::async_trait;
use rat_logger::debug;
use sqlx::{Row, SqlitePool};

/// 已存在视图的结构描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDescription {
    /// 视图名
    pub name: String,
    /// 列名（按顺序）
    pub columns: Vec<String>,
    /// 存储层记录的建视图语句
    pub sql: String,
}

/// 投影存储后端
#[async_trait]
pub trait ProjectionBackend: Send + Sync {
    /// 以单个事务执行一组DDL：全部成功或全部回滚
    async fn apply_ddl(&self, statements: &[String]) -> DynViewResult<()>;

    /// 读取视图结构，视图不存在时返回 `None`
    async fn describe_view(&self, view: &str) -> DynViewResult<Option<ViewDescription>>;
}

/// SQLite投影后端
///
/// SQLite的DDL是事务性的，DROP + CREATE 在同一事务中提交，
/// 失败时旧视图原样保留
#[derive(Debug, Clone)]
pub struct SqliteProjectionBackend {
    pool: SqlitePool,
}

impl SqliteProjectionBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ProjectionBackend for SqliteProjectionBackend {
    async fn apply_ddl(&self, statements: &[String]) -> DynViewResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| DynViewError::QueryError {
            message: format!("开启SQLite事务失败: {}", e),
        })?;

        for sql in statements {
            debug!("执行SQLite投影DDL: {}", sql);
            sqlx::query(sql)
                .persistent(false)
                .execute(&mut *tx)
                .await
                .map_err(|e| DynViewError::QueryError {
                    message: format!("执行DDL失败: {}", e),
                })?;
            // 出错时 tx 被丢弃，自动回滚
        }

        tx.commit().await.map_err(|e| DynViewError::QueryError {
            message: format!("提交SQLite事务失败: {}", e),
        })?;

        Ok(())
    }

    async fn describe_view(&self, view: &str) -> DynViewResult<Option<ViewDescription>> {
        let row = sqlx::query("SELECT sql FROM sqlite_master WHERE type = 'view' AND name = ?")
            .bind(view)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DynViewError::QueryError {
                message: format!("查询SQLite视图定义失败: {}", e),
            })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let sql: String = row.try_get("sql").map_err(|e| DynViewError::QueryError {
            message: format!("解析SQLite视图定义失败: {}", e),
        })?;

        let pragma = format!(
            "PRAGMA table_info({})",
            crate::security::IdentifierValidator::quote_identifier(view)
        );
        let rows = sqlx::query(&pragma)
            .persistent(false)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DynViewError::QueryError {
                message: format!("读取SQLite视图列失败: {}", e),
            })?;

        let columns = rows
            .iter()
            .map(|r| r.try_get::<String, _>("name"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DynViewError::QueryError {
                message: format!("解析SQLite视图列失败: {}", e),
            })?;

        Ok(Some(ViewDescription {
            name: view.to_string(),
            columns,
            sql,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseSettings;
    use crate::pool::open_sqlite_pool;

    async fn backend() -> SqliteProjectionBackend {
        let pool = open_sqlite_pool(&DatabaseSettings::in_memory()).await.unwrap();
        sqlx::query("CREATE TABLE base (id INTEGER PRIMARY KEY, body TEXT)")
            .execute(&pool)
            .await
            .unwrap();
        SqliteProjectionBackend::new(pool)
    }

    #[tokio::test]
    async fn test_apply_and_describe() {
        let backend = backend().await;
        assert!(backend.describe_view("v").await.unwrap().is_none());

        backend
            .apply_ddl(&["DROP VIEW IF EXISTS v".to_string(), "CREATE VIEW v AS SELECT id, body FROM base".to_string()])
            .await
            .unwrap();

        let description = backend.describe_view("v").await.unwrap().unwrap();
        assert_eq!(description.columns, vec!["id", "body"]);
        assert!(description.sql.starts_with("CREATE VIEW v"));
    }

    #[tokio::test]
    async fn test_failed_batch_rolls_back_drop() {
        let backend = backend().await;
        backend
            .apply_ddl(&["CREATE VIEW v AS SELECT id FROM base".to_string()])
            .await
            .unwrap();

        // DROP 成功但 CREATE 语法错误：整个批次回滚，旧视图保留
        let result = backend
            .apply_ddl(&["DROP VIEW IF EXISTS v".to_string(), "CREATE VIEW v AS SELEC id FROM base".to_string()])
            .await;
        assert!(result.is_err());

        let description = backend.describe_view("v").await.unwrap().unwrap();
        assert_eq!(description.columns, vec!["id"]);
    }
}
