//! 记录存储
//!
//! 基表的增删改查。载荷按JSON文本保存，读取时无法解析的载荷视为缺失。

use super::record::Record;
use crate::config::ProjectionConfig;
use crate::error::{DynViewError, DynViewResult};
use crate::security::IdentifierValidator;
use chrono::{DateTime, Utc};
use rat_logger::{debug, warn};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// 记录存储
#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
    config: ProjectionConfig,
}

impl RecordStore {
    pub fn new(pool: SqlitePool, config: ProjectionConfig) -> Self {
        Self { pool, config }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    fn table(&self) -> String {
        IdentifierValidator::quote_identifier(&self.config.base_table)
    }

    fn select_columns(&self) -> String {
        self.config
            .reserved_columns()
            .iter()
            .map(|c| IdentifierValidator::quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// 创建基表（已存在时不做任何事）
    pub async fn ensure_schema(&self) -> DynViewResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({} INTEGER PRIMARY KEY AUTOINCREMENT, {} TEXT NULL, {} TEXT NOT NULL, {} TEXT NOT NULL)",
            self.table(),
            IdentifierValidator::quote_identifier(&self.config.id_column),
            IdentifierValidator::quote_identifier(&self.config.payload_column),
            IdentifierValidator::quote_identifier(&self.config.created_column),
            IdentifierValidator::quote_identifier(&self.config.updated_column),
        );
        debug!("创建基表SQL: {}", sql);

        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| DynViewError::QueryError {
                message: format!("创建基表失败: {}", e),
            })?;
        Ok(())
    }

    /// 插入一条记录，两个时间戳都取当前时间
    pub async fn create(&self, payload: Option<Value>) -> DynViewResult<Record> {
        let now = Utc::now();
        let payload_text = encode_payload(payload.as_ref())?;

        let sql = format!(
            "INSERT INTO {} ({}, {}, {}) VALUES (?, ?, ?)",
            self.table(),
            IdentifierValidator::quote_identifier(&self.config.payload_column),
            IdentifierValidator::quote_identifier(&self.config.created_column),
            IdentifierValidator::quote_identifier(&self.config.updated_column),
        );

        let result = sqlx::query(&sql)
            .bind(payload_text)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| DynViewError::QueryError {
                message: format!("插入记录失败: {}", e),
            })?;

        Ok(Record {
            id: result.last_insert_rowid(),
            payload,
            created_at: now,
            updated_at: now,
        })
    }

    /// 按标识查找
    pub async fn find_by_id(&self, id: i64) -> DynViewResult<Option<Record>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            self.select_columns(),
            self.table(),
            IdentifierValidator::quote_identifier(&self.config.id_column)
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DynViewError::QueryError {
                message: format!("查询记录失败: {}", e),
            })?;

        row.map(|r| self.decode_record(&r)).transpose()
    }

    /// 全部记录，按标识升序
    pub async fn list(&self) -> DynViewResult<Vec<Record>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            self.select_columns(),
            self.table(),
            IdentifierValidator::quote_identifier(&self.config.id_column)
        );

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DynViewError::QueryError {
                message: format!("查询记录列表失败: {}", e),
            })?;

        rows.iter().map(|r| self.decode_record(r)).collect()
    }

    /// 整体替换载荷并刷新更新时间
    pub async fn update(&self, id: i64, payload: Option<Value>) -> DynViewResult<Record> {
        let sql = format!(
            "UPDATE {} SET {} = ?, {} = ? WHERE {} = ?",
            self.table(),
            IdentifierValidator::quote_identifier(&self.config.payload_column),
            IdentifierValidator::quote_identifier(&self.config.updated_column),
            IdentifierValidator::quote_identifier(&self.config.id_column)
        );

        let result = sqlx::query(&sql)
            .bind(encode_payload(payload.as_ref())?)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DynViewError::QueryError {
                message: format!("更新记录失败: {}", e),
            })?;

        if result.rows_affected() == 0 {
            return Err(DynViewError::NotFound { id });
        }

        self.find_by_id(id).await?.ok_or(DynViewError::NotFound { id })
    }

    /// 删除记录，记录不存在时返回 `false`
    pub async fn delete(&self, id: i64) -> DynViewResult<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            self.table(),
            IdentifierValidator::quote_identifier(&self.config.id_column)
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DynViewError::QueryError {
                message: format!("删除记录失败: {}", e),
            })?;

        Ok(result.rows_affected() > 0)
    }

    fn decode_record(&self, row: &SqliteRow) -> DynViewResult<Record> {
        let decode_err = |e: sqlx::Error| DynViewError::SerializationError {
            message: format!("解析记录失败: {}", e),
        };

        let id: i64 = row.try_get(self.config.id_column.as_str()).map_err(decode_err)?;
        let payload_text: Option<String> = row
            .try_get(self.config.payload_column.as_str())
            .map_err(decode_err)?;
        let created_at: DateTime<Utc> = row
            .try_get(self.config.created_column.as_str())
            .map_err(decode_err)?;
        let updated_at: DateTime<Utc> = row
            .try_get(self.config.updated_column.as_str())
            .map_err(decode_err)?;

        Ok(Record {
            id,
            payload: decode_payload(id, payload_text.as_deref()),
            created_at,
            updated_at,
        })
    }
}

fn encode_payload(payload: Option<&Value>) -> DynViewResult<Option<String>> {
    payload
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| crate::dynview_error!(serialization, format!("载荷序列化失败: {}", e)))
}

/// 无法解析的载荷视为缺失，读路径不因坏数据报错
fn decode_payload(id: i64, text: Option<&str>) -> Option<Value> {
    let text = text?;
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("记录 {} 的载荷不是合法JSON，按缺失处理: {}", id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseSettings;
    use crate::pool::open_sqlite_pool;
    use serde_json::json;

    async fn store() -> RecordStore {
        let pool = open_sqlite_pool(&DatabaseSettings::in_memory()).await.unwrap();
        let store = RecordStore::new(pool, ProjectionConfig::products());
        store.ensure_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_crud() {
        let store = store().await;

        let created = store.create(Some(json!({"price": 9.99}))).await.unwrap();
        assert_eq!(created.id, 1);

        let found = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.payload, Some(json!({"price": 9.99})));

        let updated = store.update(created.id, Some(json!({"price": 5}))).await.unwrap();
        assert_eq!(updated.payload, Some(json!({"price": 5})));
        assert!(updated.updated_at >= created.updated_at);

        store.create(None).await.unwrap();
        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].payload, None);

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert!(store.find_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store = store().await;
        assert!(matches!(
            store.update(42, None).await.unwrap_err(),
            DynViewError::NotFound { id: 42 }
        ));
    }

    #[tokio::test]
    async fn test_invalid_payload_reads_as_absent() {
        let store = store().await;
        sqlx::query("INSERT INTO products (data, created_at, updated_at) VALUES ('{broken', ?, ?)")
            .bind(Utc::now())
            .bind(Utc::now())
            .execute(store.pool())
            .await
            .unwrap();

        let record = store.find_by_id(1).await.unwrap().unwrap();
        assert!(record.payload.is_none());
    }
}
