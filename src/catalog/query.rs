//! 目录查询
//!
//! 两条读路径：通过当前查询类型解析记录载荷，或直接读取投影视图。
//! 每次调用只取一次类型快照，整次调用使用同一代字段。

use super::filter::{BindValue, ProjectionQuery};
use super::record::{ProjectedRow, Record};
use super::store::RecordStore;
use crate::error::{DynViewError, DynViewResult};
use crate::schema::SchemaRegistry;
use rat_logger::debug;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use std::sync::Arc;

/// 目录查询
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    store: RecordStore,
    schema: Arc<SchemaRegistry>,
}

impl CatalogQuery {
    pub fn new(store: RecordStore, schema: Arc<SchemaRegistry>) -> Self {
        Self { store, schema }
    }

    /// 全部商品，按当前查询类型解析
    pub async fn products(&self) -> DynViewResult<Vec<Map<String, Value>>> {
        let ty = self.schema.current();
        let records = self.store.list().await?;
        Ok(records.iter().map(|r| ty.resolve_record(r)).collect())
    }

    /// 单个商品，不存在时返回 `None`
    pub async fn product_by_id(&self, id: i64) -> DynViewResult<Option<Map<String, Value>>> {
        let ty = self.schema.current();
        let record: Option<Record> = self.store.find_by_id(id).await?;
        Ok(record.map(|r| ty.resolve_record(&r)))
    }

    /// 读取投影视图的全部行，按标识排序
    pub async fn projected_rows(&self) -> DynViewResult<Vec<ProjectedRow>> {
        self.projected_rows_with(&ProjectionQuery::new()).await
    }

    /// 按条件过滤、排序读取投影视图
    ///
    /// 可用列为当前查询类型的动态字段加上固定列；
    /// 投影落后于查询类型时，新列在视图中尚不存在，查询返回 `QueryError`
    pub async fn projected_rows_with(&self, query: &ProjectionQuery) -> DynViewResult<Vec<ProjectedRow>> {
        let config = self.store.config();
        let ty = self.schema.current();

        let mut columns: Vec<&str> = config.reserved_columns().to_vec();
        columns.extend(ty.dynamic_field_names());

        let (sql, params) = query.build_sql(&config.view_name, &config.id_column, &columns)?;
        debug!("查询投影视图: {}", sql);

        // 视图随重载重建，不能复用缓存的语句
        let mut statement = sqlx::query(&sql).persistent(false);
        for param in params {
            statement = match param {
                BindValue::Int(i) => statement.bind(i),
                BindValue::Real(f) => statement.bind(f),
                BindValue::Text(t) => statement.bind(t),
            };
        }

        let rows = statement
            .fetch_all(self.store.pool())
            .await
            .map_err(|e| DynViewError::QueryError {
                message: format!("查询投影视图失败: {}", e),
            })?;

        rows.iter().map(|row| self.decode_projected(row)).collect()
    }

    fn decode_projected(&self, row: &SqliteRow) -> DynViewResult<ProjectedRow> {
        let config = self.store.config();
        let decode_err = |e: sqlx::Error| DynViewError::SerializationError {
            message: format!("解析投影行失败: {}", e),
        };

        let mut projected = ProjectedRow {
            id: 0,
            columns: Vec::new(),
            payload: None,
            created_at: None,
            updated_at: None,
        };

        for column in row.columns() {
            let name = column.name();
            let index = column.ordinal();

            if name.eq_ignore_ascii_case(&config.id_column) {
                projected.id = row.try_get(index).map_err(decode_err)?;
            } else if name.eq_ignore_ascii_case(&config.payload_column) {
                projected.payload = row.try_get(index).map_err(decode_err)?;
            } else if name.eq_ignore_ascii_case(&config.created_column) {
                projected.created_at = row.try_get(index).map_err(decode_err)?;
            } else if name.eq_ignore_ascii_case(&config.updated_column) {
                projected.updated_at = row.try_get(index).map_err(decode_err)?;
            } else {
                projected
                    .columns
                    .push((name.to_string(), decode_dynamic(row, index).map_err(decode_err)?));
            }
        }

        Ok(projected)
    }
}

/// 按值的实际存储类型解码动态列
fn decode_dynamic(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let type_name = raw.type_info().name().to_string();
    match type_name.as_str() {
        "INTEGER" => Ok(Value::from(row.try_get::<i64, _>(index)?)),
        "REAL" => Ok(serde_json::Number::from_f64(row.try_get::<f64, _>(index)?)
            .map(Value::Number)
            .unwrap_or(Value::Null)),
        "TEXT" => Ok(Value::String(row.try_get::<String, _>(index)?)),
        _ => Ok(Value::Null),
    }
}
