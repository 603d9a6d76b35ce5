//! 记录与投影行类型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 基表中的一条记录
///
/// 载荷是不透明的JSON，可以为空；动态字段的值全部来自载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub payload: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// 载荷引用，供提取器使用
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }
}

/// 投影视图的一行
///
/// 只在查询时物化，从不持久化
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRow {
    pub id: i64,
    /// 动态列（按定义顺序）
    pub columns: Vec<(String, Value)>,
    /// 原始载荷文本
    pub payload: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ProjectedRow {
    /// 按列名取动态列的值
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// 动态列名（按顺序）
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }
}
