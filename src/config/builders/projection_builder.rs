//! # 投影配置构建器模块
//!
//! 提供投影配置的构建器实现，支持链式调用和严格验证

use crate::config::core::ProjectionConfig;
use crate::error::DynViewError;
use rat_logger::info;

/// 投影配置构建器
///
/// 严格要求所有配置项必须显式设置，严禁使用默认值
#[derive(Debug)]
pub struct ProjectionConfigBuilder {
    base_table: Option<String>,
    view_name: Option<String>,
    id_column: Option<String>,
    payload_column: Option<String>,
    created_column: Option<String>,
    updated_column: Option<String>,
    type_name: Option<String>,
}
impl ProjectionConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            base_table: None,
            view_name: None,
            id_column: None,
            payload_column: None,
            created_column: None,
            updated_column: None,
            type_name: None,
        }
    }

    /// 设置基表名
    pub fn base_table<S: Into<String>>(mut self, base_table: S) -> Self {
        self.base_table = Some(base_table.into());
        self
    }

    /// 设置派生视图名
    pub fn view_name<S: Into<String>>(mut self, view_name: S) -> Self {
        self.view_name = Some(view_name.into());
        self
    }

    /// 设置标识列名
    pub fn id_column<S: Into<String>>(mut self, id_column: S) -> Self {
        self.id_column = Some(id_column.into());
        self
    }

    /// 设置JSON载荷列名
    pub fn payload_column<S: Into<String>>(mut self, payload_column: S) -> Self {
        self.payload_column = Some(payload_column.into());
        self
    }

    /// 设置创建时间列与更新时间列
    ///
    /// # 参数
    ///
    /// * `created_column` - 创建时间列名
    /// * `updated_column` - 更新时间列名
    pub fn timestamp_columns<S: Into<String>>(mut self, created_column: S, updated_column: S) -> Self {
        self.created_column = Some(created_column.into());
        self.updated_column = Some(updated_column.into());
        self
    }

    /// 设置查询层对象类型名
    pub fn type_name<S: Into<String>>(mut self, type_name: S) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// 构建投影配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置，或名称不是安全标识符，将返回错误
    pub fn build(self) -> Result<ProjectionConfig, DynViewError> {
        let base_table = self
            .base_table
            .ok_or_else(|| crate::dynview_error!(config, "基表名必须设置"))?;

        let view_name = self
            .view_name
            .ok_or_else(|| crate::dynview_error!(config, "视图名必须设置"))?;

        let id_column = self
            .id_column
            .ok_or_else(|| crate::dynview_error!(config, "标识列名必须设置"))?;

        let payload_column = self
            .payload_column
            .ok_or_else(|| crate::dynview_error!(config, "载荷列名必须设置"))?;

        let created_column = self
            .created_column
            .ok_or_else(|| crate::dynview_error!(config, "创建时间列名必须设置"))?;

        let updated_column = self
            .updated_column
            .ok_or_else(|| crate::dynview_error!(config, "更新时间列名必须设置"))?;

        let type_name = self
            .type_name
            .ok_or_else(|| crate::dynview_error!(config, "查询层类型名必须设置"))?;

        let config = ProjectionConfig {
            base_table,
            view_name,
            id_column,
            payload_column,
            created_column,
            updated_column,
            type_name,
        };
        config.validate()?;

        info!("创建投影配置: 基表={}, 视图={}", config.base_table, config.view_name);
        Ok(config)
    }
}
impl Default for ProjectionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_every_value() {
        let missing = ProjectionConfig::builder()
            .base_table("items")
            .view_name("items_view")
            .build();
        assert!(missing.is_err());

        let config = ProjectionConfig::builder()
            .base_table("items")
            .view_name("items_view")
            .id_column("item_id")
            .payload_column("body")
            .timestamp_columns("created", "modified")
            .type_name("ItemView")
            .build()
            .unwrap();
        assert_eq!(config.reserved_columns(), ["item_id", "body", "created", "modified"]);
    }
}
