//! # 数据库配置构建器模块
//!
//! 提供SQLite数据库配置的构建器实现，支持链式调用和严格验证

use crate::config::core::DatabaseSettings;
use crate::error::DynViewError;
use rat_logger::info;

/// 数据库配置构建器
///
/// 严格要求所有配置项必须显式设置，严禁使用默认值
#[derive(Debug)]
pub struct DatabaseSettingsBuilder {
    path: Option<String>,
    create_if_missing: Option<bool>,
    max_connections: Option<u32>,
}
impl DatabaseSettings {
    /// 创建数据库配置构建器
    pub fn builder() -> DatabaseSettingsBuilder {
        DatabaseSettingsBuilder::new()
    }
}

impl DatabaseSettingsBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            path: None,
            create_if_missing: None,
            max_connections: None,
        }
    }

    /// 设置数据库文件路径
    ///
    /// # 参数
    ///
    /// * `path` - 数据库文件路径，`:memory:` 表示内存数据库
    pub fn path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = Some(path.into());
        self
    }

    /// 设置文件不存在时是否自动创建
    pub fn create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = Some(create_if_missing);
        self
    }

    /// 设置最大连接数
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = Some(max_connections);
        self
    }

    /// 构建数据库配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置，将返回错误
    pub fn build(self) -> Result<DatabaseSettings, DynViewError> {
        let path = self
            .path
            .ok_or_else(|| crate::dynview_error!(config, "数据库路径必须设置"))?;

        let create_if_missing = self
            .create_if_missing
            .ok_or_else(|| crate::dynview_error!(config, "自动创建选项必须设置"))?;

        let max_connections = self
            .max_connections
            .ok_or_else(|| crate::dynview_error!(config, "最大连接数必须设置"))?;

        if path.is_empty() {
            return Err(crate::dynview_error!(config, "数据库路径不能为空"));
        }

        if max_connections == 0 {
            return Err(crate::dynview_error!(config, "最大连接数不能为零"));
        }

        // 内存数据库的每个连接都是独立的库，只能用单连接
        if path == ":memory:" && max_connections != 1 {
            return Err(crate::dynview_error!(config, "内存数据库只能使用单个连接"));
        }

        info!("创建数据库配置: 路径={}, 最大连接数={}", path, max_connections);

        Ok(DatabaseSettings {
            path,
            create_if_missing,
            max_connections,
        })
    }
}
impl Default for DatabaseSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_every_value() {
        let missing = DatabaseSettings::builder().path("catalog.db").max_connections(4).build();
        assert!(missing.is_err());

        let shared_memory = DatabaseSettings::builder()
            .path(":memory:")
            .create_if_missing(true)
            .max_connections(2)
            .build();
        assert!(shared_memory.is_err());

        let settings = DatabaseSettings::builder()
            .path("catalog.db")
            .create_if_missing(false)
            .max_connections(4)
            .build()
            .unwrap();
        assert_eq!(settings.path, "catalog.db");
        assert!(!settings.create_if_missing);
        assert_eq!(settings.max_connections, 4);
    }
}
