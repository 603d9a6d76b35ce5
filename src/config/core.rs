//! # 配置管理模块 - 核心配置类型
//!
//! 提供统一的配置管理系统，支持构建器模式和链式配置
//! 所有配置项必须显式设置，唯一的例外是 `ProjectionConfig::products()` 这组目录服务约定值

use crate::error::DynViewError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use rat_logger::info;

/// 服务配置
///
/// 负责管理整个服务的配置，包括数据库、投影、重载和日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 投影配置
    pub projection: ProjectionConfig,
    /// 重载配置
    pub reload: ReloadConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// SQLite数据库配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库文件路径，`:memory:` 表示内存数据库
    pub path: String,
    /// 文件不存在时是否自动创建
    pub create_if_missing: bool,
    /// 最大连接数
    pub max_connections: u32,
}

/// 投影配置：基表、视图与固定列的名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// 基表名
    pub base_table: String,
    /// 派生视图名
    pub view_name: String,
    /// 标识列
    pub id_column: String,
    /// JSON载荷列
    pub payload_column: String,
    /// 创建时间列
    pub created_column: String,
    /// 更新时间列
    pub updated_column: String,
    /// 查询层对象类型名
    pub type_name: String,
}

/// 重载配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadConfig {
    /// 字段定义文件路径
    pub definition_path: PathBuf,
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 检测到变更后的去抖延迟（毫秒），避免读到写了一半的文件
    pub debounce_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,
    /// 是否输出到控制台，关闭时不初始化日志
    pub console: bool,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 错误级别
    Error,
    /// 警告级别
    Warn,
    /// 信息级别
    Info,
    /// 调试级别
    Debug,
    /// 跟踪级别
    Trace,
}

impl ServiceConfig {
    /// 创建服务配置构建器
    pub fn builder() -> super::builders::ServiceConfigBuilder {
        super::builders::ServiceConfigBuilder::new()
    }

    /// 从配置文件加载配置
    ///
    /// 扩展名为 `toml` 时按TOML解析，否则按JSON解析
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn from_file<P: AsRef<std::path::Path>>(config_path: P) -> Result<Self, DynViewError> {
        let content = std::fs::read_to_string(config_path.as_ref())?;

        let config: ServiceConfig = if config_path.as_ref().extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&content)
                .map_err(|e| crate::dynview_error!(config, format!("解析TOML配置文件失败: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| crate::dynview_error!(config, format!("解析JSON配置文件失败: {}", e)))?
        };

        config.projection.validate()?;

        info!("从文件加载配置: {:?}", config_path.as_ref());
        Ok(config)
    }

    /// 保存配置到文件
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, config_path: P) -> Result<(), DynViewError> {
        let content = if config_path.as_ref().extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::to_string_pretty(self)
                .map_err(|e| crate::dynview_error!(config, format!("序列化TOML配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| crate::dynview_error!(config, format!("序列化JSON配置失败: {}", e)))?
        };

        std::fs::write(config_path.as_ref(), content)?;

        info!("保存配置到文件: {:?}", config_path.as_ref());
        Ok(())
    }
}

impl ProjectionConfig {
    /// 创建投影配置构建器
    pub fn builder() -> super::builders::ProjectionConfigBuilder {
        super::builders::ProjectionConfigBuilder::new()
    }

    /// 目录服务的约定配置：`products` 基表与 `products_view` 视图
    pub fn products() -> Self {
        Self {
            base_table: "products".to_string(),
            view_name: "products_view".to_string(),
            id_column: "id".to_string(),
            payload_column: "data".to_string(),
            created_column: "created_at".to_string(),
            updated_column: "updated_at".to_string(),
            type_name: "ProductView".to_string(),
        }
    }

    /// 固定列（动态字段不能与之同名）
    pub fn reserved_columns(&self) -> [&str; 4] {
        [
            self.id_column.as_str(),
            self.payload_column.as_str(),
            self.created_column.as_str(),
            self.updated_column.as_str(),
        ]
    }

    /// 验证所有名称都是安全标识符，且固定列互不重名
    pub fn validate(&self) -> Result<(), DynViewError> {
        use crate::security::IdentifierValidator;

        IdentifierValidator::validate("base_table", &self.base_table)?;
        IdentifierValidator::validate("view_name", &self.view_name)?;
        IdentifierValidator::validate("type_name", &self.type_name)?;
        for column in self.reserved_columns() {
            IdentifierValidator::validate("column", column)?;
        }

        if self.base_table.eq_ignore_ascii_case(&self.view_name) {
            return Err(crate::dynview_error!(config, "视图名不能与基表名相同"));
        }

        let columns = self.reserved_columns();
        for (i, a) in columns.iter().enumerate() {
            if columns[i + 1..].iter().any(|b| a.eq_ignore_ascii_case(b)) {
                return Err(crate::dynview_error!(config, format!("固定列 '{}' 重复", a)));
            }
        }

        Ok(())
    }
}

impl ReloadConfig {
    /// 创建重载配置构建器
    pub fn builder() -> super::builders::ReloadConfigBuilder {
        super::builders::ReloadConfigBuilder::new()
    }
}

impl LoggingConfig {
    /// 创建日志配置构建器
    pub fn builder() -> super::builders::LoggingConfigBuilder {
        super::builders::LoggingConfigBuilder::new()
    }
}

impl DatabaseSettings {
    /// 内存数据库，单连接（多个连接会各自得到独立的内存库）
    pub fn in_memory() -> Self {
        Self {
            path: ":memory:".to_string(),
            create_if_missing: true,
            max_connections: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products_projection_is_valid() {
        let config = ProjectionConfig::products();
        assert!(config.validate().is_ok());
        assert_eq!(config.reserved_columns(), ["id", "data", "created_at", "updated_at"]);
    }

    #[test]
    fn test_projection_validation_rejects_collisions() {
        let mut config = ProjectionConfig::products();
        config.view_name = "Products".to_string();
        assert!(config.validate().is_err());

        let mut config = ProjectionConfig::products();
        config.updated_column = "CREATED_AT".to_string();
        assert!(config.validate().is_err());

        let mut config = ProjectionConfig::products();
        config.payload_column = "data; drop".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_service_config_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.toml");
        std::fs::write(
            &path,
            r#"
[database]
path = ":memory:"
create_if_missing = true
max_connections = 1

[projection]
base_table = "products"
view_name = "products_view"
id_column = "id"
payload_column = "data"
created_column = "created_at"
updated_column = "updated_at"
type_name = "ProductView"

[reload]
definition_path = "productview-config.json"
poll_interval_ms = 500
debounce_ms = 100

[logging]
level = "Info"
console = true
"#,
        )
        .unwrap();

        let config = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(config.projection, ProjectionConfig::products());
        assert_eq!(config.reload.debounce_ms, 100);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.logging.console);

        // JSON往返
        let json_path = dir.path().join("service.json");
        config.save_to_file(&json_path).unwrap();
        let reloaded = ServiceConfig::from_file(&json_path).unwrap();
        assert_eq!(reloaded.database, config.database);
        assert_eq!(reloaded.reload, config.reload);
    }
}
