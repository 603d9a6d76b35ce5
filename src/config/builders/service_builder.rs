//! # 服务配置构建器模块
//!
//! 提供服务配置的构建器实现，支持链式调用和严格验证

use crate::config::core::{
    DatabaseSettings, LoggingConfig, ProjectionConfig, ReloadConfig, ServiceConfig,
};
use crate::error::DynViewError;
use rat_logger::info;

/// 服务配置构建器
///
/// 提供链式配置接口，支持流畅的API调用
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    database: Option<DatabaseSettings>,
    projection: Option<ProjectionConfig>,
    reload: Option<ReloadConfig>,
    logging: Option<LoggingConfig>,
}
impl ServiceConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            database: None,
            projection: None,
            reload: None,
            logging: None,
        }
    }

    /// 设置数据库配置
    pub fn database(mut self, database: DatabaseSettings) -> Self {
        self.database = Some(database);
        self
    }

    /// 设置投影配置
    pub fn projection(mut self, projection: ProjectionConfig) -> Self {
        self.projection = Some(projection);
        self
    }

    /// 设置重载配置
    pub fn reload(mut self, reload: ReloadConfig) -> Self {
        self.reload = Some(reload);
        self
    }

    /// 设置日志配置
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// 构建服务配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置，将返回错误
    pub fn build(self) -> Result<ServiceConfig, DynViewError> {
        let database = self
            .database
            .ok_or_else(|| crate::dynview_error!(config, "数据库配置必须设置"))?;

        let projection = self
            .projection
            .ok_or_else(|| crate::dynview_error!(config, "投影配置必须设置"))?;

        let reload = self
            .reload
            .ok_or_else(|| crate::dynview_error!(config, "重载配置必须设置"))?;

        let logging = self
            .logging
            .ok_or_else(|| crate::dynview_error!(config, "日志配置必须设置"))?;

        projection.validate()?;

        info!(
            "创建服务配置: 数据库={}, 视图={}, 定义文件={:?}",
            database.path, projection.view_name, reload.definition_path
        );

        Ok(ServiceConfig {
            database,
            projection,
            reload,
            logging,
        })
    }
}
impl Default for ServiceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::core::LogLevel;

    fn reload() -> ReloadConfig {
        ReloadConfig::builder()
            .definition_path("productview-config.json")
            .poll_interval_ms(500)
            .debounce_ms(100)
            .build()
            .unwrap()
    }

    fn logging() -> LoggingConfig {
        LoggingConfig::builder()
            .level(LogLevel::Info)
            .console(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_every_value() {
        let missing = ServiceConfig::builder()
            .database(DatabaseSettings::in_memory())
            .projection(ProjectionConfig::products())
            .logging(logging())
            .build();
        assert!(missing.is_err());

        let config = ServiceConfig::builder()
            .database(DatabaseSettings::in_memory())
            .projection(ProjectionConfig::products())
            .reload(reload())
            .logging(logging())
            .build()
            .unwrap();
        assert_eq!(config.database, DatabaseSettings::in_memory());
        assert_eq!(config.projection, ProjectionConfig::products());
        assert_eq!(config.reload.poll_interval_ms, 500);
    }
}
