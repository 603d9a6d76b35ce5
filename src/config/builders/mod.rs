//! # 配置构建器模块
//!
//! 提供所有配置类型的构建器实现，支持链式调用和严格验证

pub mod database_builder;
pub mod logging_builder;
pub mod projection_builder;
pub mod reload_builder;
pub mod service_builder;

pub use database_builder::DatabaseSettingsBuilder;
pub use logging_builder::LoggingConfigBuilder;
pub use projection_builder::ProjectionConfigBuilder;
pub use reload_builder::ReloadConfigBuilder;
pub use service_builder::ServiceConfigBuilder;
