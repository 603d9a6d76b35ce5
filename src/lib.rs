//! rat_dynview - 动态模式投影引擎
//!
//! 根据声明式的字段定义（名称、类型、JSON提取路径），在运行时同时派生：
//! SQLite上的类型化投影视图，以及从JSON载荷解析字段值的查询层类型。
//! 定义文件变更时两者一起重建，无需重启服务。

// 导出所有公共模块
pub mod error;
pub mod i18n;
pub mod config;
pub mod logging;
pub mod security;
pub mod pool;
pub mod field_spec;
pub mod extractor;
pub mod projection;
pub mod dynamic_type;
pub mod schema;
pub mod reload;
pub mod catalog;

// 重新导出常用类型和函数
pub use error::{DynViewError, DynViewResult};
pub use config::{
    DatabaseSettings, LogLevel, LoggingConfig, ProjectionConfig, ReloadConfig, ServiceConfig,
};
pub use field_spec::{DeclaredType, FieldSpec, FieldSpecSet, FieldSpecStore};
pub use extractor::{Extracted, TypedValue, extract};
pub use projection::{ProjectionBackend, SqliteProjectionBackend, ViewDescription, ViewSynthesizer};
pub use dynamic_type::{DynamicField, DynamicType, QueryFieldType};
pub use schema::{SchemaChanged, SchemaRegistry};
pub use reload::{DefinitionWatcher, ProjectionStatus, ReloadOrchestrator, ReloadOutcome, ReloadState, WatcherHandle};
pub use catalog::{
    CatalogQuery, FilterOperator, ProjectedRow, ProjectionQuery, Record, RecordStore, SortDirection,
};
pub use pool::open_sqlite_pool;
pub use logging::init_logging;

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 初始化rat_dynview库
///
/// 初始化多语言错误消息系统
///
/// 注意：日志系统由调用者自行初始化，本库不会自动初始化日志
pub fn init() {
    i18n::ErrorMessageI18n::init();
}

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
