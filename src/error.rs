//! 错误处理模块
//!
//! 定义动态投影引擎的统一错误类型。
//! 注意：字段提取失败不是错误，而是 `Extracted::Absent`，永远不会出现在这里。

use thiserror::Error;

/// 动态投影引擎错误类型
#[derive(Error, Debug)]
pub enum DynViewError {
    /// 定义源格式错误（非致命，保留上一代字段定义）
    #[error("{}", crate::i18n::tf("error.parse", &[("message", message.as_str())]))]
    ParseError { message: String },

    /// 同一定义集中出现重复的字段名
    #[error("{}", crate::i18n::tf("error.duplicate_field", &[("name", name.as_str())]))]
    DuplicateFieldName { name: String },

    /// 单个字段定义不合法（名称、路径等）
    #[error("{}", crate::i18n::tf("error.invalid_field", &[("field", field.as_str()), ("message", message.as_str())]))]
    InvalidFieldSpec { field: String, message: String },

    /// 存储层拒绝了生成的视图DDL（保留上一个投影）
    #[error("{}", crate::i18n::tf("error.projection_rebuild", &[("view", view.as_str()), ("message", message.as_str())]))]
    ProjectionRebuildError { view: String, message: String },

    /// 查询执行失败
    #[error("{}", crate::i18n::tf("error.query", &[("message", message.as_str())]))]
    QueryError { message: String },

    /// 数据库连接失败
    #[error("{}", crate::i18n::tf("error.connection", &[("message", message.as_str())]))]
    ConnectionError { message: String },

    /// 配置错误
    #[error("{}", crate::i18n::tf("error.config", &[("message", message.as_str())]))]
    ConfigError { message: String },

    /// 序列化错误
    #[error("{}", crate::i18n::tf("error.serialization", &[("message", message.as_str())]))]
    SerializationError { message: String },

    /// 记录不存在
    #[error("{}", crate::i18n::tf("error.not_found", &[("id", id.to_string().as_str())]))]
    NotFound { id: i64 },

    /// IO错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),
}

/// 结果类型别名
pub type DynViewResult<T> = Result<T, DynViewError>;

impl DynViewError {
    /// 是否属于重载阶段的定义错误（解析/重复/非法字段）
    ///
    /// 这类错误会让重载整体被拒绝，系统停留在上一代定义上
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            DynViewError::ParseError { .. }
                | DynViewError::DuplicateFieldName { .. }
                | DynViewError::InvalidFieldSpec { .. }
        )
    }
}

/// 快速构造错误的宏
#[macro_export]
macro_rules! dynview_error {
    (parse, $msg:expr) => {
        $crate::error::DynViewError::ParseError {
            message: $msg.to_string(),
        }
    };
    (duplicate, $name:expr) => {
        $crate::error::DynViewError::DuplicateFieldName {
            name: $name.to_string(),
        }
    };
    (invalid_field, $field:expr, $msg:expr) => {
        $crate::error::DynViewError::InvalidFieldSpec {
            field: $field.to_string(),
            message: $msg.to_string(),
        }
    };
    (projection, $view:expr, $msg:expr) => {
        $crate::error::DynViewError::ProjectionRebuildError {
            view: $view.to_string(),
            message: $msg.to_string(),
        }
    };
    (query, $msg:expr) => {
        $crate::error::DynViewError::QueryError {
            message: $msg.to_string(),
        }
    };
    (connection, $msg:expr) => {
        $crate::error::DynViewError::ConnectionError {
            message: $msg.to_string(),
        }
    };
    (config, $msg:expr) => {
        $crate::error::DynViewError::ConfigError {
            message: $msg.to_string(),
        }
    };
    (serialization, $msg:expr) => {
        $crate::error::DynViewError::SerializationError {
            message: $msg.to_string(),
        }
    };
}
