//! 投影模块
//!
//! 把当前字段定义物化为存储层的派生视图

pub mod backend;
pub mod sql_builder;
pub mod synthesizer;

pub use backend::{ProjectionBackend, SqliteProjectionBackend, ViewDescription};
pub use sql_builder::ProjectionSqlBuilder;
pub use synthesizer::ViewSynthesizer;
