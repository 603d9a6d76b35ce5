//! 字段定义模块
//!
//! 解析并持有当前的动态字段定义集

pub mod parser;
pub mod store;
pub mod types;

pub use parser::{extract_property, load};
pub use store::FieldSpecStore;
pub use types::{DeclaredType, FieldSpec, FieldSpecSet};
