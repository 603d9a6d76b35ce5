//! 目录模块
//!
//! 记录的增删改查，以及基于当前一代字段定义的查询与投影过滤

pub mod filter;
pub mod query;
pub mod record;
pub mod store;

pub use filter::{FilterOperator, ProjectionCondition, ProjectionQuery, ProjectionSort, SortDirection};
pub use query::CatalogQuery;
pub use record::{ProjectedRow, Record};
pub use store::RecordStore;
