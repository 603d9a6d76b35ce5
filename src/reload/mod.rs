//! 重载模块
//!
//! 编排器负责按顺序重建一代定义的全部派生物；监视器只负责发现变化

pub mod orchestrator;
pub mod watcher;

pub use orchestrator::{ProjectionStatus, ReloadOrchestrator, ReloadOutcome, ReloadState};
pub use watcher::{DefinitionWatcher, WatcherHandle};
