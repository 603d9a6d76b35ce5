//! 字段定义存储
//!
//! 持有“当前一代”字段定义集。发布是一次原子指针交换，
//! 读者无需加锁，也不会看到半更新的定义集。

use super::types::FieldSpecSet;
use crate::error::DynViewResult;
use arc_swap::ArcSwap;
use rat_logger::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// 字段定义存储
pub struct FieldSpecStore {
    current: ArcSwap<FieldSpecSet>,
    next_generation: AtomicU64,
    changed_tx: watch::Sender<u64>,
}

impl std::fmt::Debug for FieldSpecStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.current.load();
        f.debug_struct("FieldSpecStore")
            .field("generation", &current.generation())
            .field("fields", &current.names())
            .finish()
    }
}

impl FieldSpecStore {
    /// 创建存储，初始为空定义集（代号0）
    pub fn new() -> Self {
        let (changed_tx, _) = watch::channel(0);
        Self {
            current: ArcSwap::from_pointee(FieldSpecSet::empty()),
            next_generation: AtomicU64::new(1),
            changed_tx,
        }
    }

    /// 解析定义源，参见 [`super::parser::load`]
    pub fn load(bytes: &[u8]) -> DynViewResult<FieldSpecSet> {
        super::parser::load(bytes)
    }

    /// 当前发布的定义集
    ///
    /// 每次请求只应读取一次，并在整个请求内使用同一快照
    pub fn current(&self) -> Arc<FieldSpecSet> {
        self.current.load_full()
    }

    /// 订阅变更通知，值为最新发布的代号
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed_tx.subscribe()
    }

    /// 为尚未发布的定义集分配代号
    pub(crate) fn stamp(&self, set: FieldSpecSet) -> FieldSpecSet {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        set.with_generation(generation)
    }

    /// 发布新的定义集，整体替换旧集
    ///
    /// 仅由重载编排器调用；未分配代号的定义集在此分配
    pub(crate) fn publish(&self, set: FieldSpecSet) -> Arc<FieldSpecSet> {
        let set = if set.generation() == 0 { self.stamp(set) } else { set };
        let generation = set.generation();
        let published = Arc::new(set);

        self.current.store(Arc::clone(&published));
        self.changed_tx.send_replace(generation);

        debug!("发布字段定义第 {} 代: {:?}", generation, published.names());
        published
    }
}

impl Default for FieldSpecStore {
    fn default() -> Self {
        Self::new()
    }
}
