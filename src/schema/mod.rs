//! 查询层模式管理
//!
//! 持有当前的动态类型，并在每次成功重载后发出无参数的“模式已变更”信号，
//! 由查询协议层据此重新暴露模式。

use crate::config::ProjectionConfig;
use crate::dynamic_type::DynamicType;
use arc_swap::ArcSwap;
use rat_logger::debug;
use std::sync::Arc;
use tokio::sync::broadcast;

/// 模式已变更信号（不携带任何数据）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaChanged;

const SIGNAL_CAPACITY: usize = 16;

/// 模式注册表
pub struct SchemaRegistry {
    current: ArcSwap<DynamicType>,
    changed_tx: broadcast::Sender<SchemaChanged>,
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.current.load();
        f.debug_struct("SchemaRegistry")
            .field("type", &current.name())
            .field("generation", &current.generation())
            .finish()
    }
}

impl SchemaRegistry {
    /// 以不含动态字段的类型初始化
    pub fn new(config: &ProjectionConfig) -> Self {
        let (changed_tx, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            current: ArcSwap::from_pointee(DynamicType::empty(config)),
            changed_tx,
        }
    }

    /// 当前类型快照
    ///
    /// 一次请求只取一次，整个请求期间使用同一代
    pub fn current(&self) -> Arc<DynamicType> {
        self.current.load_full()
    }

    /// 订阅变更信号
    ///
    /// 落后太多的订阅者会收到 `Lagged`，此时直接读取 `current()` 即可
    pub fn subscribe(&self) -> broadcast::Receiver<SchemaChanged> {
        self.changed_tx.subscribe()
    }

    /// 安装新类型并发出信号
    pub(crate) fn install(&self, ty: DynamicType) -> Arc<DynamicType> {
        let installed = Arc::new(ty);
        self.current.store(Arc::clone(&installed));

        // 没有订阅者时发送失败，可以忽略
        let receivers = self.changed_tx.send(SchemaChanged).unwrap_or(0);
        debug!(
            "安装查询类型 {} 第 {} 代，通知 {} 个订阅者",
            installed.name(),
            installed.generation(),
            receivers
        );
        installed
    }
}
