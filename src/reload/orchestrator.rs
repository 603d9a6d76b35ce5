//! 重载编排器
//!
//! 唯一的定义写入者。一次重载依次执行：
//! 解析 → 重建投影 → 发布定义集 → 重建查询类型 → 发出变更信号。
//! 定义错误使整次重载被拒绝；投影失败时定义与类型照常发布，投影保持上一个可用形态。

use crate::dynamic_type::DynamicType;
use crate::error::{DynViewError, DynViewResult};
use crate::field_spec::{FieldSpecSet, FieldSpecStore};
use crate::projection::ViewSynthesizer;
use crate::schema::SchemaRegistry;
use parking_lot::RwLock;
use rat_logger::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 编排器状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadState {
    /// 空闲，最近一次重载成功（或尚未重载）
    Idle,
    /// 正在重载
    Reloading,
    /// 最近一次重载因定义错误被拒绝，仍在使用上一代定义
    Failed { error: String },
}

/// 投影与当前定义的一致性
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionStatus {
    /// 投影与当前定义一致
    Current,
    /// 投影重建失败，仍是 `last_good` 代的形态
    Stale { last_good: Option<u64>, error: String },
}

impl ProjectionStatus {
    pub fn is_current(&self) -> bool {
        matches!(self, ProjectionStatus::Current)
    }
}

/// 一次成功重载的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadOutcome {
    /// 新发布的代号
    pub generation: u64,
    /// 动态字段数
    pub field_count: usize,
    /// 投影状态
    pub projection: ProjectionStatus,
}

/// 重载编排器
pub struct ReloadOrchestrator {
    definition_path: PathBuf,
    store: Arc<FieldSpecStore>,
    synthesizer: Arc<ViewSynthesizer>,
    schema: Arc<SchemaRegistry>,
    state: RwLock<ReloadState>,
    projection_status: RwLock<ProjectionStatus>,
    reload_lock: Mutex<()>,
}

impl std::fmt::Debug for ReloadOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadOrchestrator")
            .field("definition_path", &self.definition_path)
            .field("state", &*self.state.read())
            .field("projection_status", &*self.projection_status.read())
            .finish()
    }
}

impl ReloadOrchestrator {
    /// 创建编排器，定义存储与模式注册表从空的第0代开始
    pub fn new(definition_path: impl Into<PathBuf>, synthesizer: Arc<ViewSynthesizer>) -> Self {
        let schema = Arc::new(SchemaRegistry::new(synthesizer.config()));
        Self {
            definition_path: definition_path.into(),
            store: Arc::new(FieldSpecStore::new()),
            synthesizer,
            schema,
            state: RwLock::new(ReloadState::Idle),
            projection_status: RwLock::new(ProjectionStatus::Current),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn definition_path(&self) -> &Path {
        &self.definition_path
    }

    pub fn store(&self) -> &Arc<FieldSpecStore> {
        &self.store
    }

    pub fn schema(&self) -> &Arc<SchemaRegistry> {
        &self.schema
    }

    pub fn synthesizer(&self) -> &Arc<ViewSynthesizer> {
        &self.synthesizer
    }

    pub fn state(&self) -> ReloadState {
        self.state.read().clone()
    }

    pub fn projection_status(&self) -> ProjectionStatus {
        self.projection_status.read().clone()
    }

    /// 从定义文件重载
    ///
    /// 文件不存在是合法的，得到零个动态字段
    pub async fn reload(&self) -> DynViewResult<ReloadOutcome> {
        let _guard = self.reload_lock.lock().await;
        *self.state.write() = ReloadState::Reloading;

        info!("开始重载字段定义: {:?}", self.definition_path);
        let parsed = match tokio::fs::read(&self.definition_path).await {
            Ok(bytes) => self.parse(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("字段定义文件不存在，使用空定义集: {:?}", self.definition_path);
                Ok(FieldSpecSet::empty())
            }
            Err(e) => Err(DynViewError::from(e)),
        };

        self.apply(parsed).await
    }

    /// 从内存中的定义源重载
    pub async fn reload_from_bytes(&self, bytes: &[u8]) -> DynViewResult<ReloadOutcome> {
        let _guard = self.reload_lock.lock().await;
        *self.state.write() = ReloadState::Reloading;

        let parsed = self.parse(bytes);
        self.apply(parsed).await
    }

    fn parse(&self, bytes: &[u8]) -> DynViewResult<FieldSpecSet> {
        let set = FieldSpecStore::load(bytes)?;
        set.check_reserved(&self.synthesizer.config().reserved_columns())?;
        Ok(set)
    }

    /// 调用者必须持有 `reload_lock`
    async fn apply(&self, parsed: DynViewResult<FieldSpecSet>) -> DynViewResult<ReloadOutcome> {
        let set = match parsed {
            Ok(set) => set,
            Err(e) => {
                error!(
                    "字段定义重载被拒绝，继续使用第 {} 代: {}",
                    self.store.current().generation(),
                    e
                );
                *self.state.write() = ReloadState::Failed { error: e.to_string() };
                return Err(e);
            }
        };

        let set = self.store.stamp(set);

        let projection = match self.synthesizer.rebuild(&set).await {
            Ok(()) => ProjectionStatus::Current,
            Err(e) => ProjectionStatus::Stale {
                last_good: self.synthesizer.last_good_generation(),
                error: e.to_string(),
            },
        };

        let published = self.store.publish(set);
        let ty = DynamicType::build(&published, self.synthesizer.config());
        self.schema.install(ty);

        if let ProjectionStatus::Stale { last_good, error } = &projection {
            warn!(
                "投影与查询类型不一致: 查询类型为第 {} 代，投影停留在 {:?} 代: {}",
                published.generation(),
                last_good,
                error
            );
        }

        *self.projection_status.write() = projection.clone();
        *self.state.write() = ReloadState::Idle;

        info!(
            "字段定义重载完成: 第 {} 代, {} 个动态字段",
            published.generation(),
            published.len()
        );

        Ok(ReloadOutcome {
            generation: published.generation(),
            field_count: published.len(),
            projection,
        })
    }
}
