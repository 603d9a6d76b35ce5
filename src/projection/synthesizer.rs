//! 视图合成器
//!
//! 根据一代字段定义重建派生视图。重建互斥执行，
//! DROP 与 CREATE 在同一事务中完成，失败时旧视图保持可用。

use super::backend::{ProjectionBackend, ViewDescription};
use super::sql_builder::ProjectionSqlBuilder;
use crate::config::ProjectionConfig;
use crate::error::DynViewResult;
use crate::field_spec::FieldSpecSet;
use parking_lot::RwLock;
use rat_logger::{debug, error, info};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 视图合成器
pub struct ViewSynthesizer {
    config: ProjectionConfig,
    backend: Arc<dyn ProjectionBackend>,
    rebuild_lock: Mutex<()>,
    last_good: RwLock<Option<u64>>,
}

impl std::fmt::Debug for ViewSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewSynthesizer")
            .field("view", &self.config.view_name)
            .field("last_good", &*self.last_good.read())
            .finish()
    }
}

impl ViewSynthesizer {
    pub fn new(config: ProjectionConfig, backend: Arc<dyn ProjectionBackend>) -> Self {
        Self {
            config,
            backend,
            rebuild_lock: Mutex::new(()),
            last_good: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// 用给定定义集重建视图
    ///
    /// 视图按声明顺序包含全部动态字段加上固定列。
    /// 存储层拒绝时返回 `ProjectionRebuildError`，此前的视图保持不变。
    pub async fn rebuild(&self, set: &FieldSpecSet) -> DynViewResult<()> {
        set.check_reserved(&self.config.reserved_columns())?;

        let builder = ProjectionSqlBuilder::new(&self.config);
        let statements = vec![builder.drop_view(), builder.create_view(set)];

        let _guard = self.rebuild_lock.lock().await;

        match self.backend.apply_ddl(&statements).await {
            Ok(()) => {
                *self.last_good.write() = Some(set.generation());
                info!(
                    "重建视图 {} 成功: 第 {} 代, {} 个动态列",
                    self.config.view_name,
                    set.generation(),
                    set.len()
                );
                Ok(())
            }
            Err(e) => {
                error!("重建视图 {} 失败: {}", self.config.view_name, e);
                debug!("被拒绝的视图DDL: {}", statements.join("; "));
                Err(crate::dynview_error!(projection, self.config.view_name, e))
            }
        }
    }

    /// 当前视图结构，视图尚不存在时返回 `None`
    pub async fn describe(&self) -> DynViewResult<Option<ViewDescription>> {
        self.backend.describe_view(&self.config.view_name).await
    }

    /// 最近一次成功重建所用的定义集代号
    pub fn last_good_generation(&self) -> Option<u64> {
        *self.last_good.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DynViewError;
    use crate::field_spec::{DeclaredType, FieldSpec};
    use async_trait::async_trait;

    /// 记录DDL，可配置为拒绝执行
    struct RecordingBackend {
        reject: bool,
        applied: parking_lot::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProjectionBackend for RecordingBackend {
        async fn apply_ddl(&self, statements: &[String]) -> DynViewResult<()> {
            if self.reject {
                return Err(crate::dynview_error!(query, "rejected"));
            }
            self.applied.lock().extend(statements.iter().cloned());
            Ok(())
        }

        async fn describe_view(&self, _view: &str) -> DynViewResult<Option<ViewDescription>> {
            Ok(None)
        }
    }

    fn synthesizer(reject: bool) -> (ViewSynthesizer, Arc<RecordingBackend>) {
        let backend = Arc::new(RecordingBackend {
            reject,
            applied: parking_lot::Mutex::new(Vec::new()),
        });
        (
            ViewSynthesizer::new(ProjectionConfig::products(), backend.clone()),
            backend,
        )
    }

    #[tokio::test]
    async fn test_rebuild_drops_then_creates() {
        let (synth, backend) = synthesizer(false);
        let set = FieldSpecSet::new(vec![FieldSpec::new("price", DeclaredType::Decimal, "$.price", "price")])
            .with_generation(3);

        synth.rebuild(&set).await.unwrap();

        let applied = backend.applied.lock().clone();
        assert_eq!(applied.len(), 2);
        assert!(applied[0].starts_with("DROP VIEW IF EXISTS"));
        assert!(applied[1].starts_with("CREATE VIEW"));
        assert_eq!(synth.last_good_generation(), Some(3));
    }

    #[tokio::test]
    async fn test_rejected_rebuild_keeps_last_good() {
        let (synth, _) = synthesizer(true);
        let err = synth.rebuild(&FieldSpecSet::empty()).await.unwrap_err();
        assert!(matches!(err, DynViewError::ProjectionRebuildError { .. }));
        assert_eq!(synth.last_good_generation(), None);
    }

    #[tokio::test]
    async fn test_reserved_name_rejected_before_ddl() {
        let (synth, backend) = synthesizer(false);
        let set = FieldSpecSet::new(vec![FieldSpec::new("ID", DeclaredType::Int, "$.id", "id")]);

        let err = synth.rebuild(&set).await.unwrap_err();
        assert!(matches!(err, DynViewError::InvalidFieldSpec { .. }));
        assert!(backend.applied.lock().is_empty());
    }
}
