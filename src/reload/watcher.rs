//! 定义文件监视器
//!
//! 按固定间隔轮询定义文件的修改时间与长度。检测到变化后先去抖，
//! 再调用编排器重载。文件出现、修改、消失都算作变化。
//! 监视器只是外部驱动，重载本身完全由编排器负责。

use super::orchestrator::ReloadOrchestrator;
use crate::config::ReloadConfig;
use rat_logger::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};

/// 文件指纹：不存在时为 `None`
type Fingerprint = Option<(Option<SystemTime>, u64)>;

async fn fingerprint(path: &Path) -> Fingerprint {
    tokio::fs::metadata(path)
        .await
        .ok()
        .map(|meta| (meta.modified().ok(), meta.len()))
}

/// 定义文件监视器
pub struct DefinitionWatcher {
    orchestrator: Arc<ReloadOrchestrator>,
    poll_interval: Duration,
    debounce: Duration,
}

impl DefinitionWatcher {
    pub fn new(orchestrator: Arc<ReloadOrchestrator>, config: &ReloadConfig) -> Self {
        Self {
            orchestrator,
            // 间隔为0时 tokio 会 panic
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            debounce: Duration::from_millis(config.debounce_ms),
        }
    }

    /// 在后台任务中启动监视
    ///
    /// 以启动时的文件状态为基准，之后的变化才触发重载。
    /// 后台任务只持有关闭信号的接收端：句柄被丢弃时监视随之结束
    pub async fn start(self) -> WatcherHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let baseline = fingerprint(self.orchestrator.definition_path()).await;

        let task_handle = tokio::spawn(async move {
            self.run_watch_loop(baseline, shutdown_rx).await;
        });

        WatcherHandle {
            shutdown_tx,
            task_handle,
        }
    }

    async fn run_watch_loop(self, mut last: Fingerprint, mut shutdown_rx: watch::Receiver<bool>) {
        let path = self.orchestrator.definition_path().to_path_buf();
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "启动字段定义监视: {:?}, 轮询间隔 {:?}, 去抖 {:?}",
            path, self.poll_interval, self.debounce
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if fingerprint(&path).await == last {
                        continue;
                    }
                    debug!("检测到字段定义文件变化: {:?}", path);

                    // 去抖：等写入方写完
                    tokio::select! {
                        _ = tokio::time::sleep(self.debounce) => {}
                        _ = shutdown_rx.changed() => break,
                    }
                    last = fingerprint(&path).await;

                    if let Err(e) = self.orchestrator.reload().await {
                        warn!("监视器触发的重载失败: {}", e);
                    }
                }
                changed = shutdown_rx.changed() => {
                    // 发送端已丢弃（句柄未调用 stop 就被释放）同样退出
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("字段定义监视已退出: {:?}", path);
    }
}

/// 监视器句柄
pub struct WatcherHandle {
    shutdown_tx: watch::Sender<bool>,
    task_handle: tokio::task::JoinHandle<()>,
}

impl WatcherHandle {
    /// 停止监视并等待后台任务退出
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task_handle.await;
        info!("字段定义监视已停止");
    }

    pub fn is_running(&self) -> bool {
        !self.task_handle.is_finished()
    }
}
