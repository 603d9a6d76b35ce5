//! rat_dynview 服务入口
//!
//! 用法: `rat_dynview [配置文件]`，默认读取 `rat_dynview.toml`

use anyhow::Context;
use rat_dynview::{
    CatalogQuery, DefinitionWatcher, RecordStore, ReloadOrchestrator, ServiceConfig, SqliteProjectionBackend,
    ViewSynthesizer, init_logging, open_sqlite_pool,
};
use rat_logger::{error, info};
use std::sync::Arc;
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "rat_dynview.toml".to_string());
    let config = ServiceConfig::from_file(&config_path)
        .with_context(|| format!("加载配置文件失败: {}", config_path))?;

    init_logging(&config.logging)?;
    rat_dynview::init();
    info!("{} 启动", rat_dynview::get_info());

    let pool = open_sqlite_pool(&config.database).await?;
    let store = RecordStore::new(pool.clone(), config.projection.clone());
    store.ensure_schema().await?;

    let backend = Arc::new(SqliteProjectionBackend::new(pool.clone()));
    let synthesizer = Arc::new(ViewSynthesizer::new(config.projection.clone(), backend));
    let orchestrator = Arc::new(ReloadOrchestrator::new(
        config.reload.definition_path.clone(),
        synthesizer,
    ));

    // 启动时定义不合法则直接退出
    let outcome = orchestrator.reload().await.context("初始字段定义加载失败")?;
    info!(
        "初始字段定义: 第 {} 代, {} 个动态字段",
        outcome.generation, outcome.field_count
    );

    let query = CatalogQuery::new(store, Arc::clone(orchestrator.schema()));
    info!("查询类型:\n{}", orchestrator.schema().current().to_sdl());
    info!("当前共 {} 条商品记录", query.products().await?.len());

    let mut schema_changes = orchestrator.schema().subscribe();
    let schema = Arc::clone(orchestrator.schema());
    let announcer = tokio::spawn(async move {
        loop {
            match schema_changes.recv().await {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    info!("查询类型已更新:\n{}", schema.current().to_sdl());
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let watcher = DefinitionWatcher::new(Arc::clone(&orchestrator), &config.reload).start().await;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("等待退出信号失败: {}", e);
    }

    info!("正在停止服务");
    watcher.stop().await;
    announcer.abort();
    pool.close().await;
    Ok(())
}
