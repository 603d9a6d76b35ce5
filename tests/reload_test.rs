//! 重载并发与文件监视测试

use futures::future::join_all;
use rat_dynview::{
    DatabaseSettings, DefinitionWatcher, ProjectionConfig, RecordStore, ReloadConfig, ReloadOrchestrator,
    SqliteProjectionBackend, ViewSynthesizer, open_sqlite_pool,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const FIRST: &str = r#"{"dynamicFields":[{"name":"a","type":"String","jsonPath":"$.a"},{"name":"b","type":"Int","jsonPath":"$.b"}]}"#;
const SECOND: &str = r#"{"dynamicFields":[{"name":"c","type":"Decimal","jsonPath":"$.c"},{"name":"d","type":"Boolean","jsonPath":"$.d"},{"name":"e","type":"ListOfString","jsonPath":"$.e"}]}"#;

async fn orchestrator(definition_path: &Path) -> Arc<ReloadOrchestrator> {
    let pool = open_sqlite_pool(&DatabaseSettings::in_memory()).await.unwrap();
    RecordStore::new(pool.clone(), ProjectionConfig::products())
        .ensure_schema()
        .await
        .unwrap();
    let backend = Arc::new(SqliteProjectionBackend::new(pool));
    let synthesizer = Arc::new(ViewSynthesizer::new(ProjectionConfig::products(), backend));
    Arc::new(ReloadOrchestrator::new(definition_path, synthesizer))
}

/// 读者看到的必须是某一代的完整字段集合
fn assert_whole_generation(names: &[&str]) {
    assert!(
        names.is_empty() || names == ["a", "b"] || names == ["c", "d", "e"],
        "读到了混合的字段集合: {:?}",
        names
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_observe_mixed_generations() {
    let orch = orchestrator(Path::new("unused.json")).await;

    let writer = {
        let orch = Arc::clone(&orch);
        tokio::spawn(async move {
            for i in 0..40 {
                let bytes = if i % 2 == 0 { FIRST } else { SECOND };
                orch.reload_from_bytes(bytes.as_bytes()).await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let readers = (0..8).map(|_| {
        let orch = Arc::clone(&orch);
        tokio::spawn(async move {
            for _ in 0..500 {
                let set = orch.store().current();
                assert_whole_generation(&set.names());

                let ty = orch.schema().current();
                assert_whole_generation(&ty.dynamic_field_names());
                tokio::task::yield_now().await;
            }
        })
    });

    for result in join_all(readers).await {
        result.unwrap();
    }
    writer.await.unwrap();

    assert_eq!(orch.store().current().generation(), 40);
    assert_eq!(orch.schema().current().dynamic_field_names(), vec!["c", "d", "e"]);
}

#[tokio::test]
async fn test_concurrent_reloads_are_serialized() {
    let orch = orchestrator(Path::new("unused.json")).await;

    let reloads = (0..10).map(|i| {
        let orch = Arc::clone(&orch);
        async move {
            let bytes = if i % 2 == 0 { FIRST } else { SECOND };
            orch.reload_from_bytes(bytes.as_bytes()).await
        }
    });

    let mut generations: Vec<u64> = join_all(reloads)
        .await
        .into_iter()
        .map(|outcome| outcome.unwrap().generation)
        .collect();
    generations.sort_unstable();

    assert_eq!(generations, (1..=10).collect::<Vec<_>>());
    assert_eq!(orch.synthesizer().last_good_generation(), Some(10));

    // 视图与最后发布的类型一致
    let columns = orch.synthesizer().describe().await.unwrap().unwrap().columns;
    let ty = orch.schema().current();
    assert_eq!(&columns[1..columns.len() - 3], ty.dynamic_field_names().as_slice());
}

async fn wait_for_generation(orch: &ReloadOrchestrator, generation: u64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while orch.schema().current().generation() < generation {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("监视器未在超时前触发重载");
}

#[tokio::test]
async fn test_watcher_reloads_on_file_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("productview-config.json");
    std::fs::write(&path, FIRST).unwrap();

    let orch = orchestrator(&path).await;
    orch.reload().await.unwrap();
    assert_eq!(orch.schema().current().dynamic_field_names(), vec!["a", "b"]);

    let config = ReloadConfig::builder()
        .definition_path(&path)
        .poll_interval_ms(10)
        .debounce_ms(20)
        .build()
        .unwrap();
    let handle = DefinitionWatcher::new(Arc::clone(&orch), &config).start().await;
    assert!(handle.is_running());

    println!("🔍 修改定义文件");
    std::fs::write(&path, SECOND).unwrap();
    wait_for_generation(&orch, 2).await;
    assert_eq!(orch.schema().current().dynamic_field_names(), vec!["c", "d", "e"]);

    println!("🔍 删除定义文件");
    std::fs::remove_file(&path).unwrap();
    wait_for_generation(&orch, 3).await;
    assert!(orch.schema().current().dynamic_fields().is_empty());

    handle.stop().await;
}

#[tokio::test]
async fn test_watcher_exits_when_handle_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("productview-config.json");
    std::fs::write(&path, FIRST).unwrap();

    let orch = orchestrator(&path).await;
    let config = ReloadConfig::builder()
        .definition_path(&path)
        .poll_interval_ms(10)
        .debounce_ms(20)
        .build()
        .unwrap();
    let handle = DefinitionWatcher::new(Arc::clone(&orch), &config).start().await;
    assert_eq!(Arc::strong_count(&orch), 2);

    // 未调用 stop 直接丢弃句柄：后台任务退出并释放编排器
    drop(handle);
    tokio::time::timeout(Duration::from_secs(5), async {
        while Arc::strong_count(&orch) > 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("句柄丢弃后监视任务仍在运行");

    // 任务退出后不再响应文件变化
    std::fs::write(&path, SECOND).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(orch.schema().current().generation(), 0);
}
