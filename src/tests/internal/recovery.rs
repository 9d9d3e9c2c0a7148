//! 快照持久化与启动恢复：等待中的任务恢复为暂停，传输层仍在进行的传输重新接管。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::registry::TaskRecord;
use crate::tests::{TestEnv, settle, url, wait_manager, wait_task};
use crate::{ExecuteOn, TaskStatus};

#[tokio::test]
async fn snapshot_round_trips_through_a_restart() {
    let env = TestEnv::new();
    let first = env.manager(1).await;
    first
        .download(url("a"), None, Some("alpha.bin".to_string()))
        .await
        .unwrap();
    first.download(url("b"), None, None).await.unwrap();
    env.factory.progress(&url("a"), 5, 20);
    first.close().await;

    let snapshot = std::fs::read(first.registry().snapshot_path()).unwrap();
    let records: Vec<TaskRecord> = serde_json::from_slice(&snapshot).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status, TaskStatus::Running);
    assert_eq!(records[1].status, TaskStatus::Waiting);
    assert!(first.flush().await.is_err());

    let second = env.manager(1).await;
    let tasks = second.tasks();
    let urls: Vec<String> = tasks.iter().map(|t| t.url().to_string()).collect();
    assert_eq!(urls, vec![url("a"), url("b")]);
    // 没有对应传输的运行中任务与等待中的任务都恢复为暂停
    assert!(tasks.iter().all(|t| t.status() == TaskStatus::Suspended));
    assert_eq!(tasks[0].file_name(), "alpha.bin");
    assert_eq!(tasks[0].progress().completed, 5);
    assert_eq!(tasks[0].progress().total, 20);
    assert_eq!(second.status(), TaskStatus::Waiting);
    assert!(second.running_tasks().is_empty());

    second.start(url("b"));
    wait_task(&tasks[1], TaskStatus::Running).await;
}

#[tokio::test]
async fn live_transfers_are_adopted_after_a_restart() {
    let env = TestEnv::new();
    env.factory.keep_live_on_invalidate(true);
    let first = env.manager(6).await;
    first.download(url("a"), None, None).await.unwrap();
    first.close().await;
    assert_eq!(env.factory.live().len(), 1);

    let second = env.manager(6).await;
    let task = second.fetch(url("a")).unwrap();
    assert_eq!(task.status(), TaskStatus::Running);
    assert_eq!(second.status(), TaskStatus::Running);
    assert_eq!(second.running_tasks(), vec![task.clone()]);

    env.factory.finish(&url("a"), b"adopted", 200);
    wait_task(&task, TaskStatus::Succeeded).await;
    wait_manager(&second, TaskStatus::Succeeded).await;

    assert_eq!(env.factory.starts().len(), 1);
    assert_eq!(
        std::fs::read(env.final_file(&task.file_name())).unwrap(),
        b"adopted"
    );
}

#[tokio::test]
async fn finished_snapshot_restores_as_succeeded() {
    let env = TestEnv::new();
    let first = env.manager(6).await;
    let task = first.download(url("a"), None, None).await.unwrap();
    env.factory.finish(&url("a"), b"done", 200);
    wait_task(&task, TaskStatus::Succeeded).await;
    first.close().await;

    let second = env.manager(6).await;
    assert_eq!(second.status(), TaskStatus::Succeeded);
    assert_eq!(second.succeeded_tasks().len(), 1);

    let successes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&successes);
    second.on_success(ExecuteOn::Current, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    settle(&second).await;
    assert_eq!(successes.load(Ordering::SeqCst), 1);

    // 再次下载已成功的任务不会发起传输
    let again = second.download(url("a"), None, None).await.unwrap();
    assert_eq!(again.status(), TaskStatus::Succeeded);
    assert_eq!(env.factory.starts().len(), 1);
}
