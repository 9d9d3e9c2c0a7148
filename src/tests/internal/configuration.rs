//! 运行中修改配置：整体暂停、作废并重建会话、按新的并发上限恢复任务。

use crate::tests::{TestEnv, settle, url, wait_manager, wait_task};
use crate::{SessionConfiguration, TaskStatus};

#[tokio::test]
async fn lowering_concurrency_recreates_the_session() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let urls: Vec<String> = ["a", "b", "c", "d"].iter().map(|n| url(n)).collect();
    let tasks = manager.multi_download(urls, None, None).await.unwrap();
    assert!(tasks.iter().all(|t| t.status() == TaskStatus::Running));
    assert_eq!(env.factory.sessions(), 1);

    manager.set_configuration(SessionConfiguration::default().max_concurrent_tasks(2));
    wait_task(&tasks[3], TaskStatus::Waiting).await;
    settle(&manager).await;

    assert_eq!(env.factory.sessions(), 2);
    assert_eq!(manager.configuration().max_concurrent_tasks, 2);
    let statuses: Vec<TaskStatus> = tasks.iter().map(|t| t.status()).collect();
    assert_eq!(
        statuses,
        vec![
            TaskStatus::Running,
            TaskStatus::Running,
            TaskStatus::Waiting,
            TaskStatus::Waiting
        ]
    );
    assert_eq!(manager.running_tasks().len(), 2);
    assert_eq!(manager.status(), TaskStatus::Running);

    // 重新发起的传输都带着暂停时留下的续传数据
    let starts = env.factory.starts();
    assert_eq!(starts.len(), 6);
    assert!(starts[4..].iter().all(|r| r.continuation.is_some()));

    env.factory.finish(&url("a"), b"a", 200);
    wait_task(&tasks[2], TaskStatus::Running).await;
}

#[tokio::test]
async fn idle_manager_applies_configuration_on_a_new_session() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;

    manager.set_configuration(SessionConfiguration::default().max_concurrent_tasks(99));
    settle(&manager).await;

    assert_eq!(env.factory.sessions(), 2);
    assert_eq!(manager.configuration().max_concurrent_tasks, 6);

    let task = manager.download(url("a"), None, None).await.unwrap();
    assert_eq!(task.status(), TaskStatus::Running);
    wait_manager(&manager, TaskStatus::Running).await;
}

#[tokio::test]
async fn transport_side_invalidation_restarts_running_tasks() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager.download(url("a"), None, None).await.unwrap();

    // 进行中的传输以 SessionInvalidated 结束，随后投递 Invalidated
    env.factory.invalidate_current();
    settle(&manager).await;

    assert_eq!(task.status(), TaskStatus::Running);
    assert!(task.error().is_none());
    assert_eq!(manager.status(), TaskStatus::Running);
    assert_eq!(env.factory.sessions(), 2);
    let starts = env.factory.starts();
    assert_eq!(starts.len(), 2);
    assert!(starts[1].continuation.is_some());
    assert!(env.factory.cancels().is_empty());
}
