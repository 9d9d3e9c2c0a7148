//! 创建任务与准入控制：FIFO 启动、同一 URL 只建一个任务、批量下载的参数校验、列表排序。

use std::collections::HashMap;

use crate::errors::DownloadError;
use crate::tests::{TestEnv, settle, url, wait_manager, wait_task};
use crate::TaskStatus;

#[tokio::test]
async fn waiting_tasks_start_in_fifo_order() {
    let env = TestEnv::new();
    let manager = env.manager(1).await;

    let a = manager.download(url("a"), None, None).await.unwrap();
    let b = manager.download(url("b"), None, None).await.unwrap();
    let c = manager.download(url("c"), None, None).await.unwrap();

    assert_eq!(a.status(), TaskStatus::Running);
    assert_eq!(b.status(), TaskStatus::Waiting);
    assert_eq!(c.status(), TaskStatus::Waiting);
    assert_eq!(env.factory.started_urls(), vec![url("a")]);
    assert_eq!(manager.running_tasks(), vec![a.clone()]);

    env.factory.finish(&url("a"), b"first", 200);
    wait_task(&a, TaskStatus::Succeeded).await;
    wait_task(&b, TaskStatus::Running).await;
    assert_eq!(c.status(), TaskStatus::Waiting);

    env.factory.finish(&url("b"), b"second", 200);
    wait_task(&c, TaskStatus::Running).await;
    env.factory.finish(&url("c"), b"third", 200);
    wait_manager(&manager, TaskStatus::Succeeded).await;

    assert_eq!(env.factory.started_urls(), vec![url("a"), url("b"), url("c")]);
    assert_eq!(manager.succeeded_tasks().len(), 3);
    assert!(manager.running_tasks().is_empty());
    assert!(env.final_file(&a.file_name()).exists());
}

#[tokio::test]
async fn same_url_returns_the_same_task() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;

    let first = manager.download(url("same"), None, None).await.unwrap();
    let mut headers = HashMap::new();
    headers.insert("Authorization".to_string(), "Bearer t".to_string());
    let second = manager
        .download(url("same"), Some(headers.clone()), None)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(manager.tasks().len(), 1);
    assert_eq!(second.headers(), Some(headers));
    // 已在运行的任务不会再次发起传输
    assert_eq!(env.factory.starts().len(), 1);
}

#[tokio::test]
async fn invalid_url_is_rejected() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;

    let result = manager.download("not a url", None, None).await;
    assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    assert!(manager.tasks().is_empty());
}

#[tokio::test]
async fn multi_download_checks_lengths_and_skips_duplicates() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;

    let result = manager
        .multi_download(vec![url("a"), url("b")], Some(vec![HashMap::new()]), None)
        .await;
    assert!(matches!(result, Err(DownloadError::HeadersMatchFailed)));

    let result = manager
        .multi_download(vec![url("a"), url("b")], None, Some(vec!["a.bin".to_string()]))
        .await;
    assert!(matches!(result, Err(DownloadError::FileNamesMatchFailed)));
    assert!(manager.tasks().is_empty());

    let tasks = manager
        .multi_download(
            vec![url("a"), url("b"), url("a"), "::bad::".to_string()],
            None,
            Some(vec![
                "a.bin".to_string(),
                "b.bin".to_string(),
                "again.bin".to_string(),
                "bad.bin".to_string(),
            ]),
        )
        .await
        .unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].file_name(), "a.bin");
    assert_eq!(tasks[1].file_name(), "b.bin");
    assert_eq!(manager.tasks(), tasks);
    assert_eq!(env.factory.starts().len(), 2);
}

#[tokio::test]
async fn empty_per_item_lists_count_as_absent() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;

    let tasks = manager
        .multi_download(vec![url("a"), url("b")], Some(vec![]), Some(vec![]))
        .await
        .unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].headers(), None);
    assert_eq!(tasks[1].file_name(), crate::utils::default_file_name(tasks[1].url()));
    assert_eq!(env.factory.started_urls(), vec![url("a"), url("b")]);
}

#[tokio::test]
async fn move_and_sort_reorder_the_list() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    for name in ["a", "b", "c"] {
        manager.download(url(name), None, None).await.unwrap();
    }

    let result = manager.move_task(0, 3).await;
    assert!(matches!(
        result,
        Err(DownloadError::IndexOutOfRange {
            source_index: 0,
            destination_index: 3
        })
    ));

    manager.move_task(0, 2).await.unwrap();
    let order: Vec<String> = manager.tasks().iter().map(|t| t.url().to_string()).collect();
    assert_eq!(order, vec![url("b"), url("c"), url("a")]);

    manager
        .sort_by(|x, y| x.url().as_str().cmp(y.url().as_str()))
        .await
        .unwrap();
    let order: Vec<String> = manager.tasks().iter().map(|t| t.url().to_string()).collect();
    assert_eq!(order, vec![url("a"), url("b"), url("c")]);
    settle(&manager).await;
}

#[tokio::test]
async fn existing_final_file_succeeds_without_transfer() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;

    std::fs::create_dir_all(env.root().join("final")).unwrap();
    std::fs::write(env.final_file("cached.bin"), b"0123456789").unwrap();

    let task = manager
        .download(url("cached"), None, Some("cached.bin".to_string()))
        .await
        .unwrap();
    wait_task(&task, TaskStatus::Succeeded).await;

    assert!(env.factory.starts().is_empty());
    assert_eq!(task.progress().total, 10);
    assert_eq!(task.progress().completed, 10);
    assert!(manager.running_tasks().is_empty());
    wait_manager(&manager, TaskStatus::Succeeded).await;
}

#[tokio::test]
async fn start_failure_marks_task_failed() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    env.factory.fail_start(true);

    let task = manager.download(url("broken"), None, None).await.unwrap();
    assert_eq!(task.status(), TaskStatus::Failed);
    assert!(matches!(
        task.error(),
        Some(crate::errors::TaskError::StartFailed { .. })
    ));
    wait_manager(&manager, TaskStatus::Failed).await;
}
