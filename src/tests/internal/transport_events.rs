//! 传输层事件的分发：进度、重定向、过期事件。

use url::Url;

use crate::tests::{TestEnv, settle, url, wait_task};
use crate::transport::TransportEvent;
use crate::{SessionEvent, TaskStatus};

#[tokio::test]
async fn progress_updates_task_and_manager() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let a = manager.download(url("a"), None, None).await.unwrap();
    let b = manager.download(url("b"), None, None).await.unwrap();
    let mut events = manager.subscribe_events();

    env.factory.progress(&url("a"), 30, 100);
    env.factory.progress(&url("b"), 10, 50);
    settle(&manager).await;

    assert_eq!(a.progress().completed, 30);
    assert_eq!(a.progress().total, 100);
    assert_eq!(b.progress().completed, 10);
    let progress = manager.progress();
    assert_eq!(progress.completed, 40);
    assert_eq!(progress.total, 150);

    let mut running = 0;
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::TaskRunning(task) = event {
            assert!(task == a || task == b);
            running += 1;
        }
    }
    assert_eq!(running, 2);
}

#[tokio::test]
async fn redirected_task_is_reachable_by_both_urls() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager.download(url("a"), None, None).await.unwrap();
    let mirror = "https://mirror.example.com/a.bin";

    env.factory.redirect(&url("a"), mirror);
    settle(&manager).await;
    assert_eq!(task.current_url(), Url::parse(mirror).unwrap());
    assert_eq!(task.url().as_str(), url("a"));

    // 重定向之后传输层用新地址报告进度
    env.factory.progress(mirror, 12, 24);
    settle(&manager).await;
    assert_eq!(task.progress().completed, 12);

    assert_eq!(manager.fetch(mirror), Some(task.clone()));
    assert_eq!(manager.fetch(url("a")), Some(task.clone()));

    env.factory.finish(mirror, b"mirrored", 200);
    wait_task(&task, TaskStatus::Succeeded).await;
}

#[tokio::test]
async fn events_for_a_retired_transfer_are_ignored() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager.download(url("a"), None, None).await.unwrap();
    let handle = env.factory.handle_of(&url("a"));

    manager.suspend(url("a"));
    wait_task(&task, TaskStatus::Suspended).await;
    settle(&manager).await;
    let suspended = task.progress();

    env.factory.emit(TransportEvent::Progress {
        handle,
        current_url: Url::parse(&url("a")).unwrap(),
        bytes_written: 99,
        total_written: 99,
        total_expected: 100,
    });
    env.factory.emit(TransportEvent::Completed {
        handle,
        current_url: Url::parse(&url("a")).unwrap(),
        status_code: Some(200),
        bytes_received: 100,
        bytes_expected: 100,
        error: None,
    });
    settle(&manager).await;

    assert_eq!(task.status(), TaskStatus::Suspended);
    assert_eq!(task.progress(), suspended);
}

#[tokio::test]
async fn events_for_unknown_urls_are_dropped() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager.download(url("a"), None, None).await.unwrap();
    let handle = env.factory.handle_of(&url("a"));

    env.factory.emit(TransportEvent::Progress {
        handle: crate::transport::TransferHandle(handle.0 + 1000),
        current_url: Url::parse(&url("nobody")).unwrap(),
        bytes_written: 5,
        total_written: 5,
        total_expected: 10,
    });
    settle(&manager).await;

    assert_eq!(task.progress().completed, 0);
    assert_eq!(manager.tasks().len(), 1);
    assert_eq!(task.status(), TaskStatus::Running);
}
