//! 单个任务与全部任务的暂停、取消、移除。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::TaskError;
use crate::tests::{TestEnv, settle, url, wait_manager, wait_task};
use crate::{ExecuteOn, SessionEvent, TaskStatus};

#[tokio::test]
async fn cancelling_a_waiting_task_skips_the_transport() {
    let env = TestEnv::new();
    let manager = env.manager(1).await;
    let a = manager.download(url("a"), None, None).await.unwrap();
    let b = manager.download(url("b"), None, None).await.unwrap();
    assert_eq!(b.status(), TaskStatus::Waiting);

    manager.cancel(url("b"));
    wait_task(&b, TaskStatus::Canceled).await;
    settle(&manager).await;

    assert!(env.factory.cancels().is_empty());
    assert_eq!(manager.tasks(), vec![a.clone()]);
    assert!(manager.fetch(url("b")).is_none());
    assert_eq!(a.status(), TaskStatus::Running);
    assert_eq!(manager.status(), TaskStatus::Running);
}

#[tokio::test]
async fn suspended_task_resumes_with_its_continuation() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager.download(url("a"), None, None).await.unwrap();
    let handle = env.factory.handle_of(&url("a"));

    manager.suspend(url("a"));
    wait_task(&task, TaskStatus::Suspended).await;
    wait_manager(&manager, TaskStatus::Suspended).await;

    let cancels = env.factory.cancels();
    assert_eq!(cancels.len(), 1);
    assert_eq!(cancels[0].handle, handle);
    assert!(cancels[0].produce_continuation);
    assert!(task.is_resumable());
    assert!(matches!(task.error(), Some(TaskError::Cancelled)));
    let artifact = task.tmp_file_name().expect("continuation artifact recorded");
    assert!(env.root().join("tmp").join(&artifact).exists());
    assert_eq!(task.progress().completed, 7);

    manager.start(url("a"));
    wait_task(&task, TaskStatus::Running).await;

    let starts = env.factory.starts();
    assert_eq!(starts.len(), 2);
    assert_eq!(
        starts[1].continuation.as_deref(),
        Some(format!("resume-{}", handle.0).as_bytes())
    );
    assert_eq!(manager.status(), TaskStatus::Running);
}

#[tokio::test]
async fn stronger_intent_replaces_pending_suspend() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager.download(url("a"), None, None).await.unwrap();
    env.factory.hold_cancellations();

    manager.suspend(url("a"));
    settle(&manager).await;
    assert_eq!(task.status(), TaskStatus::WillSuspend);

    manager.cancel(url("a"));
    settle(&manager).await;
    assert_eq!(task.status(), TaskStatus::WillCancel);
    // 已经在等待传输层确认，不会再发一次取消
    assert_eq!(env.factory.cancels().len(), 1);

    env.factory.release_cancellations();
    wait_task(&task, TaskStatus::Canceled).await;
    wait_manager(&manager, TaskStatus::Canceled).await;

    assert!(manager.tasks().is_empty());
    assert!(!task.is_resumable());
    let leftovers = std::fs::read_dir(env.transient())
        .map(|dir| dir.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn removing_the_last_task_removes_the_manager_once() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let failures = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&failures);
    manager.on_failure(ExecuteOn::Current, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let mut events = manager.subscribe_events();

    let task = manager.download(url("a"), None, None).await.unwrap();
    manager.remove(url("a"), true);
    wait_task(&task, TaskStatus::Removed).await;
    wait_manager(&manager, TaskStatus::Removed).await;
    settle(&manager).await;

    assert_eq!(failures.load(Ordering::SeqCst), 1);
    assert!(manager.tasks().is_empty());
    assert!(manager.fetch(url("a")).is_none());

    let mut completions = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, SessionEvent::ManagerDidComplete) {
            completions += 1;
        }
    }
    assert_eq!(completions, 1);
}

#[tokio::test]
async fn total_suspend_then_total_start() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let tasks = manager
        .multi_download(vec![url("a"), url("b"), url("c")], None, None)
        .await
        .unwrap();
    let suspended = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&suspended);

    manager.total_suspend_with(ExecuteOn::Current, move |m| {
        assert_eq!(m.status(), TaskStatus::Suspended);
        counter.fetch_add(1, Ordering::SeqCst);
    });
    wait_manager(&manager, TaskStatus::Suspended).await;
    settle(&manager).await;

    assert_eq!(suspended.load(Ordering::SeqCst), 1);
    assert!(tasks.iter().all(|t| t.status() == TaskStatus::Suspended));
    assert_eq!(env.factory.cancels().len(), 3);
    assert!(env.factory.cancels().iter().all(|c| c.produce_continuation));

    manager.total_start();
    wait_manager(&manager, TaskStatus::Running).await;
    settle(&manager).await;

    assert!(tasks.iter().all(|t| t.status() == TaskStatus::Running));
    let starts = env.factory.starts();
    assert_eq!(starts.len(), 6);
    assert!(starts[3..].iter().all(|r| r.continuation.is_some()));
}

#[tokio::test]
async fn total_cancel_keeps_succeeded_tasks() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let done = manager.download(url("done"), None, None).await.unwrap();
    let pending = manager.download(url("pending"), None, None).await.unwrap();
    env.factory.finish(&url("done"), b"payload", 200);
    wait_task(&done, TaskStatus::Succeeded).await;

    manager.total_cancel();
    wait_task(&pending, TaskStatus::Canceled).await;
    wait_manager(&manager, TaskStatus::Canceled).await;

    assert_eq!(manager.tasks(), vec![done.clone()]);
    assert_eq!(done.status(), TaskStatus::Succeeded);
    assert!(env.final_file(&done.file_name()).exists());
}

#[tokio::test]
async fn network_failure_marks_task_failed() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager.download(url("a"), None, None).await.unwrap();

    env.factory.fail(&url("a"), "connection reset");
    wait_task(&task, TaskStatus::Failed).await;
    wait_manager(&manager, TaskStatus::Failed).await;

    assert!(matches!(
        task.error(),
        Some(TaskError::Transfer { message }) if message == "connection reset"
    ));
    assert!(manager.running_tasks().is_empty());

    // 失败的任务可以重新开始
    manager.start(url("a"));
    wait_task(&task, TaskStatus::Running).await;
    assert_eq!(env.factory.starts().len(), 2);
}

#[tokio::test]
async fn unacceptable_status_code_fails_the_task() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager.download(url("missing"), None, None).await.unwrap();

    env.factory.finish(&url("missing"), b"not found", 404);
    wait_task(&task, TaskStatus::Failed).await;

    assert!(matches!(
        task.error(),
        Some(TaskError::UnacceptableStatusCode { code: 404 })
    ));
    assert_eq!(task.response_status(), Some(404));
    assert!(!env.final_file(&task.file_name()).exists());
}

#[tokio::test]
async fn cancelling_the_running_task_starts_the_next_waiting_one() {
    let env = TestEnv::new();
    let manager = env.manager(1).await;
    let a = manager.download(url("a"), None, None).await.unwrap();
    let b = manager.download(url("b"), None, None).await.unwrap();
    assert_eq!(b.status(), TaskStatus::Waiting);

    manager.cancel(url("a"));
    wait_task(&a, TaskStatus::Canceled).await;
    wait_task(&b, TaskStatus::Running).await;

    assert_eq!(env.factory.started_urls(), vec![url("a"), url("b")]);
    assert_eq!(manager.running_tasks(), vec![b.clone()]);
    assert_eq!(manager.status(), TaskStatus::Running);
}

#[tokio::test]
async fn removing_the_running_task_starts_the_next_waiting_one() {
    let env = TestEnv::new();
    let manager = env.manager(1).await;
    let a = manager.download(url("a"), None, None).await.unwrap();
    let b = manager.download(url("b"), None, None).await.unwrap();

    manager.remove(url("a"), true);
    wait_task(&a, TaskStatus::Removed).await;
    wait_task(&b, TaskStatus::Running).await;

    assert_eq!(manager.tasks(), vec![b.clone()]);
    assert_eq!(env.factory.started_urls(), vec![url("a"), url("b")]);
}

#[tokio::test]
async fn repeated_suspend_and_resume_still_completes() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager.download(url("a"), None, None).await.unwrap();

    let mut handles = Vec::new();
    for written in [3, 6] {
        env.factory.progress(&url("a"), written, 10);
        handles.push(env.factory.handle_of(&url("a")));
        manager.suspend(url("a"));
        wait_task(&task, TaskStatus::Suspended).await;
        assert!(task.is_resumable());

        manager.start(url("a"));
        wait_task(&task, TaskStatus::Running).await;
    }

    env.factory.finish(&url("a"), b"0123456789", 200);
    wait_task(&task, TaskStatus::Succeeded).await;
    wait_manager(&manager, TaskStatus::Succeeded).await;

    let progress = task.progress();
    assert_eq!(progress.completed, progress.total);
    assert_eq!(progress.completed, 10);

    let starts = env.factory.starts();
    assert_eq!(starts.len(), 3);
    assert_eq!(
        starts[2].continuation.as_deref(),
        Some(format!("resume-{}", handles[1].0).as_bytes())
    );
    let path = task.file_path().expect("final location");
    assert_eq!(std::fs::read(path).unwrap(), b"0123456789");
}
