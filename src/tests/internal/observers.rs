//! 任务与管理器的观察者：补发、覆盖关系、执行位置、文件校验。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::tests::{TestEnv, eventually, settle, url, wait_manager, wait_task};
use crate::{ExecuteOn, TaskStatus, Validation, VerificationType};

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

#[tokio::test]
async fn success_observer_is_replayed_for_a_finished_task() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager.download(url("a"), None, None).await.unwrap();
    env.factory.finish(&url("a"), b"payload", 200);
    wait_task(&task, TaskStatus::Succeeded).await;
    settle(&manager).await;

    let successes = counter();
    let failures = counter();
    let s = Arc::clone(&successes);
    let f = Arc::clone(&failures);
    task.on_success(ExecuteOn::Current, move |t| {
        assert_eq!(t.status(), TaskStatus::Succeeded);
        s.fetch_add(1, Ordering::SeqCst);
    })
    .on_failure(ExecuteOn::Current, move |_| {
        f.fetch_add(1, Ordering::SeqCst);
    });
    settle(&manager).await;

    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(failures.load(Ordering::SeqCst), 0);
    let path = task.file_path().expect("final location");
    assert_eq!(std::fs::read(path).unwrap(), b"payload");
}

#[tokio::test]
async fn completion_observer_takes_over_success_and_failure() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager.download(url("a"), None, None).await.unwrap();

    let successes = counter();
    let completions = counter();
    let s = Arc::clone(&successes);
    let c = Arc::clone(&completions);
    task.on_success(ExecuteOn::Current, move |_| {
        s.fetch_add(1, Ordering::SeqCst);
    })
    .on_completion(ExecuteOn::Current, move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });
    settle(&manager).await;
    assert_eq!(completions.load(Ordering::SeqCst), 0);

    env.factory.fail(&url("a"), "connection reset");
    wait_task(&task, TaskStatus::Failed).await;
    settle(&manager).await;

    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert_eq!(successes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn progress_observer_runs_on_the_main_queue() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager.download(url("a"), None, None).await.unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    task.on_progress(ExecuteOn::Main, move |t| sink.lock().push(t.progress().completed));

    env.factory.progress(&url("a"), 10, 100);
    env.factory.progress(&url("a"), 40, 100);

    // 回调拿到的是共享的任务句柄，读到的总是执行那一刻的进度
    eventually(|| seen.lock().len() == 2).await;
    assert_eq!(seen.lock().last(), Some(&40));
    assert_eq!(task.progress().total, 100);
}

#[tokio::test]
async fn manager_observers_follow_the_aggregate() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let a = manager.download(url("a"), None, None).await.unwrap();
    let b = manager.download(url("b"), None, None).await.unwrap();

    let completions = counter();
    let last_progress = Arc::new(Mutex::new(None));
    let c = Arc::clone(&completions);
    let p = Arc::clone(&last_progress);
    manager
        .on_progress(ExecuteOn::Current, move |m| *p.lock() = Some(m.progress()))
        .on_completion(ExecuteOn::Current, move |m| {
            assert_eq!(m.status(), TaskStatus::Succeeded);
            c.fetch_add(1, Ordering::SeqCst);
        });
    settle(&manager).await;

    env.factory.finish(&url("a"), b"aaaa", 200);
    wait_task(&a, TaskStatus::Succeeded).await;
    settle(&manager).await;
    assert_eq!(completions.load(Ordering::SeqCst), 0);

    env.factory.finish(&url("b"), b"bb", 200);
    wait_task(&b, TaskStatus::Succeeded).await;
    wait_manager(&manager, TaskStatus::Succeeded).await;
    settle(&manager).await;

    assert_eq!(completions.load(Ordering::SeqCst), 1);
    let progress = last_progress.lock().expect("manager progress reported");
    assert_eq!(progress.completed, 6);
    assert_eq!(progress.total, 6);
    assert_eq!(manager.time_remaining(), 0);
}

#[tokio::test]
async fn background_completion_handler_runs_once() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let calls = counter();
    let c = Arc::clone(&calls);
    manager.set_background_completion_handler(move || {
        c.fetch_add(1, Ordering::SeqCst);
    });
    settle(&manager).await;

    env.factory.background_events_finished();
    eventually(|| calls.load(Ordering::SeqCst) == 1).await;

    env.factory.background_events_finished();
    settle(&manager).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn downloaded_file_is_validated() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager
        .download(url("hello"), None, Some("hello.txt".to_string()))
        .await
        .unwrap();

    let reported = Arc::new(AtomicBool::new(false));
    let r = Arc::clone(&reported);
    task.validate_file(
        "5EB63BBBE01EEED093CB22BB8F5ACDC3",
        VerificationType::Md5,
        ExecuteOn::Main,
        move |t| {
            if t.validation() == Validation::Correct {
                r.store(true, Ordering::SeqCst);
            }
        },
    );
    settle(&manager).await;
    assert_eq!(task.validation(), Validation::Unknown);

    env.factory.finish(&url("hello"), b"hello world", 200);
    wait_task(&task, TaskStatus::Succeeded).await;
    eventually(|| reported.load(Ordering::SeqCst)).await;
    assert_eq!(task.validation(), Validation::Correct);
    assert!(env.final_file("hello.txt").exists());
}

#[tokio::test]
async fn changed_code_revalidates_a_finished_task() {
    let env = TestEnv::new();
    let manager = env.manager(6).await;
    let task = manager
        .download(url("hello"), None, Some("hello.txt".to_string()))
        .await
        .unwrap();
    env.factory.finish(&url("hello"), b"hello world", 200);
    wait_task(&task, TaskStatus::Succeeded).await;

    let results = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&results);
    task.validate_file("0000", VerificationType::Sha256, ExecuteOn::Current, move |t| {
        sink.lock().push(t.validation());
    });

    eventually(|| !results.lock().is_empty()).await;
    assert_eq!(*results.lock(), vec![Validation::Incorrect]);
    assert_eq!(
        task.verification(),
        (Some("0000".to_string()), VerificationType::Sha256)
    );
}
