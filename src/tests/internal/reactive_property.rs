//! 并发基础设施测试：响应式属性与互斥状态容器。
//!
//! 测试项：
//! - `update_if_changed` 只在值变化时通知
//! - `wait_until` 条件等待（立即满足 / 异步等待 / 挂起）
//! - `SynchronizedState` 多任务并发写不丢更新

use std::time::Duration;

use crate::states::synchronized_state::SynchronizedState;
use crate::states::unlock_reactive::UnlockReactiveProperty;

#[tokio::test]
async fn update_if_changed_skips_equal_values() {
    let prop = UnlockReactiveProperty::new(1u32);
    let mut watcher = prop.watch();

    assert!(!prop.update_if_changed(1));
    assert!(prop.update_if_changed(2));
    assert_eq!(watcher.changed().await.unwrap(), 2);
    assert_eq!(prop.get_current(), 2);
}

#[tokio::test]
async fn wait_until_already_satisfied() {
    let prop = UnlockReactiveProperty::new(100i32);
    // 当前值已满足，应立即返回
    let v = tokio::time::timeout(Duration::from_millis(100), prop.wait_until(|v| *v == 100))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(v, 100);
}

#[tokio::test]
async fn wait_until_async_satisfied() {
    let prop = UnlockReactiveProperty::new(0i32);
    let p = prop.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        p.update(1);
        tokio::time::sleep(Duration::from_millis(20)).await;
        p.update(42);
    });

    prop.wait_until(|v| *v == 42).await.unwrap();
    assert_eq!(prop.get_current(), 42);
}

#[tokio::test]
async fn wait_until_blocks_when_unsatisfied() {
    let prop = UnlockReactiveProperty::new(0i32);

    let result = tokio::time::timeout(Duration::from_millis(100), prop.wait_until(|v| *v == 9999)).await;
    assert!(result.is_err(), "条件未满足时 wait_until 应持续挂起");

    prop.update(9999);
    let result = tokio::time::timeout(Duration::from_millis(100), prop.wait_until(|v| *v == 9999)).await;
    assert!(result.is_ok(), "条件满足后 wait_until 应立即返回");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn synchronized_state_concurrent_writes() {
    const TASKS: usize = 8;
    const PER_TASK: usize = 1_000;

    let state = SynchronizedState::new(0u64);
    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let s = state.clone();
        handles.push(tokio::spawn(async move {
            let mut added = 0u64;
            for _ in 0..PER_TASK {
                let step = rand::random::<u8>() as u64;
                s.write(|v| *v += step);
                added += step;
            }
            added
        }));
    }
    let mut expected = 0u64;
    for h in handles {
        expected += h.await.unwrap();
    }
    assert_eq!(state.snapshot(), expected);
}
