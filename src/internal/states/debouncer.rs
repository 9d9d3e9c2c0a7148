//! # Debouncer — 按 key 合并的延迟执行器
//!
//! 同一个 key 在静默窗口内被多次提交时，只执行最后一次提交的任务；
//! 任务在 `spawn_blocking` 线程上执行，不占用调用方线程。
//!
//! 典型用法：任务快照落盘（每次状态变化都会请求保存，但 200ms 内只写一次文件）。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

/// 延迟执行器，`Clone` 后共享同一份代数表。
#[derive(Clone, Default)]
pub struct Debouncer {
    /// 每个 key 最近一次提交的代数，过期的提交在唤醒后直接丢弃
    generations: Arc<Mutex<HashMap<String, u64>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交一个任务：`delay` 之后若没有更新的同 key 提交，则执行 `job`。
    ///
    /// 必须在 tokio 运行时内调用。
    pub fn execute<F>(&self, key: &str, delay: Duration, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let generation = {
            let mut map = self.generations.lock();
            let entry = map.entry(key.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        let generations = Arc::clone(&self.generations);
        let key = key.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let latest = generations.lock().get(&key).copied();
            if latest != Some(generation) {
                return;
            }
            if let Err(e) = tokio::task::spawn_blocking(job).await {
                tracing::error!(key = %key, error = %e, "debounced job panicked");
            }
        });
    }

    /// 作废某个 key 上所有尚未执行的提交。
    pub fn cancel(&self, key: &str) {
        let mut map = self.generations.lock();
        if let Some(g) = map.get_mut(key) {
            *g += 1;
        }
    }
}
