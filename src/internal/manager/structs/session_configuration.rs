//! 传输会话配置与全局常量。

use std::time::Duration;

/// 同时运行任务数的上限。
pub const MAX_CONCURRENT_TASKS_LIMIT: usize = 6;
/// 默认请求超时。
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// 快照写入的合并窗口。
pub const PERSIST_DEBOUNCE: Duration = Duration::from_millis(200);
/// 速度与剩余时间的刷新周期。
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfiguration {
    /// 单次请求的超时
    pub timeout: Duration,
    /// 同时运行的任务数，取值会被限制在 `1..=MAX_CONCURRENT_TASKS_LIMIT`
    pub max_concurrent_tasks: usize,
    pub allows_cellular_access: bool,
    pub allows_constrained_network_access: bool,
    pub allows_expensive_network_access: bool,
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_concurrent_tasks: MAX_CONCURRENT_TASKS_LIMIT,
            allows_cellular_access: false,
            allows_constrained_network_access: true,
            allows_expensive_network_access: true,
        }
    }
}

impl SessionConfiguration {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_concurrent_tasks(mut self, limit: usize) -> Self {
        self.max_concurrent_tasks = limit;
        self.clamped()
    }

    pub fn allows_cellular_access(mut self, allowed: bool) -> Self {
        self.allows_cellular_access = allowed;
        self
    }

    /// 并发数限制在 `1..=MAX_CONCURRENT_TASKS_LIMIT`。
    pub fn clamped(mut self) -> Self {
        self.max_concurrent_tasks = self
            .max_concurrent_tasks
            .clamp(1, MAX_CONCURRENT_TASKS_LIMIT);
        self
    }
}
