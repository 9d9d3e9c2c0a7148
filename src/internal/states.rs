//! 并发基础设施：互斥状态容器、延迟合并执行器、响应式属性与控制面命令队列。

pub mod debouncer;
pub(crate) mod queue_reactive;
pub mod reactive_core;
pub mod synchronized_state;
pub mod unlock_reactive;
