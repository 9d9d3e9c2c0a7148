//! 下载管理器：串行控制面、准入控制、聚合状态、会话重建与启动恢复。

pub mod structs;
