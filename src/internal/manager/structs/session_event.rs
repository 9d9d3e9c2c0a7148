use crate::internal::task::structs::DownloadTask;

/// 管理器广播的生命周期事件，通过 [`SessionManager::subscribe_events`](super::SessionManager::subscribe_events) 订阅。
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// 任务开始传输或写入了数据
    TaskRunning(DownloadTask),
    /// 任务进入结束状态（成功或失败）
    TaskDidComplete(DownloadTask),
    /// 管理器整体进度变化
    ManagerRunning,
    /// 管理器整体进入结束状态
    ManagerDidComplete,
}
