use serde::{Deserialize, Serialize};

/// 任务（以及管理器聚合）的状态。
///
/// `WillSuspend` / `WillCancel` / `WillRemove` 是过渡状态：控制请求已经发出，
/// 但传输层还没有确认。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    #[default]
    Waiting,
    Running,
    Suspended,
    Canceled,
    Failed,
    Removed,
    Succeeded,
    WillSuspend,
    WillCancel,
    WillRemove,
}

impl TaskStatus {
    pub fn is_transitional(self) -> bool {
        matches!(
            self,
            TaskStatus::WillSuspend | TaskStatus::WillCancel | TaskStatus::WillRemove
        )
    }

    /// 已经结束、不会再有传输的状态。
    pub fn is_completed(self) -> bool {
        matches!(
            self,
            TaskStatus::Suspended
                | TaskStatus::Canceled
                | TaskStatus::Removed
                | TaskStatus::Succeeded
                | TaskStatus::Failed
        )
    }

    /// 失败观察者需要回放的状态。
    pub fn is_failure_like(self) -> bool {
        matches!(
            self,
            TaskStatus::Suspended | TaskStatus::Canceled | TaskStatus::Removed | TaskStatus::Failed
        )
    }

    /// 过渡状态的强度：暂停 < 取消 < 移除，非过渡状态为 0。
    pub(crate) fn intent_rank(self) -> u8 {
        match self {
            TaskStatus::WillSuspend => 1,
            TaskStatus::WillCancel => 2,
            TaskStatus::WillRemove => 3,
            _ => 0,
        }
    }
}
