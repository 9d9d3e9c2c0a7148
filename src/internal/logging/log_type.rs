/// 日志开关。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOption {
    #[default]
    Default,
    /// 静默，不输出任何日志
    None,
}

/// 一条日志的来源与内容。
#[derive(Debug, Clone)]
pub enum LogType {
    /// 管理器级别的事件，附带当前任务数
    Manager { message: String, task_count: usize },
    /// 单个任务的事件；任务失败时附带错误描述
    Task {
        message: String,
        url: String,
        error: Option<String>,
    },
    /// 错误
    Error { message: String, error: String },
}

impl LogType {
    pub fn error(message: impl Into<String>, error: impl std::fmt::Display) -> Self {
        LogType::Error {
            message: message.into(),
            error: error.to_string(),
        }
    }
}
