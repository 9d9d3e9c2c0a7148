//! 默认日志实现：把 [`LogType`] 转成 `tracing` 事件，`identifier` 作为字段附带。

use super::log_type::{LogOption, LogType};

/// 可插拔的日志接收端。
pub trait Logable: Send + Sync {
    fn identifier(&self) -> &str;

    fn option(&self) -> LogOption;

    fn log(&self, log_type: LogType);
}

#[derive(Debug, Clone)]
pub struct Logger {
    identifier: String,
    option: LogOption,
}

impl Logger {
    pub fn new(identifier: impl Into<String>, option: LogOption) -> Self {
        Self {
            identifier: identifier.into(),
            option,
        }
    }
}

impl Logable for Logger {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn option(&self) -> LogOption {
        self.option
    }

    fn log(&self, log_type: LogType) {
        if self.option != LogOption::Default {
            return;
        }
        let identifier = self.identifier.as_str();
        match log_type {
            LogType::Manager {
                message,
                task_count,
            } => {
                tracing::info!(identifier, task_count, "[SessionManager] {}", message);
            }
            LogType::Task {
                message,
                url,
                error: Some(error),
            } => {
                tracing::warn!(identifier, url = %url, error = %error, "[DownloadTask] {}", message);
            }
            LogType::Task {
                message,
                url,
                error: None,
            } => {
                tracing::debug!(identifier, url = %url, "[DownloadTask] {}", message);
            }
            LogType::Error { message, error } => {
                tracing::error!(identifier, error = %error, "[Error] {}", message);
            }
        }
    }
}
