//! 记录在任务上的最近一次错误，随任务快照一起持久化。

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TaskError {
    #[error("不可接受的状态码: {code}")]
    UnacceptableStatusCode { code: u16 },

    #[error("传输失败: {message}")]
    Transfer { message: String },

    #[error("传输被取消")]
    Cancelled,

    #[error("传输会话已失效")]
    SessionInvalidated,

    #[error("无法发起传输: {message}")]
    StartFailed { message: String },
}
