//! 传输层回调事件。同一个传输的事件按发出顺序处理，不同传输之间任意交错。

use std::path::PathBuf;

use url::Url;

use super::transfer_request::TransferHandle;

/// 传输中断的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 调用方主动取消（暂停 / 取消 / 移除）
    Cancelled,
    /// 会话被整体作废，进行中的传输被连带取消
    SessionInvalidated,
    /// 网络或 I/O 错误
    Network,
}

/// 续传数据：不透明令牌，加上传输层临时目录里对应的中间产物文件名。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub token: Vec<u8>,
    pub artifact_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TransferFailure {
    pub kind: FailureKind,
    pub message: String,
    pub continuation: Option<Continuation>,
}

#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// 写入了一段数据
    Progress {
        handle: TransferHandle,
        current_url: Url,
        bytes_written: u64,
        total_written: u64,
        total_expected: u64,
    },
    /// 请求被重定向，之后的事件都携带新的 `current_url`
    Redirected {
        handle: TransferHandle,
        previous_url: Url,
        current_url: Url,
    },
    /// 响应体已完整写入临时文件 `location`，随后一定会有 `Completed`
    FinishedToLocation {
        handle: TransferHandle,
        current_url: Url,
        status_code: Option<u16>,
        location: PathBuf,
    },
    /// 传输结束（成功、失败或被取消）
    Completed {
        handle: TransferHandle,
        current_url: Url,
        status_code: Option<u16>,
        bytes_received: u64,
        bytes_expected: u64,
        error: Option<TransferFailure>,
    },
    /// 会话已作废，此前的所有传输事件都已投递完毕
    Invalidated,
    /// 后台事件全部投递完毕
    BackgroundEventsFinished,
}
