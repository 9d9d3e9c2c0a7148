//! 传输层契约。除 `list_live_handles` 外都是非阻塞调用：实际工作由传输层自己的任务完成，
//! 结果以 [`TransportEvent`](crate::transport::TransportEvent) 投递回来。

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::internal::errors::TransportError;
use crate::internal::manager::structs::session_configuration::SessionConfiguration;
use crate::internal::transport::structs::{EventSink, LiveTransfer, TransferHandle, TransferRequest};

#[async_trait]
pub trait Transport: Send + Sync {
    /// 发起传输，立即返回句柄。
    fn start_transfer(&self, request: TransferRequest) -> Result<TransferHandle, TransportError>;

    /// 取消传输。`produce_continuation` 为真时，`Completed` 事件里应带上续传数据。
    fn cancel(&self, handle: TransferHandle, produce_continuation: bool);

    /// 传输层自己记录的、仍在进行中的传输。
    async fn list_live_handles(&self) -> Vec<LiveTransfer>;

    /// 作废会话：取消所有进行中的传输（原因 `SessionInvalidated`，带续传数据），
    /// 全部结束后投递 `Invalidated`。
    fn invalidate(&self);
}

/// 创建传输会话时传入的上下文。
pub struct TransportContext {
    pub configuration: SessionConfiguration,
    /// 传输层的临时目录，未完成的中间产物放在这里
    pub transient_dir: PathBuf,
    pub events: EventSink,
}

/// 传输会话工厂；管理器在启动、重新配置、会话失效时调用。
pub trait TransportFactory: Send + Sync {
    fn create_transport(&self, context: TransportContext) -> Result<Arc<dyn Transport>, TransportError>;
}
