use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use url::Url;

/// 请求头。
pub type Headers = HashMap<String, String>;

/// 传输层发放的不透明传输句柄，在进程内唯一。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferHandle(pub u64);

impl TransferHandle {
    /// 分配一个新的句柄。不同会话共用同一个计数器，句柄不会跨会话重复。
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// 发起一次传输所需的参数。
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub url: Url,
    pub headers: Option<Headers>,
    /// 续传令牌；为 `None` 时从头开始
    pub continuation: Option<Vec<u8>>,
}

/// 传输层当前仍在进行中的一次传输。
#[derive(Debug, Clone)]
pub struct LiveTransfer {
    pub handle: TransferHandle,
    pub current_url: Url,
}
