//! 传输适配层的错误类型。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP 请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("临时文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("续传数据无效: {0}")]
    InvalidContinuation(String),

    #[error("传输会话已失效")]
    Invalidated,
}
