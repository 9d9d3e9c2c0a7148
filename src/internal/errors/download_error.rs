//! 管理器对外操作的错误类型。

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("未知错误")]
    Unknown,

    #[error("无效的 URL: {url}")]
    InvalidUrl { url: String },

    #[error("批量下载中出现重复的 URL: {url}")]
    DuplicateUrl { url: String },

    #[error("索引越界: source={source_index}, destination={destination_index}")]
    IndexOutOfRange {
        source_index: usize,
        destination_index: usize,
    },

    #[error("找不到对应的下载任务: {url}")]
    FetchDownloadTaskFailed { url: String },

    #[error("headers 数组与 urls 数量不一致")]
    HeadersMatchFailed,

    #[error("fileNames 数组与 urls 数量不一致")]
    FileNamesMatchFailed,

    #[error("不可接受的状态码: {0}")]
    UnacceptableStatusCode(u16),

    #[error("下载管理器已关闭")]
    ManagerClosed,
}
