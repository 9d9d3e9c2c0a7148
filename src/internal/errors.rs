//! 错误类型：调用方可见的 [`DownloadError`]、存储层的 [`CacheError`]、
//! 文件校验的 [`FileVerificationError`]、记录在任务上的 [`TaskError`] 与传输层的 [`TransportError`]。

pub mod cache_error;
pub mod download_error;
pub mod task_error;
pub mod transport_error;
pub mod verification_error;

pub use cache_error::CacheError;
pub use download_error::DownloadError;
pub use task_error::TaskError;
pub use transport_error::TransportError;
pub use verification_error::FileVerificationError;
