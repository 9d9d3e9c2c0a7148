//! 下载完成后的文件校验错误，只影响任务的校验结果，不会改变 `succeeded` 状态。

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileVerificationError {
    #[error("校验码为空")]
    CodeEmpty,

    #[error("校验码不匹配: 期望 {expected}, 实际 {actual}")]
    CodeMismatch { expected: String, actual: String },

    #[error("待校验文件不存在: {path}")]
    FileDoesNotExist { path: PathBuf },

    #[error("读取待校验文件失败 {path}: {source}")]
    ReadDataFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
