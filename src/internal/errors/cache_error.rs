//! 任务注册表（磁盘缓存）的错误类型。注册表内部只记录日志，从不把它抛回控制面。

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("创建目录失败 {path}: {source}")]
    CannotCreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("删除失败 {path}: {source}")]
    CannotRemoveItem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("复制失败 {from} -> {to}: {source}")]
    CannotCopyItem {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("移动失败 {from} -> {to}: {source}")]
    CannotMoveItem {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("读取任务快照失败 {path}: {message}")]
    CannotRetrieveAllTasks { path: PathBuf, message: String },

    #[error("写入任务快照失败 {path}: {message}")]
    CannotEncodeTasks { path: PathBuf, message: String },

    #[error("文件不存在: {path}")]
    FileDoesNotExist { path: PathBuf },

    #[error("读取文件失败 {path}: {source}")]
    ReadDataFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
