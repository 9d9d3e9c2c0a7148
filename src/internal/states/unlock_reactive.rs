//! # UnlockReactiveProperty
//!
//! 无锁读写的响应式属性，直接复用 [`super::reactive_core::ReactiveProperty`]。
//!
//! 下载任务与管理器的状态都以它对外暴露：
//! ```rust,no_run
//! # async fn example(task: session_downloader::DownloadTask) {
//! use session_downloader::TaskStatus;
//!
//! let mut watcher = task.watch_status();
//! while let Ok(status) = watcher.changed().await {
//!     if status == TaskStatus::Succeeded {
//!         break;
//!     }
//! }
//! # }
//! ```

pub use super::reactive_core::{PropertyWatcher, ReactivePropertyError as UnlockReactivePropertyError};

/// 纯通知机制的响应式属性，读写不阻塞。
pub type UnlockReactiveProperty<T> = super::reactive_core::ReactiveProperty<T>;
