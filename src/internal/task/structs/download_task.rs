//! # DownloadTask — 单个下载任务
//!
//! 对外是一个可 `Clone` 的句柄，同一个 URL 在一个管理器里只对应一个任务实例，
//! 相等性按实例判断。
//!
//! 字段读取随时可用（短临界区互斥）；所有状态迁移只在管理器的控制面上发生，
//! 见 `lifecycle` 与 `callbacks` 两个子模块。

mod callbacks;
mod codec;
pub(crate) mod lifecycle;
mod observers;
pub(crate) mod speed;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use crate::internal::errors::TaskError;
use crate::internal::manager::structs::session_context::SessionContext;
use crate::internal::states::reactive_core::ReactivePropertyError;
use crate::internal::states::synchronized_state::SynchronizedState;
use crate::internal::states::unlock_reactive::{PropertyWatcher, UnlockReactiveProperty};
use crate::internal::transport::structs::{Headers, TransferHandle};
use crate::internal::utils::file_type::FileType;
use crate::internal::utils::task_info::{format_duration, format_speed, format_timestamp};
use crate::internal::errors::DownloadError;
use crate::internal::utils::url_convertible::{UrlConvertible, default_file_name};

use super::task_progress::TaskProgress;
use super::task_state::{TaskObservers, TaskState};
use super::task_status::TaskStatus;
use super::validation::Validation;
use super::verification::VerificationType;

pub(crate) struct TaskInner {
    url: Url,
    state: SynchronizedState<TaskState>,
    observers: SynchronizedState<TaskObservers>,
    status: UnlockReactiveProperty<TaskStatus>,
    context: Arc<SessionContext>,
}

#[derive(Clone)]
pub struct DownloadTask {
    inner: Arc<TaskInner>,
}

impl PartialEq for DownloadTask {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for DownloadTask {}

impl fmt::Debug for DownloadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.state.read(|s| {
            f.debug_struct("DownloadTask")
                .field("url", &self.inner.url.as_str())
                .field("status", &s.status)
                .field("file_name", &s.file_name)
                .field("completed", &s.completed_bytes)
                .field("total", &s.total_bytes)
                .finish()
        })
    }
}

impl DownloadTask {
    /// `file_name` 为空时使用 URL 推导的默认文件名。
    pub(crate) fn new(
        url: Url,
        headers: Option<Headers>,
        file_name: Option<String>,
        context: &Arc<SessionContext>,
    ) -> Self {
        let file_name = file_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_file_name(&url));
        let state = TaskState::new(&url, file_name, headers);
        Self::with_state(url, state, context)
    }

    pub(crate) fn with_state(url: Url, state: TaskState, context: &Arc<SessionContext>) -> Self {
        let status = UnlockReactiveProperty::new(state.status);
        Self {
            inner: Arc::new(TaskInner {
                url,
                state: SynchronizedState::new(state),
                observers: SynchronizedState::new(TaskObservers::default()),
                status,
                context: Arc::clone(context),
            }),
        }
    }

    pub(crate) fn state(&self) -> &SynchronizedState<TaskState> {
        &self.inner.state
    }

    pub(crate) fn observers(&self) -> &SynchronizedState<TaskObservers> {
        &self.inner.observers
    }

    pub(crate) fn context(&self) -> &Arc<SessionContext> {
        &self.inner.context
    }

    pub(crate) fn set_status(&self, status: TaskStatus) {
        self.inner.state.write(|s| s.status = status);
        self.inner.status.update_if_changed(status);
    }

    pub(crate) fn transfer(&self) -> Option<TransferHandle> {
        self.inner.state.read(|s| s.transfer)
    }

    pub(crate) fn set_transfer(&self, handle: Option<TransferHandle>) {
        self.inner.state.write(|s| s.transfer = handle);
    }

    /// 原始 URL，任务的唯一标识。
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// 重定向后的当前 URL。
    pub fn current_url(&self) -> Url {
        self.inner.state.read(|s| s.current_url.clone())
    }

    pub fn file_name(&self) -> String {
        self.inner.state.read(|s| s.file_name.clone())
    }

    /// 完成文件的路径（不代表文件已存在）。
    pub fn file_path(&self) -> Option<PathBuf> {
        self.inner.context.registry.file_path(&self.file_name())
    }

    pub fn file_type(&self) -> Option<FileType> {
        FileType::from_url(&self.inner.url)
    }

    pub fn headers(&self) -> Option<Headers> {
        self.inner.state.read(|s| s.headers.clone())
    }

    pub fn status(&self) -> TaskStatus {
        self.inner.state.read(|s| s.status)
    }

    pub fn validation(&self) -> Validation {
        self.inner.state.read(|s| s.validation)
    }

    pub fn verification(&self) -> (Option<String>, VerificationType) {
        self.inner
            .state
            .read(|s| (s.verification_code.clone(), s.verification_type))
    }

    pub fn progress(&self) -> TaskProgress {
        self.inner.state.read(|s| TaskProgress {
            completed: s.completed_bytes,
            total: s.total_bytes,
        })
    }

    /// 字节/秒
    pub fn speed(&self) -> u64 {
        self.inner.state.read(|s| s.speed)
    }

    pub fn speed_string(&self) -> String {
        format_speed(self.speed())
    }

    /// 秒
    pub fn time_remaining(&self) -> u64 {
        self.inner.state.read(|s| s.time_remaining)
    }

    pub fn time_remaining_string(&self) -> String {
        format_duration(self.time_remaining())
    }

    pub fn start_date(&self) -> f64 {
        self.inner.state.read(|s| s.start_date)
    }

    pub fn start_date_string(&self) -> String {
        format_timestamp(self.start_date())
    }

    pub fn end_date(&self) -> f64 {
        self.inner.state.read(|s| s.end_date)
    }

    pub fn end_date_string(&self) -> String {
        format_timestamp(self.end_date())
    }

    /// 最近一次失败的原因。
    pub fn error(&self) -> Option<TaskError> {
        self.inner.state.read(|s| s.error.clone())
    }

    /// 最近一次响应的 HTTP 状态码。
    pub fn response_status(&self) -> Option<u16> {
        self.inner.state.read(|s| s.response_status)
    }

    pub fn tmp_file_name(&self) -> Option<String> {
        self.inner.state.read(|s| s.tmp_file_name.clone())
    }

    /// 是否还保留着续传数据。
    pub fn is_resumable(&self) -> bool {
        self.inner.state.read(|s| s.continuation.is_some())
    }

    /// 监听状态变化。
    pub fn watch_status(&self) -> PropertyWatcher<TaskStatus> {
        self.inner.status.watch()
    }

    /// 等待任务进入满足条件的状态，当前状态已满足时立即返回。
    pub async fn wait_for_status<F>(&self, predicate: F) -> Result<TaskStatus, ReactivePropertyError>
    where
        F: FnMut(&TaskStatus) -> bool,
    {
        self.inner.status.wait_until(predicate).await
    }
}

impl UrlConvertible for DownloadTask {
    fn as_url(&self) -> Result<Url, DownloadError> {
        Ok(self.url().clone())
    }
}

impl UrlConvertible for &DownloadTask {
    fn as_url(&self) -> Result<Url, DownloadError> {
        Ok(self.url().clone())
    }
}
