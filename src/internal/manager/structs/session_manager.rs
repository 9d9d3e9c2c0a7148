//! # SessionManager — 调用方持有的管理器句柄
//!
//! 句柄可以任意 `Clone`，所有克隆共享同一个控制面。读取类接口直接读共享字段；
//! 会改变状态的接口只投递命令，需要结果的接口（`download`、`move_task` 等）等待控制面回执。
//!
//! 最后一个句柄释放时，控制面同步写入快照、作废传输会话后退出。

mod control;
mod observers;
mod operations;

use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, oneshot};
use url::Url;

use crate::internal::errors::DownloadError;
use crate::internal::logging::LogType;
use crate::internal::registry::structs::Registry;
use crate::internal::states::reactive_core::ReactivePropertyError;
use crate::internal::states::synchronized_state::SynchronizedState;
use crate::internal::states::unlock_reactive::{PropertyWatcher, UnlockReactiveProperty};
use crate::internal::task::structs::{DownloadTask, TaskProgress, TaskStatus};
use crate::internal::utils::task_info::{format_duration, format_speed};
use crate::internal::utils::url_convertible::UrlConvertible;

use super::control_command::ControlCommand;
use super::manager_core::aggregate_progress;
use super::manager_state::ManagerState;
use super::session_configuration::SessionConfiguration;
use super::session_context::SessionContext;
use super::session_event::SessionEvent;
use super::session_manager_builder::SessionManagerBuilder;

pub(crate) struct ManagerShared {
    pub(crate) context: Arc<SessionContext>,
    pub(crate) state: SynchronizedState<ManagerState>,
    pub(crate) status: UnlockReactiveProperty<TaskStatus>,
}

impl Drop for ManagerShared {
    fn drop(&mut self) {
        self.context.post(ControlCommand::Shutdown(None));
    }
}

#[derive(Clone)]
pub struct SessionManager {
    pub(crate) shared: Arc<ManagerShared>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.shared.state.read(|s| {
            f.debug_struct("SessionManager")
                .field("identifier", &self.shared.context.identifier)
                .field("status", &s.status)
                .field("tasks", &s.tasks.len())
                .finish()
        })
    }
}

/// 内部实现
impl SessionManager {
    pub(crate) fn context(&self) -> &Arc<SessionContext> {
        &self.shared.context
    }

    /// 记录错误并原样返回，方便 `?` 之前统一走日志。
    pub(crate) fn report(&self, message: &str, error: DownloadError) -> DownloadError {
        self.context().log(LogType::error(message, &error));
        error
    }

    pub(crate) fn post(&self, message: &str, command: ControlCommand) {
        if !self.context().post(command) {
            self.report(message, DownloadError::ManagerClosed);
        }
    }

    /// 投递一条带回执的命令并等待结果。
    pub(crate) async fn request<R>(
        &self,
        message: &str,
        build: impl FnOnce(oneshot::Sender<R>) -> ControlCommand,
    ) -> Result<R, DownloadError> {
        let (reply, receiver) = oneshot::channel();
        if !self.context().post(build(reply)) {
            return Err(self.report(message, DownloadError::ManagerClosed));
        }
        receiver
            .await
            .map_err(|_| self.report(message, DownloadError::ManagerClosed))
    }

    pub(crate) fn parse_url(&self, message: &str, url: impl UrlConvertible) -> Option<Url> {
        match url.as_url() {
            Ok(url) => Some(url),
            Err(e) => {
                self.report(message, e);
                None
            }
        }
    }
}

/// 外部接口：只读访问
impl SessionManager {
    pub fn builder(identifier: impl Into<String>) -> SessionManagerBuilder {
        SessionManagerBuilder::new(identifier)
    }

    pub fn identifier(&self) -> &str {
        &self.shared.context.identifier
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.shared.context.registry)
    }

    pub fn status(&self) -> TaskStatus {
        self.shared.state.read(|s| s.status)
    }

    pub fn watch_status(&self) -> PropertyWatcher<TaskStatus> {
        self.shared.status.watch()
    }

    /// 等待管理器进入满足条件的状态，当前状态已满足时立即返回。
    pub async fn wait_for_status<F>(&self, predicate: F) -> Result<TaskStatus, ReactivePropertyError>
    where
        F: FnMut(&TaskStatus) -> bool,
    {
        self.shared.status.wait_until(predicate).await
    }

    /// 按调用方可见的顺序返回所有任务。
    pub fn tasks(&self) -> Vec<DownloadTask> {
        self.shared.state.read(|s| s.tasks.clone())
    }

    pub fn succeeded_tasks(&self) -> Vec<DownloadTask> {
        self.shared.state.read(|s| s.succeeded.clone())
    }

    pub fn running_tasks(&self) -> Vec<DownloadTask> {
        self.shared.state.read(|s| s.running.clone())
    }

    pub fn configuration(&self) -> SessionConfiguration {
        self.shared.state.read(|s| s.configuration.clone())
    }

    /// 所有任务已完成字节与总字节之和。
    pub fn progress(&self) -> TaskProgress {
        aggregate_progress(&self.tasks())
    }

    /// 字节/秒
    pub fn speed(&self) -> u64 {
        self.shared.state.read(|s| s.speed)
    }

    pub fn speed_string(&self) -> String {
        format_speed(self.speed())
    }

    /// 秒
    pub fn time_remaining(&self) -> u64 {
        self.shared.state.read(|s| s.time_remaining)
    }

    pub fn time_remaining_string(&self) -> String {
        format_duration(self.time_remaining())
    }

    /// 按 URL 查找任务，重定向后的地址同样可以找到。
    pub fn fetch(&self, url: impl UrlConvertible) -> Option<DownloadTask> {
        let url = self.parse_url("fetch download task failed", url)?;
        let task = self.shared.state.read(|s| s.lookup(url.as_str()));
        if task.is_none() {
            self.report(
                "fetch download task failed",
                DownloadError::FetchDownloadTaskFailed {
                    url: url.to_string(),
                },
            );
        }
        task
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.context.events.subscribe()
    }
}
