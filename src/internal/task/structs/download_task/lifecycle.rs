//! 任务状态机：准备、发起、暂停、取消、移除，以及中断后的状态判定。
//!
//! 这里的方法都以 `&mut ManagerCore` 为参数，只能在控制面上调用。
//! 读写字段时不要在 `write` 闭包里调用回调或管理器方法。

use crate::internal::errors::{TaskError, TransportError};
use crate::internal::logging::LogType;
use crate::internal::manager::structs::control_command::ControlCommand;
use crate::internal::manager::structs::manager_core::ManagerCore;
use crate::internal::manager::structs::session_event::SessionEvent;
use crate::internal::task::structs::executer::Executer;
use crate::internal::task::structs::task_status::TaskStatus;
use crate::internal::transport::structs::{FailureKind, Headers, TransferFailure, TransferRequest};

use super::DownloadTask;

/// 传输被打断的原因。
pub(crate) enum Interrupt {
    Error(TransferFailure),
    StatusCode(u16),
    /// 调用方主动暂停、取消或移除。`from_running` 表示任务让出了运行名额
    Manual { from_running: bool },
}

pub(crate) fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

pub(crate) fn is_acceptable(status_code: u16) -> bool {
    (200..300).contains(&status_code)
}

impl DownloadTask {
    pub(crate) fn log(&self, message: &str, error: Option<String>) {
        self.context().logger.log(LogType::Task {
            message: message.to_string(),
            url: self.url().to_string(),
            error,
        });
    }

    /// 调用方对已存在的任务再次 `download` 时更新请求头和文件名。
    pub(crate) fn update(&self, headers: Option<Headers>, file_name: Option<String>) {
        self.state().write(|s| s.headers = headers);
        let Some(name) = file_name.filter(|n| !n.is_empty()) else {
            return;
        };
        if let Some(old_path) = self.file_path() {
            self.context().registry.rename_final_artifact(&old_path, &name);
        }
        self.state().write(|s| s.file_name = name);
    }

    /// 按当前状态决定是发起传输、排队等待还是直接按成功处理。
    pub(crate) fn download(&self, core: &mut ManagerCore) {
        let registry = &self.context().registry;
        registry.ensure_directories();
        match self.status() {
            TaskStatus::Waiting | TaskStatus::Suspended | TaskStatus::Failed => {
                if registry.file_exists(&self.file_name()) {
                    self.prepare(core, true);
                } else if core.can_run() {
                    self.prepare(core, false);
                } else {
                    self.set_status(TaskStatus::Waiting);
                    self.execute_progress();
                    self.execute_control();
                }
            }
            TaskStatus::Succeeded => {
                self.execute_control();
                self.succeeded(core, false, false);
            }
            TaskStatus::Running => self.execute_control(),
            _ => {}
        }
    }

    fn prepare(&self, core: &mut ManagerCore, file_exists: bool) {
        self.set_status(TaskStatus::Running);
        self.state().write(|s| {
            s.speed = 0;
            if s.start_date == 0.0 {
                s.start_date = now_seconds();
            }
            s.error = None;
            s.response_status = None;
        });
        if file_exists {
            self.start_local();
        } else {
            self.start(core);
        }
    }

    /// 完成文件已经在磁盘上：不经过传输层，下一轮控制面直接按成功处理。
    fn start_local(&self) {
        self.log("file already exists", None);
        let size = self
            .file_path()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len());
        if let Some(size) = size {
            self.state().write(|s| s.total_bytes = size);
        }
        self.execute_control();
        self.context().post(ControlCommand::LocalCompletion {
            task: self.clone(),
            released_slot: false,
        });
    }

    fn start(&self, core: &mut ManagerCore) {
        let Some(transport) = core.transport() else {
            // 会话正在重建，等新会话创建后再发起
            self.set_status(TaskStatus::Suspended);
            core.push_restart(self);
            self.execute_control();
            return;
        };
        self.context().emit(SessionEvent::TaskRunning(self.clone()));

        let registry = &self.context().registry;
        let (continuation, tmp_file_name, headers) = self
            .state()
            .read(|s| (s.continuation.clone(), s.tmp_file_name.clone(), s.headers.clone()));
        let continuation = continuation
            .filter(|_| registry.restore_continuation_artifact(tmp_file_name.as_deref()));
        if continuation.is_none() {
            self.reset_progress();
        }

        let mut request = TransferRequest {
            url: self.url().clone(),
            headers,
            continuation,
        };
        self.state().write(|s| s.last_tick_bytes = s.completed_bytes);

        let mut started = transport.start_transfer(request.clone());
        if let Err(TransportError::InvalidContinuation(reason)) = &started {
            self.log("continuation rejected, restarting from zero", Some(reason.clone()));
            self.reset_progress();
            request.continuation = None;
            started = transport.start_transfer(request);
        }

        match started {
            Ok(handle) => {
                self.state().write(|s| s.transfer = Some(handle));
                core.append_running(self);
                core.persist();
                self.execute_control();
            }
            Err(e) => {
                self.log("start transfer failed", Some(e.to_string()));
                self.state().write(|s| {
                    s.error = Some(TaskError::StartFailed {
                        message: e.to_string(),
                    })
                });
                self.set_status(TaskStatus::Failed);
                self.execute_control();
                self.execute_progress();
                self.execute_completion(false);
                core.determine_status(true);
            }
        }
    }

    fn reset_progress(&self) {
        self.state().write(|s| {
            s.continuation = None;
            s.tmp_file_name = None;
            s.completed_bytes = 0;
            s.total_bytes = 0;
            s.last_tick_bytes = 0;
        });
    }

    /// 已处于过渡状态时不再调用传输层，只在意图更强时升级状态。
    fn escalate(&self, intent: TaskStatus, handler: Option<Executer<DownloadTask>>) {
        if intent.intent_rank() > self.status().intent_rank() {
            self.set_status(intent);
        }
        if handler.is_some() {
            self.set_control(handler);
        }
    }

    /// 发出中断：有进行中的传输就让传输层取消，否则在控制面上就地结束。
    fn interrupt(&self, core: &mut ManagerCore, was_running: bool, produce_continuation: bool) {
        let handle = self.transfer();
        match (was_running, handle, core.transport()) {
            (true, Some(handle), Some(transport)) => transport.cancel(handle, produce_continuation),
            (_, handle, _) => {
                if handle.is_some() {
                    self.state().write(|s| s.transfer = None);
                    core.remove_running(self);
                }
                self.context().post(ControlCommand::LocalCompletion {
                    task: self.clone(),
                    released_slot: handle.is_some(),
                });
            }
        }
    }

    /// 返回 `false` 表示当前状态不接受暂停。
    pub(crate) fn suspend(&self, core: &mut ManagerCore, handler: Option<Executer<DownloadTask>>) -> bool {
        let status = self.status();
        if status.is_transitional() {
            self.escalate(TaskStatus::WillSuspend, handler);
            return true;
        }
        if !matches!(status, TaskStatus::Running | TaskStatus::Waiting) {
            return false;
        }
        self.set_control(handler);
        self.set_status(TaskStatus::WillSuspend);
        self.interrupt(core, status == TaskStatus::Running, true);
        true
    }

    /// 已成功的任务不能取消。
    pub(crate) fn cancel(&self, core: &mut ManagerCore, handler: Option<Executer<DownloadTask>>) -> bool {
        let status = self.status();
        if status.is_transitional() {
            self.escalate(TaskStatus::WillCancel, handler);
            return true;
        }
        if status == TaskStatus::Succeeded {
            return false;
        }
        self.set_control(handler);
        self.set_status(TaskStatus::WillCancel);
        self.interrupt(core, status == TaskStatus::Running, false);
        true
    }

    /// 任何状态都可以移除；`completely` 决定是否同时删除完成文件。
    pub(crate) fn remove(
        &self,
        core: &mut ManagerCore,
        completely: bool,
        handler: Option<Executer<DownloadTask>>,
    ) -> bool {
        self.state().write(|s| s.remove_completely = completely);
        let status = self.status();
        if status.is_transitional() {
            self.escalate(TaskStatus::WillRemove, handler);
            return true;
        }
        self.set_control(handler);
        self.set_status(TaskStatus::WillRemove);
        self.interrupt(core, status == TaskStatus::Running, false);
        true
    }

    /// 不经过传输层的结束：就地暂停/取消/移除，或者完成文件已存在。
    pub(crate) fn did_complete_local(&self, core: &mut ManagerCore, released_slot: bool) {
        match self.status() {
            TaskStatus::WillSuspend | TaskStatus::WillCancel | TaskStatus::WillRemove => {
                self.determine(
                    core,
                    Interrupt::Manual {
                        from_running: released_slot,
                    },
                );
            }
            TaskStatus::Running => self.succeeded(core, released_slot, true),
            _ => {}
        }
    }

    pub(crate) fn succeeded(&self, core: &mut ManagerCore, from_running: bool, immediately: bool) {
        self.state().write(|s| {
            if s.end_date == 0.0 {
                s.end_date = now_seconds();
                s.time_remaining = 0;
            }
            s.completed_bytes = s.total_bytes;
        });
        self.set_status(TaskStatus::Succeeded);
        self.execute_progress();
        if immediately {
            self.execute_completion(true);
        }
        self.validate_now(core);
        core.append_succeeded(self);
        core.determine_status(from_running);
    }

    pub(crate) fn determine(&self, core: &mut ManagerCore, interrupt: Interrupt) {
        let mut from_running = true;
        match interrupt {
            Interrupt::Error(failure) => {
                let mut status = self.status();
                let error = match failure.kind {
                    FailureKind::Cancelled => TaskError::Cancelled,
                    FailureKind::SessionInvalidated => TaskError::SessionInvalidated,
                    FailureKind::Network => TaskError::Transfer {
                        message: failure.message.clone(),
                    },
                };
                self.log("transfer interrupted", Some(error.to_string()));
                self.state().write(|s| s.error = Some(error));

                if let Some(continuation) = failure.continuation {
                    let artifact = continuation.artifact_name.clone();
                    self.state().write(|s| {
                        s.continuation = Some(continuation.token);
                        s.tmp_file_name = artifact.clone();
                    });
                    if let Some(name) = artifact {
                        self.context().registry.backup_continuation_artifact(&name);
                    }
                }
                match failure.kind {
                    FailureKind::SessionInvalidated if status == TaskStatus::Running => {
                        status = TaskStatus::Suspended;
                        core.push_restart(self);
                    }
                    FailureKind::Network => status = TaskStatus::Failed,
                    _ => {}
                }
                self.set_status(status);
            }
            Interrupt::StatusCode(code) => {
                self.log("unacceptable status code", Some(code.to_string()));
                self.state()
                    .write(|s| s.error = Some(TaskError::UnacceptableStatusCode { code }));
                self.set_status(TaskStatus::Failed);
            }
            Interrupt::Manual { from_running: released } => from_running = released,
        }

        match self.status() {
            TaskStatus::WillSuspend => {
                self.set_status(TaskStatus::Suspended);
                self.execute_progress();
                self.execute_control();
                self.execute_completion(false);
            }
            TaskStatus::WillCancel | TaskStatus::WillRemove => {
                self.did_cancel_or_remove(core);
                self.execute_control();
                self.execute_completion(false);
            }
            TaskStatus::Suspended | TaskStatus::Failed => {
                self.execute_progress();
                self.execute_completion(false);
            }
            _ => {
                self.set_status(TaskStatus::Failed);
                self.execute_progress();
                self.execute_completion(false);
            }
        }
        core.determine_status(from_running);
    }

    fn did_cancel_or_remove(&self, core: &mut ManagerCore) {
        match self.status() {
            TaskStatus::WillCancel => self.set_status(TaskStatus::Canceled),
            TaskStatus::WillRemove => self.set_status(TaskStatus::Removed),
            _ => {}
        }
        let completely = self.state().read(|s| s.remove_completely);
        self.context().registry.remove_task_artifacts(self, completely);
        self.state().write(|s| {
            s.continuation = None;
            s.tmp_file_name = None;
            s.transfer = None;
        });
        core.did_cancel_or_remove(self);
    }
}
