//! 传输层事件落到单个任务上的处理，以及下载完成后的文件校验。

use std::path::Path;

use url::Url;

use crate::internal::errors::FileVerificationError;
use crate::internal::logging::LogType;
use crate::internal::manager::structs::control_command::ControlCommand;
use crate::internal::manager::structs::manager_core::ManagerCore;
use crate::internal::manager::structs::session_event::SessionEvent;
use crate::internal::task::structs::task_status::TaskStatus;
use crate::internal::task::structs::validation::Validation;
use crate::internal::task::structs::verification;
use crate::internal::transport::structs::TransferFailure;

use super::DownloadTask;
use super::lifecycle::{Interrupt, is_acceptable};

impl DownloadTask {
    pub(crate) fn did_write_data(&self, core: &mut ManagerCore, total_written: u64, total_expected: u64) {
        self.state().write(|s| {
            s.completed_bytes = total_written;
            s.total_bytes = total_expected.max(total_written);
        });
        self.execute_progress();
        core.update_progress();
        self.context().emit(SessionEvent::TaskRunning(self.clone()));
    }

    pub(crate) fn did_redirect(&self, core: &mut ManagerCore, current_url: Url) {
        self.state().write(|s| s.current_url = current_url.clone());
        core.insert_redirect(&current_url, self.url());
    }

    /// 响应体已经写入传输层临时文件：放到最终位置，并清理续传用的中间产物。
    pub(crate) fn did_finish_downloading(
        &self,
        core: &mut ManagerCore,
        status_code: Option<u16>,
        location: &Path,
    ) {
        let registry = &self.context().registry;
        if !status_code.is_some_and(is_acceptable) {
            registry.remove_artifact(location);
            return;
        }
        let Some(destination) = self.file_path() else {
            return;
        };

        if let Some(hook) = core.artifact_hook() {
            match hook.place_artifact(self.file_type().as_ref(), location, &destination) {
                Ok(true) => {
                    registry.remove_continuation_artifact(self.tmp_file_name().as_deref());
                    return;
                }
                Ok(false) => {}
                Err(e) => self.log("artifact hook failed", Some(e.to_string())),
            }
        }
        registry.store_final_artifact(location, &destination);
        registry.remove_continuation_artifact(self.tmp_file_name().as_deref());
    }

    /// 传输结束（成功、失败或被取消）。
    pub(crate) fn did_complete_network(
        &self,
        core: &mut ManagerCore,
        status_code: Option<u16>,
        bytes_received: u64,
        bytes_expected: u64,
        error: Option<TransferFailure>,
    ) {
        core.remove_running(self);
        self.state().write(|s| s.transfer = None);

        match self.status() {
            TaskStatus::WillCancel | TaskStatus::WillRemove => {
                if let Some(continuation) = error.and_then(|e| e.continuation) {
                    self.context()
                        .registry
                        .remove_continuation_artifact(continuation.artifact_name.as_deref());
                }
                // 传输层确认取消，任务刚离开运行集合
                self.determine(core, Interrupt::Manual { from_running: true });
            }
            TaskStatus::WillSuspend | TaskStatus::Running => {
                self.state().write(|s| {
                    s.total_bytes = if bytes_expected == 0 {
                        bytes_received
                    } else {
                        bytes_expected
                    };
                    s.completed_bytes = bytes_received;
                    s.last_tick_bytes = bytes_received;
                    s.response_status = status_code;
                });
                if let Some(error) = error {
                    self.determine(core, Interrupt::Error(error));
                } else {
                    match status_code {
                        Some(code) if is_acceptable(code) => {
                            self.state().write(|s| {
                                s.continuation = None;
                                s.tmp_file_name = None;
                            });
                            self.succeeded(core, true, true);
                        }
                        other => self.determine(core, Interrupt::StatusCode(other.unwrap_or(0))),
                    }
                }
            }
            _ => {}
        }
    }

    /// 成功后的校验：没有注册校验回调时什么都不做；校验码没变且已有结论时直接回报结论。
    pub(crate) fn validate_now(&self, _core: &mut ManagerCore) {
        let Some(executer) = self.observers().read(|o| o.validation.clone()) else {
            return;
        };
        let (should_validate, code, kind) = self
            .state()
            .read(|s| (s.should_validate, s.verification_code.clone(), s.verification_type));
        if !should_validate {
            executer.execute(self, &self.context().main);
            return;
        }
        let (Some(code), Some(path)) = (code, self.file_path()) else {
            return;
        };

        let task = self.clone();
        tokio::task::spawn_blocking(move || {
            let result = verification::validate_file(&path, &code, kind);
            task.context()
                .post(ControlCommand::ValidationFinished { task: task.clone(), result });
        });
    }

    pub(crate) fn did_validate(
        &self,
        core: &mut ManagerCore,
        result: Result<(), FileVerificationError>,
    ) {
        let validation = match result {
            Ok(()) => {
                self.log("file validation successful", None);
                Validation::Correct
            }
            Err(e) => {
                self.context().logger.log(LogType::error(
                    format!("file validation failed, url: {}", self.url()),
                    &e,
                ));
                Validation::Incorrect
            }
        };
        self.state().write(|s| {
            s.should_validate = false;
            s.validation = validation;
        });
        core.persist();
        self.execute_validation();
    }
}
