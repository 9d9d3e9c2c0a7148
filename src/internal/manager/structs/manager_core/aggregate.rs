//! 聚合状态：每次任务状态迁移后重新推导管理器的状态。

use crate::internal::manager::structs::control_command::ControlCommand;
use crate::internal::manager::structs::session_event::SessionEvent;
use crate::internal::task::structs::{DownloadTask, TaskProgress, TaskStatus};

use super::ManagerCore;

/// 所有任务的字节进度之和。
pub(crate) fn aggregate_progress(tasks: &[DownloadTask]) -> TaskProgress {
    tasks.iter().fold(TaskProgress::default(), |acc, task| {
        let p = task.progress();
        TaskProgress {
            completed: acc.completed + p.completed,
            total: acc.total + p.total,
        }
    })
}

impl ManagerCore {
    /// 有任务开始运行：启动刷新定时器并进入 `running`。
    pub(crate) fn did_start(&mut self) {
        if self.status() == TaskStatus::Running {
            return;
        }
        self.start_ticker();
        self.set_status(TaskStatus::Running);
        self.execute_progress();
    }

    pub(crate) fn update_progress(&self) {
        self.execute_progress();
        self.context.emit(SessionEvent::ManagerRunning);
    }

    pub(crate) fn determine_status(&mut self, from_running: bool) {
        let status = self.status();

        if status == TaskStatus::WillRemove {
            if self.state.read(|s| s.tasks.is_empty()) {
                self.set_status(TaskStatus::Removed);
                self.execute_control();
                self.ending(false);
            }
            return;
        }

        if status == TaskStatus::WillCancel {
            if self.state.read(|s| s.tasks.len() == s.tasks_by_url.len()) {
                self.set_status(TaskStatus::Canceled);
                self.execute_control();
                self.ending(false);
            }
            return;
        }

        let tasks = self.tasks();
        let statuses: Vec<TaskStatus> = tasks.iter().map(DownloadTask::status).collect();

        let is_completed = statuses
            .iter()
            .all(|s| matches!(s, TaskStatus::Succeeded | TaskStatus::Failed));
        if is_completed {
            if matches!(status, TaskStatus::Succeeded | TaskStatus::Failed) {
                self.persist();
                return;
            }
            self.state.write(|s| s.time_remaining = 0);
            self.execute_progress();
            let is_succeeded = statuses.iter().all(|s| *s == TaskStatus::Succeeded);
            self.set_status(if is_succeeded {
                TaskStatus::Succeeded
            } else {
                TaskStatus::Failed
            });
            self.ending(is_succeeded);
            return;
        }

        let is_suspended = statuses.iter().all(|s| {
            matches!(
                s,
                TaskStatus::Suspended | TaskStatus::Succeeded | TaskStatus::Failed
            )
        });
        if is_suspended {
            if status == TaskStatus::Suspended {
                self.persist();
                return;
            }
            self.set_status(TaskStatus::Suspended);
            if self.state.read(|s| s.should_create_session) {
                self.invalidate_session();
            } else {
                self.execute_control();
                self.ending(false);
            }
            return;
        }

        if status == TaskStatus::WillSuspend {
            return;
        }

        self.persist();

        if from_running {
            self.context.post(ControlCommand::StartNext);
        }
    }

    /// 启动恢复时用：所有任务都已成功或失败则直接进入结束状态。
    pub(crate) fn should_complete(&mut self) -> bool {
        let statuses: Vec<TaskStatus> = self.tasks().iter().map(DownloadTask::status).collect();
        let is_succeeded = statuses.iter().all(|s| *s == TaskStatus::Succeeded);
        let is_completed = is_succeeded
            || statuses
                .iter()
                .all(|s| matches!(s, TaskStatus::Succeeded | TaskStatus::Failed));
        if !is_completed {
            return false;
        }
        if matches!(self.status(), TaskStatus::Succeeded | TaskStatus::Failed) {
            return true;
        }
        self.state.write(|s| s.time_remaining = 0);
        self.execute_progress();
        self.set_status(if is_succeeded {
            TaskStatus::Succeeded
        } else {
            TaskStatus::Failed
        });
        self.execute_completion(is_succeeded);
        true
    }

    fn ending(&mut self, succeeded: bool) {
        self.execute_completion(succeeded);
        self.persist();
        self.stop_ticker();
    }
}
