//! 观察者注册与派发。
//!
//! `on_success` / `on_failure` / `on_completion` 注册时若任务已经处于对应的结束状态，
//! 会在控制面上补发一次。

use crate::internal::manager::structs::control_command::ControlCommand;
use crate::internal::manager::structs::manager_core::ManagerCore;
use crate::internal::manager::structs::session_event::SessionEvent;
use crate::internal::task::structs::executer::{ExecuteOn, Executer};
use crate::internal::task::structs::task_status::TaskStatus;
use crate::internal::task::structs::verification::VerificationType;
use crate::internal::task::structs::validation::Validation;

use super::DownloadTask;

#[derive(Debug, Clone, Copy)]
enum Replay {
    Success,
    Failure,
    Completion,
}

impl DownloadTask {
    /// 进度回调：每次写入数据、状态变化时触发。
    pub fn on_progress<F>(&self, execute_on: ExecuteOn, handler: F) -> &Self
    where
        F: Fn(&DownloadTask) + Send + Sync + 'static,
    {
        let executer = Executer::new(execute_on, handler);
        self.observers().write(|o| o.progress = Some(executer));
        self
    }

    pub fn on_success<F>(&self, execute_on: ExecuteOn, handler: F) -> &Self
    where
        F: Fn(&DownloadTask) + Send + Sync + 'static,
    {
        let executer = Executer::new(execute_on, handler);
        self.observers().write(|o| o.success = Some(executer));
        self.replay(Replay::Success);
        self
    }

    /// 暂停、取消、移除、失败都算作失败。
    pub fn on_failure<F>(&self, execute_on: ExecuteOn, handler: F) -> &Self
    where
        F: Fn(&DownloadTask) + Send + Sync + 'static,
    {
        let executer = Executer::new(execute_on, handler);
        self.observers().write(|o| o.failure = Some(executer));
        self.replay(Replay::Failure);
        self
    }

    /// 注册后成功与失败都只走这个回调。
    pub fn on_completion<F>(&self, execute_on: ExecuteOn, handler: F) -> &Self
    where
        F: Fn(&DownloadTask) + Send + Sync + 'static,
    {
        let executer = Executer::new(execute_on, handler);
        self.observers().write(|o| o.completion = Some(executer));
        self.replay(Replay::Completion);
        self
    }

    /// 注册文件校验。任务成功后计算摘要并与 `code`（忽略大小写）比较，结果见 [`DownloadTask::validation`]。
    ///
    /// 同一组校验码与算法已经有结论时不会重复计算。
    pub fn validate_file<F>(
        &self,
        code: impl Into<String>,
        kind: VerificationType,
        execute_on: ExecuteOn,
        handler: F,
    ) -> &Self
    where
        F: Fn(&DownloadTask) + Send + Sync + 'static,
    {
        let code = code.into();
        let executer = Executer::new(execute_on, handler);
        let task = self.clone();
        self.context().post(ControlCommand::Job(Box::new(move |core: &mut ManagerCore| {
            let unchanged = task.state().read(|s| {
                s.verification_code.as_deref() == Some(code.as_str())
                    && s.verification_type == kind
                    && s.validation != Validation::Unknown
            });
            if unchanged {
                task.state().write(|s| s.should_validate = false);
            } else {
                task.state().write(|s| {
                    s.should_validate = true;
                    s.verification_code = Some(code);
                    s.verification_type = kind;
                });
                core.persist();
            }
            task.observers().write(|o| o.validation = Some(executer));
            if task.status() == TaskStatus::Succeeded {
                task.validate_now(core);
            }
        })));
        self
    }

    fn replay(&self, replay: Replay) {
        let task = self.clone();
        self.context()
            .run_on_control_plane(move || task.replay_now(replay));
    }

    fn replay_now(&self, replay: Replay) {
        let status = self.status();
        let executer = self.observers().read(|o| {
            let idle = o.completion.is_none();
            match replay {
                Replay::Success if idle && status == TaskStatus::Succeeded => o.success.clone(),
                Replay::Failure if idle && status.is_failure_like() => o.failure.clone(),
                Replay::Completion if status.is_completed() => o.completion.clone(),
                _ => None,
            }
        });
        if let Some(executer) = executer {
            executer.execute(self, &self.context().main);
        }
    }

    pub(crate) fn set_control(&self, handler: Option<Executer<DownloadTask>>) {
        self.observers().write(|o| o.control = handler);
    }

    pub(crate) fn execute_progress(&self) {
        if let Some(executer) = self.observers().read(|o| o.progress.clone()) {
            executer.execute(self, &self.context().main);
        }
    }

    /// 控制回调只执行一次。
    pub(crate) fn execute_control(&self) {
        if let Some(executer) = self.observers().write(|o| o.control.take()) {
            executer.execute(self, &self.context().main);
        }
    }

    pub(crate) fn execute_completion(&self, succeeded: bool) {
        let executer = self.observers().read(|o| {
            o.completion.clone().or_else(|| {
                if succeeded {
                    o.success.clone()
                } else {
                    o.failure.clone()
                }
            })
        });
        if let Some(executer) = executer {
            executer.execute(self, &self.context().main);
        }
        self.context().emit(SessionEvent::TaskDidComplete(self.clone()));
    }

    pub(crate) fn execute_validation(&self) {
        if let Some(executer) = self.observers().read(|o| o.validation.clone()) {
            executer.execute(self, &self.context().main);
        }
    }
}
