//! 管理器级别的观察者注册。注册本身也走控制面，保证与状态迁移的先后顺序一致。

use crate::internal::manager::structs::control_command::ControlCommand;
use crate::internal::manager::structs::manager_core::{ManagerCore, ManagerReplay};
use crate::internal::task::structs::{ExecuteOn, Executer};

use super::SessionManager;

impl SessionManager {
    fn register(&self, job: impl FnOnce(&mut ManagerCore) + Send + 'static) {
        self.post(
            "register manager observer failed",
            ControlCommand::Job(Box::new(job)),
        );
    }

    /// 整体进度变化时触发，包括每个刷新周期。
    pub fn on_progress<F>(&self, execute_on: ExecuteOn, handler: F) -> &Self
    where
        F: Fn(&SessionManager) + Send + Sync + 'static,
    {
        let executer = Executer::new(execute_on, handler);
        self.register(move |core: &mut ManagerCore| core.observers.progress = Some(executer));
        self
    }

    pub fn on_success<F>(&self, execute_on: ExecuteOn, handler: F) -> &Self
    where
        F: Fn(&SessionManager) + Send + Sync + 'static,
    {
        let executer = Executer::new(execute_on, handler);
        self.register(move |core: &mut ManagerCore| {
            core.observers.success = Some(executer);
            core.replay(ManagerReplay::Success);
        });
        self
    }

    pub fn on_failure<F>(&self, execute_on: ExecuteOn, handler: F) -> &Self
    where
        F: Fn(&SessionManager) + Send + Sync + 'static,
    {
        let executer = Executer::new(execute_on, handler);
        self.register(move |core: &mut ManagerCore| {
            core.observers.failure = Some(executer);
            core.replay(ManagerReplay::Failure);
        });
        self
    }

    /// 注册后成功与失败都只走这个回调。
    pub fn on_completion<F>(&self, execute_on: ExecuteOn, handler: F) -> &Self
    where
        F: Fn(&SessionManager) + Send + Sync + 'static,
    {
        let executer = Executer::new(execute_on, handler);
        self.register(move |core: &mut ManagerCore| {
            core.observers.completion = Some(executer);
            core.replay(ManagerReplay::Completion);
        });
        self
    }

    /// 传输层报告后台事件全部投递完毕时在回调队列上执行一次。
    pub fn set_background_completion_handler<F>(&self, handler: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.register(move |core: &mut ManagerCore| {
            core.observers.background_completion = Some(Box::new(handler));
        });
    }
}
