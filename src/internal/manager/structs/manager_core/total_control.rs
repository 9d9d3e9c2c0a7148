//! 整体控制：对所有任务一次性发起开始、暂停、取消、移除。

use crate::internal::manager::structs::session_manager::SessionManager;
use crate::internal::task::structs::{Executer, TaskStatus};

use super::ManagerCore;

impl ManagerCore {
    pub(crate) fn total_start(&mut self, handler: Option<Executer<SessionManager>>) {
        for task in self.tasks() {
            if task.status() != TaskStatus::Succeeded {
                self.start_task(&task, None);
            }
        }
        // 开始不需要等待传输层确认，回调立即执行
        self.observers.control = handler;
        self.execute_control();
    }

    pub(crate) fn total_suspend(&mut self, handler: Option<Executer<SessionManager>>) {
        if !matches!(self.status(), TaskStatus::Running | TaskStatus::Waiting) {
            return;
        }
        self.observers.control = handler;
        self.set_status(TaskStatus::WillSuspend);
        let mut accepted = false;
        for task in self.tasks() {
            accepted |= task.suspend(self, None);
        }
        if !accepted {
            self.determine_status(false);
        }
    }

    pub(crate) fn total_cancel(&mut self, handler: Option<Executer<SessionManager>>) {
        if matches!(self.status(), TaskStatus::Succeeded | TaskStatus::Canceled) {
            return;
        }
        self.observers.control = handler;
        self.set_status(TaskStatus::WillCancel);
        let mut accepted = false;
        for task in self.tasks() {
            accepted |= task.cancel(self, None);
        }
        if !accepted {
            self.determine_status(false);
        }
    }

    pub(crate) fn total_remove(&mut self, completely: bool, handler: Option<Executer<SessionManager>>) {
        if self.status() == TaskStatus::Removed {
            return;
        }
        self.observers.control = handler;
        self.set_status(TaskStatus::WillRemove);
        for task in self.tasks() {
            task.remove(self, completely, None);
        }
        self.determine_status(false);
    }
}
