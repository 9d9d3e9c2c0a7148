//! 管理器级别回调的派发与补发。

use std::sync::Arc;

use crate::internal::manager::structs::session_event::SessionEvent;
use crate::internal::manager::structs::session_manager::SessionManager;
use crate::internal::task::structs::{Executer, TaskStatus};

use super::ManagerCore;

#[derive(Debug, Clone, Copy)]
pub(crate) enum ManagerReplay {
    Success,
    Failure,
    Completion,
}

impl ManagerCore {
    /// 管理器句柄已经全部释放时返回 `None`，回调随之跳过。
    fn manager(&self) -> Option<SessionManager> {
        self.handle.upgrade().map(|shared| SessionManager {
            shared: Arc::clone(&shared),
        })
    }

    fn execute(&self, executer: Option<Executer<SessionManager>>) {
        if let (Some(executer), Some(manager)) = (executer, self.manager()) {
            executer.execute(&manager, &self.context.main);
        }
    }

    pub(crate) fn execute_progress(&self) {
        self.execute(self.observers.progress.clone());
    }

    /// 控制回调只执行一次。
    pub(crate) fn execute_control(&mut self) {
        let executer = self.observers.control.take();
        self.execute(executer);
    }

    pub(crate) fn execute_completion(&self, succeeded: bool) {
        let executer = self.observers.completion.clone().or_else(|| {
            if succeeded {
                self.observers.success.clone()
            } else {
                self.observers.failure.clone()
            }
        });
        self.execute(executer);
        self.context.emit(SessionEvent::ManagerDidComplete);
    }

    /// 注册时管理器已处于对应的结束状态，补发一次。
    pub(crate) fn replay(&self, replay: ManagerReplay) {
        let status = self.status();
        let idle = self.observers.completion.is_none();
        let executer = match replay {
            ManagerReplay::Success if idle && status == TaskStatus::Succeeded => {
                self.observers.success.clone()
            }
            ManagerReplay::Failure if idle && status.is_failure_like() => self.observers.failure.clone(),
            ManagerReplay::Completion if status.is_completed() => self.observers.completion.clone(),
            _ => None,
        };
        self.execute(executer);
    }

    pub(crate) fn did_finish_background_events(&mut self) {
        if let Some(handler) = self.observers.background_completion.take() {
            self.context.main.dispatch(handler);
        }
    }
}
