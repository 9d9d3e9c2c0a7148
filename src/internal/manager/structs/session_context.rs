//! 管理器与其下所有任务共享的只读上下文。

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::internal::logging::{LogType, Logable};
use crate::internal::registry::structs::Registry;
use crate::internal::states::queue_reactive::QueueReactiveProperty;
use crate::internal::task::structs::MainQueue;

use super::control_command::ControlCommand;
use super::session_event::SessionEvent;

pub(crate) struct SessionContext {
    pub(crate) identifier: String,
    /// 控制面队列
    pub(crate) queue: QueueReactiveProperty<ControlCommand>,
    pub(crate) main: MainQueue,
    pub(crate) logger: Arc<dyn Logable>,
    pub(crate) registry: Arc<Registry>,
    pub(crate) events: broadcast::Sender<SessionEvent>,
}

impl SessionContext {
    /// 投递到控制面；控制面已退出时丢弃。
    pub(crate) fn post(&self, command: ControlCommand) -> bool {
        self.queue.send(command).is_ok()
    }

    /// 在控制面上执行一段不需要管理器状态的逻辑；控制面已退出时就地执行。
    pub(crate) fn run_on_control_plane<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(ControlCommand::Local(job)) = self.queue.send(ControlCommand::Local(Box::new(job))) {
            job();
        }
    }

    pub(crate) fn log(&self, log_type: LogType) {
        self.logger.log(log_type);
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // 没有订阅者时发送失败，忽略即可
        let _ = self.events.send(event);
    }
}
