use crate::internal::manager::structs::control_command::ControlCommand;
use crate::internal::states::queue_reactive::QueueReactiveProperty;

use super::transport_event::TransportEvent;

/// 传输层投递事件的入口。每个会话一个，事件带着会话编号进入控制面队列。
#[derive(Clone, Debug)]
pub struct EventSink {
    session: u64,
    queue: QueueReactiveProperty<ControlCommand>,
}

impl EventSink {
    pub(crate) fn new(session: u64, queue: QueueReactiveProperty<ControlCommand>) -> Self {
        Self { session, queue }
    }

    /// 投递事件；控制面已关闭时返回 `false`。
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.queue
            .send(ControlCommand::Transport {
                session: self.session,
                event,
            })
            .is_ok()
    }

    pub fn session(&self) -> u64 {
        self.session
    }
}
