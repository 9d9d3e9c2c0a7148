//! # ManagerCore — 串行控制面
//!
//! 管理器所有的状态迁移都发生在这里：一个 tokio 任务独占 `ManagerCore`，
//! 按 FIFO 顺序消费 [`ControlCommand`]。句柄一侧只负责投递命令、读取共享字段。
//!
//! 任务状态机的方法（见 `DownloadTask` 的 `lifecycle` / `callbacks`）以 `&mut ManagerCore`
//! 为参数，因此同样只会在这个任务里执行。

mod admission;
mod aggregate;
mod observers;
mod recovery;
mod session;
mod ticker;
mod total_control;
mod transport_events;

pub(crate) use aggregate::aggregate_progress;
pub(crate) use observers::ManagerReplay;

use std::sync::{Arc, Weak};

use tokio::task::JoinHandle;

use crate::internal::logging::LogType;
use crate::internal::states::queue_reactive::QueueReactiveConsumer;
use crate::internal::states::synchronized_state::SynchronizedState;
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;
use crate::internal::task::structs::{DownloadTask, TaskStatus};
use crate::internal::transport::traits::{ArtifactHook, Transport, TransportFactory};

use super::control_command::{ControlCommand, TaskControl};
use super::manager_state::{ManagerObservers, ManagerState};
use super::session_context::SessionContext;
use super::session_manager::ManagerShared;

pub(crate) struct ManagerCore {
    pub(crate) context: Arc<SessionContext>,
    pub(crate) state: SynchronizedState<ManagerState>,
    status: UnlockReactiveProperty<TaskStatus>,
    pub(crate) observers: ManagerObservers,
    /// 管理器句柄，用于把自己交给管理器级别的回调
    handle: Weak<ManagerShared>,
    factory: Arc<dyn TransportFactory>,
    transport: Option<Arc<dyn Transport>>,
    /// 当前传输会话的编号，`Invalidated` 事件只认当前会话
    session_id: u64,
    /// 已经要求传输层作废会话，正在等待 `Invalidated`
    invalidating: bool,
    hook: Option<Arc<dyn ArtifactHook>>,
    ticker: Option<JoinHandle<()>>,
}

impl ManagerCore {
    pub(crate) fn new(
        context: Arc<SessionContext>,
        state: SynchronizedState<ManagerState>,
        status: UnlockReactiveProperty<TaskStatus>,
        handle: Weak<ManagerShared>,
        factory: Arc<dyn TransportFactory>,
        hook: Option<Arc<dyn ArtifactHook>>,
    ) -> Self {
        Self {
            context,
            state,
            status,
            observers: ManagerObservers::default(),
            handle,
            factory,
            transport: None,
            session_id: 0,
            invalidating: false,
            hook,
            ticker: None,
        }
    }

    pub(crate) async fn run(mut self, mut consumer: QueueReactiveConsumer<ControlCommand>) {
        while let Some(command) = consumer.recv().await {
            if let ControlCommand::Shutdown(reply) = command {
                consumer.close();
                self.shutdown();
                if let Some(reply) = reply {
                    let _ = reply.send(());
                }
                break;
            }
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::Download { item, reply } => {
                let task = self.download(item);
                let _ = reply.send(task);
            }
            ControlCommand::MultiDownload { items, reply } => {
                let tasks = self.multi_download(items);
                let _ = reply.send(tasks);
            }
            ControlCommand::Control {
                url,
                action,
                handler,
            } => {
                let Some(task) = self.state.read(|s| s.tasks_by_url.get(url.as_str()).cloned()) else {
                    self.context.log(LogType::error(
                        format!("can't {} download task", action.verb()),
                        crate::internal::errors::DownloadError::FetchDownloadTaskFailed {
                            url: url.to_string(),
                        },
                    ));
                    return;
                };
                match action {
                    TaskControl::Start => self.start_task(&task, handler),
                    TaskControl::Suspend => {
                        task.suspend(self, handler);
                    }
                    TaskControl::Cancel => {
                        task.cancel(self, handler);
                    }
                    TaskControl::Remove { completely } => {
                        task.remove(self, completely, handler);
                    }
                }
            }
            ControlCommand::TotalControl { action, handler } => match action {
                TaskControl::Start => self.total_start(handler),
                TaskControl::Suspend => self.total_suspend(handler),
                TaskControl::Cancel => self.total_cancel(handler),
                TaskControl::Remove { completely } => self.total_remove(completely, handler),
            },
            ControlCommand::MoveTask { from, to, reply } => {
                let _ = reply.send(self.move_task(from, to));
            }
            ControlCommand::Sort { comparator, reply } => {
                self.sort(comparator);
                let _ = reply.send(());
            }
            ControlCommand::SetConfiguration(configuration) => self.set_configuration(configuration),
            ControlCommand::Transport { session, event } => self.handle_transport_event(session, event),
            ControlCommand::LocalCompletion {
                task,
                released_slot,
            } => task.did_complete_local(self, released_slot),
            ControlCommand::StartNext => self.start_next(),
            ControlCommand::Tick => self.tick(),
            ControlCommand::ValidationFinished { task, result } => task.did_validate(self, result),
            ControlCommand::Job(job) => job(self),
            ControlCommand::Local(job) => job(),
            ControlCommand::Flush(reply) => {
                let _ = reply.send(());
            }
            ControlCommand::Shutdown(_) => {}
        }
    }

    pub(crate) fn set_status(&self, status: TaskStatus) {
        self.state.write(|s| s.status = status);
        self.status.update_if_changed(status);
    }

    pub(crate) fn status(&self) -> TaskStatus {
        self.state.read(|s| s.status)
    }

    pub(crate) fn tasks(&self) -> Vec<DownloadTask> {
        self.state.read(|s| s.tasks.clone())
    }

    pub(crate) fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.transport.clone()
    }

    pub(crate) fn artifact_hook(&self) -> Option<Arc<dyn ArtifactHook>> {
        self.hook.clone()
    }

    /// 请求保存快照（合并写入）。
    pub(crate) fn persist(&self) {
        self.context.registry.store_tasks(self.tasks());
    }

    pub(crate) fn log_manager(&self, message: &str) {
        let task_count = self.state.read(|s| s.tasks.len());
        self.context.log(LogType::Manager {
            message: message.to_string(),
            task_count,
        });
    }
}

impl TaskControl {
    fn verb(self) -> &'static str {
        match self {
            TaskControl::Start => "start",
            TaskControl::Suspend => "suspend",
            TaskControl::Cancel => "cancel",
            TaskControl::Remove { .. } => "remove",
        }
    }
}
