//! 传输会话的创建、作废与重建，以及运行中修改配置。

use crate::internal::logging::LogType;
use crate::internal::manager::structs::session_configuration::SessionConfiguration;
use crate::internal::task::structs::TaskStatus;
use crate::internal::transport::structs::EventSink;
use crate::internal::transport::traits::TransportContext;

use super::ManagerCore;

impl ManagerCore {
    pub(crate) fn create_session(&mut self) {
        self.session_id += 1;
        let configuration = self.state.read(|s| s.configuration.clone());
        let context = TransportContext {
            configuration,
            transient_dir: self.context.registry.paths().transient.clone(),
            events: EventSink::new(self.session_id, self.context.queue.clone()),
        };
        match self.factory.create_transport(context) {
            Ok(transport) => self.transport = Some(transport),
            Err(e) => {
                self.context
                    .log(LogType::error("create transport session failed", &e));
                self.transport = None;
            }
        }
        self.invalidating = false;
        self.state.write(|s| s.should_create_session = false);
    }

    /// 作废当前会话，等 `Invalidated` 事件到达后再重建；没有会话时直接重建。
    pub(crate) fn invalidate_session(&mut self) {
        if let Some(transport) = self.transport.take() {
            self.invalidating = true;
            transport.invalidate();
        } else if !self.invalidating {
            self.recreate_session();
        }
    }

    pub(crate) fn did_become_invalidated(&mut self, session: u64) {
        if session != self.session_id {
            return;
        }
        self.log_manager("session did become invalidated");
        self.transport = None;
        self.state.write(|s| s.should_create_session = true);
        self.recreate_session();
    }

    /// 新建会话并重新发起重启队列里的任务。
    fn recreate_session(&mut self) {
        self.create_session();
        let restart = self.state.read(|s| s.restart_queue.clone());
        for task in &restart {
            self.start_task(task, None);
        }
        self.state.write(|s| s.restart_queue.retain(|t| !restart.contains(t)));
    }

    /// 新配置在下一个会话生效：运行中先整体暂停，暂停完成后作废并重建会话，再恢复原来的任务。
    pub(crate) fn set_configuration(&mut self, configuration: SessionConfiguration) {
        let configuration = configuration.clamped();
        if self.state.read(|s| s.should_create_session) {
            self.log_manager("session is being recreated, configuration ignored");
            return;
        }
        let old = self.state.write(|s| {
            let old = std::mem::replace(&mut s.configuration, configuration.clone());
            s.should_create_session = true;
            old
        });

        if self.status() == TaskStatus::Running {
            let restart = self.state.read(|s| {
                if configuration.max_concurrent_tasks <= old.max_concurrent_tasks {
                    let mut restart = s.running.clone();
                    restart.extend(
                        s.tasks
                            .iter()
                            .filter(|t| t.status() == TaskStatus::Waiting)
                            .cloned(),
                    );
                    restart
                } else {
                    s.tasks
                        .iter()
                        .filter(|t| matches!(t.status(), TaskStatus::Waiting | TaskStatus::Running))
                        .cloned()
                        .collect()
                }
            });
            self.state.write(|s| s.restart_queue = restart);
            self.total_suspend(None);
        } else {
            self.invalidate_session();
        }
    }

    /// 控制面退出前：同步写快照，作废会话，停止定时器。
    pub(crate) fn shutdown(&mut self) {
        self.context.registry.store_tasks_now(&self.tasks());
        if let Some(transport) = self.transport.take() {
            transport.invalidate();
        }
        self.stop_ticker();
        self.log_manager("manager closed");
    }
}
