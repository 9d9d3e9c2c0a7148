//! 启动恢复：从快照重建任务列表，再和传输层仍在进行中的传输对账。

use crate::internal::task::structs::TaskStatus;

use super::ManagerCore;

impl ManagerCore {
    pub(crate) async fn restore(&mut self) {
        let tasks = self.context.registry.load_all(&self.context);
        self.state.write(|s| {
            for task in &tasks {
                let original = task.url().as_str().to_string();
                let current = task.current_url();
                if current.as_str() != original {
                    s.redirects.insert(current.as_str().to_string(), original.clone());
                }
                s.tasks_by_url.insert(original, task.clone());
                if task.status() == TaskStatus::Succeeded {
                    s.succeeded.push(task.clone());
                }
            }
            s.tasks = tasks;
            s.should_create_session = true;
        });
        self.log_manager("retrieve all tasks");

        self.create_session();
        let live = match self.transport() {
            Some(transport) => transport.list_live_handles().await,
            None => Vec::new(),
        };
        for transfer in live {
            let Some(task) = self.state.read(|s| s.lookup(transfer.current_url.as_str())) else {
                continue;
            };
            self.did_start();
            self.append_running(&task);
            task.set_status(TaskStatus::Running);
            task.set_transfer(Some(transfer.handle));
        }

        // 快照里还是运行中，但传输层已经没有对应的传输
        for task in self.tasks() {
            let status = task.status();
            let orphaned = status == TaskStatus::Running || status.is_transitional();
            if orphaned && task.transfer().is_none() {
                task.set_status(TaskStatus::Suspended);
            }
        }

        if !self.should_complete() {
            self.persist();
        }
    }
}
