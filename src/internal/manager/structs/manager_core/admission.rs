//! 创建任务、准入控制与任务列表维护。

use std::collections::HashSet;

use crate::internal::errors::DownloadError;
use crate::internal::logging::LogType;
use crate::internal::manager::structs::control_command::{DownloadItem, TaskComparator};
use crate::internal::task::structs::{DownloadTask, Executer, TaskStatus};

use super::ManagerCore;

impl ManagerCore {
    /// 还有运行名额。
    pub(crate) fn can_run(&self) -> bool {
        self.state
            .read(|s| s.running.len() < s.configuration.max_concurrent_tasks)
    }

    /// 同一个 URL 只对应一个任务：已存在时更新请求头和文件名，否则新建并登记。
    fn fetch_or_create(&mut self, item: DownloadItem) -> DownloadTask {
        let key = item.url.as_str().to_string();
        if let Some(task) = self.state.read(|s| s.tasks_by_url.get(&key).cloned()) {
            task.update(item.headers, item.file_name);
            return task;
        }
        let task = DownloadTask::new(item.url, item.headers, item.file_name, &self.context);
        self.state.write(|s| {
            s.tasks.push(task.clone());
            s.tasks_by_url.insert(key, task.clone());
        });
        task
    }

    pub(crate) fn download(&mut self, item: DownloadItem) -> DownloadTask {
        let task = self.fetch_or_create(item);
        self.persist();
        self.start_task(&task, None);
        task
    }

    /// 批量下载：重复的 URL 记日志后跳过，其余照常创建并启动。
    pub(crate) fn multi_download(&mut self, items: Vec<DownloadItem>) -> Vec<DownloadTask> {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(items.len());
        for item in items {
            if !seen.insert(item.url.as_str().to_string()) {
                self.context.log(LogType::error(
                    "create download task failed",
                    DownloadError::DuplicateUrl {
                        url: item.url.to_string(),
                    },
                ));
                continue;
            }
            unique.push(self.fetch_or_create(item));
        }
        self.persist();
        for task in &unique {
            if task.status() != TaskStatus::Succeeded {
                self.start_task(task, None);
            }
        }
        unique
    }

    /// 会话正在重建时先挂起并记入重启队列，否则交给任务自己判断能否运行。
    pub(crate) fn start_task(&mut self, task: &DownloadTask, handler: Option<Executer<DownloadTask>>) {
        task.set_control(handler);
        self.did_start();
        if self.state.read(|s| s.should_create_session) {
            task.set_status(TaskStatus::Suspended);
            self.push_restart(task);
        } else {
            task.download(self);
        }
    }

    /// 按列表顺序启动第一个等待中的任务。
    pub(crate) fn start_next(&mut self) {
        let next = self.state.read(|s| {
            s.tasks
                .iter()
                .find(|t| t.status() == TaskStatus::Waiting)
                .cloned()
        });
        if let Some(task) = next {
            task.download(self);
        }
    }

    pub(crate) fn move_task(&mut self, from: usize, to: usize) -> Result<(), DownloadError> {
        let len = self.state.read(|s| s.tasks.len());
        if from >= len || to >= len {
            let error = DownloadError::IndexOutOfRange {
                source_index: from,
                destination_index: to,
            };
            self.context.log(LogType::error("move task failed", &error));
            return Err(error);
        }
        if from == to {
            return Ok(());
        }
        self.state.write(|s| {
            let task = s.tasks.remove(from);
            s.tasks.insert(to, task);
        });
        self.persist();
        Ok(())
    }

    /// 排序在锁外进行，比较函数里可以安全地读取任务字段。
    pub(crate) fn sort(&mut self, mut comparator: TaskComparator) {
        let mut tasks = self.tasks();
        tasks.sort_by(|a, b| comparator(a, b));
        self.state.write(|s| s.tasks = tasks);
        self.persist();
    }

    pub(crate) fn append_running(&self, task: &DownloadTask) {
        self.state.write(|s| {
            if !s.running.contains(task) {
                s.running.push(task.clone());
            }
        });
    }

    pub(crate) fn remove_running(&self, task: &DownloadTask) {
        self.state.write(|s| s.running.retain(|t| t != task));
    }

    pub(crate) fn append_succeeded(&self, task: &DownloadTask) {
        self.state.write(|s| {
            if !s.succeeded.contains(task) {
                s.succeeded.push(task.clone());
            }
        });
    }

    pub(crate) fn push_restart(&self, task: &DownloadTask) {
        self.state.write(|s| {
            if !s.restart_queue.contains(task) {
                s.restart_queue.push(task.clone());
            }
        });
    }

    pub(crate) fn insert_redirect(&self, current: &url::Url, original: &url::Url) {
        if current == original {
            return;
        }
        self.state.write(|s| {
            s.redirects
                .insert(current.as_str().to_string(), original.as_str().to_string());
        });
    }

    /// 任务被取消或移除后从列表中摘除。
    ///
    /// 管理器处于整体移除/取消过程中时，列表本身等到全部确认后再统一清理。
    fn maintain_remove(&self, task: &DownloadTask) {
        let key = task.url().as_str().to_string();
        let removed = task.status() == TaskStatus::Removed;
        self.state.write(|s| {
            s.tasks_by_url.remove(&key);
            s.redirects.retain(|_, original| original != &key);
            s.restart_queue.retain(|t| t != task);
            match s.status {
                TaskStatus::WillRemove => {
                    if s.tasks_by_url.is_empty() {
                        s.tasks.clear();
                        s.succeeded.clear();
                    }
                }
                TaskStatus::WillCancel => {
                    if s.tasks_by_url.len() == s.succeeded.len() {
                        s.tasks = s.succeeded.clone();
                    }
                }
                _ => {
                    s.tasks.retain(|t| t != task);
                    if removed {
                        s.succeeded.retain(|t| t != task);
                    }
                }
            }
        });
    }

    pub(crate) fn did_cancel_or_remove(&mut self, task: &DownloadTask) {
        self.maintain_remove(task);
        // 单独移除了最后一个任务时，管理器也随之进入取消/移除流程
        if self.state.read(|s| s.tasks.is_empty()) {
            match task.status() {
                TaskStatus::Canceled => self.set_status(TaskStatus::WillCancel),
                TaskStatus::Removed => self.set_status(TaskStatus::WillRemove),
                _ => {}
            }
        }
    }
}
