//! 单个任务与全部任务的开始、暂停、取消、移除。
//!
//! 这些接口只投递命令；带 `_with` 后缀的版本在控制面确认后执行一次回调。

use crate::internal::manager::structs::control_command::{ControlCommand, TaskControl};
use crate::internal::task::structs::{DownloadTask, ExecuteOn, Executer};
use crate::internal::utils::url_convertible::UrlConvertible;

use super::SessionManager;

impl SessionManager {
    fn control(
        &self,
        url: impl UrlConvertible,
        action: TaskControl,
        handler: Option<Executer<DownloadTask>>,
    ) {
        let message = match action {
            TaskControl::Start => "start download task failed",
            TaskControl::Suspend => "suspend download task failed",
            TaskControl::Cancel => "cancel download task failed",
            TaskControl::Remove { .. } => "remove download task failed",
        };
        let Some(url) = self.parse_url(message, url) else {
            return;
        };
        self.post(
            message,
            ControlCommand::Control {
                url,
                action,
                handler,
            },
        );
    }

    fn total_control(&self, action: TaskControl, handler: Option<Executer<SessionManager>>) {
        self.post(
            "total control failed",
            ControlCommand::TotalControl { action, handler },
        );
    }

    pub fn start(&self, url: impl UrlConvertible) {
        self.control(url, TaskControl::Start, None);
    }

    pub fn start_with<F>(&self, url: impl UrlConvertible, execute_on: ExecuteOn, handler: F)
    where
        F: Fn(&DownloadTask) + Send + Sync + 'static,
    {
        self.control(url, TaskControl::Start, Some(Executer::new(execute_on, handler)));
    }

    /// 暂停；只有运行中或等待中的任务会响应。
    pub fn suspend(&self, url: impl UrlConvertible) {
        self.control(url, TaskControl::Suspend, None);
    }

    pub fn suspend_with<F>(&self, url: impl UrlConvertible, execute_on: ExecuteOn, handler: F)
    where
        F: Fn(&DownloadTask) + Send + Sync + 'static,
    {
        self.control(url, TaskControl::Suspend, Some(Executer::new(execute_on, handler)));
    }

    /// 取消会丢弃续传数据和中间产物，已成功的任务不受影响。
    pub fn cancel(&self, url: impl UrlConvertible) {
        self.control(url, TaskControl::Cancel, None);
    }

    pub fn cancel_with<F>(&self, url: impl UrlConvertible, execute_on: ExecuteOn, handler: F)
    where
        F: Fn(&DownloadTask) + Send + Sync + 'static,
    {
        self.control(url, TaskControl::Cancel, Some(Executer::new(execute_on, handler)));
    }

    /// `completely` 为真时同时删除已完成的文件。
    pub fn remove(&self, url: impl UrlConvertible, completely: bool) {
        self.control(url, TaskControl::Remove { completely }, None);
    }

    pub fn remove_with<F>(
        &self,
        url: impl UrlConvertible,
        completely: bool,
        execute_on: ExecuteOn,
        handler: F,
    ) where
        F: Fn(&DownloadTask) + Send + Sync + 'static,
    {
        self.control(
            url,
            TaskControl::Remove { completely },
            Some(Executer::new(execute_on, handler)),
        );
    }

    /// 启动所有未成功的任务。
    pub fn total_start(&self) {
        self.total_control(TaskControl::Start, None);
    }

    pub fn total_start_with<F>(&self, execute_on: ExecuteOn, handler: F)
    where
        F: Fn(&SessionManager) + Send + Sync + 'static,
    {
        self.total_control(TaskControl::Start, Some(Executer::new(execute_on, handler)));
    }

    pub fn total_suspend(&self) {
        self.total_control(TaskControl::Suspend, None);
    }

    pub fn total_suspend_with<F>(&self, execute_on: ExecuteOn, handler: F)
    where
        F: Fn(&SessionManager) + Send + Sync + 'static,
    {
        self.total_control(TaskControl::Suspend, Some(Executer::new(execute_on, handler)));
    }

    pub fn total_cancel(&self) {
        self.total_control(TaskControl::Cancel, None);
    }

    pub fn total_cancel_with<F>(&self, execute_on: ExecuteOn, handler: F)
    where
        F: Fn(&SessionManager) + Send + Sync + 'static,
    {
        self.total_control(TaskControl::Cancel, Some(Executer::new(execute_on, handler)));
    }

    pub fn total_remove(&self, completely: bool) {
        self.total_control(TaskControl::Remove { completely }, None);
    }

    pub fn total_remove_with<F>(&self, completely: bool, execute_on: ExecuteOn, handler: F)
    where
        F: Fn(&SessionManager) + Send + Sync + 'static,
    {
        self.total_control(
            TaskControl::Remove { completely },
            Some(Executer::new(execute_on, handler)),
        );
    }
}
