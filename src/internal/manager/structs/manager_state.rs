//! 管理器的共享字段：句柄一侧只读，控制面一侧读写。

use std::collections::HashMap;

use crate::internal::task::structs::{DownloadTask, Executer, TaskStatus};

use super::session_configuration::SessionConfiguration;
use super::session_manager::SessionManager;

#[derive(Debug)]
pub(crate) struct ManagerState {
    pub(crate) status: TaskStatus,
    /// 调用方可见的顺序
    pub(crate) tasks: Vec<DownloadTask>,
    /// 原始 URL -> 任务
    pub(crate) tasks_by_url: HashMap<String, DownloadTask>,
    /// 当前 URL（可能是重定向后的） -> 原始 URL
    pub(crate) redirects: HashMap<String, String>,
    pub(crate) running: Vec<DownloadTask>,
    pub(crate) succeeded: Vec<DownloadTask>,
    /// 会话重建后需要重新发起的任务
    pub(crate) restart_queue: Vec<DownloadTask>,
    pub(crate) configuration: SessionConfiguration,
    pub(crate) should_create_session: bool,
    pub(crate) speed: u64,
    pub(crate) time_remaining: u64,
}

impl ManagerState {
    pub(crate) fn new(configuration: SessionConfiguration) -> Self {
        Self {
            status: TaskStatus::Waiting,
            tasks: Vec::new(),
            tasks_by_url: HashMap::new(),
            redirects: HashMap::new(),
            running: Vec::new(),
            succeeded: Vec::new(),
            restart_queue: Vec::new(),
            configuration,
            should_create_session: false,
            speed: 0,
            time_remaining: 0,
        }
    }

    pub(crate) fn lookup(&self, url: &str) -> Option<DownloadTask> {
        let original = self.redirects.get(url).map(String::as_str).unwrap_or(url);
        self.tasks_by_url.get(original).cloned()
    }
}

/// 管理器级别的观察者。
#[derive(Default)]
pub(crate) struct ManagerObservers {
    pub(crate) progress: Option<Executer<SessionManager>>,
    pub(crate) success: Option<Executer<SessionManager>>,
    pub(crate) failure: Option<Executer<SessionManager>>,
    pub(crate) completion: Option<Executer<SessionManager>>,
    pub(crate) control: Option<Executer<SessionManager>>,
    /// 传输层报告后台事件全部投递完毕时调用一次
    pub(crate) background_completion: Option<Box<dyn FnOnce() + Send>>,
}
