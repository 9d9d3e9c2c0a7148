//! 控制面命令。调用方、传输层、定时器都只投递命令，状态迁移在唯一的消费者里按 FIFO 顺序发生。

use std::cmp::Ordering;
use std::fmt;

use tokio::sync::oneshot;
use url::Url;

use crate::internal::errors::{DownloadError, FileVerificationError};
use crate::internal::task::structs::{DownloadTask, Executer};
use crate::internal::transport::structs::{Headers, TransportEvent};

use super::manager_core::ManagerCore;
use super::session_configuration::SessionConfiguration;
use super::session_manager::SessionManager;

/// 单个任务上的控制动作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskControl {
    Start,
    Suspend,
    Cancel,
    Remove { completely: bool },
}

/// 批量下载中的一项。
pub(crate) struct DownloadItem {
    pub(crate) url: Url,
    pub(crate) headers: Option<Headers>,
    pub(crate) file_name: Option<String>,
}

pub(crate) type TaskComparator = Box<dyn FnMut(&DownloadTask, &DownloadTask) -> Ordering + Send>;

pub(crate) enum ControlCommand {
    Download {
        item: DownloadItem,
        reply: oneshot::Sender<DownloadTask>,
    },
    MultiDownload {
        items: Vec<DownloadItem>,
        reply: oneshot::Sender<Vec<DownloadTask>>,
    },
    Control {
        url: Url,
        action: TaskControl,
        handler: Option<Executer<DownloadTask>>,
    },
    TotalControl {
        action: TaskControl,
        handler: Option<Executer<SessionManager>>,
    },
    MoveTask {
        from: usize,
        to: usize,
        reply: oneshot::Sender<Result<(), DownloadError>>,
    },
    Sort {
        comparator: TaskComparator,
        reply: oneshot::Sender<()>,
    },
    SetConfiguration(SessionConfiguration),
    Transport {
        session: u64,
        event: TransportEvent,
    },
    /// 不经过传输层的结束（就地暂停/取消/移除，或完成文件已存在）。
    /// `released_slot` 表示任务结束前占着运行名额
    LocalCompletion {
        task: DownloadTask,
        released_slot: bool,
    },
    /// 有运行名额空出来了，启动下一个等待中的任务
    StartNext,
    /// 刷新速度与剩余时间
    Tick,
    ValidationFinished {
        task: DownloadTask,
        result: Result<(), FileVerificationError>,
    },
    /// 需要访问管理器状态的一段逻辑
    Job(Box<dyn FnOnce(&mut ManagerCore) + Send>),
    /// 不需要管理器状态、只需要串行化的一段逻辑
    Local(Box<dyn FnOnce() + Send>),
    /// 屏障：之前投递的命令全部处理完后回执
    Flush(oneshot::Sender<()>),
    /// 落盘快照、作废传输会话并退出控制面；带回执时在退出前回复
    Shutdown(Option<oneshot::Sender<()>>),
}

impl fmt::Debug for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlCommand::Download { .. } => "Download",
            ControlCommand::MultiDownload { .. } => "MultiDownload",
            ControlCommand::Control { .. } => "Control",
            ControlCommand::TotalControl { .. } => "TotalControl",
            ControlCommand::MoveTask { .. } => "MoveTask",
            ControlCommand::Sort { .. } => "Sort",
            ControlCommand::SetConfiguration(_) => "SetConfiguration",
            ControlCommand::Transport { .. } => "Transport",
            ControlCommand::LocalCompletion { .. } => "LocalCompletion",
            ControlCommand::StartNext => "StartNext",
            ControlCommand::Tick => "Tick",
            ControlCommand::ValidationFinished { .. } => "ValidationFinished",
            ControlCommand::Job(_) => "Job",
            ControlCommand::Local(_) => "Local",
            ControlCommand::Flush(_) => "Flush",
            ControlCommand::Shutdown(_) => "Shutdown",
        };
        f.write_str(name)
    }
}
