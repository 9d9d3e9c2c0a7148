//! 任务的可变字段，整体放在一个 [`SynchronizedState`](crate::states::synchronized_state::SynchronizedState) 里。

use url::Url;

use crate::internal::errors::TaskError;
use crate::internal::transport::structs::{Headers, TransferHandle};

use super::download_task::DownloadTask;
use super::executer::Executer;
use super::task_status::TaskStatus;
use super::validation::Validation;
use super::verification::VerificationType;

#[derive(Debug, Clone)]
pub(crate) struct TaskState {
    pub(crate) current_url: Url,
    pub(crate) file_name: String,
    pub(crate) headers: Option<Headers>,
    pub(crate) status: TaskStatus,
    pub(crate) validation: Validation,
    pub(crate) verification_code: Option<String>,
    pub(crate) verification_type: VerificationType,
    /// 校验码或算法变化后需要重新计算
    pub(crate) should_validate: bool,
    pub(crate) continuation: Option<Vec<u8>>,
    pub(crate) tmp_file_name: Option<String>,
    /// Unix 秒
    pub(crate) start_date: f64,
    pub(crate) end_date: f64,
    pub(crate) completed_bytes: u64,
    pub(crate) total_bytes: u64,
    /// 上一次测速时的已完成字节数
    pub(crate) last_tick_bytes: u64,
    pub(crate) speed: u64,
    pub(crate) time_remaining: u64,
    pub(crate) error: Option<TaskError>,
    pub(crate) response_status: Option<u16>,
    pub(crate) remove_completely: bool,
    pub(crate) transfer: Option<TransferHandle>,
}

impl TaskState {
    pub(crate) fn new(url: &Url, file_name: String, headers: Option<Headers>) -> Self {
        Self {
            current_url: url.clone(),
            file_name,
            headers,
            status: TaskStatus::Waiting,
            validation: Validation::Unknown,
            verification_code: None,
            verification_type: VerificationType::Md5,
            should_validate: false,
            continuation: None,
            tmp_file_name: None,
            start_date: 0.0,
            end_date: 0.0,
            completed_bytes: 0,
            total_bytes: 0,
            last_tick_bytes: 0,
            speed: 0,
            time_remaining: 0,
            error: None,
            response_status: None,
            remove_completely: false,
            transfer: None,
        }
    }
}

/// 任务上注册的观察者，每种至多一个。
#[derive(Default)]
pub(crate) struct TaskObservers {
    pub(crate) progress: Option<Executer<DownloadTask>>,
    pub(crate) success: Option<Executer<DownloadTask>>,
    pub(crate) failure: Option<Executer<DownloadTask>>,
    pub(crate) completion: Option<Executer<DownloadTask>>,
    /// 一次性的控制回调，执行后清空
    pub(crate) control: Option<Executer<DownloadTask>>,
    pub(crate) validation: Option<Executer<DownloadTask>>,
}
