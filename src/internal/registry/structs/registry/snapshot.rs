//! 任务快照的读写。写入走 200ms 的合并窗口，关闭时改为同步写入。

use std::path::PathBuf;
use std::sync::Arc;

use crate::internal::errors::CacheError;
use crate::internal::manager::structs::session_configuration::PERSIST_DEBOUNCE;
use crate::internal::manager::structs::session_context::SessionContext;
use crate::internal::registry::structs::task_record::TaskRecord;
use crate::internal::task::structs::{DownloadTask, TaskStatus};

use super::Registry;

pub(super) const STORE_KEY: &str = "store_tasks";

impl Registry {
    pub fn snapshot_path(&self) -> PathBuf {
        self.paths
            .root
            .join(format!("{}_tasks.snapshot", self.identifier))
    }

    /// 请求保存快照。窗口内的多次请求只落盘最后一次。
    pub(crate) fn store_tasks(self: &Arc<Self>, tasks: Vec<DownloadTask>) {
        let registry = Arc::clone(self);
        self.debouncer.execute(STORE_KEY, PERSIST_DEBOUNCE, move || {
            registry.store_tasks_now(&tasks);
        });
    }

    /// 立即同步写入快照，并作废尚未执行的合并写入。
    pub(crate) fn store_tasks_now(&self, tasks: &[DownloadTask]) {
        self.debouncer.cancel(STORE_KEY);
        let records: Vec<TaskRecord> = tasks.iter().map(DownloadTask::to_record).collect();
        if let Err(e) = self.write_records(&records) {
            self.report("store tasks failed", e);
        }
    }

    fn write_records(&self, records: &[TaskRecord]) -> Result<(), CacheError> {
        let path = self.snapshot_path();
        let encode_failed = |message: String| CacheError::CannotEncodeTasks {
            path: path.clone(),
            message,
        };
        let data = serde_json::to_vec_pretty(records).map_err(|e| encode_failed(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| encode_failed(e.to_string()))?;
        }
        // 先写临时文件再改名，避免进程中途退出留下半个快照
        let staging = path.with_extension("snapshot.partial");
        std::fs::write(&staging, data).map_err(|e| encode_failed(e.to_string()))?;
        std::fs::rename(&staging, &path).map_err(|e| encode_failed(e.to_string()))?;
        Ok(())
    }

    /// 读取快照里的全部记录；文件不存在时为空，解析失败时记日志并返回空。
    pub(crate) fn load_records(&self) -> Vec<TaskRecord> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Vec::new();
        }
        let decoded = std::fs::read(&path)
            .map_err(|e| e.to_string())
            .and_then(|data| {
                serde_json::from_slice::<Vec<TaskRecord>>(&data).map_err(|e| e.to_string())
            });
        match decoded {
            Ok(records) => records,
            Err(message) => {
                self.report(
                    "retrieve all tasks failed",
                    CacheError::CannotRetrieveAllTasks { path, message },
                );
                Vec::new()
            }
        }
    }

    /// 恢复全部任务并挂到给定的会话上下文。快照里处于 `waiting` 的任务一律改为 `suspended`。
    pub(crate) fn load_all(&self, context: &Arc<SessionContext>) -> Vec<DownloadTask> {
        self.load_records()
            .into_iter()
            .map(|mut record| {
                if record.status == TaskStatus::Waiting {
                    record.status = TaskStatus::Suspended;
                }
                DownloadTask::from_record(record, context)
            })
            .collect()
    }
}
