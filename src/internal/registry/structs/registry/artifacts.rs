//! 产物文件的搬运：完成文件入库、中间产物的备份与还原、清理。

use std::path::{Path, PathBuf};

use crate::internal::errors::CacheError;
use crate::internal::task::structs::DownloadTask;

use super::Registry;

impl Registry {
    /// 把传输层交付的文件移到最终位置。跨文件系统时退化为复制后删除。
    pub(crate) fn store_final_artifact(&self, location: &Path, destination: &Path) -> bool {
        if let Some(parent) = destination.parent() {
            if let Err(source) = std::fs::create_dir_all(parent) {
                self.report(
                    "store file failed",
                    CacheError::CannotCreateDirectory {
                        path: parent.to_path_buf(),
                        source,
                    },
                );
                return false;
            }
        }
        if std::fs::rename(location, destination).is_ok() {
            return true;
        }
        let copied = std::fs::copy(location, destination).and_then(|_| std::fs::remove_file(location));
        match copied {
            Ok(()) => true,
            Err(source) => {
                self.report(
                    "store file failed",
                    CacheError::CannotMoveItem {
                        from: location.to_path_buf(),
                        to: destination.to_path_buf(),
                        source,
                    },
                );
                false
            }
        }
    }

    /// 把传输层临时目录里的中间产物复制一份到 `tmp/`，覆盖旧备份。
    pub(crate) fn backup_continuation_artifact(&self, artifact_name: &str) {
        if artifact_name.is_empty() {
            return;
        }
        let source_path = self.transient_path(artifact_name);
        let backup = self.continuation_backup_path(artifact_name);
        self.remove_if_exists(&backup, "store tmp file failed");
        if !source_path.exists() {
            return;
        }
        if let Err(source) = std::fs::copy(&source_path, &backup) {
            self.report(
                "store tmp file failed",
                CacheError::CannotCopyItem {
                    from: source_path,
                    to: backup,
                    source,
                },
            );
        }
    }

    /// 续传前确保中间产物位于传输层临时目录。
    ///
    /// 临时目录里已有时丢弃备份；否则把备份移回去。两处都没有时返回 `false`，调用方应从头下载。
    pub(crate) fn restore_continuation_artifact(&self, artifact_name: Option<&str>) -> bool {
        let Some(name) = artifact_name.filter(|n| !n.is_empty()) else {
            return false;
        };
        let backup = self.continuation_backup_path(name);
        let origin = self.transient_path(name);
        let backup_exists = backup.exists();
        let origin_exists = origin.exists();
        if !backup_exists && !origin_exists {
            return false;
        }

        if origin_exists {
            self.remove_if_exists(&backup, "retrieve tmp file failed");
        } else if let Err(source) = move_file(&backup, &origin) {
            self.report(
                "retrieve tmp file failed",
                CacheError::CannotMoveItem {
                    from: backup,
                    to: origin,
                    source,
                },
            );
        }
        true
    }

    /// 删除中间产物（备份与传输层临时目录两处）。
    pub(crate) fn remove_continuation_artifact(&self, artifact_name: Option<&str>) {
        let Some(name) = artifact_name.filter(|n| !n.is_empty()) else {
            return;
        };
        self.remove_if_exists(&self.continuation_backup_path(name), "remove tmp file failed");
        self.remove_if_exists(&self.transient_path(name), "remove tmp file failed");
    }

    pub(crate) fn remove_artifact(&self, path: &Path) {
        self.remove_if_exists(path, "remove file failed");
    }

    /// 任务被取消或移除时的清理；`completely` 为真时连同完成文件一起删除。
    pub(crate) fn remove_task_artifacts(&self, task: &DownloadTask, completely: bool) {
        self.remove_continuation_artifact(task.tmp_file_name().as_deref());
        if completely {
            if let Some(path) = task.file_path() {
                self.remove_artifact(&path);
            }
        }
    }

    /// 调用方修改了任务的文件名：完成文件已存在时跟着改名，返回新路径。
    pub(crate) fn rename_final_artifact(&self, old_path: &Path, new_name: &str) -> Option<PathBuf> {
        let new_path = self.file_path(new_name)?;
        if !old_path.exists() || old_path == new_path {
            return Some(new_path);
        }
        if let Err(source) = move_file(old_path, &new_path) {
            self.report(
                "update file name failed",
                CacheError::CannotMoveItem {
                    from: old_path.to_path_buf(),
                    to: new_path.clone(),
                    source,
                },
            );
        }
        Some(new_path)
    }
}

fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::internal::logging::{LogOption, Logger};
    use crate::internal::registry::structs::{Registry, RegistryPaths};

    fn registry(dir: &tempfile::TempDir) -> Registry {
        let paths = RegistryPaths::with_root("unit", dir.path().join("root"))
            .transient(dir.path().join("transient"));
        Registry::new("unit", paths, Arc::new(Logger::new("unit", LogOption::None)))
    }

    #[test]
    fn directories_are_recreated_after_external_delete() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);
        assert!(registry.paths().final_dir.is_dir());
        std::fs::remove_dir_all(&registry.paths().root).unwrap();
        registry.ensure_directories();
        assert!(registry.paths().tmp.is_dir());
        assert!(registry.paths().final_dir.is_dir());
    }

    #[test]
    fn backup_then_restore_moves_artifact_back() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);
        let origin = registry.transient_path("part-1");
        std::fs::write(&origin, b"partial").unwrap();

        registry.backup_continuation_artifact("part-1");
        assert!(registry.continuation_backup_path("part-1").exists());

        // 模拟系统清掉了传输层临时目录
        std::fs::remove_file(&origin).unwrap();
        assert!(registry.restore_continuation_artifact(Some("part-1")));
        assert_eq!(std::fs::read(&origin).unwrap(), b"partial");
        assert!(!registry.continuation_backup_path("part-1").exists());

        assert!(!registry.restore_continuation_artifact(Some("missing")));
        assert!(!registry.restore_continuation_artifact(None));
    }

    #[test]
    fn final_artifact_is_moved_and_renamed() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);
        let location = registry.transient_path("done.tmp");
        std::fs::write(&location, b"content").unwrap();
        let destination = registry.file_path("a.bin").unwrap();

        assert!(registry.store_final_artifact(&location, &destination));
        assert!(!location.exists());
        assert!(registry.file_exists("a.bin"));

        let renamed = registry.rename_final_artifact(&destination, "b.bin").unwrap();
        assert!(renamed.exists());
        assert!(!registry.file_exists("a.bin"));
        assert!(registry.file_path("").is_none());
    }

    #[tokio::test]
    async fn clear_disk_cache_keeps_layout() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);
        std::fs::write(registry.file_path("x.bin").unwrap(), b"x").unwrap();
        registry.clear_disk_cache().await;
        assert!(!registry.file_exists("x.bin"));
        assert!(registry.paths().final_dir.is_dir());
    }
}
