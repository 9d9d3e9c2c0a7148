//! # Registry — 下载目录与任务快照
//!
//! 每个管理器标识对应一套目录：
//!
//! - `root/`：任务快照 `<identifier>_tasks.snapshot`
//! - `root/tmp/`：被中断传输的中间产物备份，续传时再还回传输层的临时目录
//! - `root/final/`：下载完成的文件，默认以 URL 的 md5 加扩展名命名
//!
//! 传输层自己的临时目录（transient）不归注册表管理，这里只负责在两者之间搬运中间产物。
//! 所有磁盘操作都是尽力而为：失败写日志，不向调用方返回错误。

mod artifacts;
mod snapshot;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

use crate::internal::errors::CacheError;
use crate::internal::logging::{LogType, Logable};
use crate::internal::states::debouncer::Debouncer;
use crate::internal::utils::url_convertible::{UrlConvertible, default_file_name};

/// 注册表用到的四个目录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryPaths {
    pub root: PathBuf,
    pub tmp: PathBuf,
    pub final_dir: PathBuf,
    /// 传输层的临时目录
    pub transient: PathBuf,
}

impl RegistryPaths {
    /// 默认目录：`<系统缓存目录>/session_downloader.cache.<identifier>/downloads`，
    /// 取不到系统缓存目录时退回临时目录。
    pub fn for_identifier(identifier: &str) -> Self {
        let base = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
        let root = base
            .join(format!("session_downloader.cache.{identifier}"))
            .join("downloads");
        Self::with_root(identifier, root)
    }

    /// 以 `root` 为根目录，`tmp` 和 `final` 放在它下面。
    pub fn with_root(identifier: &str, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            tmp: root.join("tmp"),
            final_dir: root.join("final"),
            transient: std::env::temp_dir().join(format!("{identifier}-transfers")),
            root,
        }
    }

    pub fn transient(mut self, dir: impl Into<PathBuf>) -> Self {
        self.transient = dir.into();
        self
    }
}

pub struct Registry {
    identifier: String,
    paths: RegistryPaths,
    logger: Arc<dyn Logable>,
    debouncer: Debouncer,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("identifier", &self.identifier)
            .field("paths", &self.paths)
            .finish()
    }
}

impl Registry {
    pub(crate) fn new(identifier: &str, paths: RegistryPaths, logger: Arc<dyn Logable>) -> Self {
        let registry = Self {
            identifier: identifier.to_string(),
            paths,
            logger,
            debouncer: Debouncer::new(),
        };
        registry.ensure_directories();
        registry
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn paths(&self) -> &RegistryPaths {
        &self.paths
    }

    pub(crate) fn report(&self, message: &str, error: CacheError) {
        self.logger.log(LogType::error(message, error));
    }

    /// 创建缺失的目录。可重复调用；目录被外部删掉后会重新创建。
    pub fn ensure_directories(&self) {
        for dir in [
            &self.paths.root,
            &self.paths.tmp,
            &self.paths.final_dir,
            &self.paths.transient,
        ] {
            if dir.is_dir() {
                continue;
            }
            if let Err(source) = std::fs::create_dir_all(dir) {
                self.report(
                    "create directory failed",
                    CacheError::CannotCreateDirectory {
                        path: dir.clone(),
                        source,
                    },
                );
            }
        }
    }

    /// 下载完成后的文件路径；文件名为空时返回 `None`。
    pub fn file_path(&self, file_name: &str) -> Option<PathBuf> {
        if file_name.is_empty() {
            return None;
        }
        Some(self.paths.final_dir.join(file_name))
    }

    pub fn file_exists(&self, file_name: &str) -> bool {
        self.file_path(file_name).is_some_and(|p| p.exists())
    }

    /// 按默认文件名推导某个 URL 的完成文件路径。
    pub fn file_path_for_url(&self, url: impl UrlConvertible) -> Option<PathBuf> {
        let url: Url = url.as_url().ok()?;
        self.file_path(&default_file_name(&url))
    }

    pub fn file_exists_for_url(&self, url: impl UrlConvertible) -> bool {
        self.file_path_for_url(url).is_some_and(|p| p.exists())
    }

    pub(crate) fn continuation_backup_path(&self, artifact_name: &str) -> PathBuf {
        self.paths.tmp.join(artifact_name)
    }

    pub(crate) fn transient_path(&self, artifact_name: &str) -> PathBuf {
        self.paths.transient.join(artifact_name)
    }

    /// 删除整个根目录后重建目录结构。快照文件也会一起被删掉。
    pub async fn clear_disk_cache(&self) {
        self.debouncer.cancel(snapshot::STORE_KEY);
        let root = self.paths.root.clone();
        if tokio::fs::try_exists(&root).await.unwrap_or(false) {
            if let Err(source) = tokio::fs::remove_dir_all(&root).await {
                self.report(
                    "clear disk cache failed",
                    CacheError::CannotRemoveItem { path: root, source },
                );
            }
        }
        self.ensure_directories();
    }

    fn remove_if_exists(&self, path: &Path, message: &str) {
        if !path.exists() {
            return;
        }
        let result = if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        if let Err(source) = result {
            self.report(
                message,
                CacheError::CannotRemoveItem {
                    path: path.to_path_buf(),
                    source,
                },
            );
        }
    }
}
