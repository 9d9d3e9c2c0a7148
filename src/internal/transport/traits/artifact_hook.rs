//! 产物放置钩子：下载完成后由它决定最终文件如何落地（如 zip 解包），不处理则走默认的移动。

use std::path::Path;

use crate::internal::utils::file_type::FileType;

pub trait ArtifactHook: Send + Sync {
    /// 返回 `Ok(true)` 表示钩子已经把 `location` 处理到 `destination`；
    /// `Ok(false)` 则由注册表执行默认的移动。
    fn place_artifact(
        &self,
        _file_type: Option<&FileType>,
        _location: &Path,
        _destination: &Path,
    ) -> std::io::Result<bool> {
        Ok(false)
    }
}

/// 把闭包包装成 [`ArtifactHook`]。
pub struct ArtifactHookAdapter<F>(pub F);

impl<F> ArtifactHook for ArtifactHookAdapter<F>
where
    F: Fn(Option<&FileType>, &Path, &Path) -> std::io::Result<bool> + Send + Sync,
{
    fn place_artifact(
        &self,
        file_type: Option<&FileType>,
        location: &Path,
        destination: &Path,
    ) -> std::io::Result<bool> {
        (self.0)(file_type, location, destination)
    }
}
