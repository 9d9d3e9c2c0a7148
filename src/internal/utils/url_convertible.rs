//! 可转换为 [`Url`] 的类型，以及由 URL 推导的默认文件名。

use percent_encoding::percent_decode_str;
use url::Url;

use crate::internal::errors::DownloadError;

/// 可以解析为下载地址的类型：字符串、[`Url`] 或已有的下载任务。
pub trait UrlConvertible {
    fn as_url(&self) -> Result<Url, DownloadError>;
}

impl UrlConvertible for Url {
    fn as_url(&self) -> Result<Url, DownloadError> {
        Ok(self.clone())
    }
}

impl UrlConvertible for &Url {
    fn as_url(&self) -> Result<Url, DownloadError> {
        Ok((*self).clone())
    }
}

impl UrlConvertible for str {
    fn as_url(&self) -> Result<Url, DownloadError> {
        let invalid = || DownloadError::InvalidUrl {
            url: self.to_string(),
        };
        let url = Url::parse(self).map_err(|_| invalid())?;
        // 只接受带主机的地址，`mailto:` 之类不算下载地址
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(invalid());
        }
        Ok(url)
    }
}

impl UrlConvertible for &str {
    fn as_url(&self) -> Result<Url, DownloadError> {
        (**self).as_url()
    }
}

impl UrlConvertible for String {
    fn as_url(&self) -> Result<Url, DownloadError> {
        self.as_str().as_url()
    }
}

impl UrlConvertible for &String {
    fn as_url(&self) -> Result<Url, DownloadError> {
        self.as_str().as_url()
    }
}

/// URL 路径最后一段的扩展名（已做百分号解码），没有则为 `None`。
pub fn path_extension(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let decoded = percent_decode_str(last).decode_utf8_lossy();
    let (stem, ext) = decoded.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_string())
}

/// 默认文件名：完整 URL 字符串的 md5，有扩展名时追加 `.扩展名`。
pub fn default_file_name(url: &Url) -> String {
    let digest = format!("{:x}", md5::compute(url.as_str().as_bytes()));
    match path_extension(url) {
        Some(ext) => format!("{digest}.{ext}"),
        None => digest,
    }
}
