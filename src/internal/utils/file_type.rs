use super::url_convertible::path_extension;
use url::Url;

/// 由扩展名识别的文件类型，供完成后的产物处理钩子判断是否需要解包。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    Zip,
    Mp4,
    Text,
    Json,
    /// 其他类型，保留原始扩展名
    Other(String),
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "zip" => FileType::Zip,
            "mp4" => FileType::Mp4,
            "txt" => FileType::Text,
            "json" => FileType::Json,
            _ => FileType::Other(ext.to_string()),
        }
    }

    /// URL 没有扩展名时返回 `None`。
    pub fn from_url(url: &Url) -> Option<Self> {
        path_extension(url).map(|ext| Self::from_extension(&ext))
    }
}
