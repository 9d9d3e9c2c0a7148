use serde::{Deserialize, Serialize};

use crate::internal::errors::TransportError;

/// HTTP 传输的续传令牌，序列化为 JSON 后作为不透明字节交给核心保存。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeToken {
    pub url: String,
    /// 临时目录下的中间产物文件名
    pub artifact: String,
    /// 已写入的字节数，续传从这里开始
    pub offset: u64,
    #[serde(default)]
    pub total: u64,
    /// `ETag` 或 `Last-Modified`，续传时作为 `If-Range`
    #[serde(default)]
    pub validator: Option<String>,
}

impl ResumeToken {
    pub fn encode(&self) -> Vec<u8> {
        // 只含字符串和整数，序列化不会失败
        serde_json::to_vec(self).unwrap_or_default()
    }

    pub fn decode(data: &[u8]) -> Result<Self, TransportError> {
        serde_json::from_slice(data).map_err(|e| TransportError::InvalidContinuation(e.to_string()))
    }

    /// `Range` 请求头的值。
    pub fn range_header(&self) -> String {
        format!("bytes={}-", self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::ResumeToken;

    #[test]
    fn garbage_is_rejected() {
        assert!(ResumeToken::decode(b"\x00\x01not json").is_err());
    }

    #[test]
    fn old_tokens_without_optional_fields_decode() {
        let token = ResumeToken::decode(br#"{"url":"https://a.b/c","artifact":"x.tmp","offset":42}"#).unwrap();
        assert_eq!(token.offset, 42);
        assert_eq!(token.validator, None);
        assert_eq!(token.range_header(), "bytes=42-");
    }
}
