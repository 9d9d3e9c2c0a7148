//! 任务快照的单条记录。新增字段必须带 `#[serde(default)]`，旧快照缺字段时取零值。

use serde::{Deserialize, Serialize};
use url::Url;

use crate::internal::errors::TaskError;
use crate::internal::task::structs::{TaskStatus, Validation, VerificationType};
use crate::internal::transport::structs::Headers;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub url: Url,
    #[serde(default, rename = "currentURL")]
    pub current_url: Option<Url>,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub headers: Option<Headers>,
    #[serde(default)]
    pub start_date: f64,
    #[serde(default)]
    pub end_date: f64,
    #[serde(default)]
    pub total_bytes: u64,
    #[serde(default)]
    pub completed_bytes: u64,
    #[serde(default)]
    pub verification_code: Option<String>,
    #[serde(default)]
    pub verification_type: VerificationType,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub validation: Validation,
    #[serde(default)]
    pub error: Option<TaskError>,
    #[serde(default, with = "base64_bytes")]
    pub resume_data: Option<Vec<u8>>,
    #[serde(default)]
    pub tmp_file_name: Option<String>,
    #[serde(default)]
    pub response_status: Option<u16>,
}

/// 续传令牌以 base64 字符串保存。
mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => s.serialize_some(&STANDARD.encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(d)?;
        encoded
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
