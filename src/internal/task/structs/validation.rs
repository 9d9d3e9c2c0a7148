use serde::{Deserialize, Serialize};

/// 文件校验结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Validation {
    #[default]
    Unknown,
    Correct,
    Incorrect,
}
