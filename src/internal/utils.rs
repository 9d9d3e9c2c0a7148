//! 零散工具：URL 转换与默认文件名、文件类型识别、展示用格式化。

pub mod file_type;
pub mod task_info;
pub mod url_convertible;
