//! 日志侧信道：存储错误、"找不到任务"等非致命情况都从这里汇报，而不是抛回控制面。

pub mod log_type;
pub mod logger;

pub use log_type::{LogOption, LogType};
pub use logger::{Logable, Logger};
