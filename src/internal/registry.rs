//! 任务注册表（磁盘缓存）：目录布局、任务快照、产物文件的移动与清理。
//!
//! 注册表里的 I/O 错误一律通过日志侧信道汇报，不会抛回控制面。

pub mod structs;
