//! 下载任务：状态机、计时与速度统计、观察者、快照编解码。
//!
//! 所有状态迁移都在管理器的控制面上执行；任务自身的字段由互斥容器保护，
//! 供定时器、观察者和调用方并发读取。

pub mod structs;
