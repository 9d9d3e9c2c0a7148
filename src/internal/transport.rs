//! 传输适配层：把底层传输（HTTP 会话）的异步事件投递进管理器的串行控制面。
//!
//! 核心只依赖 [`traits::Transport`] / [`traits::TransportFactory`]；
//! 默认实现 [`http::HttpTransport`] 基于 `reqwest`。

pub mod http;
pub mod structs;
pub mod traits;
