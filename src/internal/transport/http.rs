//! 基于 `reqwest` 的默认传输实现：流式写入临时目录，中断时产出续传令牌，续传用 `Range` 请求。

pub mod http_transport;
pub mod resume_token;
mod transfer_worker;

pub use http_transport::{HttpTransport, HttpTransportFactory};
pub use resume_token::ResumeToken;
