//! HTTP 层
//!
//! - `HttpTransport` / `ReqwestTransport`: 传输能力与 reqwest 实现
//! - `SseDecoder`: 流式响应的逐行解码器
//! - `HttpChatService`: 基于厂商适配器的通用对话服务

pub mod generic;
pub mod stream;
pub mod transport;

pub use generic::HttpChatService;
pub use stream::{classify_line, decode_lines, SseDecoder, SseLine};
pub use transport::{
    ByteStream, HttpTransport, ReqwestTransport, StreamResponse, TransportRequest,
    TransportResponse,
};
