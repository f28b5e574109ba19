pub mod adapter;
pub mod client;
pub mod http;
pub mod providers;
pub mod types;

pub use adapter::{ChatAdapter, CHAT_COMPLETIONS_PATH};
pub use client::{ChatService, DynChatService};
pub use http::{HttpChatService, HttpTransport, ReqwestTransport, SseDecoder};
pub use providers::{
    builtin_providers, AdapterProvider, DeepSeekAdapter, DoubaoAdapter, OpenAiAdapter,
    SiliconFlowAdapter,
};
pub use types::{ChatMessage, ChatStream, MessageRole, StreamEvent, DEFAULT_SYSTEM_PROMPT};
