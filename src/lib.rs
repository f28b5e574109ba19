pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod plugin;
pub mod services;
pub mod utils;

pub use config::{BridgeConfig, EnvConfig, ProviderConfig, Timeouts};
pub use error::{BridgeError, Result};
pub use llm::{
    ChatAdapter, ChatMessage, ChatService, ChatStream, DynChatService, HttpChatService,
    MessageRole, StreamEvent,
};
pub use plugin::{
    register_plugin, DynServiceProvider, ProviderDescriptor, ProviderRegistry, ServiceProvider,
};
pub use services::{ChatUtil, ServiceFactory};
pub use utils::{logging, validation};
