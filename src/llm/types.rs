use std::fmt;
use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// 默认系统提示词，`chat(prompt)` 会把它放在用户消息之前
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 对话消息。顺序由调用方决定，系统消息应放在第一位。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Tool, content)
    }

    /// 单轮提问的标准两条消息
    pub fn prompt_exchange(prompt: impl Into<String>) -> Vec<ChatMessage> {
        vec![Self::system(DEFAULT_SYSTEM_PROMPT), Self::user(prompt)]
    }
}

/// 流式输出中的单个事件
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    Delta(String),
    Error(String),
}

impl StreamEvent {
    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StreamEvent::Error(_))
    }

    pub fn as_delta(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(text) => Some(text),
            StreamEvent::Error(_) => None,
        }
    }

    /// 字符串形式：增量原样返回，错误渲染为 `{"error": "..."}`
    pub fn into_payload(self) -> String {
        match self {
            StreamEvent::Delta(text) => text,
            StreamEvent::Error(message) => json!({ "error": message }).to_string(),
        }
    }
}

pub type ChatStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;
