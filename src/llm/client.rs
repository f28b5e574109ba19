use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::warn;

use super::types::{ChatMessage, ChatStream, StreamEvent};
use crate::error::Result;

/// 统一对话服务
///
/// 单轮 `chat` 与 `chat_stream` 默认把提示词包装为系统消息 + 用户消息，
/// 流式回调版本默认消费 `stream_chat` 产生的事件流。
#[async_trait]
pub trait ChatService: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn chat_messages(&self, messages: &[ChatMessage]) -> Result<String>;

    async fn chat(&self, prompt: &str) -> Result<String> {
        self.chat_messages(&ChatMessage::prompt_exchange(prompt)).await
    }

    /// 惰性、只进、不可重启的增量序列，以流结束或错误事件终止
    fn stream_chat(&self, messages: Vec<ChatMessage>) -> ChatStream;

    /// 回调在当前任务上按到达顺序同步执行，返回前全部送达
    async fn chat_stream_messages(
        &self,
        messages: &[ChatMessage],
        sink: &mut (dyn FnMut(StreamEvent) + Send),
    ) {
        let mut stream = self.stream_chat(messages.to_vec());
        while let Some(event) = stream.next().await {
            sink(event);
        }
    }

    async fn chat_stream(&self, prompt: &str, sink: &mut (dyn FnMut(StreamEvent) + Send)) {
        self.chat_stream_messages(&ChatMessage::prompt_exchange(prompt), sink)
            .await
    }

    fn probe_prompt(&self) -> &str {
        "Hello"
    }

    /// 发送一次最小请求，任何错误都视为不可用
    async fn is_available(&self) -> bool {
        let messages = [ChatMessage::user(self.probe_prompt())];
        match self.chat_messages(&messages).await {
            Ok(content) => !content.trim().is_empty(),
            Err(err) => {
                warn!(provider = self.provider_name(), error = %err, "service unavailable");
                false
            }
        }
    }
}

pub type DynChatService = Arc<dyn ChatService>;
