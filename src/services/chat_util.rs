use std::sync::Arc;

use super::ServiceFactory;
use crate::error::Result;
use crate::llm::{ChatMessage, StreamEvent};

/// 面向调用方的便捷入口，不指定提供商时使用默认提供商
#[derive(Clone)]
pub struct ChatUtil {
    factory: Arc<ServiceFactory>,
}

impl ChatUtil {
    pub fn new(factory: Arc<ServiceFactory>) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &Arc<ServiceFactory> {
        &self.factory
    }

    pub async fn chat(&self, prompt: &str) -> Result<String> {
        self.factory.get_default_service()?.chat(prompt).await
    }

    pub async fn chat_with(&self, provider: &str, prompt: &str) -> Result<String> {
        self.factory.get_service(provider)?.chat(prompt).await
    }

    pub async fn chat_messages(&self, provider: &str, messages: &[ChatMessage]) -> Result<String> {
        self.factory.get_service(provider)?.chat_messages(messages).await
    }

    /// 只有获取服务失败时返回错误，传输错误通过回调送达
    pub async fn chat_stream(
        &self,
        prompt: &str,
        sink: &mut (dyn FnMut(StreamEvent) + Send),
    ) -> Result<()> {
        let service = self.factory.get_default_service()?;
        service.chat_stream(prompt, sink).await;
        Ok(())
    }

    pub async fn chat_stream_with(
        &self,
        provider: &str,
        prompt: &str,
        sink: &mut (dyn FnMut(StreamEvent) + Send),
    ) -> Result<()> {
        let service = self.factory.get_service(provider)?;
        service.chat_stream(prompt, sink).await;
        Ok(())
    }
}
