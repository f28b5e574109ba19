use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use super::stream::SseDecoder;
use super::transport::{ByteStream, HttpTransport, ReqwestTransport, TransportRequest};
use crate::config::{ProviderConfig, Timeouts};
use crate::error::{BridgeError, Result};
use crate::llm::adapter::ChatAdapter;
use crate::llm::client::ChatService;
use crate::llm::types::{ChatMessage, ChatStream, StreamEvent};
use crate::utils::mask_api_key;

const MAX_ERROR_BODY: usize = 500;

/// 基于厂商适配器的通用 HTTP 对话服务
///
/// 创建后绑定一个提供商配置与一组超时，不再改变。
pub struct HttpChatService<A: ChatAdapter> {
    adapter: Arc<A>,
    config: ProviderConfig,
    transport: Arc<dyn HttpTransport>,
    timeouts: Timeouts,
}

impl<A: ChatAdapter> HttpChatService<A> {
    pub fn new(adapter: A, config: &ProviderConfig, timeouts: Timeouts) -> Result<Self> {
        let transport = ReqwestTransport::new(timeouts)?;
        Ok(Self::with_transport(
            adapter,
            config,
            timeouts,
            Arc::new(transport),
        ))
    }

    /// 使用指定的传输实现创建服务
    ///
    /// 未配置 `api_url` 时填充厂商默认地址；调用方的配置不会被修改。
    pub fn with_transport(
        adapter: A,
        config: &ProviderConfig,
        timeouts: Timeouts,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let mut config = config.clone();
        if config.api_url().is_none() {
            config.api_url = Some(adapter.default_api_url().to_string());
        }

        info!(
            provider = adapter.provider_name(),
            api_url = config.api_url.as_deref().unwrap_or_default(),
            model = %adapter.resolve_model(&config),
            api_key = %mask_api_key(&config.api_key),
            "chat service initialized"
        );

        Self {
            adapter: Arc::new(adapter),
            config,
            transport,
            timeouts,
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn endpoint_url(&self) -> String {
        let base = self
            .config
            .api_url()
            .unwrap_or_else(|| self.adapter.default_api_url());
        format!("{}{}", base.trim_end_matches('/'), self.adapter.chat_endpoint())
    }

    pub fn build_request_body(&self, messages: &[ChatMessage], stream: bool) -> Value {
        self.adapter.build_request_body(&self.config, messages, stream)
    }

    fn request(&self, messages: &[ChatMessage], stream: bool) -> TransportRequest {
        TransportRequest {
            url: self.endpoint_url(),
            api_key: self.config.api_key.clone(),
            body: self.build_request_body(messages, stream),
        }
    }

    async fn send_chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let response = self.transport.post(self.request(messages, false)).await?;
        if !response.is_success() {
            return Err(BridgeError::transport(
                Some(response.status),
                format!("Request failed: {}", truncate(&response.body)),
            ));
        }
        self.adapter.parse_response(&response.body)
    }
}

#[async_trait]
impl<A: ChatAdapter> ChatService for HttpChatService<A> {
    fn provider_name(&self) -> &str {
        self.adapter.provider_name()
    }

    #[instrument(skip(self, messages), fields(provider = self.adapter.provider_name()))]
    async fn chat_messages(&self, messages: &[ChatMessage]) -> Result<String> {
        self.send_chat(messages).await.map_err(|err| {
            error!(error = %err, "chat request failed");
            BridgeError::chat(self.adapter.display_name(), err)
        })
    }

    fn stream_chat(&self, messages: Vec<ChatMessage>) -> ChatStream {
        let adapter = Arc::clone(&self.adapter);
        let transport = Arc::clone(&self.transport);
        let request = self.request(&messages, true);

        Box::pin(futures::stream::unfold(
            StreamState::Pending(request),
            move |state| {
                let adapter = Arc::clone(&adapter);
                let transport = Arc::clone(&transport);
                async move { next_event(adapter.as_ref(), transport.as_ref(), state).await }
            },
        ))
    }

    fn probe_prompt(&self) -> &str {
        self.adapter.probe_prompt()
    }
}

enum StreamState {
    Pending(TransportRequest),
    Reading {
        chunks: ByteStream,
        decoder: SseDecoder,
        pending: VecDeque<StreamEvent>,
    },
    Done,
}

async fn next_event<A: ChatAdapter>(
    adapter: &A,
    transport: &dyn HttpTransport,
    mut state: StreamState,
) -> Option<(StreamEvent, StreamState)> {
    loop {
        state = match state {
            StreamState::Pending(request) => match transport.post_stream(request).await {
                Ok(response) if response.is_success() => StreamState::Reading {
                    chunks: response.chunks,
                    decoder: SseDecoder::new(),
                    pending: VecDeque::new(),
                },
                Ok(response) => {
                    warn!(
                        provider = adapter.provider_name(),
                        status = response.status,
                        "streaming request rejected"
                    );
                    let message = format!("Request failed: {}", response.status);
                    return Some((StreamEvent::Error(message), StreamState::Done));
                }
                Err(err) => {
                    warn!(provider = adapter.provider_name(), error = %err, "streaming request failed");
                    let message = format!(
                        "{} streaming API call failed: {}",
                        adapter.display_name(),
                        err
                    );
                    return Some((StreamEvent::Error(message), StreamState::Done));
                }
            },
            StreamState::Reading {
                mut chunks,
                mut decoder,
                mut pending,
            } => {
                if let Some(event) = pending.pop_front() {
                    return Some((
                        event,
                        StreamState::Reading {
                            chunks,
                            decoder,
                            pending,
                        },
                    ));
                }
                if decoder.is_finished() {
                    return None;
                }
                match chunks.next().await {
                    Some(Ok(bytes)) => pending.extend(decoder.feed(adapter, &bytes)),
                    Some(Err(err)) => {
                        warn!(provider = adapter.provider_name(), error = %err, "stream interrupted");
                        return Some((StreamEvent::Error(err.to_string()), StreamState::Done));
                    }
                    None => pending.extend(decoder.finish(adapter)),
                }
                StreamState::Reading {
                    chunks,
                    decoder,
                    pending,
                }
            }
            StreamState::Done => return None,
        };
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated, {} bytes total)", &body[..end], body.len())
}
