#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use llmbridge::config::{ProviderConfig, Timeouts};
use llmbridge::error::{BridgeError, Result};
use llmbridge::llm::http::{StreamResponse, TransportRequest, TransportResponse};
use llmbridge::llm::{ChatAdapter, DynChatService, HttpChatService, HttpTransport};
use llmbridge::plugin::{ProviderDescriptor, ServiceProvider};
use parking_lot::Mutex;

/// 预先编排好的响应
#[derive(Clone)]
pub enum Script {
    Reply { status: u16, body: String },
    Stream { status: u16, chunks: Vec<std::result::Result<String, String>> },
    Fail(String),
}

impl Script {
    pub fn ok(body: impl Into<String>) -> Self {
        Script::Reply {
            status: 200,
            body: body.into(),
        }
    }

    pub fn sse(lines: &[&str]) -> Self {
        Script::Stream {
            status: 200,
            chunks: lines.iter().map(|line| Ok(format!("{line}\n"))).collect(),
        }
    }
}

/// 内存中的传输实现，记录每一次请求
pub struct ScriptedTransport {
    script: Script,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.requests.lock().push(request);
        match &self.script {
            Script::Reply { status, body } => Ok(TransportResponse {
                status: *status,
                body: body.clone(),
            }),
            Script::Stream { .. } => Err(BridgeError::transport(None, "unexpected plain request")),
            Script::Fail(message) => Err(BridgeError::transport(None, message.clone())),
        }
    }

    async fn post_stream(&self, request: TransportRequest) -> Result<StreamResponse> {
        self.requests.lock().push(request);
        match &self.script {
            Script::Stream { status, chunks } => {
                let chunks: Vec<Result<Vec<u8>>> = chunks
                    .iter()
                    .map(|chunk| match chunk {
                        Ok(text) => Ok(text.clone().into_bytes()),
                        Err(message) => Err(BridgeError::transport(Some(*status), message.clone())),
                    })
                    .collect();
                Ok(StreamResponse {
                    status: *status,
                    chunks: Box::pin(futures::stream::iter(chunks)),
                })
            }
            Script::Reply { status, body } => Ok(StreamResponse {
                status: *status,
                chunks: Box::pin(futures::stream::iter(vec![Ok(body.clone().into_bytes())])),
            }),
            Script::Fail(message) => Err(BridgeError::transport(None, message.clone())),
        }
    }
}

pub fn scripted_service<A: ChatAdapter>(
    adapter: A,
    config: ProviderConfig,
    transport: &Arc<ScriptedTransport>,
) -> HttpChatService<A> {
    HttpChatService::with_transport(adapter, &config, Timeouts::default(), transport.clone())
}

/// 通过脚本传输构造服务的插件，并统计构造次数
pub struct ScriptedProvider<A> {
    descriptor: ProviderDescriptor,
    adapter: A,
    transport: Arc<ScriptedTransport>,
    delay: Duration,
    pub constructions: AtomicUsize,
}

impl<A: ChatAdapter + Clone> ScriptedProvider<A> {
    pub fn new(descriptor: ProviderDescriptor, adapter: A, transport: Arc<ScriptedTransport>) -> Arc<Self> {
        Self::with_delay(descriptor, adapter, transport, Duration::from_millis(5))
    }

    /// 构造服务前先阻塞 `delay`
    pub fn with_delay(
        descriptor: ProviderDescriptor,
        adapter: A,
        transport: Arc<ScriptedTransport>,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            descriptor,
            adapter,
            transport,
            delay,
            constructions: AtomicUsize::new(0),
        })
    }

    pub fn construction_count(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }
}

impl<A: ChatAdapter + Clone> ServiceProvider for ScriptedProvider<A> {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn create_service(&self, config: &ProviderConfig, timeouts: Timeouts) -> Result<DynChatService> {
        self.constructions.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(Arc::new(HttpChatService::with_transport(
            self.adapter.clone(),
            config,
            timeouts,
            self.transport.clone(),
        )))
    }
}
