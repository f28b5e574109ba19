use std::pin::Pin;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::instrument;

use crate::config::Timeouts;
use crate::error::{BridgeError, Result};

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// 发往厂商的一次 POST 请求
#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub url: String,
    pub api_key: String,
    pub body: Value,
}

#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct StreamResponse {
    pub status: u16,
    pub chunks: ByteStream,
}

impl StreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 传输能力："POST 字节，拿到状态码和响应体"
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse>;

    async fn post_stream(&self, request: TransportRequest) -> Result<StreamResponse>;
}

/// 基于 reqwest 的传输实现
///
/// - 连接超时：`Timeouts::connect`
/// - 读取超时：`Timeouts::read`，两次读取之间的最长间隔，不限制请求总时长
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeouts: Timeouts) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .build()
            .map_err(|e| BridgeError::Other(anyhow!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn request_builder(&self, request: &TransportRequest) -> reqwest::RequestBuilder {
        self.client
            .post(&request.url)
            .bearer_auth(&request.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&request.body)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse> {
        let response = self
            .request_builder(&request)
            .send()
            .await
            .map_err(|e| BridgeError::transport(None, format!("HTTP request error: {}", e)))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            BridgeError::transport(Some(status), format!("failed to read response: {}", e))
        })?;

        Ok(TransportResponse { status, body })
    }

    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn post_stream(&self, request: TransportRequest) -> Result<StreamResponse> {
        let response = self
            .request_builder(&request)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| BridgeError::transport(None, format!("HTTP request error: {}", e)))?;

        let status = response.status().as_u16();
        let chunks = response.bytes_stream().map(move |chunk| {
            chunk.map(|bytes| bytes.to_vec()).map_err(|e| {
                BridgeError::transport(Some(status), format!("stream read error: {}", e))
            })
        });

        Ok(StreamResponse {
            status,
            chunks: Box::pin(chunks),
        })
    }
}
