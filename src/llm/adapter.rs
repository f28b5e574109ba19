//! 厂商适配契约
//!
//! 每个厂商只需声明自己的参数表与默认值，请求构建、响应解析、流式 chunk 解析
//! 都有 OpenAI 兼容格式的默认实现，厂商按需覆盖其中的钩子。

use std::collections::HashMap;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{BridgeError, Result};
use crate::llm::types::{ChatMessage, StreamEvent};

pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

pub trait ChatAdapter: Send + Sync + 'static {
    /// 规范名称，小写，例如 `openai`
    fn provider_name(&self) -> &'static str;

    /// 日志与错误信息中使用的名称，例如 `OpenAI`
    fn display_name(&self) -> &'static str;

    fn default_api_url(&self) -> &'static str;

    fn default_model(&self) -> &'static str;

    fn chat_endpoint(&self) -> &'static str {
        CHAT_COMPLETIONS_PATH
    }

    /// 允许从配置参数透传到请求体的键，其余键被丢弃
    fn passthrough_parameters(&self) -> &'static [&'static str];

    /// 请求体中缺失时才补充的默认值
    fn default_parameters(&self) -> Vec<(&'static str, Value)>;

    /// 可用性探测使用的提示词
    fn probe_prompt(&self) -> &'static str {
        "Hello"
    }

    /// 透传之后、补默认值之前的厂商定制
    fn customize_request(&self, _body: &mut Map<String, Value>, _parameters: &HashMap<String, Value>) {}

    /// 成功响应里的附加字段（推理过程、工具调用等）
    fn inspect_message(&self, _message: &Value) {}

    /// 从 `choices[0]` 中提取增量文本
    fn extract_delta(&self, choice: &Value) -> Option<String> {
        choice["delta"]["content"].as_str().map(str::to_string)
    }

    fn resolve_model(&self, config: &ProviderConfig) -> String {
        config
            .model()
            .unwrap_or_else(|| self.default_model())
            .to_string()
    }

    fn build_request_body(
        &self,
        config: &ProviderConfig,
        messages: &[ChatMessage],
        stream: bool,
    ) -> Value {
        let mut body = Map::new();
        body.insert("model".into(), json!(self.resolve_model(config)));
        body.insert("messages".into(), json!(messages));
        body.insert("stream".into(), json!(stream));

        for key in self.passthrough_parameters() {
            if let Some(value) = config.parameters.get(*key) {
                body.insert((*key).to_string(), value.clone());
            }
        }

        self.customize_request(&mut body, &config.parameters);

        for (key, value) in self.default_parameters() {
            body.entry(key).or_insert(value);
        }

        Value::Object(body)
    }

    /// 把 `error` 对象转换为厂商协议错误，原样保留 type/code/message
    fn vendor_error(&self, error: &Value) -> BridgeError {
        let message = error["message"]
            .as_str()
            .or_else(|| error.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        let error_type = error["type"].as_str().unwrap_or("unknown_error").to_string();
        let code = match &error["code"] {
            Value::String(code) => Some(code.clone()),
            Value::Number(code) => Some(code.to_string()),
            _ => None,
        };
        BridgeError::VendorProtocol {
            provider: self.display_name().to_string(),
            error_type,
            code,
            message,
        }
    }

    fn parse_response(&self, body: &str) -> Result<String> {
        let unparseable = || BridgeError::UnparseableResponse {
            provider: self.display_name().to_string(),
            body: body.to_string(),
        };

        let payload: Value = serde_json::from_str(body).map_err(|_| unparseable())?;

        if let Some(error) = payload.get("error").filter(|error| !error.is_null()) {
            return Err(self.vendor_error(error));
        }

        let message = payload["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .map(|choice| &choice["message"])
            .ok_or_else(unparseable)?;

        // 工具调用回复的 content 为 null
        let content = match message.get("content") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) => String::new(),
            _ => return Err(unparseable()),
        };
        self.inspect_message(message);
        Ok(content)
    }

    /// 解析一行 SSE 数据（已去掉 `data:` 前缀）
    ///
    /// 返回 `Ok(None)` 表示该 chunk 没有可输出的内容；错误由解码器记录并跳过。
    fn parse_stream_chunk(&self, data: &str) -> Result<Option<StreamEvent>> {
        let payload: Value = serde_json::from_str(data)
            .map_err(|e| BridgeError::ChunkDecode(format!("{}: {}", e, data)))?;

        if let Some(error) = payload.get("error").filter(|error| !error.is_null()) {
            let message = error["message"]
                .as_str()
                .or_else(|| error.as_str())
                .unwrap_or("Unknown error");
            debug!(provider = self.provider_name(), %message, "error chunk in stream");
            return Ok(Some(StreamEvent::error(message)));
        }

        let delta = payload["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .and_then(|choice| self.extract_delta(choice));

        Ok(delta
            .filter(|text| !text.is_empty())
            .map(StreamEvent::Delta))
    }
}
