use std::collections::HashMap;

use serde_json::{json, Map, Value};
use tracing::debug;

use super::AdapterProvider;
use crate::llm::adapter::ChatAdapter;
use crate::plugin::ProviderDescriptor;

pub const PROVIDER_NAME: &str = "doubao";

const SUPPORTED_MODELS: &[&str] = &[
    "doubao-seed-1.6",
    "doubao-seed-1.6-flash",
    "doubao-seed-1.6-thinking",
    "doubao-1.5-pro-32k",
    "doubao-1.5-pro-256k",
    "doubao-1.5-lite",
    "doubao-1.5-thinking-pro",
    "doubao-1.5-vision-pro",
    "doubao-1.5-vision-lite",
    "doubao-vision-pro",
    "doubao-vision-lite",
    "doubao-pro-32k",
    "doubao-pro-256k",
    "doubao-lite-4k",
    "doubao-lite-32k",
    "doubao-lite-128k",
];

/// 豆包（火山方舟）接口
///
/// 配置了 `endpoint_id`（接入点 ID）时用它替换模型名称。
#[derive(Clone, Copy, Debug, Default)]
pub struct DoubaoAdapter;

impl ChatAdapter for DoubaoAdapter {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn display_name(&self) -> &'static str {
        "Doubao"
    }

    fn default_api_url(&self) -> &'static str {
        "https://ark.cn-beijing.volces.com/api/v3"
    }

    fn default_model(&self) -> &'static str {
        "doubao-pro-32k"
    }

    fn passthrough_parameters(&self) -> &'static [&'static str] {
        &[
            "temperature",
            "max_tokens",
            "top_p",
            "frequency_penalty",
            "presence_penalty",
            "stop",
            "functions",
            "function_call",
            "tools",
            "tool_choice",
        ]
    }

    fn default_parameters(&self) -> Vec<(&'static str, Value)> {
        vec![("temperature", json!(0.7)), ("max_tokens", json!(4096))]
    }

    fn probe_prompt(&self) -> &'static str {
        "你好"
    }

    fn customize_request(&self, body: &mut Map<String, Value>, parameters: &HashMap<String, Value>) {
        if let Some(endpoint_id) = parameters.get("endpoint_id").filter(|v| !v.is_null()) {
            body.insert("model".into(), endpoint_id.clone());
        }
    }

    fn inspect_message(&self, message: &Value) {
        if let Some(function_call) = message.get("function_call") {
            debug!(provider = PROVIDER_NAME, %function_call, "function call");
        }
        if let Some(tool_calls) = message.get("tool_calls") {
            debug!(provider = PROVIDER_NAME, %tool_calls, "tool calls");
        }
    }

    fn extract_delta(&self, choice: &Value) -> Option<String> {
        let delta = &choice["delta"];
        if let Some(tool_calls) = delta.get("tool_calls") {
            debug!(provider = PROVIDER_NAME, %tool_calls, "streamed tool calls");
        }
        if let Some(function_call) = delta.get("function_call") {
            debug!(provider = PROVIDER_NAME, %function_call, "streamed function call");
        }
        delta["content"].as_str().map(str::to_string)
    }
}

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(PROVIDER_NAME)
        .with_priority(30)
        .with_description("Doubao - ByteDance models with long context and deep thinking")
        .with_models(SUPPORTED_MODELS.iter().copied())
}

pub fn provider() -> AdapterProvider<DoubaoAdapter> {
    AdapterProvider::new(DoubaoAdapter, descriptor())
}
