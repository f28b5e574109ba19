use serde_json::{json, Value};
use tracing::debug;

use super::AdapterProvider;
use crate::llm::adapter::ChatAdapter;
use crate::plugin::ProviderDescriptor;

pub const PROVIDER_NAME: &str = "deepseek";

const SUPPORTED_MODELS: &[&str] = &[
    "deepseek-chat",
    "deepseek-reasoner",
    "deepseek-v3",
    "deepseek-v3-0324",
    "deepseek-v2.5",
    "deepseek-v2.5-1210",
    "deepseek-r1",
    "deepseek-r1-lite",
    "deepseek-coder",
    "deepseek-coder-v2-instruct",
    "deepseek-coder-v2-lite-instruct",
    "deepseek-math",
];

/// DeepSeek 接口，兼容 OpenAI 格式
///
/// `deepseek-reasoner` 返回的 `reasoning_content` 只记录到 debug 日志，不进入结果。
#[derive(Clone, Copy, Debug, Default)]
pub struct DeepSeekAdapter;

impl ChatAdapter for DeepSeekAdapter {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn display_name(&self) -> &'static str {
        "DeepSeek"
    }

    fn default_api_url(&self) -> &'static str {
        "https://api.deepseek.com"
    }

    fn default_model(&self) -> &'static str {
        "deepseek-chat"
    }

    fn passthrough_parameters(&self) -> &'static [&'static str] {
        &[
            "temperature",
            "max_tokens",
            "top_p",
            "frequency_penalty",
            "presence_penalty",
            "stop",
            "logprobs",
            "top_logprobs",
            "response_format",
        ]
    }

    fn default_parameters(&self) -> Vec<(&'static str, Value)> {
        vec![("temperature", json!(1.0)), ("max_tokens", json!(4096))]
    }

    fn inspect_message(&self, message: &Value) {
        if let Some(reasoning) = message["reasoning_content"]
            .as_str()
            .filter(|text| !text.trim().is_empty())
        {
            debug!(provider = PROVIDER_NAME, reasoning, "reasoning content");
        }
    }

    fn extract_delta(&self, choice: &Value) -> Option<String> {
        let delta = &choice["delta"];
        if let Some(reasoning) = delta["reasoning_content"]
            .as_str()
            .filter(|text| !text.is_empty())
        {
            debug!(provider = PROVIDER_NAME, reasoning, "reasoning stream");
        }
        delta["content"].as_str().map(str::to_string)
    }
}

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(PROVIDER_NAME)
        .with_priority(20)
        .with_description("DeepSeek - reasoning and code generation models")
        .with_models(SUPPORTED_MODELS.iter().copied())
}

pub fn provider() -> AdapterProvider<DeepSeekAdapter> {
    AdapterProvider::new(DeepSeekAdapter, descriptor())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::llm::StreamEvent;

    #[test]
    fn request_passes_deepseek_specific_keys() {
        let config = ProviderConfig::new("sk")
            .with_parameter("response_format", json!({ "type": "json_object" }))
            .with_parameter("top_k", json!(5));
        let body = DeepSeekAdapter.build_request_body(&config, &[], false);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert!(body.get("top_k").is_none());
        assert_eq!(body["temperature"], json!(1.0));
        assert_eq!(body["max_tokens"], json!(4096));
    }

    #[test]
    fn reasoning_is_not_part_of_result() {
        let body = r#"{"choices":[{"message":{"content":"42","reasoning_content":"think"}}]}"#;
        assert_eq!(DeepSeekAdapter.parse_response(body).unwrap(), "42");

        let chunk = r#"{"choices":[{"delta":{"reasoning_content":"hmm","content":null}}]}"#;
        assert_eq!(DeepSeekAdapter.parse_stream_chunk(chunk).unwrap(), None);

        let chunk = r#"{"choices":[{"delta":{"content":"4"}}]}"#;
        assert_eq!(
            DeepSeekAdapter.parse_stream_chunk(chunk).unwrap(),
            Some(StreamEvent::Delta("4".into()))
        );
    }
}
