use serde_json::{json, Value};

use super::AdapterProvider;
use crate::llm::adapter::ChatAdapter;
use crate::plugin::ProviderDescriptor;

pub const PROVIDER_NAME: &str = "siliconflow";

const SUPPORTED_MODELS: &[&str] = &[
    "deepseek-ai/DeepSeek-V2.5",
    "deepseek-ai/DeepSeek-Coder-V2-Instruct",
    "deepseek-ai/DeepSeek-R1",
    "deepseek-ai/DeepSeek-V3",
    "Qwen/Qwen2.5-72B-Instruct",
    "Qwen/Qwen2.5-7B-Instruct",
    "Qwen/Qwen2-VL-7B-Instruct",
    "THUDM/glm-4-9b-chat",
    "internlm/internlm2_5-20b-chat",
    "meta-llama/Meta-Llama-3.1-8B-Instruct",
    "meta-llama/Meta-Llama-3.1-70B-Instruct",
];

/// 硅基流动，托管多种开源模型
#[derive(Clone, Copy, Debug, Default)]
pub struct SiliconFlowAdapter;

impl ChatAdapter for SiliconFlowAdapter {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn display_name(&self) -> &'static str {
        "SiliconFlow"
    }

    fn default_api_url(&self) -> &'static str {
        "https://api.siliconflow.cn/v1"
    }

    fn default_model(&self) -> &'static str {
        "Qwen/Qwen2.5-7B-Instruct"
    }

    fn passthrough_parameters(&self) -> &'static [&'static str] {
        &[
            "temperature",
            "max_tokens",
            "top_p",
            "top_k",
            "frequency_penalty",
            "presence_penalty",
            "stop",
        ]
    }

    fn default_parameters(&self) -> Vec<(&'static str, Value)> {
        vec![("temperature", json!(0.7)), ("max_tokens", json!(2000))]
    }
}

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(PROVIDER_NAME)
        .with_priority(50)
        .with_description("SiliconFlow - cloud platform for open-source LLMs")
        .with_models(SUPPORTED_MODELS.iter().copied())
}

pub fn provider() -> AdapterProvider<SiliconFlowAdapter> {
    AdapterProvider::new(SiliconFlowAdapter, descriptor())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    #[test]
    fn top_k_is_forwarded() {
        let config = ProviderConfig::new("key").with_parameter("top_k", json!(40));
        let body = SiliconFlowAdapter.build_request_body(&config, &[], true);
        assert_eq!(body["top_k"], json!(40));
        assert_eq!(body["model"], "Qwen/Qwen2.5-7B-Instruct");
    }
}
