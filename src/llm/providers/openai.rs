use serde_json::{json, Value};

use super::AdapterProvider;
use crate::llm::adapter::ChatAdapter;
use crate::plugin::ProviderDescriptor;

pub const PROVIDER_NAME: &str = "openai";

const SUPPORTED_MODELS: &[&str] = &[
    "gpt-4",
    "gpt-4-turbo",
    "gpt-4-turbo-preview",
    "gpt-4-1106-preview",
    "gpt-4-0125-preview",
    "gpt-4-vision-preview",
    "gpt-3.5-turbo",
    "gpt-3.5-turbo-16k",
    "gpt-3.5-turbo-1106",
    "gpt-3.5-turbo-0125",
    "gpt-4o",
    "gpt-4o-mini",
    "chatgpt-4o-latest",
    "o1-preview",
    "o1-mini",
];

/// OpenAI 及兼容接口
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenAiAdapter;

impl ChatAdapter for OpenAiAdapter {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn display_name(&self) -> &'static str {
        "OpenAI"
    }

    fn default_api_url(&self) -> &'static str {
        "https://api.openai.com/v1"
    }

    fn default_model(&self) -> &'static str {
        "gpt-3.5-turbo"
    }

    fn passthrough_parameters(&self) -> &'static [&'static str] {
        &[
            "temperature",
            "max_tokens",
            "top_p",
            "frequency_penalty",
            "presence_penalty",
            "stop",
            "n",
            "logit_bias",
            "user",
        ]
    }

    fn default_parameters(&self) -> Vec<(&'static str, Value)> {
        vec![("temperature", json!(0.7)), ("max_tokens", json!(2000))]
    }
}

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(PROVIDER_NAME)
        .with_priority(10)
        .with_description("OpenAI - GPT series large language models")
        .with_models(SUPPORTED_MODELS.iter().copied())
}

pub fn provider() -> AdapterProvider<OpenAiAdapter> {
    AdapterProvider::new(OpenAiAdapter, descriptor())
}
