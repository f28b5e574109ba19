//! 内置厂商适配器
//!
//! | 提供商 | 优先级 | 默认地址 | 默认模型 |
//! |---|---|---|---|
//! | openai | 10 | `https://api.openai.com/v1` | `gpt-3.5-turbo` |
//! | deepseek | 20 | `https://api.deepseek.com` | `deepseek-chat` |
//! | doubao | 30 | `https://ark.cn-beijing.volces.com/api/v3` | `doubao-pro-32k` |
//! | siliconflow | 50 | `https://api.siliconflow.cn/v1` | `Qwen/Qwen2.5-7B-Instruct` |

pub mod deepseek;
pub mod doubao;
pub mod openai;
pub mod siliconflow;

use std::sync::Arc;

use crate::config::{ProviderConfig, Timeouts};
use crate::error::Result;
use crate::llm::adapter::ChatAdapter;
use crate::llm::http::HttpChatService;
use crate::llm::DynChatService;
use crate::plugin::{DynServiceProvider, ProviderDescriptor, ServiceProvider};

pub use deepseek::DeepSeekAdapter;
pub use doubao::DoubaoAdapter;
pub use openai::OpenAiAdapter;
pub use siliconflow::SiliconFlowAdapter;

/// 把厂商适配器包装为插件：描述信息 + 基于 reqwest 的服务构造
pub struct AdapterProvider<A> {
    descriptor: ProviderDescriptor,
    adapter: A,
}

impl<A: ChatAdapter + Clone> AdapterProvider<A> {
    pub fn new(adapter: A, descriptor: ProviderDescriptor) -> Self {
        Self {
            descriptor,
            adapter,
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }
}

impl<A: ChatAdapter + Clone> ServiceProvider for AdapterProvider<A> {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn create_service(&self, config: &ProviderConfig, timeouts: Timeouts) -> Result<DynChatService> {
        let service = HttpChatService::new(self.adapter.clone(), config, timeouts)?;
        Ok(Arc::new(service))
    }
}

/// 内置提供商，顺序即发现顺序
pub fn builtin_providers() -> Vec<DynServiceProvider> {
    vec![
        Arc::new(openai::provider()),
        Arc::new(deepseek::provider()),
        Arc::new(doubao::provider()),
        Arc::new(siliconflow::provider()),
    ]
}
