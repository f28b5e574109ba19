//! 提供商插件机制
//!
//! 任何实现 `ServiceProvider` 的组件，只要注册进 `ProviderRegistry`
//! （或通过 `register_plugin` 进入全局插件列表），即可按名称被工厂选用，
//! 无需修改注册表或工厂。

pub mod registry;

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::{ProviderConfig, Timeouts};
use crate::error::Result;
use crate::llm::DynChatService;

pub use registry::{ProviderDiscovery, ProviderRegistry};

pub const DEFAULT_PRIORITY: i32 = 100;

/// 提供商元数据
///
/// `priority` 越小越优先；`supported_models` 为 `None` 表示不限制模型。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub priority: i32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_models: Option<Vec<String>>,
}

impl ProviderDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: format!("AI Service Provider: {}", name),
            name,
            priority: DEFAULT_PRIORITY,
            supported_models: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_models = Some(models.into_iter().map(Into::into).collect());
        self
    }

    /// 注册表键：去空白后的小写名称
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn matches(&self, name: &str) -> bool {
        let wanted = normalize_name(name);
        !wanted.is_empty() && self.key() == wanted
    }
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// 提供商插件契约
pub trait ServiceProvider: Send + Sync {
    fn descriptor(&self) -> &ProviderDescriptor;

    /// 纯构造；不校验密钥是否存在，那是工厂的职责
    fn create_service(&self, config: &ProviderConfig, timeouts: Timeouts) -> Result<DynChatService>;

    fn provider_name(&self) -> &str {
        &self.descriptor().name
    }

    fn supports(&self, name: &str) -> bool {
        self.descriptor().matches(name)
    }

    fn priority(&self) -> i32 {
        self.descriptor().priority
    }

    fn description(&self) -> &str {
        &self.descriptor().description
    }

    fn supported_models(&self) -> Option<&[String]> {
        self.descriptor().supported_models.as_deref()
    }
}

pub type DynServiceProvider = Arc<dyn ServiceProvider>;

static PLUGINS: Lazy<RwLock<Vec<DynServiceProvider>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// 向进程级插件列表注册提供商
///
/// 全局注册表在下一次发现（首次使用或 `reload`）时才会看到新插件。
pub fn register_plugin(provider: DynServiceProvider) {
    tracing::debug!(plugin = provider.provider_name(), "provider plugin registered");
    PLUGINS.write().push(provider);
}

pub fn registered_plugins() -> Vec<DynServiceProvider> {
    PLUGINS.read().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_defaults() {
        let descriptor = ProviderDescriptor::new("Custom");
        assert_eq!(descriptor.priority, 100);
        assert_eq!(descriptor.description, "AI Service Provider: Custom");
        assert!(descriptor.supported_models.is_none());
        assert_eq!(descriptor.key(), "custom");
    }

    #[test]
    fn descriptor_matches_case_insensitively() {
        let descriptor = ProviderDescriptor::new("OpenAI");
        assert!(descriptor.matches("openai"));
        assert!(descriptor.matches("OPENAI"));
        assert!(!descriptor.matches(""));
        assert!(!descriptor.matches("deepseek"));
    }

    #[test]
    fn matching_agrees_with_registry_key_for_non_ascii_names() {
        let descriptor = ProviderDescriptor::new("Ärger");
        assert_eq!(descriptor.key(), "ärger");
        assert!(descriptor.matches("ÄRGER"));
        assert!(descriptor.matches(" ärger "));
    }
}
