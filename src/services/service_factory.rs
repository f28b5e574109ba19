use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::llm::DynChatService;
use crate::plugin::{normalize_name, ProviderRegistry};

/// 对话服务工厂
///
/// 按提供商名称懒加载并缓存服务实例：
/// - 配置：从绑定的 `BridgeConfig` 中查找，缺失或密钥为空时返回配置错误
/// - 构造：委托注册表中匹配的提供商，找不到时返回不支持的提供商错误
/// - 缓存：同一名称在工厂生命周期内只构造一次，`clear_cache` 后重新构造
///
/// 映射锁只在取出或插入单元格时持有，构造在单元格上等待，
/// 某个提供商构造缓慢不会阻塞其他提供商的缓存命中。
pub struct ServiceFactory {
    config: BridgeConfig,
    registry: Arc<ProviderRegistry>,
    cache: RwLock<HashMap<String, Arc<ServiceCell>>>,
}

type ServiceCell = OnceCell<DynChatService>;

impl ServiceFactory {
    pub fn new(config: BridgeConfig, registry: Arc<ProviderRegistry>) -> Self {
        Self {
            config,
            registry,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// 使用进程级注册表
    pub fn from_config(config: BridgeConfig) -> Self {
        Self::new(config, ProviderRegistry::global())
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn get_service(&self, provider_name: &str) -> Result<DynChatService> {
        let key = normalize_name(provider_name);
        let cell = self.cell(&key);
        cell.get_or_try_init(|| self.create_service(provider_name.trim()))
            .map(Arc::clone)
    }

    fn cell(&self, key: &str) -> Arc<ServiceCell> {
        if let Some(cell) = self.cache.read().get(key) {
            return Arc::clone(cell);
        }
        Arc::clone(self.cache.write().entry(key.to_string()).or_default())
    }

    pub fn get_default_service(&self) -> Result<DynChatService> {
        self.get_service(&self.config.default_provider)
    }

    fn create_service(&self, provider_name: &str) -> Result<DynChatService> {
        if !self.config.enabled {
            return Err(BridgeError::Configuration("AI services are disabled".into()));
        }
        let provider_config = self.config.provider(provider_name).ok_or_else(|| {
            BridgeError::Configuration(format!(
                "AI provider configuration not found: {provider_name}"
            ))
        })?;
        if !provider_config.has_credential() {
            return Err(BridgeError::Configuration(format!(
                "API key for provider `{provider_name}` must not be empty"
            )));
        }

        let provider = self.registry.get_provider(provider_name).ok_or_else(|| {
            BridgeError::UnsupportedProvider {
                name: provider_name.to_string(),
                available: self.registry.available_providers(),
            }
        })?;

        info!(
            provider = provider.provider_name(),
            priority = provider.priority(),
            "creating AI service"
        );
        provider.create_service(provider_config, self.config.timeouts())
    }

    pub fn is_provider_configured(&self, provider_name: &str) -> bool {
        self.config.is_provider_configured(provider_name)
    }

    pub fn configured_providers(&self) -> Vec<String> {
        self.config.configured_providers()
    }

    pub fn available_providers(&self) -> Vec<String> {
        self.registry.available_providers()
    }

    /// 未声明模型列表或提供商不存在时返回 `None`
    pub fn supported_models(&self, provider_name: &str) -> Option<Vec<String>> {
        self.registry
            .get_provider(provider_name)
            .and_then(|provider| provider.supported_models().map(<[String]>::to_vec))
    }

    pub fn cached_providers(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .cache
            .read()
            .iter()
            .filter(|(_, cell)| cell.get().is_some())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn clear_cache(&self) {
        self.cache.write().clear();
        info!("AI service cache cleared");
    }

    pub fn clear_cache_for(&self, provider_name: &str) {
        let evicted = self.cache.write().remove(&normalize_name(provider_name));
        if evicted.is_some_and(|cell| cell.get().is_some()) {
            debug!(provider = provider_name, "AI service evicted from cache");
        }
    }

    /// 重新发现提供商，并清空实例缓存
    pub fn reload_providers(&self) {
        self.registry.reload();
        self.clear_cache();
    }
}
