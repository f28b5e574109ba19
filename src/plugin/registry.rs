use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{info, warn};

use super::{normalize_name, registered_plugins, DynServiceProvider};
use crate::llm::providers::builtin_providers;

/// 发现函数：返回当前可用的全部提供商
pub type ProviderDiscovery = Arc<dyn Fn() -> Vec<DynServiceProvider> + Send + Sync>;

static GLOBAL_REGISTRY: Lazy<Arc<ProviderRegistry>> = Lazy::new(|| {
    Arc::new(ProviderRegistry::new(Arc::new(|| {
        let mut providers = builtin_providers();
        providers.extend(registered_plugins());
        providers
    })))
});

#[derive(Default)]
struct Catalog {
    ordered: Vec<DynServiceProvider>,
    by_name: HashMap<String, DynServiceProvider>,
}

impl Catalog {
    fn build(mut providers: Vec<DynServiceProvider>) -> Self {
        // 稳定排序：同优先级保持发现顺序
        providers.sort_by_key(|provider| provider.priority());

        let mut catalog = Catalog::default();
        for provider in providers {
            let key = normalize_name(provider.provider_name());
            if key.is_empty() {
                warn!(
                    description = provider.description(),
                    "skipping provider with empty name"
                );
                continue;
            }
            if let Some(existing) = catalog.by_name.get(&key) {
                warn!(
                    provider = %key,
                    kept_priority = existing.priority(),
                    dropped_priority = provider.priority(),
                    "duplicate provider name, keeping the preferred registration"
                );
                continue;
            }
            info!(
                provider = provider.provider_name(),
                priority = provider.priority(),
                "provider registered"
            );
            catalog.by_name.insert(key, Arc::clone(&provider));
            catalog.ordered.push(provider);
        }
        catalog
    }
}

/// 提供商注册表
///
/// 首次使用时执行一次发现，按优先级升序登记；`reload` 在写锁内整体替换目录，
/// 读者只会看到完整的旧目录或完整的新目录。
pub struct ProviderRegistry {
    discovery: ProviderDiscovery,
    catalog: RwLock<Option<Arc<Catalog>>>,
}

impl ProviderRegistry {
    /// 发现函数在注册表锁内执行，不能回调同一个注册表
    pub fn new(discovery: ProviderDiscovery) -> Self {
        Self {
            discovery,
            catalog: RwLock::new(None),
        }
    }

    /// 固定提供商集合，常用于测试
    pub fn from_providers(providers: Vec<DynServiceProvider>) -> Self {
        Self::new(Arc::new(move || providers.clone()))
    }

    /// 内置提供商，再加上额外插件
    pub fn with_builtins(extra: Vec<DynServiceProvider>) -> Self {
        Self::new(Arc::new(move || {
            let mut providers = builtin_providers();
            providers.extend(extra.iter().cloned());
            providers
        }))
    }

    /// 进程级注册表：内置提供商 + `register_plugin` 注册的插件
    pub fn global() -> Arc<ProviderRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog.read().is_some()
    }

    fn catalog(&self) -> Arc<Catalog> {
        if let Some(catalog) = self.catalog.read().as_ref() {
            return Arc::clone(catalog);
        }

        let mut guard = self.catalog.write();
        if let Some(catalog) = guard.as_ref() {
            return Arc::clone(catalog);
        }
        let catalog = Arc::new(self.discover());
        *guard = Some(Arc::clone(&catalog));
        catalog
    }

    fn discover(&self) -> Catalog {
        info!("discovering AI service providers");
        let catalog = Catalog::build((self.discovery)());
        info!(
            count = catalog.ordered.len(),
            providers = ?catalog.ordered.iter().map(|p| p.provider_name()).collect::<Vec<_>>(),
            "provider discovery finished"
        );
        catalog
    }

    /// 忽略大小写查找；空名称返回 `None`
    pub fn get_provider(&self, name: &str) -> Option<DynServiceProvider> {
        let key = normalize_name(name);
        if key.is_empty() {
            return None;
        }
        self.catalog().by_name.get(&key).cloned()
    }

    pub fn is_provider_available(&self, name: &str) -> bool {
        self.get_provider(name).is_some()
    }

    /// 按优先级排列的提供商名称（小写）
    pub fn available_providers(&self) -> Vec<String> {
        self.catalog()
            .ordered
            .iter()
            .map(|provider| normalize_name(provider.provider_name()))
            .collect()
    }

    /// 按优先级排列的全部提供商
    pub fn all_providers(&self) -> Vec<DynServiceProvider> {
        self.catalog().ordered.clone()
    }

    pub fn providers_summary(&self) -> String {
        let catalog = self.catalog();
        if catalog.ordered.is_empty() {
            return "no AI service providers found".to_string();
        }
        catalog
            .ordered
            .iter()
            .map(|provider| {
                format!(
                    "- {} (priority: {}): {}",
                    provider.provider_name(),
                    provider.priority(),
                    provider.description()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 清空目录并重新发现
    pub fn reload(&self) {
        let mut guard = self.catalog.write();
        info!("reloading AI service providers");
        *guard = Some(Arc::new(self.discover()));
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_builtins(Vec::new())
    }
}
