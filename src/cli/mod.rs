use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::plugin::ProviderRegistry;
use crate::services::ServiceFactory;
use crate::utils::ConfigValidator;

#[derive(Clone, Debug, Serialize)]
pub struct ProviderEntry {
    pub name: String,
    pub priority: i32,
    pub description: String,
    pub models: Option<Vec<String>>,
}

/// 按优先级列出注册表中的提供商
pub fn provider_entries(registry: &ProviderRegistry) -> Vec<ProviderEntry> {
    registry
        .all_providers()
        .into_iter()
        .map(|provider| ProviderEntry {
            name: provider.provider_name().to_string(),
            priority: provider.priority(),
            description: provider.description().to_string(),
            models: provider.supported_models().map(<[String]>::to_vec),
        })
        .collect()
}

/// 读取配置文件并创建绑定全局注册表的工厂；校验问题只记录警告
pub fn load_factory(path: &Path) -> Result<ServiceFactory> {
    let config = BridgeConfig::from_path(path)?;
    for problem in ConfigValidator::validate_config(&config) {
        warn!(config = %path.display(), "{problem}");
    }
    Ok(ServiceFactory::from_config(config))
}
