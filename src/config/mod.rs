pub mod env;

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BridgeError, Result};
use crate::plugin::normalize_name;

pub use env::EnvConfig;

/// 桥接层全局配置
///
/// 对应 JSON 配置文件：
///
/// ```json
/// {
///   "default_provider": "deepseek",
///   "timeout_ms": 30000,
///   "read_timeout_ms": 300000,
///   "providers": {
///     "deepseek": { "api_key": "${DEEPSEEK_API_KEY}", "default_model": "deepseek-chat" }
///   }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "BridgeConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "BridgeConfig::default_provider_name")]
    pub default_provider: String,
    /// 连接/写超时（毫秒）
    #[serde(default = "BridgeConfig::default_timeout_ms")]
    pub timeout_ms: u64,
    /// 读取/流式超时（毫秒）
    #[serde(default = "BridgeConfig::default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            default_provider: Self::default_provider_name(),
            timeout_ms: Self::default_timeout_ms(),
            read_timeout_ms: Self::default_read_timeout_ms(),
            providers: HashMap::new(),
        }
    }
}

impl BridgeConfig {
    fn default_enabled() -> bool {
        true
    }

    fn default_provider_name() -> String {
        "openai".to_string()
    }

    fn default_timeout_ms() -> u64 {
        30_000
    }

    fn default_read_timeout_ms() -> u64 {
        300_000
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_provider(mut self, name: impl Into<String>) -> Self {
        self.default_provider = name.into();
        self
    }

    pub fn with_timeouts(mut self, timeout_ms: u64, read_timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self.read_timeout_ms = read_timeout_ms;
        self
    }

    pub fn with_provider(mut self, name: impl Into<String>, config: ProviderConfig) -> Self {
        self.providers.insert(name.into(), config);
        self
    }

    /// 从 JSON 字符串加载配置，并解析 `${VAR}` 形式的密钥
    pub fn from_json_str(content: &str) -> Result<Self> {
        let mut config: BridgeConfig = serde_json::from_str(content)?;
        config.resolve_credentials()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BridgeError::Other(anyhow!("failed to read config `{}`: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    fn resolve_credentials(&mut self) -> Result<()> {
        for (name, provider) in self.providers.iter_mut() {
            if EnvConfig::is_placeholder(&provider.api_key) {
                provider.api_key = EnvConfig::resolve(&provider.api_key).map_err(|e| {
                    BridgeError::Configuration(format!("provider `{}`: {}", name, e))
                })?;
            }
        }
        Ok(())
    }

    /// 查找提供商配置：先精确匹配，再去空白并忽略大小写匹配
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name).or_else(|| {
            let wanted = normalize_name(name);
            self.providers
                .iter()
                .find(|(key, _)| normalize_name(key) == wanted)
                .map(|(_, config)| config)
        })
    }

    pub fn is_provider_configured(&self, name: &str) -> bool {
        self.provider(name)
            .map(|config| config.has_credential())
            .unwrap_or(false)
    }

    pub fn configured_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts::from_millis(self.timeout_ms, self.read_timeout_ms)
    }
}

/// 单个提供商的配置
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, Value>,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// 配置的 URL，空白视为未配置
    pub fn api_url(&self) -> Option<&str> {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn model(&self) -> Option<&str> {
        self.default_model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
    }
}

/// 每个服务实例固定的两个超时
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Timeouts {
    pub fn from_millis(connect_ms: u64, read_ms: u64) -> Self {
        Self {
            connect: Duration::from_millis(connect_ms),
            read: Duration::from_millis(read_ms),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from_millis(
            BridgeConfig::default_timeout_ms(),
            BridgeConfig::default_read_timeout_ms(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply_when_fields_missing() {
        let config = BridgeConfig::from_json_str("{}").unwrap();
        assert!(config.enabled);
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.timeouts(), Timeouts::from_millis(30_000, 300_000));
        assert!(config.providers.is_empty());
    }

    #[test]
    fn provider_lookup_falls_back_to_case_insensitive() {
        let config = BridgeConfig::new().with_provider("DeepSeek", ProviderConfig::new("sk-1"));
        assert!(config.provider("DeepSeek").is_some());
        assert!(config.provider("deepseek").is_some());
        assert!(config.provider("openai").is_none());
    }

    #[test]
    fn blank_credential_is_not_configured() {
        let config = BridgeConfig::new()
            .with_provider("openai", ProviderConfig::new("   "))
            .with_provider("deepseek", ProviderConfig::new("sk-2"));
        assert!(!config.is_provider_configured("openai"));
        assert!(config.is_provider_configured("deepseek"));
        assert!(!config.is_provider_configured("doubao"));
        assert_eq!(config.configured_providers(), vec!["deepseek", "openai"]);
    }

    #[test]
    fn parses_parameters_bag() {
        let raw = json!({
            "default_provider": "doubao",
            "providers": {
                "doubao": {
                    "api_key": "key",
                    "api_url": "  ",
                    "parameters": { "temperature": 0.3, "endpoint_id": "ep-1" }
                }
            }
        });
        let config = BridgeConfig::from_json_str(&raw.to_string()).unwrap();
        let doubao = config.provider("doubao").unwrap();
        assert_eq!(doubao.parameters["endpoint_id"], json!("ep-1"));
        assert_eq!(doubao.api_url(), None);
        assert_eq!(doubao.model(), None);
    }

    #[test]
    fn resolves_env_placeholder_credentials() {
        std::env::set_var("LLMBRIDGE_TEST_CONFIG_KEY", "resolved-key");
        let raw = json!({
            "providers": { "openai": { "api_key": "${LLMBRIDGE_TEST_CONFIG_KEY}" } }
        });
        let config = BridgeConfig::from_json_str(&raw.to_string()).unwrap();
        assert_eq!(config.provider("openai").unwrap().api_key, "resolved-key");
        std::env::remove_var("LLMBRIDGE_TEST_CONFIG_KEY");
    }

    #[test]
    fn missing_env_placeholder_is_configuration_error() {
        let raw = json!({
            "providers": { "openai": { "api_key": "${LLMBRIDGE_TEST_MISSING_KEY}" } }
        });
        let err = BridgeConfig::from_json_str(&raw.to_string()).unwrap_err();
        assert!(matches!(err, BridgeError::Configuration(_)));
    }
}
