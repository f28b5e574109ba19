use tracing::warn;

use crate::config::{BridgeConfig, ProviderConfig};
use crate::error::{BridgeError, Result};

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 验证 API Key 格式
    pub fn validate_api_key(api_key: &str) -> Result<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(BridgeError::Configuration("API Key 不能为空".into()));
        }

        if api_key.starts_with("your_") || api_key.starts_with("sk-") && api_key.len() < 20 {
            return Err(BridgeError::Configuration(
                "API Key 看起来是占位符，请提供真实的 API Key".into(),
            ));
        }

        Ok(())
    }

    /// 验证 URL 格式
    pub fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(BridgeError::Configuration("URL 不能为空".into()));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(BridgeError::Configuration(format!(
                "URL 必须以 http:// 或 https:// 开头: {url}"
            )));
        }

        Ok(())
    }

    /// 验证温度参数
    pub fn validate_temperature(temperature: f64) -> Result<()> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(BridgeError::Configuration(format!(
                "温度参数必须在 0.0 到 2.0 之间，当前值: {temperature}"
            )));
        }
        Ok(())
    }

    /// 验证单个提供商配置
    pub fn validate_provider(name: &str, config: &ProviderConfig) -> Result<()> {
        let scoped = |err| scope_error(name, err);
        Self::validate_api_key(&config.api_key).map_err(scoped)?;
        if let Some(url) = config.api_url() {
            Self::validate_url(url).map_err(scoped)?;
        }
        if let Some(temperature) = config.parameters.get("temperature").and_then(|v| v.as_f64()) {
            Self::validate_temperature(temperature).map_err(scoped)?;
        }
        Ok(())
    }

    /// 验证整体配置，返回全部问题
    pub fn validate_config(config: &BridgeConfig) -> Vec<BridgeError> {
        let mut problems = Vec::new();
        if config.timeout_ms == 0 || config.read_timeout_ms == 0 {
            problems.push(BridgeError::Configuration("超时时间必须大于 0".into()));
        }
        if !config.is_provider_configured(&config.default_provider) {
            warn!(
                provider = %config.default_provider,
                "默认提供商没有对应的配置"
            );
        }
        let mut names: Vec<_> = config.providers.keys().collect();
        names.sort();
        for name in names {
            if let Err(err) = Self::validate_provider(name, &config.providers[name]) {
                problems.push(err);
            }
        }
        problems
    }
}

fn scope_error(name: &str, err: BridgeError) -> BridgeError {
    match err {
        BridgeError::Configuration(message) => {
            BridgeError::Configuration(format!("provider `{name}`: {message}"))
        }
        other => other,
    }
}
