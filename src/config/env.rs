use std::env;

/// 环境变量配置管理
pub struct EnvConfig;

impl EnvConfig {
    /// 是否为 `${VAR_NAME}` 形式的占位符
    pub fn is_placeholder(value: &str) -> bool {
        let value = value.trim();
        value.len() > 3 && value.starts_with("${") && value.ends_with('}')
    }

    /// 解析密钥
    ///
    /// - `${VAR_NAME}`：从环境变量读取
    /// - 其他值：原样返回
    pub fn resolve(value: &str) -> Result<String, String> {
        let trimmed = value.trim();
        if Self::is_placeholder(trimmed) {
            let var_name = &trimmed[2..trimmed.len() - 1];
            Self::get_env(var_name)
        } else {
            Ok(value.to_string())
        }
    }

    pub fn get_env(key: &str) -> Result<String, String> {
        env::var(key).map_err(|_| format!("environment variable `{}` is not set", key))
    }
}
