use std::env;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEBUG_ENV: &str = "LLMBRIDGE_DEBUG";

/// 日志配置
pub struct LoggingConfig;

impl LoggingConfig {
    /// 安装全局 tracing 订阅者
    ///
    /// `RUST_LOG` 优先；未设置时使用 [`default_directives`] 的结果。
    /// `LLMBRIDGE_DEBUG` 额外打开目标、源码位置和线程编号。
    /// 已有订阅者时静默返回。
    pub fn init() {
        let verbose = Self::is_debug();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

        let layer = fmt::layer()
            .with_target(verbose)
            .with_file(verbose)
            .with_line_number(verbose)
            .with_thread_ids(verbose);

        if tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
            .is_ok()
        {
            tracing::debug!(verbose, "logging initialized");
        }
    }

    pub fn is_debug() -> bool {
        env::var(DEBUG_ENV).is_ok()
    }
}

/// 未设置 `RUST_LOG` 时的过滤指令
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "llmbridge=debug,info"
    } else {
        "llmbridge=info,warn"
    }
}

/// 日志中展示密钥时只保留首尾各 4 个字符
pub fn mask_api_key(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}****{tail}")
}
