/// 工具模块 - 日志与配置校验
pub mod logging;
pub mod validation;

pub use logging::{mask_api_key, LoggingConfig};
pub use validation::ConfigValidator;
