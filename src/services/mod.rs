pub mod chat_util;
pub mod service_factory;

pub use chat_util::ChatUtil;
pub use service_factory::ServiceFactory;
