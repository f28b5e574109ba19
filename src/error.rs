use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("unsupported provider `{name}`, available providers: {available:?}")]
    UnsupportedProvider { name: String, available: Vec<String> },
    #[error("transport error{}: {message}", format_status(.status))]
    Transport { status: Option<u16>, message: String },
    #[error("{provider} API error [{}]: {message}", format_error_kind(.error_type, .code.as_deref()))]
    VendorProtocol {
        provider: String,
        error_type: String,
        code: Option<String>,
        message: String,
    },
    #[error("unable to parse {provider} response: {body}")]
    UnparseableResponse { provider: String, body: String },
    #[error("failed to decode stream chunk: {0}")]
    ChunkDecode(String),
    #[error("{provider} API call failed: {source}")]
    Chat {
        provider: String,
        #[source]
        source: Box<BridgeError>,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

fn format_error_kind(error_type: &str, code: Option<&str>) -> String {
    match code {
        Some(code) if !code.is_empty() => format!("{error_type}:{code}"),
        _ => error_type.to_string(),
    }
}

impl BridgeError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        BridgeError::Transport {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn chat(provider: &str, source: BridgeError) -> Self {
        BridgeError::Chat {
            provider: provider.to_string(),
            source: Box::new(source),
        }
    }

    /// 剥离 `Chat` 包装后的底层错误
    pub fn root(&self) -> &BridgeError {
        match self {
            BridgeError::Chat { source, .. } => source.root(),
            other => other,
        }
    }
}
