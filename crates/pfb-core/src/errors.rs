/// Core error type for the bot.
///
/// Outbound Bot API calls do not use this type: they report failures as data
/// (`ApiResponse { ok: false, .. }`). Everything else maps into `Error` so the
/// handlers can decide between a user-facing message and propagating the fault.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed navigation token {token:?}: {reason}")]
    MalformedToken { token: String, reason: String },

    #[error("invalid session record: {0}")]
    InvalidRecord(String),

    #[error("session cache error: {0}")]
    Cache(String),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn malformed(token: &str, reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
