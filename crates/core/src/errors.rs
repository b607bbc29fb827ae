use thiserror::Error;

/// Unified error type for the entire trade-journal-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input / Session ─────────────────────────────────────────────
    #[error("Operation validation failed: {0}")]
    ValidationError(String),

    #[error("Not signed in: {0}")]
    Unauthenticated(String),

    // ── Backend / Network ───────────────────────────────────────────
    #[error("Backend error ({table}): {message}")]
    Backend {
        table: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Operation not found: {0}")]
    OperationNotFound(String),

    #[error("Delete of {id} was blocked: {message}")]
    DeleteBlocked {
        id: String,
        message: String,
    },

    #[error("Malformed row: {0}")]
    MalformedRow(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    // ── Encoding / Config ───────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// `true` for the benign outcome of deleting a row that is already gone.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::OperationNotFound(_))
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; strip the query so filters and
        // tokens passed as parameters never end up in logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

impl From<url::ParseError> for CoreError {
    fn from(e: url::ParseError) -> Self {
        CoreError::Config(format!("Invalid backend URL: {e}"))
    }
}
