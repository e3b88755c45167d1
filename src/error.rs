use thiserror::Error;

/// Unified error taxonomy. Every failure surfaced by the CLI is exactly one
/// of these variants; `code()` is the stable identifier emitted in JSON mode.
#[derive(Error, Debug)]
pub enum HogError {
    #[error("{message}")]
    NoAccount { message: String },

    #[error("{message}")]
    NoProject { message: String },

    #[error("Invalid API key — use a personal API key (phx_...)")]
    Unauthorized,

    #[error("Access denied to this resource")]
    Forbidden,

    /// Raised both for HTTP 404 responses (with status) and for local
    /// lookups that come up empty (without).
    #[error("{message}")]
    NotFound {
        message: String,
        status: Option<u16>,
    },

    #[error("Rate limit exceeded (HogQL: 120/hr) — try again later")]
    RateLimited,

    #[error("PostHog server error: {status}")]
    Server { status: u16 },

    /// Raised for unclassified non-2xx responses (with status) and for
    /// local request validation (without).
    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    #[error("{message}")]
    Config { message: String },

    #[error("{message}")]
    Unknown { message: String },
}

impl HogError {
    pub fn config(message: impl Into<String>) -> Self {
        HogError::Config {
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        HogError::Unknown {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        HogError::NotFound {
            message: message.into(),
            status: None,
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        HogError::Api {
            message: message.into(),
            status: None,
        }
    }

    /// Stable wire code, used in JSON error output.
    pub fn code(&self) -> &'static str {
        match self {
            HogError::NoAccount { .. } => "NO_ACCOUNT",
            HogError::NoProject { .. } => "NO_PROJECT",
            HogError::Unauthorized => "UNAUTHORIZED",
            HogError::Forbidden => "FORBIDDEN",
            HogError::NotFound { .. } => "NOT_FOUND",
            HogError::RateLimited => "RATE_LIMITED",
            HogError::Server { .. } => "SERVER_ERROR",
            HogError::Api { .. } => "API_ERROR",
            HogError::Config { .. } => "CONFIG_ERROR",
            HogError::Unknown { .. } => "UNKNOWN_ERROR",
        }
    }

    /// HTTP status the error was classified from, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            HogError::Unauthorized => Some(401),
            HogError::Forbidden => Some(403),
            HogError::NotFound { status, .. } => *status,
            HogError::RateLimited => Some(429),
            HogError::Server { status } => Some(*status),
            HogError::Api { status, .. } => *status,
            _ => None,
        }
    }
}
