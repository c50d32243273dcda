//! Error types for the codecrew domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all codecrew operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Progress tracker errors ---
    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether this failure is worth retrying with backoff.
    ///
    /// Rate limits, timeouts, network blips, interrupted streams, and
    /// server-side 5xx responses are transient. Authentication and
    /// malformed-request failures never resolve by retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. }
            | ProviderError::Timeout(_)
            | ProviderError::Network(_)
            | ProviderError::StreamInterrupted(_) => true,
            ProviderError::ApiError { status_code, .. } => *status_code >= 500,
            ProviderError::AuthenticationFailed(_)
            | ProviderError::ModelNotFound(_)
            | ProviderError::NotConfigured(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Permission denied: {tool_name} — {reason}")]
    PermissionDenied { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Summarization failed: {0}")]
    Summarization(String),
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt progress record: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn transient_classification() {
        assert!(ProviderError::RateLimited {
            retry_after_secs: 5
        }
        .is_transient());
        assert!(ProviderError::Timeout("120s".into()).is_transient());
        assert!(ProviderError::Network("conn reset".into()).is_transient());
        assert!(ProviderError::ApiError {
            status_code: 503,
            message: "overloaded".into()
        }
        .is_transient());

        assert!(!ProviderError::AuthenticationFailed("bad key".into()).is_transient());
        assert!(!ProviderError::ModelNotFound("gpt-99".into()).is_transient());
        assert!(!ProviderError::ApiError {
            status_code: 400,
            message: "malformed request".into()
        }
        .is_transient());
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::PermissionDenied {
            tool_name: "write_file".into(),
            reason: "operator denied".into(),
        });
        assert!(err.to_string().contains("write_file"));
        assert!(err.to_string().contains("denied"));
    }
}
