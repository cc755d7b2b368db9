//! Error types for the CIMR core library.
//!
//! Every fallible operation in the crate returns [`CimrResult`]. The chat
//! session never surfaces these to the transcript: it collapses them into a
//! single fallback message and logs the cause.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E2001-E2099 | Config | Environment, config file, and validation errors |
//! | E3001-E3099 | Registry | Team, sub-team, agent and module lookup errors |
//! | E4001-E4099 | Session | Chat session state errors |
//! | E5001-E5099 | Backend | HTTP transport, status and response errors |
//! | E9001-E9099 | General | Internal, IO and serialization errors |

use thiserror::Error;

/// The main error type for the CIMR core library.
#[derive(Debug, Error)]
pub enum CimrError {
    // ========================================================================
    // Configuration Errors (E2001-E2099)
    // ========================================================================
    /// Configuration file parse error
    #[error("[E2001] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// Invalid configuration value
    #[error("[E2002] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    // ========================================================================
    // Registry Errors (E3001-E3099)
    // ========================================================================
    /// Team id not present in the registry
    #[error("[E3001] Team not found: {0}")]
    TeamNotFound(String),

    /// Sub-team id not present in the given team
    #[error("[E3002] Sub-team '{sub_team}' not found in team '{team}'")]
    SubTeamNotFound { team: String, sub_team: String },

    /// Agent id not present in the registry
    #[error("[E3003] Agent not found: {0}")]
    AgentNotFound(String),

    /// Team has no backend module mapped to it
    #[error("[E3004] Unknown module: {0}")]
    UnknownModule(String),

    /// Registry holds no agents at all
    #[error("[E3005] Registry contains no agents")]
    EmptyRegistry,

    // ========================================================================
    // Session Errors (E4001-E4099)
    // ========================================================================
    /// A request is already outstanding for this session
    #[error("[E4001] A response is still pending for agent '{0}'")]
    RequestInFlight(String),

    /// Submission was empty after trimming
    #[error("[E4002] Message is empty")]
    EmptyMessage,

    // ========================================================================
    // Backend Errors (E5001-E5099)
    // ========================================================================
    /// Transport-level failure (connect, DNS, TLS, reset)
    #[error("[E5001] Backend unreachable: {0}")]
    BackendUnavailable(String),

    /// Backend answered with a non-2xx status
    #[error("[E5002] Backend returned HTTP {status}: {body}")]
    BackendStatus { status: u16, body: String },

    /// Response body could not be decoded
    #[error("[E5003] Failed to parse backend response: {0}")]
    ResponseParseError(String),

    /// Request exceeded the configured timeout
    #[error("[E5004] Backend request timed out")]
    BackendTimeout,

    /// Backend URL could not be built
    #[error("[E5005] Invalid backend URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Backend answered but reported the query as unsuccessful
    #[error("[E5006] Query failed: {0}")]
    QueryFailed(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error (catch-all for unexpected conditions)
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("[E9002] IO error: {0}")]
    IoError(String),

    /// Serialization/deserialization error
    #[error("[E9003] Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for CIMR operations.
pub type CimrResult<T> = Result<T, CimrError>;

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<reqwest::Error> for CimrError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CimrError::BackendTimeout
        } else if err.is_status() {
            CimrError::BackendStatus {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                body: err.to_string(),
            }
        } else if err.is_decode() {
            CimrError::ResponseParseError(err.to_string())
        } else {
            CimrError::BackendUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CimrError {
    fn from(err: serde_json::Error) -> Self {
        CimrError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for CimrError {
    fn from(err: std::io::Error) -> Self {
        CimrError::IoError(err.to_string())
    }
}

impl From<config::ConfigError> for CimrError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => CimrError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => CimrError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => CimrError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => CimrError::ConfigParseError(err.to_string()),
        }
    }
}

impl From<crate::config::ConfigLoadError> for CimrError {
    fn from(err: crate::config::ConfigLoadError) -> Self {
        match err {
            crate::config::ConfigLoadError::Config(e) => e.into(),
            crate::config::ConfigLoadError::InvalidValue { key, message } => {
                CimrError::InvalidConfigValue { key, message }
            }
            crate::config::ConfigLoadError::MissingRequired(key) => {
                CimrError::InvalidConfigValue {
                    key,
                    message: "Missing required value".to_string(),
                }
            }
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl CimrError {
    /// Returns true if this error came from talking to the backend.
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self,
            CimrError::BackendUnavailable(_)
                | CimrError::BackendStatus { .. }
                | CimrError::ResponseParseError(_)
                | CimrError::BackendTimeout
                | CimrError::InvalidUrl { .. }
                | CimrError::QueryFailed(_)
        )
    }

    /// Returns true if this error is about registry lookups.
    pub fn is_registry_error(&self) -> bool {
        matches!(
            self,
            CimrError::TeamNotFound(_)
                | CimrError::SubTeamNotFound { .. }
                | CimrError::AgentNotFound(_)
                | CimrError::UnknownModule(_)
                | CimrError::EmptyRegistry
        )
    }

    /// Returns true if the same request might succeed later.
    pub fn is_transient(&self) -> bool {
        match self {
            CimrError::BackendUnavailable(_) | CimrError::BackendTimeout => true,
            CimrError::BackendStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            CimrError::ConfigParseError(_) => "E2001",
            CimrError::InvalidConfigValue { .. } => "E2002",
            CimrError::TeamNotFound(_) => "E3001",
            CimrError::SubTeamNotFound { .. } => "E3002",
            CimrError::AgentNotFound(_) => "E3003",
            CimrError::UnknownModule(_) => "E3004",
            CimrError::EmptyRegistry => "E3005",
            CimrError::RequestInFlight(_) => "E4001",
            CimrError::EmptyMessage => "E4002",
            CimrError::BackendUnavailable(_) => "E5001",
            CimrError::BackendStatus { .. } => "E5002",
            CimrError::ResponseParseError(_) => "E5003",
            CimrError::BackendTimeout => "E5004",
            CimrError::InvalidUrl { .. } => "E5005",
            CimrError::QueryFailed(_) => "E5006",
            CimrError::Internal(_) => "E9001",
            CimrError::IoError(_) => "E9002",
            CimrError::SerializationError(_) => "E9003",
        }
    }
}
