//! Error types for stack deployment

use crate::status::StackStatus;
use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: CloudFormation rejected the create request
    E001SubmissionRejected,
    /// E002: Stack status could not be read
    E002StatusQueryFailed,
    /// E003: Stack reached a failure status
    E003CreationFailed,
    /// E004: Wait strategy gave up before the stack settled
    E004TimedOut,
    /// E005: Request failed local validation
    E005InvalidRequest,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001SubmissionRejected => "E001",
            Self::E002StatusQueryFailed => "E002",
            Self::E003CreationFailed => "E003",
            Self::E004TimedOut => "E004",
            Self::E005InvalidRequest => "E005",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures reported by the provider API itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A stack with this name already exists (or is still being created)
    #[error("stack '{stack_name}' already exists")]
    AlreadyExists { stack_name: String },

    /// The template needs a capability the request did not acknowledge
    #[error("insufficient capabilities: {message}")]
    InsufficientCapabilities { message: String },

    /// Account stack quota reached
    #[error("limit exceeded: {message}")]
    LimitExceeded { message: String },

    /// The stack is unknown to the provider (never created, or deleted out-of-band)
    #[error("stack '{stack_name}' does not exist")]
    NotFound { stack_name: String },

    /// The provider answered, but without the fields we need
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    /// Any other service-side error, keyed by the provider's error code
    #[error("{code}: {message}")]
    Service { code: String, message: String },

    /// The request never got a service answer (network, credentials, timeout)
    #[error("request failed: {message}")]
    Transport { message: String },
}

/// Errors that end a deployment
#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("[{code}] Stack '{stack_name}' was rejected by CloudFormation: {source}")]
    SubmissionRejected {
        code: &'static str,
        stack_name: String,
        #[source]
        source: ApiError,
    },

    #[error("[{code}] Failed to query status of stack '{stack_name}': {source}")]
    StatusQueryFailed {
        code: &'static str,
        stack_name: String,
        #[source]
        source: ApiError,
    },

    #[error("[{code}] Stack '{stack_name}' creation failed with status {status}: {reason}")]
    CreationFailed {
        code: &'static str,
        stack_name: String,
        status: StackStatus,
        reason: String,
    },

    #[error("[{code}] Gave up waiting for stack '{stack_name}' after {attempts} polls (last status {last_status})")]
    TimedOut {
        code: &'static str,
        stack_name: String,
        attempts: u32,
        last_status: StackStatus,
    },

    #[error("[{code}] Invalid stack request: {message}")]
    InvalidRequest { code: &'static str, message: String },
}

impl DeploymentError {
    pub fn submission_rejected(stack_name: impl Into<String>, source: ApiError) -> Self {
        Self::SubmissionRejected {
            code: ErrorCode::E001SubmissionRejected.as_str(),
            stack_name: stack_name.into(),
            source,
        }
    }

    pub fn status_query_failed(stack_name: impl Into<String>, source: ApiError) -> Self {
        Self::StatusQueryFailed {
            code: ErrorCode::E002StatusQueryFailed.as_str(),
            stack_name: stack_name.into(),
            source,
        }
    }

    pub fn creation_failed(
        stack_name: impl Into<String>,
        status: StackStatus,
        reason: Option<String>,
    ) -> Self {
        Self::CreationFailed {
            code: ErrorCode::E003CreationFailed.as_str(),
            stack_name: stack_name.into(),
            status,
            reason: reason.unwrap_or_else(|| "no reason reported".to_string()),
        }
    }

    pub fn timed_out(stack_name: impl Into<String>, attempts: u32, last_status: StackStatus) -> Self {
        Self::TimedOut {
            code: ErrorCode::E004TimedOut.as_str(),
            stack_name: stack_name.into(),
            attempts,
            last_status,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            code: ErrorCode::E005InvalidRequest.as_str(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SubmissionRejected { .. } => ErrorCode::E001SubmissionRejected,
            Self::StatusQueryFailed { .. } => ErrorCode::E002StatusQueryFailed,
            Self::CreationFailed { .. } => ErrorCode::E003CreationFailed,
            Self::TimedOut { .. } => ErrorCode::E004TimedOut,
            Self::InvalidRequest { .. } => ErrorCode::E005InvalidRequest,
        }
    }
}

/// Result type alias for DeploymentError
pub type Result<T> = std::result::Result<T, DeploymentError>;
