//! Error types for completion, streaming and templating operations.
//!
//! The main error type is [`LlmError`], which covers all failure modes:
//! - Configuration errors (missing API key, invalid sampling parameters)
//! - Request failures (network issues, server errors)
//! - Rate limiting and timeouts
//! - Authentication failures
//! - Context window exceeded
//! - Prompt template errors
//! - Broken event streams
//!
//! # Error Handling Example
//!
//! ```rust,no_run
//! use fireworks_llm::{LlmError, error::ErrorCategory};
//!
//! fn handle_error(err: LlmError) {
//!     if err.is_retryable() {
//!         println!("Retryable error: {}", err);
//!     }
//!
//!     match err.category() {
//!         ErrorCategory::Transient => println!("Temporary issue, try again later"),
//!         ErrorCategory::Client => println!("Fix the request and try again"),
//!         _ => println!("System issue: {}", err.user_message()),
//!     }
//! }
//! ```

use crate::logging::{log_error, log_warn};
use thiserror::Error;

// ============================================================================
// Error categorization types
// ============================================================================

/// High-level categorization of errors for routing and handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// External service failures (the completions API, the network).
    External,

    /// Internal errors (bugs, invariant violations).
    Internal,

    /// Client errors the caller can fix (bad input, auth, configuration).
    Client,

    /// Temporary failures that should be retried with backoff.
    Transient,
}

/// Severity level for logging and alerting decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// System is unusable.
    Critical,

    /// Action failed but system is stable.
    Error,

    /// Unexpected but recoverable situation.
    Warning,

    /// Expected failure (e.g. validation).
    Info,
}

// ============================================================================
// LLM Error types
// ============================================================================

/// Convenient result type for LLM operations.
///
/// ```rust
/// use fireworks_llm::LlmResult;
///
/// fn last_char(text: &str) -> LlmResult<char> {
///     text.chars()
///         .last()
///         .ok_or_else(|| fireworks_llm::LlmError::response_parsing_error("Empty completion"))
/// }
/// ```
pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Errors that can occur while talking to the completions API or preparing
/// prompts for it.
///
/// | Variant | Category | Retryable |
/// |---------|----------|-----------|
/// | `ConfigurationError` | Client | No |
/// | `RequestFailed` | External | Yes |
/// | `ResponseParsingError` | External | No |
/// | `RateLimitExceeded` | Transient | Yes |
/// | `Timeout` | Transient | Yes |
/// | `AuthenticationFailed` | Client | No |
/// | `TokenLimitExceeded` | Client | No |
/// | `TemplateError` | Client | No |
/// | `StreamError` | External | No |
///
/// Prefer the constructor methods, which log the error as it is created.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Client configuration is invalid or incomplete.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// The HTTP request failed or the server answered with an error status.
    #[error("Request failed: {message}")]
    RequestFailed {
        /// Description of the failure.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server answered, but the body could not be understood.
    #[error("Response parsing failed: {message}")]
    ResponseParsingError {
        /// Details about the parsing failure.
        message: String,
    },

    /// The API is throttling requests.
    #[error("Rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimitExceeded {
        /// Recommended wait time before retrying.
        retry_after_seconds: u64,
    },

    /// A request or the whole retried operation ran out of time.
    #[error("Request timed out after {timeout_seconds}s")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout_seconds: u64,
    },

    /// The API rejected the credentials.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Details about the authentication failure.
        message: String,
    },

    /// Prompt plus requested completion length does not fit the model's
    /// context window.
    #[error("Token limit exceeded: {current} > {max}")]
    TokenLimitExceeded {
        /// Estimated tokens required.
        current: usize,
        /// Context window of the model.
        max: usize,
    },

    /// A prompt template could not be built or formatted.
    #[error("Prompt template error: {message}")]
    TemplateError {
        /// What went wrong with the template.
        message: String,
    },

    /// A streaming response broke off or carried an undecodable event.
    #[error("Stream error: {message}")]
    StreamError {
        /// What went wrong with the stream.
        message: String,
    },
}

impl LlmError {
    /// Get the error category for routing and handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError { .. } => ErrorCategory::Client,
            Self::RequestFailed { .. } => ErrorCategory::External,
            Self::ResponseParsingError { .. } => ErrorCategory::External,
            Self::RateLimitExceeded { .. } => ErrorCategory::Transient,
            Self::Timeout { .. } => ErrorCategory::Transient,
            Self::AuthenticationFailed { .. } => ErrorCategory::Client,
            Self::TokenLimitExceeded { .. } => ErrorCategory::Client,
            Self::TemplateError { .. } => ErrorCategory::Client,
            Self::StreamError { .. } => ErrorCategory::External,
        }
    }

    /// Get the error severity for logging and alerting.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ConfigurationError { .. } => ErrorSeverity::Error,
            Self::RequestFailed { .. } => ErrorSeverity::Error,
            Self::ResponseParsingError { .. } => ErrorSeverity::Warning,
            Self::RateLimitExceeded { .. } => ErrorSeverity::Warning,
            Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::AuthenticationFailed { .. } => ErrorSeverity::Error,
            Self::TokenLimitExceeded { .. } => ErrorSeverity::Info,
            Self::TemplateError { .. } => ErrorSeverity::Info,
            Self::StreamError { .. } => ErrorSeverity::Warning,
        }
    }

    /// Whether this error is transient and should trigger a retry.
    ///
    /// Returns `true` for rate limits, timeouts and general request failures.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded { .. } | Self::Timeout { .. } | Self::RequestFailed { .. }
        )
    }

    /// Convert to a message that is safe to show to end users.
    ///
    /// ```rust
    /// use fireworks_llm::LlmError;
    ///
    /// let err = LlmError::rate_limit_exceeded(60);
    /// assert_eq!(
    ///     err.user_message(),
    ///     "Service is busy. Please wait 60 seconds and try again"
    /// );
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigurationError { .. } => {
                "AI service configuration issue. Please check your settings".to_string()
            }
            Self::RequestFailed { .. } => {
                "Unable to communicate with AI service. Please try again".to_string()
            }
            Self::ResponseParsingError { .. } => {
                "Received an invalid response from AI service".to_string()
            }
            Self::RateLimitExceeded {
                retry_after_seconds,
            } => {
                format!("Service is busy. Please wait {retry_after_seconds} seconds and try again")
            }
            Self::Timeout { .. } => "Request timed out. Please try again".to_string(),
            Self::AuthenticationFailed { .. } => {
                "Authentication failed. Please check your credentials".to_string()
            }
            Self::TokenLimitExceeded { .. } => {
                "Your request is too long. Please shorten it and try again".to_string()
            }
            Self::TemplateError { .. } => "The prompt could not be prepared".to_string(),
            Self::StreamError { .. } => {
                "The response stream was interrupted. Please try again".to_string()
            }
        }
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================

    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Client configuration validation failed"
        );
        Self::ConfigurationError { message }
    }

    pub fn request_failed(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        log_error!(
            error_type = "request_failed",
            message = %message,
            has_source = source.is_some(),
            "Completion request failed"
        );
        Self::RequestFailed { message, source }
    }

    pub fn response_parsing_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "response_parsing_error",
            message = %message,
            "Completion response format invalid"
        );
        Self::ResponseParsingError { message }
    }

    pub fn rate_limit_exceeded(retry_after_seconds: u64) -> Self {
        log_warn!(
            error_type = "rate_limit_exceeded",
            retry_after_seconds = retry_after_seconds,
            "Completions API rate limit exceeded"
        );
        Self::RateLimitExceeded {
            retry_after_seconds,
        }
    }

    pub fn timeout(timeout_seconds: u64) -> Self {
        log_warn!(
            error_type = "timeout",
            timeout_seconds = timeout_seconds,
            "Completion request timed out"
        );
        Self::Timeout { timeout_seconds }
    }

    pub fn authentication_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "authentication_failed",
            message = %message,
            "Completions API authentication failed"
        );
        Self::AuthenticationFailed { message }
    }

    pub fn token_limit_exceeded(current: usize, max: usize) -> Self {
        log_warn!(
            error_type = "token_limit_exceeded",
            current_tokens = current,
            max_tokens = max,
            "Prompt exceeds model context window"
        );
        Self::TokenLimitExceeded { current, max }
    }

    pub fn template_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "template_error",
            message = %message,
            "Prompt template could not be formatted"
        );
        Self::TemplateError { message }
    }

    pub fn stream_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "stream_error",
            message = %message,
            "Completion stream failed"
        );
        Self::StreamError { message }
    }
}
