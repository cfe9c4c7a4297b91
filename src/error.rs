//! # Error Handling
//!
//! This module defines the relay's error taxonomy and how each kind is turned
//! into an HTTP response.
//!
//! ## Key Rust Concepts for Error Handling:
//!
//! ### Enums for Error Types
//! - **Variants**: Each variant is one failure category with its own status code
//! - **Struct variants**: `Upstream` keeps the client-facing message apart from
//!   the detail that only goes to the server log
//!
//! ### Traits for Error Conversion
//! - **From trait**: leaf errors (WAV codec, profile checks, provider client)
//!   convert automatically with `?`
//! - **ResponseError trait**: turns an error into an actix `HttpResponse`
//! - **Display trait**: how errors are written to the log
//!
//! ## Response Format:
//! Every failure returns the same JSON shape:
//! ```json
//! { "error": "pcm_b64 missing" }
//! ```

use crate::audio::{ProfileError, WavError};
use crate::provider::ProviderError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

/// Failure categories surfaced by the relay.
///
/// ## Status Code Mapping:
/// - **InvalidInput** / **UnsupportedProfile** → 400
/// - **PayloadTooLarge** → 413
/// - **ConfigurationMissing** / **Upstream** → 500
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed request fields
    InvalidInput(String),

    /// Audio format outside the single supported profile
    UnsupportedProfile(String),

    /// Uploaded file or body larger than the configured limit
    PayloadTooLarge(String),

    /// Provider credential not configured
    ConfigurationMissing(String),

    /// Provider call failed or returned something unusable.
    ///
    /// `message` is what the client sees; when `None` the endpoint fills in
    /// `"<operation> failed"`. `detail` is only logged.
    Upstream {
        message: Option<String>,
        detail: String,
    },
}

impl AppError {
    /// No provider credential is configured.
    pub fn missing_credential() -> Self {
        AppError::ConfigurationMissing("OPENAI_API_KEY is missing".to_string())
    }

    /// Upstream failure whose client message is decided by the endpoint.
    pub fn upstream(detail: impl Into<String>) -> Self {
        AppError::Upstream {
            message: None,
            detail: detail.into(),
        }
    }

    /// Attach the operation name used for generic upstream messages.
    ///
    /// Other variants pass through untouched.
    pub fn in_operation(self, operation: &str) -> Self {
        match self {
            AppError::Upstream { message: None, detail } => AppError::Upstream {
                message: Some(format!("{} failed", operation)),
                detail,
            },
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::UnsupportedProfile(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ConfigurationMissing(_) | AppError::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message placed in the `error` field of the response body.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg)
            | AppError::UnsupportedProfile(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::ConfigurationMissing(msg) => msg.clone(),
            AppError::Upstream { message, .. } => message
                .clone()
                .unwrap_or_else(|| "upstream request failed".to_string()),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::UnsupportedProfile(msg) => write!(f, "Unsupported profile: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::ConfigurationMissing(msg) => write!(f, "Configuration missing: {}", msg),
            AppError::Upstream { detail, .. } => write!(f, "Upstream failure: {}", detail),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts errors into `{"error": "..."}` responses.
///
/// Upstream details never reach the client; they are logged by the endpoint
/// before the error is returned.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(AppError::status_code(self)).json(json!({
            "error": self.public_message()
        }))
    }
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::UnsupportedProfile => AppError::UnsupportedProfile(err.to_string()),
            ProfileError::InvalidSampleRate(_) | ProfileError::MisalignedBuffer { .. } => {
                AppError::InvalidInput(err.to_string())
            }
        }
    }
}

/// A WAV container only reaches the codec's decoder from a provider, so a
/// malformed one is always an upstream problem.
impl From<WavError> for AppError {
    fn from(err: WavError) -> Self {
        AppError::upstream(err.to_string())
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::upstream(err.to_string())
    }
}

/// Shorthand for `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;
