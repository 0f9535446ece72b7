use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use crate::ads_client::PlatformError;

/// Closed set of error categories reported to API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The refresh credential is expired or invalid.
    AuthError,
    /// The credential lacks permission on the requested account.
    PermissionDenied,
    /// The Ads platform rejected the request.
    PlatformError,
    /// The incoming request payload is missing or malformed.
    ValidationError,
    /// Anything else.
    InternalError,
}

impl ErrorKind {
    /// HTTP status returned for this kind.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::AuthError => StatusCode::UNAUTHORIZED,
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::PlatformError | ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::AuthError => "AUTH_ERROR",
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::PlatformError => "PLATFORM_ERROR",
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single platform-reported error, with the request fields it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// JSON body returned for every failed request (and for failed batch items).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorResult {
    pub error: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Platform status name, e.g. `INVALID_ARGUMENT`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_status: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// Application-specific error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Refresh token expired, revoked or otherwise rejected.
    Auth {
        /// Raw detail from the token endpoint.
        detail: String,
    },
    /// Credentials are valid but not allowed to access the account.
    PermissionDenied {
        /// Raw detail from the platform.
        detail: String,
    },
    /// Vendor-reported request failure.
    Platform {
        /// Platform status name (`INVALID_ARGUMENT`, `PERMISSION_DENIED`, ...).
        status: String,
        /// First error message reported by the platform.
        message: String,
        request_id: Option<String>,
        errors: Vec<FieldError>,
    },
    /// Bad request error (invalid input).
    Validation(String),
    /// Internal server error.
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Auth { .. } => ErrorKind::AuthError,
            AppError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            AppError::Platform { .. } => ErrorKind::PlatformError,
            AppError::Validation(_) => ErrorKind::ValidationError,
            AppError::Internal(_) => ErrorKind::InternalError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// Builds the serialized body for this error.
    pub fn to_error_result(&self) -> ErrorResult {
        let mut result = ErrorResult {
            error: self.kind(),
            message: String::new(),
            technical_detail: None,
            request_id: None,
            platform_status: None,
            errors: Vec::new(),
        };

        match self {
            AppError::Auth { detail } => {
                result.message =
                    "Refresh token has expired or is invalid. Please reauthenticate.".to_string();
                result.technical_detail = Some(detail.clone());
            }
            AppError::PermissionDenied { detail } => {
                result.message = "Invalid credentials or insufficient permissions".to_string();
                result.technical_detail = Some(detail.clone());
            }
            AppError::Platform {
                status,
                message,
                request_id,
                errors,
            } => {
                result.message = message.clone();
                result.request_id = request_id.clone();
                result.platform_status = Some(status.clone());
                result.errors = errors.clone();
            }
            AppError::Validation(msg) => result.message = msg.clone(),
            AppError::Internal(msg) => result.message = msg.clone(),
        }

        result
    }
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Auth { detail } => write!(f, "Authentication error: {}", detail),
            AppError::PermissionDenied { detail } => write!(f, "Permission denied: {}", detail),
            AppError::Platform {
                status,
                message,
                request_id,
                ..
            } => match request_id {
                Some(id) => write!(f, "Platform error {} (request {}): {}", status, id, message),
                None => write!(f, "Platform error {}: {}", status, message),
            },
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Client-side failures are logged at `warn`, internal ones at `error`.
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        (status, Json(self.to_error_result())).into_response()
    }
}

/// Maps a vendor client failure onto the closed error taxonomy.
///
/// This is the only place outside `ads_client` that knows about vendor
/// error shapes.
pub fn classify_platform_error(err: PlatformError) -> AppError {
    match err {
        PlatformError::Refresh(detail) => AppError::Auth { detail },
        PlatformError::PermissionDenied(detail) => AppError::PermissionDenied { detail },
        PlatformError::Failure(failure) => {
            let message = failure
                .errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| failure.message.clone());
            let errors = failure
                .errors
                .into_iter()
                .map(|e| FieldError {
                    message: e.message,
                    fields: e.field_path,
                })
                .collect();
            AppError::Platform {
                status: failure.status,
                message,
                request_id: failure.request_id,
                errors,
            }
        }
        PlatformError::Transport(msg) => {
            AppError::Internal(format!("Ads platform request failed: {}", msg))
        }
        PlatformError::Decode(msg) => {
            AppError::Internal(format!("Unexpected Ads platform response: {}", msg))
        }
    }
}

impl From<PlatformError> for AppError {
    fn from(err: PlatformError) -> Self {
        classify_platform_error(err)
    }
}
