//! API types for the orderflow HTTP surface.
//!
//! Request/response structures for the intake endpoint and the shared error
//! type with its HTTP status mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Successful intake response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponse {
	/// Confirmation message.
	pub message: String,
	/// Identifier assigned to the new order.
	pub order_id: String,
}

/// Uniform summary returned for a whole processing batch, regardless of
/// per-record outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSummary {
	/// Always `"Done"`.
	pub status: String,
}

impl ProcessSummary {
	pub fn done() -> Self {
		Self {
			status: "Done".to_string(),
		}
	}
}

/// API error body.
///
/// Client errors carry only `error`; dependent-service errors also carry the
/// underlying cause in `details`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
	/// Human-readable description of what went wrong.
	pub error: String,
	/// Underlying cause, present for dependent-service failures.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<String>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Malformed or incomplete submission (400).
	BadRequest { message: String },
	/// Requested order does not exist (404).
	NotFound { message: String },
	/// A dependent service failed (500); `details` carries the cause.
	Internal {
		message: String,
		details: Option<String>,
	},
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest { .. } => 400,
			ApiError::NotFound { .. } => 404,
			ApiError::Internal { .. } => 500,
		}
	}

	/// Convert to ErrorBody for JSON serialization.
	pub fn to_error_body(&self) -> ErrorBody {
		match self {
			ApiError::BadRequest { message } | ApiError::NotFound { message } => ErrorBody {
				error: message.clone(),
				details: None,
			},
			ApiError::Internal { message, details } => ErrorBody {
				error: message.clone(),
				details: details.clone(),
			},
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message } => write!(f, "Bad Request: {}", message),
			ApiError::NotFound { message } => write!(f, "Not Found: {}", message),
			ApiError::Internal { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = match self.status_code() {
			400 => StatusCode::BAD_REQUEST,
			404 => StatusCode::NOT_FOUND,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};

		(status, Json(self.to_error_body())).into_response()
	}
}
