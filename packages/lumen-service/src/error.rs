use uuid::Uuid;

use lumen_domain::day::DayError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid date {input:?}.")]
	InvalidDate { input: String },
	#[error("User {user_id} not found.")]
	UserNotFound { user_id: Uuid },
	#[error("Invalid configuration: {message}")]
	Config { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Stored record is malformed: {message}")]
	MalformedRecord { message: String },
	#[error("{operation} timed out after {timeout_ms} ms.")]
	Timeout { operation: String, timeout_ms: u64 },
	#[error("Internal error: {message}")]
	Internal { message: String },
}
impl Error {
	/// Transient failures worth another attempt.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Storage { .. } | Self::Timeout { .. })
	}
}
impl From<DayError> for Error {
	fn from(err: DayError) -> Self {
		match err {
			DayError::InvalidDate { input } => Self::InvalidDate { input },
		}
	}
}

impl From<lumen_config::Error> for Error {
	fn from(err: lumen_config::Error) -> Self {
		Self::Config { message: err.to_string() }
	}
}

impl From<lumen_storage::Error> for Error {
	fn from(err: lumen_storage::Error) -> Self {
		match err {
			lumen_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			lumen_storage::Error::SerdeJson(inner) =>
				Self::MalformedRecord { message: inner.to_string() },
			lumen_storage::Error::InvalidRow(message) => Self::MalformedRecord { message },
		}
	}
}

impl From<lumen_providers::Error> for Error {
	fn from(err: lumen_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Internal { message: err.to_string() }
	}
}
