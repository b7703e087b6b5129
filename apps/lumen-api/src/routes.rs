use axum::{
	Json, Router,
	extract::{Query, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use lumen_domain::insight::DailyInsight;
use lumen_service::{DailyInsightRequest, Error as ServiceError, RecomputeRequest};

pub const USER_ID_HEADER: &str = "x-lumen-user-id";

/// Query string of `GET /v1/insights/daily`. Flags default to `false`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DailyInsightQuery {
	pub date: Option<String>,
	pub refresh: bool,
	pub narrative: bool,
	pub narrative_refresh: bool,
}
impl From<DailyInsightQuery> for DailyInsightRequest {
	fn from(query: DailyInsightQuery) -> Self {
		Self {
			date: query.date,
			refresh: query.refresh,
			include_narrative: query.narrative,
			force_narrative: query.narrative_refresh,
		}
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/insights/daily", get(daily_insight))
		.route("/v1/insights/daily/recompute", post(recompute_daily_insight))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn daily_insight(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(query): Query<DailyInsightQuery>,
) -> Result<Json<DailyInsight>, ApiError> {
	let user_id = user_id(&headers)?;
	let doc = state.service.get_daily_insight(user_id, query.into()).await?;

	Ok(Json(doc))
}

async fn recompute_daily_insight(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<RecomputeRequest>,
) -> Result<(StatusCode, Json<DailyInsight>), ApiError> {
	let user_id = user_id(&headers)?;
	let doc = state.service.recompute_daily_insight(user_id, payload).await?;

	Ok((StatusCode::CREATED, Json(doc)))
}

fn user_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
	let Some(raw) = headers.get(USER_ID_HEADER) else {
		return Err(ApiError::new(
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
			"X-Lumen-User-Id header is required.",
		));
	};
	let parsed = raw.to_str().ok().and_then(|value| Uuid::parse_str(value.trim()).ok());

	parsed.ok_or_else(|| {
		ApiError::new(
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
			"X-Lumen-User-Id must be a UUID.",
		)
	})
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}

	pub fn status(&self) -> StatusCode {
		self.status
	}

	pub fn error_code(&self) -> &str {
		&self.error_code
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();
		let (status, code) = match err {
			ServiceError::InvalidDate { .. } => (StatusCode::BAD_REQUEST, "INVALID_DATE"),
			ServiceError::UserNotFound { .. } => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
			ServiceError::Provider { .. } => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
			ServiceError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
			ServiceError::Storage { .. } | ServiceError::MalformedRecord { .. } =>
				(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
			ServiceError::Config { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
			ServiceError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
		};

		if status.is_server_error() {
			tracing::error!(error_code = code, error = %message, "Request failed.");
		}

		Self::new(status, code, message)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
