use axum::{
	Json, Router,
	body::Bytes,
	extract::{
		DefaultBodyLimit, Path, Query, State,
		rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use vnotes_service::{
	AddNoteRequest, AddNoteResponse, DeleteResponse, Error as ServiceError, ListRequest,
	ListResponse, TranscribeRequest, TranscribeResponse,
};

/// Largest audio clip accepted by the transcription route.
pub const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct ListQuery {
	query: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WipeQuery {
	#[serde(default)]
	confirm: bool,
}

#[derive(Debug, Deserialize)]
struct TranscribeQuery {
	format: String,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/notes", post(add_note).get(list_notes).delete(delete_all_notes))
		.route("/v1/notes/{note_id}", delete(delete_note))
		.route(
			"/v1/transcriptions",
			post(transcribe).layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES)),
		)
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn add_note(
	State(state): State<AppState>,
	payload: Result<Json<AddNoteRequest>, JsonRejection>,
) -> Result<Json<AddNoteResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.add_note(payload).await?;

	Ok(Json(response))
}

async fn list_notes(
	State(state): State<AppState>,
	query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
	let Query(query) = query?;
	let response = state.service.list_notes(ListRequest { query: query.query }).await?;

	Ok(Json(response))
}

async fn delete_note(
	State(state): State<AppState>,
	note_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
	let Path(note_id) = note_id?;
	let response = state.service.delete_note(note_id).await?;

	Ok(Json(response))
}

async fn delete_all_notes(
	State(state): State<AppState>,
	query: Result<Query<WipeQuery>, QueryRejection>,
) -> Result<StatusCode, ApiError> {
	let Query(query) = query?;

	if !query.confirm {
		return Err(json_error(
			StatusCode::UNPROCESSABLE_ENTITY,
			"INVALID_REQUEST",
			"Deleting all notes requires confirm=true.",
		));
	}

	state.service.delete_all_notes().await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn transcribe(
	State(state): State<AppState>,
	query: Result<Query<TranscribeQuery>, QueryRejection>,
	audio: Result<Bytes, BytesRejection>,
) -> Result<Json<TranscribeResponse>, ApiError> {
	let Query(query) = query?;
	let audio = audio?;
	let response = state
		.service
		.transcribe(TranscribeRequest { audio: audio.to_vec(), format: query.format })
		.await?;

	Ok(Json(response))
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
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::Validation { message } =>
				json_error(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST", message),
			ServiceError::Provider { message } => {
				tracing::error!(error = %message, "Provider call failed.");

				json_error(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message)
			},
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Vector index call failed.");

				json_error(StatusCode::BAD_GATEWAY, "STORAGE_ERROR", message)
			},
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(err: JsonRejection) -> Self {
		json_error(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST", err.body_text())
	}
}

impl From<QueryRejection> for ApiError {
	fn from(err: QueryRejection) -> Self {
		json_error(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST", err.body_text())
	}
}

impl From<PathRejection> for ApiError {
	fn from(err: PathRejection) -> Self {
		json_error(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST", err.body_text())
	}
}

impl From<BytesRejection> for ApiError {
	fn from(err: BytesRejection) -> Self {
		if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
			return json_error(
				StatusCode::PAYLOAD_TOO_LARGE,
				"PAYLOAD_TOO_LARGE",
				format!("Audio clips are limited to {MAX_AUDIO_BYTES} bytes."),
			);
		}

		json_error(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST", err.body_text())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
