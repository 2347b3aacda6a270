use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
	response::Response,
};
use serde_json::Value;
use tower::util::ServiceExt;

use vnotes_api::{
	routes::{self, MAX_AUDIO_BYTES},
	state::AppState,
};
use vnotes_service::{NoteStore, Providers};
use vnotes_testkit::{FailingEmbedding, InMemoryIndex, KeywordEmbedding, StubTranscription};

async fn test_app() -> Router {
	let embedding =
		KeywordEmbedding::new([("milk", 0), ("groceries", 0), ("dentist", 1), ("schedule", 1)]);
	let providers =
		Providers::new(Arc::new(embedding), Arc::new(StubTranscription::new("Buy milk.")));

	app_with(providers).await
}

async fn app_with(providers: Providers) -> Router {
	let cfg = vnotes_testkit::test_config("http://127.0.0.1:6334", "notes_http", 8);
	let index = Arc::new(InMemoryIndex::new("notes_http"));
	let service = NoteStore::with_providers(cfg, index, providers);

	service.ensure_collection().await.expect("Failed to ensure collection.");

	routes::router(AppState::from_service(service))
}

async fn send(app: &Router, request: Request<Body>) -> Response {
	app.clone().oneshot(request).await.expect("Failed to call router.")
}

async fn json_body(response: Response) -> Value {
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&body).expect("Failed to parse response.")
}

fn post_note(text: &str) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri("/v1/notes")
		.header("content-type", "application/json")
		.body(Body::from(serde_json::json!({ "text": text }).to_string()))
		.expect("Failed to build request.")
}

fn get(uri: &str) -> Request<Body> {
	Request::builder().uri(uri).body(Body::empty()).expect("Failed to build request.")
}

fn delete(uri: &str) -> Request<Body> {
	Request::builder()
		.method("DELETE")
		.uri(uri)
		.body(Body::empty())
		.expect("Failed to build request.")
}

#[tokio::test]
async fn health_ok() {
	let app = test_app().await;
	let response = send(&app, get("/health")).await;

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn add_then_list_returns_the_note() {
	let app = test_app().await;
	let response = send(&app, post_note("buy milk")).await;

	assert_eq!(response.status(), StatusCode::OK);

	let added = json_body(response).await;
	let note_id = added["note_id"].as_str().expect("note_id is a string").to_string();
	let listed = json_body(send(&app, get("/v1/notes")).await).await;
	let items = listed["items"].as_array().expect("items is an array");

	assert_eq!(items.len(), 1);
	assert_eq!(items[0]["note_id"], note_id.as_str());
	assert_eq!(items[0]["text"], "buy milk");
	assert!(items[0]["score"].is_null());
	assert!(items[0]["created_at"].is_string());
}

#[tokio::test]
async fn search_ranks_by_similarity() {
	let app = test_app().await;

	send(&app, post_note("schedule dentist")).await;
	send(&app, post_note("buy milk")).await;

	let found = json_body(send(&app, get("/v1/notes?query=groceries")).await).await;
	let items = found["items"].as_array().expect("items is an array");

	assert_eq!(items[0]["text"], "buy milk");
	assert!(items[0]["score"].is_number());
}

#[tokio::test]
async fn blank_note_is_unprocessable() {
	let app = test_app().await;
	let response = send(&app, post_note("   ")).await;

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

	let json = json_body(response).await;

	assert_eq!(json["error_code"], "INVALID_REQUEST");
	assert_eq!(json["message"], "Note text must be non-empty.");
}

#[tokio::test]
async fn malformed_json_is_unprocessable() {
	let app = test_app().await;
	let request = Request::builder()
		.method("POST")
		.uri("/v1/notes")
		.header("content-type", "application/json")
		.body(Body::from("{\"body\":"))
		.expect("Failed to build request.");
	let response = send(&app, request).await;

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(json_body(response).await["error_code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn delete_note_is_idempotent_over_http() {
	let app = test_app().await;
	let added = json_body(send(&app, post_note("buy milk")).await).await;
	let note_id = added["note_id"].as_str().expect("note_id is a string").to_string();
	let uri = format!("/v1/notes/{note_id}");

	for _ in 0..2 {
		let response = send(&app, delete(&uri)).await;

		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(json_body(response).await["note_id"], note_id.as_str());
	}

	let listed = json_body(send(&app, get("/v1/notes")).await).await;

	assert!(listed["items"].as_array().expect("items is an array").is_empty());
}

#[tokio::test]
async fn delete_note_rejects_malformed_id() {
	let app = test_app().await;
	let response = send(&app, delete("/v1/notes/not-a-uuid")).await;

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(json_body(response).await["error_code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn wipe_requires_confirmation() {
	let app = test_app().await;

	send(&app, post_note("buy milk")).await;

	let response = send(&app, delete("/v1/notes")).await;

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

	let listed = json_body(send(&app, get("/v1/notes")).await).await;

	assert_eq!(listed["items"].as_array().expect("items is an array").len(), 1);

	let response = send(&app, delete("/v1/notes?confirm=true")).await;

	assert_eq!(response.status(), StatusCode::NO_CONTENT);

	let listed = json_body(send(&app, get("/v1/notes")).await).await;

	assert!(listed["items"].as_array().expect("items is an array").is_empty());
}

#[tokio::test]
async fn transcribes_raw_audio_body() {
	let app = test_app().await;
	let request = Request::builder()
		.method("POST")
		.uri("/v1/transcriptions?format=mp3")
		.header("content-type", "audio/mpeg")
		.body(Body::from(b"ID3-fake".to_vec()))
		.expect("Failed to build request.");
	let response = send(&app, request).await;

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_body(response).await;

	assert_eq!(json["text"], "Buy milk.");
	assert_eq!(json["audio_hash"].as_str().expect("audio_hash is a string").len(), 64);
}

#[tokio::test]
async fn transcription_requires_a_format() {
	let app = test_app().await;
	let request = Request::builder()
		.method("POST")
		.uri("/v1/transcriptions")
		.body(Body::from(b"ID3-fake".to_vec()))
		.expect("Failed to build request.");
	let response = send(&app, request).await;

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn oversized_audio_gets_a_json_error() {
	let app = test_app().await;
	let request = Request::builder()
		.method("POST")
		.uri("/v1/transcriptions?format=wav")
		.header("content-type", "audio/wav")
		.body(Body::from(vec![0_u8; MAX_AUDIO_BYTES + 1]))
		.expect("Failed to build request.");
	let response = send(&app, request).await;

	assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

	let json = json_body(response).await;

	assert_eq!(json["error_code"], "PAYLOAD_TOO_LARGE");
	assert!(json["message"].is_string());
}

#[tokio::test]
async fn provider_failure_is_bad_gateway() {
	let providers =
		Providers::new(Arc::new(FailingEmbedding), Arc::new(StubTranscription::new("unused")));
	let app = app_with(providers).await;
	let response = send(&app, post_note("buy milk")).await;

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
	assert_eq!(json_body(response).await["error_code"], "PROVIDER_ERROR");
}
