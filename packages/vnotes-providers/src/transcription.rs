use std::time::Duration;

use reqwest::{
	Client,
	multipart::{Form, Part},
};
use serde_json::Value;

use crate::{Error, Result};

/// Audio container formats accepted by OpenAI-compatible transcription endpoints.
pub const SUPPORTED_FORMATS: [&str; 9] =
	["flac", "m4a", "mp3", "mp4", "mpeg", "mpga", "ogg", "wav", "webm"];

pub fn is_supported_format(format: &str) -> bool {
	SUPPORTED_FORMATS.contains(&format)
}

pub async fn transcribe(
	cfg: &vnotes_config::TranscriptionProviderConfig,
	audio: &[u8],
	format: &str,
) -> Result<String> {
	let mime = mime_type(format).ok_or_else(|| Error::InvalidConfig {
		message: format!("Unsupported audio format {format:?}."),
	})?;
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let file = Part::bytes(audio.to_vec()).file_name(format!("audio.{format}")).mime_str(mime)?;
	let form = Form::new()
		.part("file", file)
		.text("model", cfg.model.clone())
		.text("response_format", cfg.response_format.clone());
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.multipart(form)
		.send()
		.await?
		.error_for_status()?;

	if is_json_format(&cfg.response_format) {
		let json: Value = res.json().await?;

		parse_transcription_response(json)
	} else {
		Ok(res.text().await?.trim().to_string())
	}
}

fn is_json_format(response_format: &str) -> bool {
	matches!(response_format, "json" | "verbose_json")
}

fn mime_type(format: &str) -> Option<&'static str> {
	let mime = match format {
		"flac" => "audio/flac",
		"m4a" => "audio/mp4",
		"mp3" | "mpga" | "mpeg" => "audio/mpeg",
		"mp4" => "video/mp4",
		"ogg" => "audio/ogg",
		"wav" => "audio/wav",
		"webm" => "audio/webm",
		_ => return None,
	};

	Some(mime)
}

fn parse_transcription_response(json: Value) -> Result<String> {
	json.get("text").and_then(|v| v.as_str()).map(|text| text.trim().to_string()).ok_or_else(
		|| Error::InvalidResponse {
			message: "Transcription response is missing text.".to_string(),
		},
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_text_from_verbose_json() {
		let json = serde_json::json!({
			"task": "transcribe",
			"language": "english",
			"duration": 2.5,
			"text": " Buy milk on the way home. ",
			"segments": []
		});

		assert_eq!(
			parse_transcription_response(json).expect("parse failed"),
			"Buy milk on the way home."
		);
	}

	#[test]
	fn missing_text_is_an_invalid_response() {
		let json = serde_json::json!({ "segments": [] });

		assert!(matches!(
			parse_transcription_response(json),
			Err(Error::InvalidResponse { .. })
		));
	}

	#[test]
	fn every_supported_format_has_a_mime_type() {
		for format in SUPPORTED_FORMATS {
			assert!(mime_type(format).is_some(), "Missing MIME type for {format}.");
		}

		assert!(mime_type("aiff").is_none());
		assert!(!is_supported_format("aiff"));
	}

	#[test]
	fn only_json_formats_are_parsed_as_json() {
		assert!(is_json_format("verbose_json"));
		assert!(is_json_format("json"));
		assert!(!is_json_format("text"));
		assert!(!is_json_format("srt"));
	}
}
