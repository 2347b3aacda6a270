use serde::{Deserialize, Serialize};

use crate::{Error, NoteStore, Result};
use vnotes_providers::transcription;

#[derive(Clone, Debug)]
pub struct TranscribeRequest {
	pub audio: Vec<u8>,
	pub format: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranscribeResponse {
	/// blake3 hex digest of the submitted audio bytes.
	pub audio_hash: String,
	pub text: String,
}

#[derive(Clone, Debug)]
pub(crate) struct Transcript {
	audio_hash: String,
	text: String,
}

impl NoteStore {
	/// Transcribes one recorded clip.
	///
	/// The last clip is remembered by digest, so resubmitting the same recording returns the
	/// earlier text without another provider call.
	pub async fn transcribe(&self, req: TranscribeRequest) -> Result<TranscribeResponse> {
		if req.audio.is_empty() {
			return Err(Error::Validation { message: "Audio clip must be non-empty.".to_string() });
		}

		let format = req.format.trim().to_ascii_lowercase();

		if !transcription::is_supported_format(&format) {
			return Err(Error::Validation {
				message: format!(
					"Audio format must be one of {}.",
					transcription::SUPPORTED_FORMATS.join(", ")
				),
			});
		}

		let audio_hash = blake3::hash(&req.audio).to_hex().to_string();

		if let Some(text) = self.remembered_transcript(&audio_hash) {
			tracing::debug!(%audio_hash, "Transcription served from the last clip.");

			return Ok(TranscribeResponse { audio_hash, text });
		}

		let text = self
			.providers
			.transcription
			.transcribe(&self.cfg.providers.transcription, &req.audio, &format)
			.await?;

		tracing::info!(%audio_hash, bytes = req.audio.len(), "Audio clip transcribed.");

		*self.last_transcript.lock().unwrap_or_else(|err| err.into_inner()) =
			Some(Transcript { audio_hash: audio_hash.clone(), text: text.clone() });

		Ok(TranscribeResponse { audio_hash, text })
	}

	fn remembered_transcript(&self, audio_hash: &str) -> Option<String> {
		let last = self.last_transcript.lock().unwrap_or_else(|err| err.into_inner());

		last.as_ref().filter(|last| last.audio_hash == audio_hash).map(|last| last.text.clone())
	}
}
