use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, NoteStore, Result};
use vnotes_storage::models::NotePoint;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddNoteRequest {
	pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddNoteResponse {
	pub note_id: Uuid,
}

impl NoteStore {
	pub async fn add_note(&self, req: AddNoteRequest) -> Result<AddNoteResponse> {
		let text = validate_note_text(&req.text, self.cfg.notes.max_note_chars)?;
		let vector = self.embed_text(text).await?;
		let note = NotePoint {
			note_id: Uuid::new_v4(),
			text: text.to_string(),
			vector,
			created_at: OffsetDateTime::now_utc(),
		};

		self.index.upsert(std::slice::from_ref(&note)).await?;

		tracing::info!(note_id = %note.note_id, chars = note.text.chars().count(), "Note added.");

		Ok(AddNoteResponse { note_id: note.note_id })
	}
}

fn validate_note_text(text: &str, max_chars: u32) -> Result<&str> {
	let text = text.trim();

	if text.is_empty() {
		return Err(Error::Validation { message: "Note text must be non-empty.".to_string() });
	}
	if text.chars().count() > max_chars as usize {
		return Err(Error::Validation {
			message: format!("Note text must be at most {max_chars} characters."),
		});
	}

	Ok(text)
}
