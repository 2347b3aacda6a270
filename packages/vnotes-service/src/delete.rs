use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{NoteStore, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
	pub note_id: Uuid,
}

impl NoteStore {
	/// Deleting an id that is not stored succeeds.
	pub async fn delete_note(&self, note_id: Uuid) -> Result<DeleteResponse> {
		self.index.delete(&[note_id]).await?;

		tracing::info!(%note_id, "Note deleted.");

		Ok(DeleteResponse { note_id })
	}

	/// Drops the whole collection and recreates it empty, so the store stays usable.
	pub async fn delete_all_notes(&self) -> Result<()> {
		self.index.delete_collection().await?;

		tracing::info!(collection = self.index.collection(), "Notes collection dropped.");

		self.ensure_collection().await
	}
}
