use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{LIST_LIMIT, NoteStore, Result};
use vnotes_storage::models::IndexedNote;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ListRequest {
	#[serde(default)]
	pub query: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListItem {
	pub note_id: Uuid,
	pub text: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: Option<OffsetDateTime>,
	/// Similarity to the query. Always `None` when listing without a query.
	pub score: Option<f32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListResponse {
	pub items: Vec<ListItem>,
}

impl NoteStore {
	pub async fn list_notes(&self, req: ListRequest) -> Result<ListResponse> {
		let query = req.query.as_deref().map(str::trim).filter(|query| !query.is_empty());
		let notes: Vec<IndexedNote> = match query {
			None => {
				let notes = self.index.scroll(LIST_LIMIT).await?;

				notes.into_iter().map(|note| IndexedNote { score: None, ..note }).collect()
			},
			Some(query) => {
				let vector = self.embed_text(query).await?;

				self.index.search(&vector, LIST_LIMIT).await?
			},
		};
		let items = notes
			.into_iter()
			.take(LIST_LIMIT as usize)
			.map(|note| ListItem {
				note_id: note.note_id,
				text: note.text,
				created_at: note.created_at,
				score: note.score,
			})
			.collect::<Vec<_>>();

		tracing::debug!(searched = query.is_some(), count = items.len(), "Notes listed.");

		Ok(ListResponse { items })
	}
}
