use crate::{Error, NoteStore, Result};

impl NoteStore {
	/// Creates the notes collection when it is missing and makes sure the ordering index exists.
	///
	/// Safe to call on every start. An existing collection must have the configured vector size.
	pub async fn ensure_collection(&self) -> Result<()> {
		let collection = self.index.collection();
		let vector_dim = self.cfg.storage.qdrant.vector_dim;

		if self.index.collection_exists().await? {
			let message = match self.index.collection_vector_dim().await? {
				Some(existing) if existing == vector_dim => None,
				Some(existing) => Some(format!(
					"Collection {collection:?} has vector size {existing}, expected {vector_dim}."
				)),
				None => Some(format!("Collection {collection:?} has no single unnamed vector.")),
			};

			if let Some(message) = message {
				return Err(Error::Storage { message });
			}

			tracing::debug!(collection, "Notes collection already exists.");
		} else {
			self.index.create_collection(vector_dim).await?;

			tracing::info!(collection, vector_dim, "Notes collection created.");
		}

		self.index.ensure_payload_index().await?;

		Ok(())
	}
}
