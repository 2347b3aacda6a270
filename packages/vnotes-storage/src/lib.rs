pub mod models;
pub mod qdrant;

mod error;

pub use error::Error;

use std::{future::Future, pin::Pin};

use uuid::Uuid;

use crate::models::{IndexedNote, NotePoint};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A vector index holding one collection of notes under a fixed dimension and cosine distance.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn collection(&self) -> &str;

	fn collection_exists(&self) -> BoxFuture<'_, Result<bool>>;

	/// Vector size the existing collection was created with, `None` when it has no single
	/// unnamed vector.
	fn collection_vector_dim(&self) -> BoxFuture<'_, Result<Option<u32>>>;

	fn create_collection(&self, vector_dim: u32) -> BoxFuture<'_, Result<()>>;

	/// Makes sure the `created_at_ms` payload field is indexed for ordered scrolling.
	fn ensure_payload_index(&self) -> BoxFuture<'_, Result<()>>;

	fn upsert<'a>(&'a self, points: &'a [NotePoint]) -> BoxFuture<'a, Result<()>>;

	/// Returns up to `limit` notes, most recent first, without scores.
	fn scroll(&self, limit: u32) -> BoxFuture<'_, Result<Vec<IndexedNote>>>;

	/// Returns up to `limit` nearest notes ordered by descending similarity.
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<IndexedNote>>>;

	/// Removes the given ids. Ids that are not present are ignored; a missing collection is not.
	fn delete<'a>(&'a self, note_ids: &'a [Uuid]) -> BoxFuture<'a, Result<()>>;

	/// Drops the collection and every point in it. Dropping a missing collection succeeds.
	fn delete_collection(&self) -> BoxFuture<'_, Result<()>>;
}
