use std::{
	future,
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use uuid::Uuid;

use vnotes_storage::{
	BoxFuture, Error, Result, VectorIndex,
	models::{IndexedNote, NotePoint},
};

/// A single-collection `VectorIndex` kept in memory.
///
/// Mirrors the Qdrant behaviour the note store relies on: cosine scoring, upsert by id,
/// most-recent-first scrolling and errors for calls against a missing collection.
pub struct InMemoryIndex {
	collection: String,
	state: Mutex<Option<Collection>>,
	writes: AtomicUsize,
}

struct Collection {
	vector_dim: u32,
	payload_indexed: bool,
	points: Vec<NotePoint>,
}

impl InMemoryIndex {
	pub fn new(collection: impl Into<String>) -> Self {
		Self { collection: collection.into(), state: Mutex::new(None), writes: AtomicUsize::new(0) }
	}

	/// Number of successful upserts and deletes.
	pub fn write_count(&self) -> usize {
		self.writes.load(Ordering::SeqCst)
	}

	pub fn point_count(&self) -> Option<usize> {
		self.lock().as_ref().map(|collection| collection.points.len())
	}

	pub fn vector_dim(&self) -> Option<u32> {
		self.lock().as_ref().map(|collection| collection.vector_dim)
	}

	pub fn is_payload_indexed(&self) -> bool {
		self.lock().as_ref().map(|collection| collection.payload_indexed).unwrap_or(false)
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, Option<Collection>> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn missing(&self) -> Error {
		Error::NotFound(format!("Collection `{}` doesn't exist!", self.collection))
	}

	fn create(&self, vector_dim: u32) -> Result<()> {
		let mut state = self.lock();

		if state.is_some() {
			return Err(Error::InvalidArgument(format!(
				"Collection `{}` already exists!",
				self.collection
			)));
		}

		*state = Some(Collection { vector_dim, payload_indexed: false, points: Vec::new() });

		Ok(())
	}

	fn index_payload(&self) -> Result<()> {
		let mut state = self.lock();
		let collection = state.as_mut().ok_or_else(|| self.missing())?;

		collection.payload_indexed = true;

		Ok(())
	}

	fn upsert_points(&self, points: &[NotePoint]) -> Result<()> {
		let mut state = self.lock();
		let collection = state.as_mut().ok_or_else(|| self.missing())?;

		for point in points {
			if point.vector.len() != collection.vector_dim as usize {
				return Err(Error::InvalidArgument(format!(
					"Wrong input: Vector dimension error: expected dim: {}, got {}",
					collection.vector_dim,
					point.vector.len()
				)));
			}
		}
		for point in points {
			match collection.points.iter_mut().find(|stored| stored.note_id == point.note_id) {
				Some(stored) => *stored = point.clone(),
				None => collection.points.push(point.clone()),
			}
		}

		self.writes.fetch_add(1, Ordering::SeqCst);

		Ok(())
	}

	fn scroll_points(&self, limit: u32) -> Result<Vec<IndexedNote>> {
		let state = self.lock();
		let collection = state.as_ref().ok_or_else(|| self.missing())?;
		let mut points = collection.points.iter().collect::<Vec<_>>();

		points.sort_by(|a, b| b.created_at.cmp(&a.created_at));

		Ok(points.into_iter().take(limit as usize).map(|point| to_note(point, None)).collect())
	}

	fn search_points(&self, vector: &[f32], limit: u32) -> Result<Vec<IndexedNote>> {
		let state = self.lock();
		let collection = state.as_ref().ok_or_else(|| self.missing())?;

		if vector.len() != collection.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Wrong input: Vector dimension error: expected dim: {}, got {}",
				collection.vector_dim,
				vector.len()
			)));
		}

		let mut scored = collection
			.points
			.iter()
			.map(|point| (cosine_similarity(vector, &point.vector), point))
			.collect::<Vec<_>>();

		scored.sort_by(|a, b| b.0.total_cmp(&a.0));

		Ok(scored
			.into_iter()
			.take(limit as usize)
			.map(|(score, point)| to_note(point, Some(score)))
			.collect())
	}

	fn delete_points(&self, note_ids: &[Uuid]) -> Result<()> {
		let mut state = self.lock();
		let collection = state.as_mut().ok_or_else(|| self.missing())?;

		collection.points.retain(|point| !note_ids.contains(&point.note_id));

		self.writes.fetch_add(1, Ordering::SeqCst);

		Ok(())
	}

	fn drop_collection(&self) -> Result<()> {
		self.lock().take();

		Ok(())
	}
}
impl VectorIndex for InMemoryIndex {
	fn collection(&self) -> &str {
		&self.collection
	}

	fn collection_exists(&self) -> BoxFuture<'_, Result<bool>> {
		let exists = self.lock().is_some();

		Box::pin(future::ready(Ok(exists)))
	}

	fn collection_vector_dim(&self) -> BoxFuture<'_, Result<Option<u32>>> {
		let vector_dim = self.vector_dim().ok_or_else(|| self.missing()).map(Some);

		Box::pin(future::ready(vector_dim))
	}

	fn create_collection(&self, vector_dim: u32) -> BoxFuture<'_, Result<()>> {
		Box::pin(future::ready(self.create(vector_dim)))
	}

	fn ensure_payload_index(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(future::ready(self.index_payload()))
	}

	fn upsert<'a>(&'a self, points: &'a [NotePoint]) -> BoxFuture<'a, Result<()>> {
		Box::pin(future::ready(self.upsert_points(points)))
	}

	fn scroll(&self, limit: u32) -> BoxFuture<'_, Result<Vec<IndexedNote>>> {
		Box::pin(future::ready(self.scroll_points(limit)))
	}

	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<IndexedNote>>> {
		Box::pin(future::ready(self.search_points(vector, limit)))
	}

	fn delete<'a>(&'a self, note_ids: &'a [Uuid]) -> BoxFuture<'a, Result<()>> {
		Box::pin(future::ready(self.delete_points(note_ids)))
	}

	fn delete_collection(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(future::ready(self.drop_collection()))
	}
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
	let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
	let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

	if norm_a == 0.0 || norm_b == 0.0 {
		return 0.0;
	}

	dot / (norm_a * norm_b)
}

fn to_note(point: &NotePoint, score: Option<f32>) -> IndexedNote {
	IndexedNote {
		note_id: point.note_id,
		text: point.text.clone(),
		created_at: Some(point.created_at),
		score,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cosine_similarity_ignores_magnitude() {
		let score = cosine_similarity(&[1.0, 0.0], &[5.0, 0.0]);

		assert!((score - 1.0).abs() < 1e-6);
		assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]), 0.0);
		assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
	}
}
