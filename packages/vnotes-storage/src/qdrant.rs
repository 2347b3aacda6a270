use std::collections::HashMap;

use qdrant_client::{
	Qdrant, QdrantError,
	client::Payload,
	qdrant::{
		CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, DeletePointsBuilder,
		Direction, Distance, FieldType, OrderBy, PointId, PointStruct, PointsIdsList, Query,
		QueryPointsBuilder, ScrollPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
		point_id::PointIdOptions, value::Kind, vectors_config,
	},
};
use uuid::Uuid;

use crate::{
	BoxFuture, Result, VectorIndex,
	models::{self, CREATED_AT_FIELD, IndexedNote, NotePoint, TEXT_FIELD},
};

pub struct QdrantStore {
	pub client: Qdrant,
	pub collection: String,
}
impl QdrantStore {
	pub fn new(cfg: &vnotes_config::Qdrant) -> Result<Self> {
		let client = Qdrant::from_url(&cfg.url).api_key(cfg.api_key.clone()).build()?;

		Ok(Self { client, collection: cfg.collection.clone() })
	}

	async fn exists(&self) -> Result<bool> {
		Ok(self.client.collection_exists(self.collection.clone()).await?)
	}

	async fn configured_dim(&self) -> Result<Option<u32>> {
		let info = self.client.collection_info(self.collection.clone()).await?;
		let config = info
			.result
			.and_then(|info| info.config)
			.and_then(|config| config.params)
			.and_then(|params| params.vectors_config)
			.and_then(|vectors| vectors.config);

		Ok(match config {
			Some(vectors_config::Config::Params(params)) => u32::try_from(params.size).ok(),
			_ => None,
		})
	}

	async fn create(&self, vector_dim: u32) -> Result<()> {
		let create = CreateCollectionBuilder::new(self.collection.clone())
			.vectors_config(VectorParamsBuilder::new(vector_dim as u64, Distance::Cosine));

		self.client.create_collection(create).await?;

		Ok(())
	}

	async fn create_created_at_index(&self) -> Result<()> {
		let index = CreateFieldIndexCollectionBuilder::new(
			self.collection.clone(),
			CREATED_AT_FIELD,
			FieldType::Integer,
		)
		.wait(true);

		self.client.create_field_index(index).await?;

		Ok(())
	}

	async fn upsert_notes(&self, notes: &[NotePoint]) -> Result<()> {
		let points = notes
			.iter()
			.map(|note| {
				PointStruct::new(
					note.note_id.to_string(),
					note.vector.clone(),
					Payload::from(payload_map(note)),
				)
			})
			.collect::<Vec<_>>();
		let upsert = UpsertPointsBuilder::new(self.collection.clone(), points).wait(true);

		self.client.upsert_points(upsert).await?;

		Ok(())
	}

	async fn scroll_recent(&self, limit: u32) -> Result<Vec<IndexedNote>> {
		let order_by = OrderBy {
			key: CREATED_AT_FIELD.to_string(),
			direction: Some(Direction::Desc as i32),
			start_from: None,
		};
		let scroll = ScrollPointsBuilder::new(self.collection.clone())
			.limit(limit)
			.with_payload(true)
			.with_vectors(false)
			.order_by(order_by);
		let response = self.client.scroll(scroll).await?;

		Ok(response
			.result
			.into_iter()
			.filter_map(|point| to_indexed_note(point.id.as_ref(), &point.payload, None))
			.collect())
	}

	async fn search_nearest(&self, vector: &[f32], limit: u32) -> Result<Vec<IndexedNote>> {
		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector.to_vec()))
			.limit(limit as u64)
			.with_payload(true);
		let response = self.client.query(search).await?;

		Ok(response
			.result
			.into_iter()
			.filter_map(|point| {
				to_indexed_note(point.id.as_ref(), &point.payload, Some(point.score))
			})
			.collect())
	}

	async fn delete_notes(&self, note_ids: &[Uuid]) -> Result<()> {
		if note_ids.is_empty() {
			return Ok(());
		}

		let ids = note_ids.iter().map(|id| PointId::from(id.to_string())).collect::<Vec<_>>();
		let delete = DeletePointsBuilder::new(self.collection.clone())
			.points(PointsIdsList { ids })
			.wait(true);

		self.client.delete_points(delete).await?;

		Ok(())
	}

	async fn drop_collection(&self) -> Result<()> {
		match self.client.delete_collection(self.collection.clone()).await {
			Ok(_) => {},
			Err(err) =>
				if is_missing_collection_error(&err) {
					tracing::info!(collection = %self.collection, "Qdrant collection missing during drop.");
				} else {
					return Err(err.into());
				},
		}

		Ok(())
	}
}
impl VectorIndex for QdrantStore {
	fn collection(&self) -> &str {
		&self.collection
	}

	fn collection_exists(&self) -> BoxFuture<'_, Result<bool>> {
		Box::pin(self.exists())
	}

	fn collection_vector_dim(&self) -> BoxFuture<'_, Result<Option<u32>>> {
		Box::pin(self.configured_dim())
	}

	fn create_collection(&self, vector_dim: u32) -> BoxFuture<'_, Result<()>> {
		Box::pin(self.create(vector_dim))
	}

	fn ensure_payload_index(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(self.create_created_at_index())
	}

	fn upsert<'a>(&'a self, points: &'a [NotePoint]) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.upsert_notes(points))
	}

	fn scroll(&self, limit: u32) -> BoxFuture<'_, Result<Vec<IndexedNote>>> {
		Box::pin(self.scroll_recent(limit))
	}

	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<IndexedNote>>> {
		Box::pin(self.search_nearest(vector, limit))
	}

	fn delete<'a>(&'a self, note_ids: &'a [Uuid]) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.delete_notes(note_ids))
	}

	fn delete_collection(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(self.drop_collection())
	}
}

fn payload_map(note: &NotePoint) -> HashMap<String, Value> {
	let mut payload_map = HashMap::new();

	payload_map.insert(TEXT_FIELD.to_string(), Value::from(note.text.clone()));
	payload_map.insert(CREATED_AT_FIELD.to_string(), Value::from(models::unix_ms(note.created_at)));

	payload_map
}

fn to_indexed_note(
	point_id: Option<&PointId>,
	payload: &HashMap<String, Value>,
	score: Option<f32>,
) -> Option<IndexedNote> {
	let Some(note_id) = point_id.and_then(point_id_to_uuid) else {
		tracing::warn!(?point_id, "Skipping Qdrant point without a UUID id.");

		return None;
	};
	let Some(text) = payload_string(payload, TEXT_FIELD) else {
		tracing::warn!(%note_id, "Skipping Qdrant point without a text payload.");

		return None;
	};
	let created_at = payload_i64(payload, CREATED_AT_FIELD).and_then(models::from_unix_ms);

	Some(IndexedNote { note_id, text, created_at, score })
}

fn point_id_to_uuid(point_id: &PointId) -> Option<Uuid> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Uuid::parse_str(id).ok(),
		_ => None,
	}
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	match &payload.get(key)?.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	}
}

fn payload_i64(payload: &HashMap<String, Value>, key: &str) -> Option<i64> {
	match &payload.get(key)?.kind {
		Some(Kind::IntegerValue(value)) => Some(*value),
		Some(Kind::DoubleValue(value)) =>
			if value.fract() == 0.0 {
				Some(*value as i64)
			} else {
				None
			},
		_ => None,
	}
}

fn is_missing_collection_error(err: &QdrantError) -> bool {
	is_missing_collection_message(&err.to_string())
}

fn is_missing_collection_message(message: &str) -> bool {
	let message = message.to_lowercase();

	message.contains("not found") || message.contains("404") || message.contains("doesn't exist")
}
