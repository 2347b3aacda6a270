use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use vnotes_storage::{VectorIndex, models::NotePoint, qdrant::QdrantStore};
use vnotes_testkit::TestCollection;

const VECTOR_DIM: u32 = 4;

fn point(text: &str, vector: [f32; 4], created_at: OffsetDateTime) -> NotePoint {
	NotePoint { note_id: Uuid::new_v4(), text: text.to_string(), vector: vector.to_vec(), created_at }
}

fn store_for(collection: &TestCollection) -> QdrantStore {
	let cfg = vnotes_testkit::test_config(collection.qdrant_url(), collection.name(), VECTOR_DIM);

	QdrantStore::new(&cfg.storage.qdrant).expect("Failed to build Qdrant client.")
}

#[tokio::test]
#[ignore = "Requires external Qdrant. Set VNOTES_QDRANT_URL to run."]
async fn notes_round_trip_through_qdrant() {
	let Some(qdrant_url) = vnotes_testkit::env_qdrant_url() else {
		eprintln!("Skipping Qdrant smoke test; set VNOTES_QDRANT_URL to run this test.");

		return;
	};
	let collection = TestCollection::new(qdrant_url, "vnotes_smoke");
	let store = store_for(&collection);

	assert!(!store.collection_exists().await.expect("Failed to check collection."));

	store.create_collection(VECTOR_DIM).await.expect("Failed to create collection.");

	assert_eq!(
		store.collection_vector_dim().await.expect("Failed to read collection info."),
		Some(VECTOR_DIM)
	);

	store.ensure_payload_index().await.expect("Failed to index payload.");
	store.ensure_payload_index().await.expect("Payload indexing must be repeatable.");

	let now = OffsetDateTime::now_utc();
	let milk = point("buy milk", [1.0, 0.0, 0.0, 0.1], now - Duration::seconds(10));
	let dentist = point("schedule dentist", [0.0, 1.0, 0.0, 0.1], now);

	store.upsert(&[milk.clone(), dentist.clone()]).await.expect("Failed to upsert notes.");

	let recent = store.scroll(10).await.expect("Failed to scroll notes.");

	assert_eq!(recent.len(), 2);
	assert_eq!(recent[0].note_id, dentist.note_id);
	assert_eq!(recent[1].text, "buy milk");
	assert!(recent.iter().all(|note| note.score.is_none()));

	let found = store.search(&[0.9, 0.0, 0.0, 0.1], 10).await.expect("Failed to search notes.");

	assert_eq!(found[0].note_id, milk.note_id);
	assert!(found[0].score.unwrap_or_default() > found[1].score.unwrap_or_default());

	store.delete(&[milk.note_id]).await.expect("Failed to delete note.");
	store.delete(&[milk.note_id]).await.expect("Repeated delete must succeed.");

	assert_eq!(store.scroll(10).await.expect("Failed to scroll notes.").len(), 1);

	store.delete_collection().await.expect("Failed to drop collection.");
	store.delete_collection().await.expect("Dropping a missing collection must succeed.");

	assert!(!store.collection_exists().await.expect("Failed to check collection."));
	assert!(store.delete(&[dentist.note_id]).await.is_err());

	collection.cleanup().await.expect("Failed to clean up test collection.");
}
