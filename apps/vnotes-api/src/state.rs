use std::sync::Arc;

use vnotes_service::NoteStore;
use vnotes_storage::qdrant::QdrantStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<NoteStore>,
}
impl AppState {
	/// Connects to Qdrant and makes sure the notes collection exists before serving.
	pub async fn new(config: vnotes_config::Config) -> color_eyre::Result<Self> {
		let qdrant = QdrantStore::new(&config.storage.qdrant)?;
		let service = NoteStore::new(config, Arc::new(qdrant));

		service.ensure_collection().await?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: NoteStore) -> Self {
		Self { service: Arc::new(service) }
	}
}
