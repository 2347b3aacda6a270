pub mod index;
pub mod providers;

mod error;

pub use error::{Error, Result};
pub use index::InMemoryIndex;
pub use providers::{FailingEmbedding, KeywordEmbedding, StubTranscription};

use std::{env, thread, time::Duration};

use qdrant_client::Qdrant;
use serde_json::Map;
use tokio::{runtime::Builder, time};
use uuid::Uuid;

use vnotes_config::{
	Config, EmbeddingProviderConfig, Notes, Providers, Qdrant as QdrantConfig, Service, Storage,
	TranscriptionProviderConfig,
};

pub const QDRANT_URL_ENV: &str = "VNOTES_QDRANT_URL";

pub fn env_qdrant_url() -> Option<String> {
	env::var(QDRANT_URL_ENV).ok()
}

/// A valid configuration pointing at `qdrant_url` with small vectors.
pub fn test_config(qdrant_url: &str, collection: &str, vector_dim: u32) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			qdrant: QdrantConfig {
				url: qdrant_url.to_string(),
				api_key: None,
				collection: collection.to_string(),
				vector_dim,
			},
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test-embedding".to_string(),
				dimensions: vector_dim,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			transcription: TranscriptionProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/audio/transcriptions".to_string(),
				model: "test-transcription".to_string(),
				response_format: "verbose_json".to_string(),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		notes: Notes { max_note_chars: 200 },
	}
}

/// A uniquely named Qdrant collection that is dropped on cleanup or drop.
pub struct TestCollection {
	qdrant_url: String,
	name: String,
	cleaned: bool,
}
impl TestCollection {
	pub fn new(qdrant_url: impl Into<String>, prefix: &str) -> Self {
		Self {
			qdrant_url: qdrant_url.into(),
			name: format!("{prefix}_{}", Uuid::new_v4().simple()),
			cleaned: false,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn qdrant_url(&self) -> &str {
		&self.qdrant_url
	}

	pub async fn cleanup(mut self) -> Result<()> {
		cleanup_qdrant_collection(&self.qdrant_url, &self.name).await?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestCollection {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}

		let qdrant_url = self.qdrant_url.clone();
		let name = self.name.clone();
		let cleanup_thread = thread::spawn(move || {
			let runtime = match Builder::new_current_thread().enable_all().build() {
				Ok(runtime) => runtime,
				Err(err) => {
					eprintln!("Test Qdrant cleanup failed: {err}.");

					return;
				},
			};

			if let Err(err) = runtime.block_on(cleanup_qdrant_collection(&qdrant_url, &name)) {
				eprintln!("Test Qdrant cleanup failed: {err}.");
			}
		});
		let _ = cleanup_thread.join();
	}
}

async fn cleanup_qdrant_collection(qdrant_url: &str, collection: &str) -> Result<()> {
	let client = Qdrant::from_url(qdrant_url)
		.build()
		.map_err(|err| Error::Message(format!("Failed to build Qdrant client: {err}.")))?;
	let max_attempts = 6;
	let mut backoff = Duration::from_millis(100);

	for attempt in 1..=max_attempts {
		let exists = time::timeout(Duration::from_secs(10), client.collection_exists(collection))
			.await
			.map_err(|_| Error::Message("Qdrant collection_exists timed out.".to_string()))??;

		if !exists {
			return Ok(());
		}

		match time::timeout(Duration::from_secs(10), client.delete_collection(collection)).await {
			Ok(Ok(_)) => return Ok(()),
			Ok(Err(err)) =>
				if attempt == max_attempts {
					return Err(Error::Message(format!(
						"Failed to delete Qdrant collection {collection:?} after {attempt} attempts: {err}."
					)));
				},
			Err(_) =>
				if attempt == max_attempts {
					return Err(Error::Message(format!(
						"Timed out deleting Qdrant collection {collection:?} after {attempt} attempts."
					)));
				},
		}

		time::sleep(backoff).await;

		backoff = backoff.saturating_mul(2).min(Duration::from_secs(2));
	}

	Ok(())
}
