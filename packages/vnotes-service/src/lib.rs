pub mod add_note;
pub mod collection;
pub mod delete;
pub mod list;
pub mod time_serde;
pub mod transcribe;

mod error;

pub use add_note::{AddNoteRequest, AddNoteResponse};
pub use delete::DeleteResponse;
pub use error::{Error, Result};
pub use list::{ListItem, ListRequest, ListResponse};
pub use transcribe::{TranscribeRequest, TranscribeResponse};
pub use vnotes_storage::BoxFuture;

use std::sync::{Arc, Mutex};

use vnotes_config::{Config, EmbeddingProviderConfig, TranscriptionProviderConfig};
use vnotes_providers::{embedding, transcription};
use vnotes_storage::VectorIndex;

/// Upper bound on the number of notes returned by one listing or search.
pub const LIST_LIMIT: u32 = 10;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

pub trait TranscriptionProvider
where
	Self: Send + Sync,
{
	fn transcribe<'a>(
		&'a self,
		cfg: &'a TranscriptionProviderConfig,
		audio: &'a [u8],
		format: &'a str,
	) -> BoxFuture<'a, Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub transcription: Arc<dyn TranscriptionProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		transcription: Arc<dyn TranscriptionProvider>,
	) -> Self {
		Self { embedding, transcription }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), transcription: provider }
	}
}

/// The note lifecycle on top of one vector index collection.
///
/// Built once at startup and shared behind an `Arc`; every operation is a short sequential
/// chain of external calls with no retries.
pub struct NoteStore {
	pub cfg: Config,
	pub index: Arc<dyn VectorIndex>,
	pub providers: Providers,
	last_transcript: Mutex<Option<transcribe::Transcript>>,
}
impl NoteStore {
	pub fn new(cfg: Config, index: Arc<dyn VectorIndex>) -> Self {
		Self::with_providers(cfg, index, Providers::default())
	}

	pub fn with_providers(cfg: Config, index: Arc<dyn VectorIndex>, providers: Providers) -> Self {
		Self { cfg, index, providers, last_transcript: Mutex::new(None) }
	}

	pub(crate) async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
		let texts = [text.to_string()];
		let mut vectors =
			self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await?;

		if vectors.len() != 1 {
			return Err(Error::Provider {
				message: format!(
					"Embedding provider returned {} vectors for one input.",
					vectors.len()
				),
			});
		}

		let vector = vectors.pop().unwrap_or_default();

		if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}
		if vector.iter().any(|value| !value.is_finite()) {
			return Err(Error::Provider {
				message: "Embedding vector contains non-finite values.".to_string(),
			});
		}

		Ok(vector)
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}
impl TranscriptionProvider for DefaultProviders {
	fn transcribe<'a>(
		&'a self,
		cfg: &'a TranscriptionProviderConfig,
		audio: &'a [u8],
		format: &'a str,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(transcription::transcribe(cfg, audio, format).await?) })
	}
}
