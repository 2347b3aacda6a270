use std::sync::atomic::{AtomicUsize, Ordering};

use vnotes_config::{EmbeddingProviderConfig, TranscriptionProviderConfig};
use vnotes_service::{BoxFuture, EmbeddingProvider, Error, Result, TranscriptionProvider};

/// Deterministic embeddings built from keyword axes.
///
/// Each word that matches a keyword adds one to that keyword's axis, and the last component
/// carries a small constant so no vector is all zeros.
pub struct KeywordEmbedding {
	axes: Vec<(String, usize)>,
	dimensions: Option<usize>,
	calls: AtomicUsize,
}
impl KeywordEmbedding {
	pub fn new<I, S>(axes: I) -> Self
	where
		I: IntoIterator<Item = (S, usize)>,
		S: Into<String>,
	{
		Self {
			axes: axes.into_iter().map(|(word, axis)| (word.into(), axis)).collect(),
			dimensions: None,
			calls: AtomicUsize::new(0),
		}
	}

	/// Forces the vector length instead of following the provider config.
	pub fn with_dimensions(mut self, dimensions: usize) -> Self {
		self.dimensions = Some(dimensions);

		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn vector(&self, text: &str, dimensions: usize) -> Vec<f32> {
		let mut vector = vec![0.0; dimensions.max(1)];
		let keyword_axes = vector.len().saturating_sub(1).max(1);
		let bias_axis = vector.len() - 1;

		for word in text.split(|ch: char| !ch.is_alphanumeric()).filter(|word| !word.is_empty()) {
			let word = word.to_lowercase();

			for (keyword, axis) in &self.axes {
				if *keyword == word {
					vector[axis % keyword_axes] += 1.0;
				}
			}
		}

		vector[bias_axis] += 0.1;

		vector
	}
}
impl EmbeddingProvider for KeywordEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let dimensions = self.dimensions.unwrap_or(cfg.dimensions as usize);
		let vectors = texts.iter().map(|text| self.vector(text, dimensions)).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// Always fails, standing in for an unreachable embedding endpoint.
pub struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			Err(Error::Provider { message: "error sending request for url".to_string() })
		})
	}
}

pub struct StubTranscription {
	text: String,
	calls: AtomicUsize,
}
impl StubTranscription {
	pub fn new(text: impl Into<String>) -> Self {
		Self { text: text.into(), calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl TranscriptionProvider for StubTranscription {
	fn transcribe<'a>(
		&'a self,
		_cfg: &'a TranscriptionProviderConfig,
		_audio: &'a [u8],
		_format: &'a str,
	) -> BoxFuture<'a, Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let text = self.text.clone();

		Box::pin(async move { Ok(text) })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keyword_vectors_are_deterministic_and_never_zero() {
		let embedding = KeywordEmbedding::new([("milk", 0), ("dentist", 1)]);

		assert_eq!(embedding.vector("Buy MILK", 4), vec![1.0, 0.0, 0.0, 0.1]);
		assert_eq!(embedding.vector("schedule dentist", 4), vec![0.0, 1.0, 0.0, 0.1]);
		assert_eq!(embedding.vector("nothing here", 4), vec![0.0, 0.0, 0.0, 0.1]);
	}
}
