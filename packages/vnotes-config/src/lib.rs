mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Notes, Providers, Qdrant, Service, Storage,
	TranscriptionProviderConfig,
};

use std::{env, fs, path::Path};

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_QDRANT_URL: &str = "QDRANT_URL";
pub const ENV_QDRANT_API_KEY: &str = "QDRANT_API_KEY";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	apply_env_overrides(&mut cfg, |key| env::var(key).ok());

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Fills secrets and connection parameters from the environment.
///
/// `OPENAI_API_KEY` only fills provider keys left empty in the file, while the Qdrant
/// variables always win over the file.
pub fn apply_env_overrides<F>(cfg: &mut Config, lookup: F)
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(key) = lookup(ENV_OPENAI_API_KEY).filter(|key| !key.trim().is_empty()) {
		if cfg.providers.embedding.api_key.trim().is_empty() {
			cfg.providers.embedding.api_key = key.clone();
		}
		if cfg.providers.transcription.api_key.trim().is_empty() {
			cfg.providers.transcription.api_key = key;
		}
	}
	if let Some(url) = lookup(ENV_QDRANT_URL).filter(|url| !url.trim().is_empty()) {
		cfg.storage.qdrant.url = url;
	}
	if let Some(key) = lookup(ENV_QDRANT_API_KEY) {
		cfg.storage.qdrant.api_key = Some(key);
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.url.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.url must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.notes.max_note_chars == 0 {
		return Err(Error::Validation {
			message: "notes.max_note_chars must be greater than zero.".to_string(),
		});
	}

	for (label, key, timeout_ms) in [
		("embedding", &cfg.providers.embedding.api_key, cfg.providers.embedding.timeout_ms),
		(
			"transcription",
			&cfg.providers.transcription.api_key,
			cfg.providers.transcription.timeout_ms,
		),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!(
					"Provider {label} api_key must be non-empty. Set it in the config file or via {ENV_OPENAI_API_KEY}."
				),
			});
		}
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
	}

	if cfg.providers.transcription.model.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.transcription.model must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.qdrant.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.storage.qdrant.api_key = None;
	}

	for api_base in
		[&mut cfg.providers.embedding.api_base, &mut cfg.providers.transcription.api_base]
	{
		while api_base.ends_with('/') {
			api_base.pop();
		}
	}
}
