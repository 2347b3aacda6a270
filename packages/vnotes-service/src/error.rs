pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	Validation { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	/// True when an external collaborator (embedding, transcription or the index) failed.
	pub fn is_external(&self) -> bool {
		matches!(self, Self::Provider { .. } | Self::Storage { .. })
	}
}

impl From<vnotes_providers::Error> for Error {
	fn from(err: vnotes_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<vnotes_storage::Error> for Error {
	fn from(err: vnotes_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
