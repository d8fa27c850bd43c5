use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Invalid vector: {0}")]
	InvalidVector(String),
	#[error("Storage corruption: {0}")]
	Corruption(String),
	#[error("Unsupported index version: {0}")]
	UnsupportedVersion(u32),
	#[error("Index was built with embedding model '{stored}' but '{configured}' is configured")]
	ModelMismatch { stored: String, configured: String },
	#[error("Serialization error: {0}")]
	Serialization(String),
}

impl IndexError {
	pub fn code(&self) -> &str {
		match self {
			Self::Io(_) => "INDEX_IO",
			Self::InvalidVector(_) => "INDEX_INVALID_VECTOR",
			Self::Corruption(_) => "INDEX_CORRUPT",
			Self::UnsupportedVersion(_) => "INDEX_VERSION",
			Self::ModelMismatch { .. } => "INDEX_MODEL_MISMATCH",
			Self::Serialization(_) => "INDEX_SERIALIZATION",
		}
	}
}
