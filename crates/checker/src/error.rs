use thiserror::Error;

/// Errors raised while loading a [`crate::CheckerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The document is not valid TOML or does not match the schema.
	#[error("invalid checker config: {0}")]
	Parse(#[from] toml::de::Error),
	/// `chunk_size` must be positive.
	#[error("chunk_size must be at least 1")]
	ZeroChunkSize,
	/// `chunk_size` exceeds the supported maximum.
	#[error("chunk_size {size} exceeds maximum {max}")]
	ChunkSizeTooLarge { size: usize, max: usize },
}
