//! Checker configuration.
//!
//! Configuration is read from TOML. Every field is optional and falls back to
//! [`CheckerConfig::default`]:
//!
//! ```toml
//! async_enabled = true
//! chunk_size = 16384
//! check_grammar = true
//! auto_correct = false
//! ambiguous_boundaries = ["'", "’"]
//! context_chars = 256
//! ```

use serde::Deserialize;

use crate::error::ConfigError;

/// Default size of one batch chunk, in chars.
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Largest accepted chunk size, in chars.
pub const MAX_CHUNK_SIZE: usize = 1 << 20;

/// Default amount of paragraph context sent around an incremental check, in chars.
pub const DEFAULT_CONTEXT_CHARS: usize = 256;

/// Settings for the checking pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
	/// Route checks through the asynchronous backend path.
	pub async_enabled: bool,
	/// Maximum chars per batch request before sentence snapping.
	pub chunk_size: usize,
	/// Request grammar checking alongside spelling.
	pub check_grammar: bool,
	/// Apply backend autocorrections to incremental spelling results.
	pub auto_correct: bool,
	/// Characters that may end a word or continue it, such as apostrophes.
	///
	/// A spelling result ending right before one of these, with the caret just after
	/// it, is suppressed because the user may still be typing the word.
	pub ambiguous_boundaries: Vec<char>,
	/// Chars of paragraph context sent on each side of an incremental check.
	pub context_chars: usize,
}

impl Default for CheckerConfig {
	fn default() -> Self {
		Self {
			async_enabled: true,
			chunk_size: DEFAULT_CHUNK_SIZE,
			check_grammar: true,
			auto_correct: false,
			ambiguous_boundaries: vec!['\'', '\u{2019}'],
			context_chars: DEFAULT_CONTEXT_CHARS,
		}
	}
}

impl CheckerConfig {
	/// Parses and validates a TOML configuration document.
	pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks value ranges that the type system does not capture.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.chunk_size == 0 {
			return Err(ConfigError::ZeroChunkSize);
		}
		if self.chunk_size > MAX_CHUNK_SIZE {
			return Err(ConfigError::ChunkSizeTooLarge {
				size: self.chunk_size,
				max: MAX_CHUNK_SIZE,
			});
		}
		Ok(())
	}

	/// Returns true if `c` is configured as an ambiguous word boundary.
	pub fn is_ambiguous_boundary(&self, c: char) -> bool {
		self.ambiguous_boundaries.contains(&c)
	}
}
