use std::path::PathBuf;

/// Library-level structured errors for tinyconfig.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum TinyConfigError {
	#[error("Failed to parse default config text")]
	DefaultsParseError {
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to resolve the directory of the running executable")]
	ExecutableDirNotFound {
		#[source]
		source: Option<std::io::Error>,
	},
}

/// Result type alias using TinyConfigError.
pub type Result<T> = std::result::Result<T, TinyConfigError>;
