use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read discover config at {path:?}.")]
	ReadConfig { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse discover config at {path:?}.")]
	ParseConfig { path: PathBuf, source: toml::de::Error },
	#[error("Failed to parse inline discover config.")]
	ParseInline(#[from] toml::de::Error),
	#[error("Invalid discover config: {message}")]
	Validation { message: String },
}
