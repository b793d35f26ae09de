pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Remote catalog unavailable: {message}")]
	RemoteUnavailable { message: String },
	#[error("Search is offline. Retry to reconnect.")]
	Offline,
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
}
impl Error {
	pub fn is_remote(&self) -> bool {
		matches!(self, Self::RemoteUnavailable { .. })
	}
}

impl From<discover_providers::Error> for Error {
	fn from(err: discover_providers::Error) -> Self {
		Self::RemoteUnavailable { message: err.to_string() }
	}
}
