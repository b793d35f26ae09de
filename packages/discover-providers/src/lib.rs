pub mod aggregate;
pub mod lookup;
pub mod search;

mod error;

pub use error::{Error, Result};
pub use search::SearchPage;

use std::time::Duration;

use reqwest::{
	Client,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

pub fn request_headers(
	api_key: Option<&str>,
	default_headers: &Map<String, Value>,
) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(api_key) = api_key {
		headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

pub(crate) fn client(cfg: &discover_config::Catalog) -> Result<Client> {
	let headers = request_headers(cfg.api_key.as_deref(), &cfg.default_headers)?;

	Ok(Client::builder()
		.user_agent(discover_cli::USER_AGENT)
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.default_headers(headers)
		.build()?)
}

pub(crate) fn endpoint(cfg: &discover_config::Catalog, path: &str) -> String {
	format!("{}{}", cfg.api_base, path)
}
