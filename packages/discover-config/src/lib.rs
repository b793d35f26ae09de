mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Catalog, Config, Search, Service, UUID_PLACEHOLDER};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseInline(source) => Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	let api_base = cfg.catalog.api_base.trim();

	if api_base.is_empty() {
		return Err(Error::Validation {
			message: "catalog.api_base must be non-empty.".to_string(),
		});
	}
	if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
		return Err(Error::Validation {
			message: "catalog.api_base must start with http:// or https://.".to_string(),
		});
	}
	if !cfg.catalog.result_path.contains(UUID_PLACEHOLDER) {
		return Err(Error::Validation {
			message: format!(
				"catalog.result_path must contain the {UUID_PLACEHOLDER} placeholder."
			),
		});
	}
	if cfg.catalog.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "catalog.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (key, value) in &cfg.catalog.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("catalog.default_headers.{key} must be a string."),
			});
		}
	}

	if cfg.search.max_page_size == 0 {
		return Err(Error::Validation {
			message: "search.max_page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.page_size == 0 {
		return Err(Error::Validation {
			message: "search.page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.page_size > cfg.search.max_page_size {
		return Err(Error::Validation {
			message: "search.page_size must not exceed search.max_page_size.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.catalog.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.catalog.api_key = None;
	}

	let trimmed = cfg.catalog.api_base.trim().trim_end_matches('/').to_string();

	cfg.catalog.api_base = trimmed;
}
