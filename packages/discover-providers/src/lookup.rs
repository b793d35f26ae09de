use serde_json::Value;
use url::form_urlencoded;

use crate::{Error, Result};

pub async fn fetch_result_by_uuid(cfg: &discover_config::Catalog, uuid: &str) -> Result<Value> {
	let uuid = uuid.trim();

	if uuid.is_empty() {
		return Err(Error::InvalidConfig {
			message: "Record identifier must be non-empty.".to_string(),
		});
	}

	let client = crate::client(cfg)?;
	let path = result_path(&cfg.result_path, uuid);
	let res = client.get(crate::endpoint(cfg, &path)).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	tracing::debug!(uuid, "Fetched full record.");

	parse_lookup_response(json)
}

fn result_path(template: &str, uuid: &str) -> String {
	let encoded: String = form_urlencoded::byte_serialize(uuid.as_bytes()).collect();

	template.replace(discover_config::UUID_PLACEHOLDER, &encoded)
}

fn parse_lookup_response(json: Value) -> Result<Value> {
	if let Some(result) = json.get("result").filter(|value| value.is_object()) {
		return Ok(result.clone());
	}
	if let Some(first) =
		json.get("results").and_then(Value::as_array).and_then(|items| items.first())
	{
		return Ok(first.clone());
	}
	if json.get("results").is_some() {
		return Err(Error::InvalidResponse {
			message: "Record lookup returned no results.".to_string(),
		});
	}
	if json.is_object() {
		return Ok(json);
	}

	Err(Error::InvalidResponse { message: "Record lookup response must be an object.".to_string() })
}
