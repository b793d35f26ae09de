use serde_json::{Map, Value};

use crate::{Error, Result};

pub async fn fetch_aggregate_filters(cfg: &discover_config::Catalog) -> Result<Map<String, Value>> {
	let client = crate::client(cfg)?;
	let res = client.get(crate::endpoint(cfg, &cfg.aggregate_path)).send().await?;
	let json: Value = res.error_for_status()?.json().await?;
	let aggregations = parse_aggregate_response(json)?;

	tracing::debug!(fields = aggregations.len(), "Fetched aggregations.");

	Ok(aggregations)
}

fn parse_aggregate_response(json: Value) -> Result<Map<String, Value>> {
	let Value::Object(mut body) = json else {
		return Err(Error::InvalidResponse {
			message: "Aggregate response must be an object.".to_string(),
		});
	};

	if let Some(Value::Object(aggregations)) = body.get_mut("aggregations") {
		return Ok(std::mem::take(aggregations));
	}

	Ok(body)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unwraps_aggregations_key() {
		let json = serde_json::json!({
			"aggregations": { "sample_size": { "statistics": { "minimum": 1 } } }
		});
		let parsed = parse_aggregate_response(json).expect("Failed to parse aggregate response.");

		assert!(parsed.contains_key("sample_size"));
	}

	#[test]
	fn keeps_field_order() {
		let json = serde_json::json!({ "b": {}, "a": {}, "c": {} });
		let parsed = parse_aggregate_response(json).expect("Failed to parse aggregate response.");
		let keys: Vec<&str> = parsed.keys().map(String::as_str).collect();

		assert_eq!(keys, vec!["b", "a", "c"]);
	}

	#[test]
	fn rejects_non_object_body() {
		assert!(parse_aggregate_response(serde_json::json!([])).is_err());
	}
}
