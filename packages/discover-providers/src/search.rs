use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
	pub results: Vec<Value>,
	pub num_hits: u64,
}

#[derive(Debug, Serialize)]
struct SearchBody<'a> {
	query: &'a str,
	filters: BTreeMap<&'a str, &'a [String]>,
	page: u32,
	num_results: u32,
}

pub async fn fetch_search_results(
	cfg: &discover_config::Catalog,
	query: &str,
	filters: &BTreeMap<String, Vec<String>>,
	page: u32,
	page_size: u32,
) -> Result<SearchPage> {
	if page == 0 {
		return Err(Error::InvalidConfig {
			message: "Search page must be 1 or greater.".to_string(),
		});
	}

	let client = crate::client(cfg)?;
	let body = search_body(query, filters, page, page_size);
	let res = client.post(crate::endpoint(cfg, &cfg.search_path)).json(&body).send().await?;
	let json: Value = res.error_for_status()?.json().await?;
	let parsed = parse_search_response(json)?;

	tracing::debug!(
		page,
		num_hits = parsed.num_hits,
		returned = parsed.results.len(),
		"Fetched search page."
	);

	Ok(parsed)
}

fn search_body<'a>(
	query: &'a str,
	filters: &'a BTreeMap<String, Vec<String>>,
	page: u32,
	page_size: u32,
) -> SearchBody<'a> {
	let filters = filters
		.iter()
		.filter(|(_, values)| !values.is_empty())
		.map(|(key, values)| (key.as_str(), values.as_slice()))
		.collect();

	SearchBody { query, filters, page, num_results: page_size }
}

fn parse_search_response(json: Value) -> Result<SearchPage> {
	let results = json
		.get("results")
		.and_then(Value::as_array)
		.cloned()
		.ok_or_else(|| Error::InvalidResponse {
			message: "Search response is missing results array.".to_string(),
		})?;
	let num_hits =
		json.get("num_hits").and_then(Value::as_u64).unwrap_or(results.len() as u64);

	Ok(SearchPage { results, num_hits })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_empty_filters() {
		let filters = BTreeMap::from([
			("country_codes".to_string(), vec!["GB".to_string()]),
			("study_design".to_string(), Vec::new()),
		]);
		let body = serde_json::to_value(search_body("sleep", &filters, 2, 50))
			.expect("Failed to serialize search body.");

		assert_eq!(
			body,
			serde_json::json!({
				"query": "sleep",
				"filters": { "country_codes": ["GB"] },
				"page": 2,
				"num_results": 50
			})
		);
	}

	#[test]
	fn num_hits_defaults_to_result_count() {
		let parsed = parse_search_response(serde_json::json!({ "results": [{}, {}] }))
			.expect("Failed to parse search response.");

		assert_eq!(parsed.num_hits, 2);
	}

	#[test]
	fn rejects_missing_results() {
		assert!(parse_search_response(serde_json::json!({ "num_hits": 3 })).is_err());
	}
}
