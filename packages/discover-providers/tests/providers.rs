use std::collections::{BTreeMap, HashMap};

use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value, json};

use discover_config::Catalog;
use discover_providers::{aggregate, lookup, search};
use discover_testkit::{CatalogData, MockCatalog, fixtures};

fn catalog_config(api_base: &str) -> Catalog {
	Catalog {
		api_base: api_base.to_string(),
		search_path: discover_testkit::SEARCH_PATH.to_string(),
		aggregate_path: discover_testkit::AGGREGATE_PATH.to_string(),
		result_path: discover_testkit::RESULT_PATH.to_string(),
		timeout_ms: 5_000,
		api_key: None,
		default_headers: Map::new(),
	}
}

#[test]
fn builds_bearer_auth_header_only_with_key() {
	let headers = discover_providers::request_headers(Some("secret"), &Map::new())
		.expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");

	let anonymous =
		discover_providers::request_headers(None, &Map::new()).expect("Failed to build headers.");

	assert!(anonymous.get(AUTHORIZATION).is_none());
}

#[test]
fn rejects_non_string_default_headers() {
	let mut headers = Map::new();

	headers.insert("x-retries".to_string(), json!(3));

	assert!(discover_providers::request_headers(None, &headers).is_err());
}

#[tokio::test]
async fn fetches_aggregations_search_and_records() {
	let mut records = HashMap::new();

	records.insert("study-1".to_string(), fixtures::dataset("study-1", "NCDS"));

	let server = MockCatalog::start(CatalogData {
		aggregations: fixtures::aggregations(),
		search: json!({ "results": [fixtures::dataset_stub("study-1", "NCDS")], "num_hits": 41 }),
		records,
	})
	.await
	.expect("Failed to start mock catalog.");
	let cfg = catalog_config(server.api_base());

	let aggregations =
		aggregate::fetch_aggregate_filters(&cfg).await.expect("Failed to fetch aggregations.");
	let keys: Vec<&str> = aggregations.keys().map(String::as_str).collect();

	assert_eq!(keys.first(), Some(&"sample_size"));
	assert_eq!(keys.len(), 6);

	let filters = BTreeMap::from([
		("country_codes".to_string(), vec!["GB".to_string()]),
		("study_design".to_string(), Vec::new()),
	]);
	let page = search::fetch_search_results(&cfg, "cohort", &filters, 1, 25)
		.await
		.expect("Failed to fetch search results.");

	assert_eq!(page.num_hits, 41);
	assert_eq!(page.results.len(), 1);

	let requests = server.search_requests();

	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0]["filters"], json!({ "country_codes": ["GB"] }));
	assert_eq!(requests[0]["num_results"], json!(25));

	let record =
		lookup::fetch_result_by_uuid(&cfg, "study-1").await.expect("Failed to fetch record.");

	assert_eq!(record["dataset_schema"]["name"], Value::String("NCDS".to_string()));
	assert_eq!(server.lookups(), 1);

	server.shutdown();
}

#[tokio::test]
async fn missing_record_is_an_http_error() {
	let server =
		MockCatalog::start(CatalogData::default()).await.expect("Failed to start mock catalog.");
	let cfg = catalog_config(server.api_base());
	let err = lookup::fetch_result_by_uuid(&cfg, "missing").await.expect_err("Expected 404.");

	assert!(matches!(err, discover_providers::Error::Reqwest(_)));
}
