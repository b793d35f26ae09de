use serde::Deserialize;
use serde_json::{Map, Value};

pub const UUID_PLACEHOLDER: &str = "{uuid}";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub catalog: Catalog,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
	pub api_base: String,
	#[serde(default = "default_search_path")]
	pub search_path: String,
	#[serde(default = "default_aggregate_path")]
	pub aggregate_path: String,
	/// Must contain the `{uuid}` placeholder.
	#[serde(default = "default_result_path")]
	pub result_path: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	pub api_key: Option<String>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	#[serde(default = "default_page_size")]
	pub page_size: u32,
	#[serde(default = "default_max_page_size")]
	pub max_page_size: u32,
	#[serde(default = "default_debounce_ms")]
	pub debounce_ms: u64,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			page_size: default_page_size(),
			max_page_size: default_max_page_size(),
			debounce_ms: default_debounce_ms(),
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_search_path() -> String {
	"/discover/search".to_string()
}

fn default_aggregate_path() -> String {
	"/discover/aggregate".to_string()
}

fn default_result_path() -> String {
	format!("/discover/get_by_uuid/{UUID_PLACEHOLDER}")
}

fn default_timeout_ms() -> u64 {
	60_000
}

fn default_page_size() -> u32 {
	50
}

fn default_max_page_size() -> u32 {
	500
}

fn default_debounce_ms() -> u64 {
	300
}
