use std::collections::HashSet;

use serde_json::Value;
use url::Url;

use crate::{
	record::{self, Field, RawSearchResult},
	study::Organization,
};

pub const DOI_RESOLVER: &str = "https://doi.org/";

const RECORD_LINK_FIELDS: &[Field] = &[
	Field::Top("url"),
	Field::Extra("url"),
	Field::Top("original_source_url"),
	Field::Extra("original_source_url"),
	Field::Top("doi"),
	Field::Extra("doi"),
];

#[derive(Debug, Default)]
pub struct ResolvedCatalogs {
	pub catalogs: Vec<Organization>,
	pub used_urls: HashSet<String>,
}

pub fn resolve_catalogs(record: &RawSearchResult) -> ResolvedCatalogs {
	let dataset_urls = schema_urls(record);
	let mut resolved = ResolvedCatalogs::default();

	for entry in record::entries(record.schema_field("includedInDataCatalog")) {
		if !entry.is_object() {
			continue;
		}

		let Some(name) = entry.get("name").and_then(record::text) else {
			continue;
		};
		let mut catalog = Organization::from_value(entry, name);

		catalog.url = catalog.url.map(|url| specific_url(&url, &dataset_urls).unwrap_or(url));

		if let Some(url) = catalog.url.as_ref() {
			resolved.used_urls.insert(url.clone());
		}

		resolved.catalogs.push(catalog);
	}

	resolved
}

pub fn additional_links(record: &RawSearchResult, used_urls: &HashSet<String>) -> Vec<String> {
	let identifiers = record::entries(record.schema_field("identifier"))
		.into_iter()
		.filter_map(identifier_text)
		.filter_map(link_for);
	let urls = schema_urls(record).into_iter();
	let singular = RECORD_LINK_FIELDS
		.iter()
		.filter_map(|field| field.lookup(record).and_then(record::text))
		.filter_map(link_for);
	let mut seen = HashSet::new();
	let mut links = Vec::new();

	for link in identifiers.chain(urls).chain(singular) {
		if used_urls.contains(&link) || !seen.insert(link.clone()) {
			continue;
		}

		links.push(link);
	}

	links
}

pub fn link_for(raw: &str) -> Option<String> {
	let trimmed = raw.trim();

	if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
		return Some(trimmed.to_string());
	}
	if trimmed.starts_with("10.") && trimmed.contains('/') {
		return Some(format!("{DOI_RESOLVER}{trimmed}"));
	}

	None
}

pub fn host_of(raw: &str) -> Option<String> {
	Url::parse(raw.trim()).ok()?.host_str().map(str::to_string)
}

fn specific_url(catalog_url: &str, dataset_urls: &[String]) -> Option<String> {
	let catalog_host = host_of(catalog_url)?;

	dataset_urls.iter().find(|url| host_of(url).as_deref() == Some(catalog_host.as_str())).cloned()
}

fn schema_urls(record: &RawSearchResult) -> Vec<String> {
	record::entries(record.schema_field("url"))
		.into_iter()
		.filter_map(record::text)
		.map(str::to_string)
		.collect()
}

fn identifier_text(value: &Value) -> Option<&str> {
	match value {
		Value::Object(_) => ["value", "@id", "url"]
			.into_iter()
			.find_map(|key| value.get(key).and_then(record::text)),
		_ => record::text(value),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn bare_dois_become_resolver_links() {
		assert_eq!(
			link_for("10.5255/UKDA-SN-5545-4").as_deref(),
			Some("https://doi.org/10.5255/UKDA-SN-5545-4")
		);
		assert_eq!(link_for("10.5255"), None);
		assert_eq!(link_for("SN 5545"), None);
	}

	#[test]
	fn catalog_prefers_dataset_url_on_same_host() {
		let record = RawSearchResult::new(json!({
			"dataset_schema": {
				"url": ["https://www.cls.ucl.ac.uk/ncds", "https://example.org/ncds"],
				"includedInDataCatalog": [
					{ "name": "CLS", "url": "https://www.cls.ucl.ac.uk/", "image": "cls.png" }
				]
			}
		}));
		let resolved = resolve_catalogs(&record);

		assert_eq!(resolved.catalogs.len(), 1);
		assert_eq!(resolved.catalogs[0].url.as_deref(), Some("https://www.cls.ucl.ac.uk/ncds"));
		assert_eq!(resolved.catalogs[0].logo.as_deref(), Some("cls.png"));
		assert!(resolved.used_urls.contains("https://www.cls.ucl.ac.uk/ncds"));
	}

	#[test]
	fn unparseable_catalog_url_is_kept_as_is() {
		let record = RawSearchResult::new(json!({
			"dataset_schema": {
				"url": ["https://example.org/study"],
				"includedInDataCatalog": [{ "name": "Broken", "url": "not a url" }]
			}
		}));
		let resolved = resolve_catalogs(&record);

		assert_eq!(resolved.catalogs[0].url.as_deref(), Some("not a url"));
	}

	#[test]
	fn additional_links_skip_used_and_duplicate_urls() {
		let record = RawSearchResult::new(json!({
			"doi": "10.1000/xyz",
			"url": "https://example.org/study",
			"dataset_schema": {
				"identifier": ["https://example.org/study", { "value": "10.1000/xyz" }, "local-id"],
				"url": ["https://catalog.org/study", "https://example.org/study"]
			}
		}));
		let used = HashSet::from(["https://catalog.org/study".to_string()]);

		assert_eq!(
			additional_links(&record, &used),
			vec!["https://example.org/study".to_string(), "https://doi.org/10.1000/xyz".to_string()]
		);
	}
}
