use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
	funders, links,
	record::{self, Field, RawSearchResult},
};

pub const UNTITLED_DATASET: &str = "Untitled Dataset";
pub const UNNAMED_VARIABLE: &str = "Unnamed Variable";

pub type Rule<T> = fn(&RawSearchResult) -> Option<T>;

static HTML_ANCHOR: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"(?i)<a[\s>]|</a\s*>").ok());

const TITLE_RULES: &[Rule<String>] = &[schema_name, schema_title];
const IMAGE_RULES: &[Rule<String>] = &[schema_image, top_image];
const GEOGRAPHIC_RULES: &[Rule<String>] = &[explicit_geographic_coverage, country_codes];
const TEMPORAL_RULES: &[Rule<String>] = &[explicit_temporal_coverage, year_span];
const SAMPLE_SIZE_RULES: &[Rule<String>] = &[explicit_sample_size, schema_size];
const RESOURCE_TYPE_RULES: &[Rule<String>] = &[extra_resource_type, schema_type];
const STUDY_DESIGN_RULES: &[Rule<Vec<String>>] = &[extra_study_design, top_study_design];
const TOPIC_RULES: &[Rule<Vec<String>>] = &[schema_keywords, top_topics];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub logo: Option<String>,
}
impl Organization {
	pub fn named(name: impl Into<String>) -> Self {
		Self { name: name.into(), url: None, logo: None }
	}

	pub fn from_value(value: &Value, default_name: &str) -> Self {
		let name = value.get("name").and_then(record::text).unwrap_or(default_name).to_string();
		let url = value.get("url").and_then(record::text).map(str::to_string);
		let logo = ["logo", "image"]
			.into_iter()
			.find_map(|key| value.get(key).and_then(record::text))
			.map(str::to_string);

		Self { name, url, logo }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableEntry {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub uuid: Option<String>,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}
impl VariableEntry {
	pub fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::String(_) => record::text(value)
				.map(|name| Self { uuid: None, name: name.to_string(), description: None }),
			Value::Object(_) => Some(Self {
				uuid: ["uuid", "@id", "id"]
					.into_iter()
					.find_map(|key| value.get(key).and_then(record::text))
					.map(str::to_string),
				name: value
					.get("name")
					.and_then(record::text)
					.unwrap_or(UNNAMED_VARIABLE)
					.to_string(),
				description: value
					.get("description")
					.and_then(record::text)
					.map(str::to_string),
			}),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyDetail {
	pub title: String,
	pub description: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub image: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub publisher: Option<Organization>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub funders: Option<Vec<Organization>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub geographic_coverage: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub temporal_coverage: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sample_size: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub age_coverage: Option<String>,
	pub study_design: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub resource_type: Option<String>,
	pub topics: Vec<String>,
	pub instruments: Vec<String>,
	pub data_catalogs: Vec<Organization>,
	pub matched_variables: Vec<VariableEntry>,
	pub all_variables: Vec<VariableEntry>,
	pub additional_links: Vec<String>,
}

pub fn extract(record: &RawSearchResult) -> StudyDetail {
	let funders = funders::extract_funders(record);
	let catalogs = links::resolve_catalogs(record);
	let additional_links = links::additional_links(record, &catalogs.used_urls);

	StudyDetail {
		title: first_match(record, TITLE_RULES).unwrap_or_else(|| UNTITLED_DATASET.to_string()),
		description: record
			.schema_field("description")
			.and_then(record::text)
			.map(str::to_string)
			.unwrap_or_default(),
		image: first_match(record, IMAGE_RULES),
		publisher: publisher(record),
		funders: (!funders.is_empty()).then_some(funders),
		geographic_coverage: first_match(record, GEOGRAPHIC_RULES),
		temporal_coverage: first_match(record, TEMPORAL_RULES),
		sample_size: first_match(record, SAMPLE_SIZE_RULES),
		age_coverage: age_coverage(record),
		study_design: first_match(record, STUDY_DESIGN_RULES).unwrap_or_default(),
		resource_type: first_match(record, RESOURCE_TYPE_RULES),
		topics: first_match(record, TOPIC_RULES).unwrap_or_default(),
		instruments: Field::Top("instruments")
			.lookup(record)
			.map(record::string_list)
			.unwrap_or_default(),
		data_catalogs: catalogs.catalogs,
		matched_variables: variables(record.matched_variables()),
		all_variables: variables(record.variables_measured()),
		additional_links,
	}
}

pub fn first_match<T>(record: &RawSearchResult, rules: &[Rule<T>]) -> Option<T> {
	rules.iter().find_map(|rule| rule(record))
}

pub fn age_coverage(record: &RawSearchResult) -> Option<String> {
	let bound = |key: &'static str| {
		Field::Extra(key)
			.lookup(record)
			.or_else(|| Field::Top(key).lookup(record))
			.and_then(record::scalar_to_string)
	};

	match (bound("age_lower"), bound("age_upper")) {
		(Some(lower), Some(upper)) => Some(format!("{lower} - {upper} years")),
		(Some(lower), None) => Some(format!("{lower}+ years")),
		(None, Some(upper)) => Some(format!("0 - {upper} years")),
		(None, None) => None,
	}
}

pub fn clean_topics(value: &Value) -> Vec<String> {
	record::entries(Some(value))
		.into_iter()
		.filter_map(Value::as_str)
		.map(str::trim)
		.filter(|topic| !topic.is_empty() && !is_html_fragment(topic))
		.map(str::to_string)
		.collect()
}

fn is_html_fragment(topic: &str) -> bool {
	if topic.starts_with('<') {
		return true;
	}

	HTML_ANCHOR.as_ref().map(|re| re.is_match(topic)).unwrap_or(false)
}

fn publisher(record: &RawSearchResult) -> Option<Organization> {
	let first = record::entries(record.schema_field("publisher")).into_iter().next()?;

	match first {
		Value::String(_) => record::text(first).map(Organization::named),
		Value::Object(_) => {
			let name = first.get("name").and_then(record::text)?;

			Some(Organization::from_value(first, name))
		},
		_ => None,
	}
}

fn variables(raw: &[Value]) -> Vec<VariableEntry> {
	raw.iter().filter_map(VariableEntry::from_value).collect()
}

fn owned_text(value: Option<&Value>) -> Option<String> {
	value.and_then(record::text).map(str::to_string)
}

fn schema_name(record: &RawSearchResult) -> Option<String> {
	owned_text(record.schema_field("name"))
}

fn schema_title(record: &RawSearchResult) -> Option<String> {
	owned_text(record.schema_field("title"))
}

fn schema_image(record: &RawSearchResult) -> Option<String> {
	let image = record.schema_field("image")?;

	owned_text(Some(image)).or_else(|| owned_text(image.get("url")))
}

fn top_image(record: &RawSearchResult) -> Option<String> {
	owned_text(record.top("image"))
}

fn explicit_geographic_coverage(record: &RawSearchResult) -> Option<String> {
	[
		Field::Top("geographic_coverage"),
		Field::Extra("geographic_coverage"),
		Field::Schema("spatialCoverage"),
	]
	.into_iter()
	.find_map(|field| owned_text(field.lookup(record)))
}

fn country_codes(record: &RawSearchResult) -> Option<String> {
	let codes = [Field::Extra("country_codes"), Field::Top("country_codes")]
		.into_iter()
		.find_map(|field| field.lookup(record))
		.map(record::string_list)?;

	(!codes.is_empty()).then(|| codes.join(", "))
}

fn explicit_temporal_coverage(record: &RawSearchResult) -> Option<String> {
	[
		Field::Top("temporal_coverage"),
		Field::Extra("temporal_coverage"),
		Field::Schema("temporalCoverage"),
	]
	.into_iter()
	.find_map(|field| owned_text(field.lookup(record)))
}

fn year_span(record: &RawSearchResult) -> Option<String> {
	let year = |key: &'static str| {
		[Field::Extra(key), Field::Top(key)]
			.into_iter()
			.find_map(|field| field.lookup(record).and_then(record::scalar_to_string))
	};
	let start = year("start_year")?;

	match year("end_year") {
		Some(end) => Some(format!("{start}..{end}")),
		None => Some(start),
	}
}

fn explicit_sample_size(record: &RawSearchResult) -> Option<String> {
	[Field::Top("sample_size"), Field::Extra("sample_size")]
		.into_iter()
		.find_map(|field| field.lookup(record).and_then(record::scalar_to_string))
}

fn schema_size(record: &RawSearchResult) -> Option<String> {
	record.schema_field("size").and_then(record::scalar_to_string)
}

fn extra_resource_type(record: &RawSearchResult) -> Option<String> {
	record.resource_type().map(str::to_string)
}

fn schema_type(record: &RawSearchResult) -> Option<String> {
	Field::Schema("@type").lookup(record).map(record::string_list)?.into_iter().next()
}

fn extra_study_design(record: &RawSearchResult) -> Option<Vec<String>> {
	non_empty(Field::Extra("study_design").lookup(record).map(record::string_list))
}

fn top_study_design(record: &RawSearchResult) -> Option<Vec<String>> {
	non_empty(Field::Top("study_design").lookup(record).map(record::string_list))
}

fn schema_keywords(record: &RawSearchResult) -> Option<Vec<String>> {
	non_empty(Field::Schema("keywords").lookup(record).map(clean_topics))
}

fn top_topics(record: &RawSearchResult) -> Option<Vec<String>> {
	non_empty(Field::Top("topics").lookup(record).map(clean_topics))
}

fn non_empty(values: Option<Vec<String>>) -> Option<Vec<String>> {
	values.filter(|values| !values.is_empty())
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn age_coverage_covers_each_bound_combination() {
		let both =
			RawSearchResult::new(json!({ "extra_data": { "age_lower": 5, "age_upper": 16 } }));
		let lower = RawSearchResult::new(json!({ "extra_data": { "age_lower": 18 } }));
		let upper = RawSearchResult::new(json!({ "extra_data": { "age_upper": 11 } }));

		assert_eq!(age_coverage(&both).as_deref(), Some("5 - 16 years"));
		assert_eq!(age_coverage(&lower).as_deref(), Some("18+ years"));
		assert_eq!(age_coverage(&upper).as_deref(), Some("0 - 11 years"));
		assert_eq!(age_coverage(&RawSearchResult::default()), None);
	}

	#[test]
	fn topics_drop_html_and_non_strings() {
		let topics = clean_topics(&json!([
			"Depression",
			"<p>Anxiety</p>",
			"See <a href=\"https://example.org\">here</a>",
			42,
			"  Sleep  "
		]));

		assert_eq!(topics, vec!["Depression".to_string(), "Sleep".to_string()]);
	}

	#[test]
	fn temporal_coverage_falls_back_to_years() {
		let span = RawSearchResult::new(json!({
			"extra_data": { "start_year": 1958, "end_year": 2013 }
		}));
		let open = RawSearchResult::new(json!({ "extra_data": { "start_year": 2001 } }));

		assert_eq!(first_match(&span, TEMPORAL_RULES).as_deref(), Some("1958..2013"));
		assert_eq!(first_match(&open, TEMPORAL_RULES).as_deref(), Some("2001"));
	}

	#[test]
	fn explicit_fields_take_priority_over_fallbacks() {
		let record = RawSearchResult::new(json!({
			"geographic_coverage": "Scotland",
			"dataset_schema": { "size": 900 },
			"extra_data": { "country_codes": ["GB"], "sample_size": "1200" }
		}));

		assert_eq!(first_match(&record, GEOGRAPHIC_RULES).as_deref(), Some("Scotland"));
		assert_eq!(first_match(&record, SAMPLE_SIZE_RULES).as_deref(), Some("1200"));
	}

	#[test]
	fn publisher_requires_a_name() {
		let nameless = RawSearchResult::new(json!({
			"dataset_schema": { "publisher": [{ "url": "https://example.org" }] }
		}));
		let named = RawSearchResult::new(json!({
			"dataset_schema": { "publisher": [{ "name": "UK Data Service", "logo": "logo.png" }] }
		}));

		assert_eq!(publisher(&nameless), None);
		assert_eq!(
			publisher(&named),
			Some(Organization {
				name: "UK Data Service".to_string(),
				url: None,
				logo: Some("logo.png".to_string()),
			})
		);
	}
}
