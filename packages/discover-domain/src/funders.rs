use serde_json::Value;

use crate::{
	record::{self, Field, RawSearchResult},
	study::Organization,
};

pub const DEFAULT_FUNDER_NAME: &str = "Funding Organization";

// Formatting heuristics tuned to known catalogs. They do not generalize.
const ABBREVIATION_TOKEN_RATIO: f64 = 0.6;
const SHORT_TOKEN_CHARS: usize = 8;

const PRIMARY_FUNDER_FIELDS: &[Field] = &[Field::Top("funders"), Field::Extra("funders")];
const ALTERNATE_FUNDER_FIELDS: &[Field] = &[
	Field::Top("funders"),
	Field::Top("funding_bodies"),
	Field::Top("funding"),
	Field::Top("funder"),
	Field::Extra("funders"),
	Field::Extra("funding_bodies"),
	Field::Extra("funding"),
	Field::Extra("funder"),
];

const MENTAL_HEALTH_MARKERS: &[&str] = &["cmhm", "mental health"];

pub fn extract_funders(record: &RawSearchResult) -> Vec<Organization> {
	let mental_health = is_mental_health_related(record);
	let mut funders = schema_funders(record);

	if funders.is_empty()
		&& let Some(value) = PRIMARY_FUNDER_FIELDS.iter().find_map(|field| field.lookup(record))
	{
		funders = parse_funder_value(value, mental_health);
	}
	if (funders.is_empty() || mental_health)
		&& let Some(value) = ALTERNATE_FUNDER_FIELDS.iter().find_map(|field| field.lookup(record))
	{
		for funder in parse_funder_value(value, mental_health) {
			push_unique(&mut funders, funder);
		}
	}

	let mut unique = Vec::with_capacity(funders.len());

	for funder in funders {
		push_unique(&mut unique, funder);
	}

	if unique.len() == 1 && is_abbreviation_list(&unique[0].name) {
		let single = unique.remove(0);

		for token in single.name.split_whitespace() {
			push_unique(&mut unique, Organization::named(token));
		}
	}

	unique
}

pub fn is_mental_health_related(record: &RawSearchResult) -> bool {
	let catalogs = record::entries(record.schema_field("includedInDataCatalog"));
	let in_catalog = catalogs.iter().any(|catalog| {
		["name", "url"]
			.iter()
			.filter_map(|key| catalog.get(key).and_then(record::text))
			.any(mentions_mental_health)
	});

	if in_catalog {
		return true;
	}

	[Field::Schema("keywords"), Field::Top("topics")]
		.iter()
		.filter_map(|field| field.lookup(record))
		.flat_map(record::string_list)
		.any(|topic| mentions_mental_health(&topic))
}

/// Heuristic test for a space-joined list of organization codes such as `"ESRC MRC NIHR"`.
pub fn is_abbreviation_list(raw: &str) -> bool {
	let trimmed = raw.trim();

	if !trimmed.contains(' ') || has_sentence_punctuation(trimmed) {
		return false;
	}

	let tokens: Vec<&str> = trimmed.split_whitespace().collect();

	if tokens.is_empty() {
		return false;
	}

	let code_like = tokens
		.iter()
		.filter(|token| token.chars().count() < SHORT_TOKEN_CHARS || is_uppercase_heavy(token))
		.count();

	code_like as f64 / tokens.len() as f64 > ABBREVIATION_TOKEN_RATIO
}

fn schema_funders(record: &RawSearchResult) -> Vec<Organization> {
	record::list(record.schema_field("funder"))
		.iter()
		.filter_map(|entry| match entry {
			Value::String(_) => record::text(entry).map(Organization::named),
			Value::Object(_) => Some(Organization::from_value(entry, DEFAULT_FUNDER_NAME)),
			_ => None,
		})
		.collect()
}

fn parse_funder_value(value: &Value, mental_health: bool) -> Vec<Organization> {
	match value {
		Value::Array(items) => items
			.iter()
			.filter_map(|item| match item {
				Value::String(_) => record::text(item).map(Organization::named),
				Value::Object(_) => Some(Organization::from_value(item, DEFAULT_FUNDER_NAME)),
				_ => None,
			})
			.collect(),
		Value::String(raw) => parse_funder_string(raw, mental_health),
		_ => Vec::new(),
	}
}

fn parse_funder_string(raw: &str, mental_health: bool) -> Vec<Organization> {
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return Vec::new();
	}

	let catalog_qualified =
		mental_health && trimmed.contains(' ') && !has_sentence_punctuation(trimmed);

	if catalog_qualified || is_abbreviation_list(trimmed) {
		return trimmed.split_whitespace().map(Organization::named).collect();
	}

	vec![Organization::named(trimmed)]
}

fn push_unique(funders: &mut Vec<Organization>, funder: Organization) {
	if !funders.iter().any(|existing| existing.name == funder.name) {
		funders.push(funder);
	}
}

fn has_sentence_punctuation(raw: &str) -> bool {
	raw.contains([',', '.', ';'])
}

fn is_uppercase_heavy(token: &str) -> bool {
	if token == token.to_uppercase() {
		return true;
	}

	let mut run = 0;

	for ch in token.chars() {
		if ch.is_uppercase() {
			run += 1;

			if run >= 2 {
				return true;
			}
		} else {
			run = 0;
		}
	}

	false
}

fn mentions_mental_health(raw: &str) -> bool {
	let lowered = raw.to_lowercase();

	MENTAL_HEALTH_MARKERS.iter().any(|marker| lowered.contains(marker))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn code_lists_are_abbreviations() {
		assert!(is_abbreviation_list("ALSPAC MCS NCDS BCS70"));
		assert!(is_abbreviation_list("ESRC MRC Wellcome"));
	}

	#[test]
	fn names_with_long_words_are_not_abbreviations() {
		assert!(!is_abbreviation_list("Wellcome Trust"));
		assert!(!is_abbreviation_list("Economic and Social Research Council"));
	}

	#[test]
	fn punctuation_or_single_token_disables_splitting() {
		assert!(!is_abbreviation_list("ESRC, MRC"));
		assert!(!is_abbreviation_list("U.K. MRC"));
		assert!(!is_abbreviation_list("ESRC"));
	}

	#[test]
	fn mixed_case_runs_count_as_uppercase_heavy() {
		assert!(is_uppercase_heavy("NIHRtrust"));
		assert!(is_uppercase_heavy("BCS70"));
		assert!(!is_uppercase_heavy("Foundation"));
	}

	#[test]
	fn mental_health_context_splits_plain_names() {
		let funders = parse_funder_string("Wellcome Foundation", true);

		assert_eq!(funders.len(), 2);
		assert_eq!(parse_funder_string("Wellcome Foundation", false).len(), 1);
	}
}
