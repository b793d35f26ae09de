use serde_json::{Value, json};

use crate::{record::RawSearchResult, study::UNNAMED_VARIABLE};

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
	Ready(RawSearchResult),
	NeedsFetch { uuid: String, matched_variable: Option<Value> },
}

pub fn plan(hit: &RawSearchResult) -> Resolution {
	let working = working_record(hit);

	if !is_under_populated(&working) {
		return Resolution::Ready(working);
	}

	let Some(uuid) = working.uuid().map(str::to_string) else {
		return Resolution::Ready(working);
	};
	let matched_variable = hit.is_variable().then(|| synthesize_matched_variable(hit));

	Resolution::NeedsFetch { uuid, matched_variable }
}

pub fn settle(fetched: RawSearchResult) -> RawSearchResult {
	working_record(&fetched)
}

pub fn working_record(hit: &RawSearchResult) -> RawSearchResult {
	if hit.is_variable()
		&& let Some(ancestor) = hit.first_ancestor()
	{
		return RawSearchResult::new(ancestor.clone());
	}

	hit.clone()
}

/// A record that declares variables but carries none in its schema is a search-index stub.
pub fn is_under_populated(record: &RawSearchResult) -> bool {
	record.variable_count() > 0 && record.variables_measured().is_empty()
}

pub fn synthesize_matched_variable(hit: &RawSearchResult) -> Value {
	let mut variable = json!({
		"name": hit
			.extra_field("name")
			.and_then(crate::record::text)
			.unwrap_or(UNNAMED_VARIABLE),
	});

	if let Some(object) = variable.as_object_mut() {
		if let Some(uuid) = hit.uuid() {
			object.insert("uuid".to_string(), Value::String(uuid.to_string()));
		}
		if let Some(description) = hit.extra_field("description").and_then(crate::record::text) {
			object.insert("description".to_string(), Value::String(description.to_string()));
		}
	}

	variable
}

pub fn attach_matched_variable(fetched: &mut RawSearchResult, variable: Value) {
	fetched.set_matched_variables(vec![variable]);
}

#[cfg(test)]
mod tests {
	use super::*;

	fn variable_hit(ancestors: Value) -> RawSearchResult {
		RawSearchResult::new(json!({
			"extra_data": {
				"uuid": "var-1",
				"resource_type": "variable",
				"name": "GHQ-12",
				"description": "General health questionnaire"
			},
			"ancestors": ancestors
		}))
	}

	#[test]
	fn variable_hit_switches_to_first_ancestor() {
		let hit = variable_hit(json!([
			{ "dataset_schema": { "name": "Parent" } },
			{ "dataset_schema": { "name": "Grandparent" } }
		]));
		let working = working_record(&hit);

		assert_eq!(working.schema_field("name"), Some(&json!("Parent")));
	}

	#[test]
	fn variable_hit_without_ancestors_is_kept() {
		let hit = variable_hit(json!([]));

		assert_eq!(working_record(&hit), hit);
	}

	#[test]
	fn stub_ancestor_requests_fetch_with_synthesized_variable() {
		let hit = variable_hit(json!([
			{ "extra_data": { "uuid": "study-1", "number_of_variables": 40 }, "dataset_schema": {} }
		]));

		match plan(&hit) {
			Resolution::NeedsFetch { uuid, matched_variable } => {
				assert_eq!(uuid, "study-1");
				assert_eq!(
					matched_variable,
					Some(json!({
						"name": "GHQ-12",
						"uuid": "var-1",
						"description": "General health questionnaire"
					}))
				);
			},
			other => panic!("Expected fetch, got {other:?}."),
		}
	}

	#[test]
	fn stub_without_identifier_is_displayed_as_is() {
		let hit = RawSearchResult::new(json!({ "extra_data": { "number_of_variables": 3 } }));

		assert_eq!(plan(&hit), Resolution::Ready(hit));
	}

	#[test]
	fn synthesized_variable_defaults_name() {
		let hit = RawSearchResult::new(json!({ "extra_data": { "resource_type": "variable" } }));

		assert_eq!(synthesize_matched_variable(&hit), json!({ "name": "Unnamed Variable" }));
	}
}
