use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SCHEMA_KEY: &str = "dataset_schema";
pub const EXTRA_DATA_KEY: &str = "extra_data";
pub const ANCESTORS_KEY: &str = "ancestors";
pub const MATCHED_VARIABLES_KEY: &str = "variables_which_matched";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
	Top(&'static str),
	Schema(&'static str),
	Extra(&'static str),
}
impl Field {
	pub fn lookup(self, record: &RawSearchResult) -> Option<&Value> {
		let value = match self {
			Self::Top(key) => record.top(key),
			Self::Schema(key) => record.schema_field(key),
			Self::Extra(key) => record.extra_field(key),
		}?;

		(!value.is_null()).then_some(value)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSearchResult(Value);
impl RawSearchResult {
	pub fn new(value: Value) -> Self {
		Self(value)
	}

	pub fn as_value(&self) -> &Value {
		&self.0
	}

	pub fn into_value(self) -> Value {
		self.0
	}

	pub fn top(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn schema(&self) -> Option<&Map<String, Value>> {
		self.0.get(SCHEMA_KEY).and_then(Value::as_object)
	}

	pub fn extra(&self) -> Option<&Map<String, Value>> {
		self.0.get(EXTRA_DATA_KEY).and_then(Value::as_object)
	}

	pub fn schema_field(&self, key: &str) -> Option<&Value> {
		self.schema().and_then(|schema| schema.get(key))
	}

	pub fn extra_field(&self, key: &str) -> Option<&Value> {
		self.extra().and_then(|extra| extra.get(key))
	}

	pub fn uuid(&self) -> Option<&str> {
		Field::Extra("uuid").lookup(self).or_else(|| Field::Top("uuid").lookup(self)).and_then(text)
	}

	pub fn resource_type(&self) -> Option<&str> {
		Field::Extra("resource_type").lookup(self).and_then(text)
	}

	pub fn is_variable(&self) -> bool {
		self.resource_type().map(|tag| tag.to_lowercase().contains("variable")).unwrap_or(false)
	}

	pub fn first_ancestor(&self) -> Option<&Value> {
		self.0.get(ANCESTORS_KEY).and_then(Value::as_array).and_then(|ancestors| ancestors.first())
	}

	pub fn variable_count(&self) -> u64 {
		Field::Extra("number_of_variables")
			.lookup(self)
			.or_else(|| Field::Top("number_of_variables").lookup(self))
			.and_then(|value| match value {
				Value::Number(number) => number.as_u64().or_else(|| {
					number.as_f64().filter(|n| n.is_finite() && *n > 0.0).map(|n| n as u64)
				}),
				Value::String(raw) => raw.trim().parse().ok(),
				_ => None,
			})
			.unwrap_or(0)
	}

	pub fn variables_measured(&self) -> &[Value] {
		list(self.schema_field("variableMeasured"))
	}

	pub fn matched_variables(&self) -> &[Value] {
		list(self.top(MATCHED_VARIABLES_KEY))
	}

	pub fn set_matched_variables(&mut self, variables: Vec<Value>) {
		if !self.0.is_object() {
			self.0 = Value::Object(Map::new());
		}
		if let Some(object) = self.0.as_object_mut() {
			object.insert(MATCHED_VARIABLES_KEY.to_string(), Value::Array(variables));
		}
	}
}
impl From<Value> for RawSearchResult {
	fn from(value: Value) -> Self {
		Self(value)
	}
}

pub fn text(value: &Value) -> Option<&str> {
	value.as_str().map(str::trim).filter(|raw| !raw.is_empty())
}

pub fn scalar_to_string(value: &Value) -> Option<String> {
	match value {
		Value::String(_) => text(value).map(str::to_string),
		Value::Number(number) => {
			if number.is_i64() || number.is_u64() {
				Some(number.to_string())
			} else {
				number.as_f64().filter(|n| n.is_finite()).map(|n| n.to_string())
			}
		},
		_ => None,
	}
}

pub fn string_list(value: &Value) -> Vec<String> {
	match value {
		Value::Array(items) => items.iter().filter_map(text).map(str::to_string).collect(),
		_ => text(value).map(|raw| vec![raw.to_string()]).unwrap_or_default(),
	}
}

pub fn list(value: Option<&Value>) -> &[Value] {
	value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

pub fn entries(value: Option<&Value>) -> Vec<&Value> {
	match value {
		Some(Value::Array(items)) => items.iter().collect(),
		Some(Value::Null) | None => Vec::new(),
		Some(other) => vec![other],
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn variable_detection_is_case_insensitive() {
		let record = RawSearchResult::new(serde_json::json!({
			"extra_data": { "resource_type": "Variable" }
		}));

		assert!(record.is_variable());
		assert!(!RawSearchResult::default().is_variable());
	}

	#[test]
	fn variable_count_accepts_numeric_strings() {
		let record = RawSearchResult::new(serde_json::json!({
			"extra_data": { "number_of_variables": "12" }
		}));

		assert_eq!(record.variable_count(), 12);
	}

	#[test]
	fn null_fields_are_treated_as_absent() {
		let record = RawSearchResult::new(serde_json::json!({
			"uuid": null,
			"extra_data": { "uuid": "abc" }
		}));

		assert!(Field::Top("uuid").lookup(&record).is_none());
		assert_eq!(record.uuid(), Some("abc"));
	}

	#[test]
	fn scalar_rendering_drops_integral_fraction() {
		assert_eq!(scalar_to_string(&serde_json::json!(16)), Some("16".to_string()));
		assert_eq!(scalar_to_string(&serde_json::json!(16.5)), Some("16.5".to_string()));
		assert_eq!(scalar_to_string(&serde_json::json!(" ")), None);
	}
}
