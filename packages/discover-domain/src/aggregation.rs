use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const AGE_RANGE_ID: &str = "age_range";
pub const RANGE_STEPS: usize = 100;

const AGE_FIELDS: &[&str] = &["age_lower", "age_upper", "age_min", "age_max"];
const NUMERIC_FIELDS: &[&str] = &[
	"sample_size",
	"age_lower",
	"age_upper",
	"start_year",
	"end_year",
	"duration_years",
	"num_variables",
	"num_sweeps",
];
const DEFAULT_AGE_BOUNDS: (f64, f64) = (0.0, 100.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
	Range,
	Multiselect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
	pub id: String,
	pub label: String,
	#[serde(rename = "type")]
	pub kind: FilterKind,
	pub options: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateFieldStat {
	pub minimum: Option<f64>,
	pub maximum: Option<f64>,
	pub buckets: Vec<Bucket>,
}
impl AggregateFieldStat {
	pub fn from_value(value: &Value) -> Self {
		let statistics = value.get("statistics");
		let stat = |keys: [&str; 2]| {
			statistics.and_then(|stats| {
				keys.into_iter().find_map(|key| stats.get(key).and_then(Value::as_f64))
			})
		};
		let buckets = value
			.get("buckets")
			.and_then(Value::as_array)
			.map(|buckets| buckets.iter().map(Bucket::from_value).collect())
			.unwrap_or_default();

		Self { minimum: stat(["minimum", "min"]), maximum: stat(["maximum", "max"]), buckets }
	}

	fn finite_minimum(&self) -> Option<f64> {
		self.minimum.filter(|value| value.is_finite())
	}

	fn finite_maximum(&self) -> Option<f64> {
		self.maximum.filter(|value| value.is_finite())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
	pub key: String,
	pub count: u64,
}
impl Bucket {
	fn from_value(value: &Value) -> Self {
		let key = match value.get("key") {
			Some(Value::String(key)) => key.clone(),
			Some(Value::Number(number)) => number.to_string(),
			Some(Value::Bool(flag)) => flag.to_string(),
			_ => String::new(),
		};
		let count = ["doc_count", "count"]
			.into_iter()
			.find_map(|key| value.get(key).and_then(Value::as_u64))
			.unwrap_or(0);

		Self { key, count }
	}
}

#[derive(Debug, Default)]
struct AgeAccumulator {
	min: Option<f64>,
	max: Option<f64>,
}
impl AgeAccumulator {
	fn fold(&mut self, stat: &AggregateFieldStat) {
		if let Some(value) = stat.finite_minimum() {
			self.min = Some(self.min.map_or(value, |current| current.min(value)));
		}
		if let Some(value) = stat.finite_maximum() {
			self.max = Some(self.max.map_or(value, |current| current.max(value)));
		}
	}

	fn bounds(&self) -> Option<(f64, f64)> {
		match (self.min, self.max) {
			(Some(min), Some(max)) if min <= max => Some((min, max)),
			_ => None,
		}
	}
}

pub fn parse_aggregations(raw: &Map<String, Value>) -> Vec<(String, AggregateFieldStat)> {
	raw.iter()
		.map(|(field, value)| (field.clone(), AggregateFieldStat::from_value(value)))
		.collect()
}

pub fn normalize_aggregations(raw: &Map<String, Value>) -> Vec<FilterDescriptor> {
	build_filters(&parse_aggregations(raw))
}

pub fn build_filters(fields: &[(String, AggregateFieldStat)]) -> Vec<FilterDescriptor> {
	let mut age = AgeAccumulator::default();
	let mut filters = Vec::with_capacity(fields.len() + 1);

	for (field, stat) in fields {
		if AGE_FIELDS.contains(&field.as_str()) {
			age.fold(stat);

			continue;
		}
		if NUMERIC_FIELDS.contains(&field.as_str()) {
			let (default_min, default_max) = numeric_defaults(field);
			let min = stat.finite_minimum().unwrap_or(default_min);
			let max = stat.finite_maximum().unwrap_or(default_max);

			filters.push(range_filter(field, &humanize(field), min, max));

			continue;
		}
		if stat.buckets.is_empty() {
			continue;
		}

		filters.push(FilterDescriptor {
			id: field.clone(),
			label: humanize(field),
			kind: FilterKind::Multiselect,
			options: stat.buckets.iter().map(|bucket| bucket.key.clone()).collect(),
		});
	}

	let (min, max) = age.bounds().unwrap_or(DEFAULT_AGE_BOUNDS);

	filters.push(range_filter(AGE_RANGE_ID, &humanize(AGE_RANGE_ID), min, max));

	filters
}

pub fn numeric_defaults(field: &str) -> (f64, f64) {
	match field {
		"sample_size" => (0.0, 100_000.0),
		"start_year" | "end_year" => (1_900.0, 2_024.0),
		"duration_years" => (0.0, 100.0),
		"num_variables" => (0.0, 10_000.0),
		"num_sweeps" => (0.0, 50.0),
		_ => (0.0, 100.0),
	}
}

pub fn range_options(min: f64, max: f64) -> Vec<String> {
	let max = if max > min { max } else { min + 1.0 };
	let span = max - min;

	(0..=RANGE_STEPS)
		.map(|step| {
			let point = min + (step as f64 / RANGE_STEPS as f64) * span;

			format_number(point)
		})
		.collect()
}

pub fn humanize(field: &str) -> String {
	field
		.split('_')
		.filter(|word| !word.is_empty())
		.map(|word| {
			let mut chars = word.chars();

			match chars.next() {
				Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}

fn range_filter(id: &str, label: &str, min: f64, max: f64) -> FilterDescriptor {
	FilterDescriptor {
		id: id.to_string(),
		label: label.to_string(),
		kind: FilterKind::Range,
		options: range_options(min, max),
	}
}

fn format_number(value: f64) -> String {
	if value == 0.0 {
		return "0".to_string();
	}

	value.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn humanizes_field_names() {
		assert_eq!(humanize("sample_size"), "Sample Size");
		assert_eq!(humanize("age_range"), "Age Range");
		assert_eq!(humanize("genetic_data_collected"), "Genetic Data Collected");
	}

	#[test]
	fn degenerate_span_is_widened() {
		let options = range_options(5.0, 5.0);

		assert_eq!(options.len(), 101);
		assert_eq!(options.first().map(String::as_str), Some("5"));
		assert_eq!(options.last().map(String::as_str), Some("6"));
	}

	#[test]
	fn fractional_points_render_without_trailing_zeroes() {
		let options = range_options(0.0, 1.0);

		assert_eq!(options[50], "0.5");
		assert_eq!(options[100], "1");
	}

	#[test]
	fn stats_accept_short_keys_and_ignore_non_numbers() {
		let stat = AggregateFieldStat::from_value(&serde_json::json!({
			"statistics": { "min": 2, "maximum": "NaN" }
		}));

		assert_eq!(stat.minimum, Some(2.0));
		assert_eq!(stat.maximum, None);
	}

	#[test]
	fn bucket_keys_are_stringified() {
		let stat = AggregateFieldStat::from_value(&serde_json::json!({
			"buckets": [{ "key": 1, "doc_count": 3 }, { "doc_count": 1 }]
		}));

		assert_eq!(stat.buckets[0], Bucket { key: "1".to_string(), count: 3 });
		assert_eq!(stat.buckets[1].key, "");
	}
}
