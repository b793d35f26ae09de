use serde_json::{Value, json};

pub fn dataset(uuid: &str, title: &str) -> Value {
	json!({
		"extra_data": {
			"uuid": uuid,
			"resource_type": "dataset",
			"number_of_variables": 2,
			"age_lower": 16,
			"age_upper": 64,
			"study_design": ["cohort"],
			"country_codes": ["GB", "IE"],
			"start_year": 1958,
			"end_year": 2013
		},
		"dataset_schema": {
			"@type": "Dataset",
			"name": title,
			"description": format!("{title} description."),
			"keywords": ["Health", "Education"],
			"funder": [
				{ "name": "Economic and Social Research Council", "url": "https://esrc.ukri.org" }
			],
			"publisher": [{ "name": "UK Data Service", "url": "https://ukdataservice.ac.uk" }],
			"identifier": [format!("10.5255/{uuid}")],
			"url": [format!("https://www.cls.ucl.ac.uk/{uuid}")],
			"includedInDataCatalog": [
				{ "name": "CLS", "url": "https://www.cls.ucl.ac.uk/", "image": "https://cls.png" }
			],
			"variableMeasured": [
				{ "name": "ghq12", "description": "General health questionnaire" },
				{ "name": "bmi", "description": "Body mass index" }
			]
		}
	})
}

pub fn dataset_stub(uuid: &str, title: &str) -> Value {
	json!({
		"extra_data": { "uuid": uuid, "resource_type": "dataset", "number_of_variables": 2 },
		"dataset_schema": { "name": title, "variableMeasured": [] }
	})
}

pub fn variable_hit(uuid: &str, name: &str, parent: Value) -> Value {
	json!({
		"extra_data": {
			"uuid": uuid,
			"resource_type": "variable",
			"name": name,
			"description": format!("{name} description.")
		},
		"ancestors": [parent]
	})
}

pub fn aggregations() -> Value {
	json!({
		"sample_size": { "statistics": { "minimum": 10, "maximum": 5000 } },
		"age_lower": { "statistics": { "min": 2, "max": 40 } },
		"country_codes": {
			"buckets": [{ "key": "GB", "doc_count": 12 }, { "key": "US", "doc_count": 4 }]
		},
		"age_upper": { "statistics": { "min": 5, "max": 18 } },
		"genetic_data_collected": { "buckets": [] },
		"start_year": { "statistics": { "minimum": null, "maximum": 2020 } }
	})
}
