use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use discover_config::Config;
use discover_domain::RawSearchResult;
use discover_service::{DiscoverService, SearchOrchestrator};

#[derive(Debug, Parser)]
#[command(
	version = discover_cli::VERSION,
	rename_all = "kebab",
	styles = discover_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Print the filter descriptors built from the catalog aggregations.
	Filters,
	/// Run one search and print the page with the selected study.
	Search {
		#[arg(default_value = "")]
		query: String,
		/// Repeatable `id=value` selection.
		#[arg(long = "filter", value_name = "ID=VALUE", value_parser = parse_filter)]
		filters: Vec<(String, String)>,
		#[arg(long, default_value_t = 1)]
		page: u32,
		/// Index of the hit to display.
		#[arg(long, value_name = "I")]
		select: Option<usize>,
	},
	/// Fetch one record and print its normalized form.
	Show { uuid: String },
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = discover_config::load(&args.config)?;
	init_tracing(&config)?;
	tracing::debug!(api_base = %config.catalog.api_base, "Configuration loaded.");
	let output = execute(config, args.command).await?;

	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

pub async fn execute(config: Config, command: Command) -> color_eyre::Result<Value> {
	let service = Arc::new(DiscoverService::new(config));

	match command {
		Command::Filters => Ok(serde_json::to_value(service.load_filters().await?)?),
		Command::Search { query, filters, page, select } => {
			let orchestrator = SearchOrchestrator::new(service);

			orchestrator.initialize().await?;
			orchestrator.stage(query, group_filters(filters), page)?;
			orchestrator.search().await?;

			if let Some(index) = select
				&& index != 0
			{
				orchestrator.select(index).await?;
			}

			let state = orchestrator.snapshot();

			Ok(json!({
				"query": state.query,
				"filters": state.selected_filters,
				"page": state.page,
				"total_pages": state.total_pages(),
				"num_hits": state.num_hits,
				"results": state.results.iter().map(summary).collect::<Vec<_>>(),
				"selected": state.selected,
				"display": state.display,
			}))
		},
		Command::Show { uuid } => {
			let record = service.fetch_record(&uuid).await?;

			Ok(serde_json::to_value(service.study_detail(&record).await?)?)
		},
	}
}

fn summary(hit: &RawSearchResult) -> Value {
	json!({
		"uuid": hit.uuid(),
		"resource_type": hit.resource_type(),
		"name": hit.schema_field("name").or_else(|| hit.extra_field("name")),
	})
}

fn group_filters(pairs: Vec<(String, String)>) -> BTreeMap<String, Vec<String>> {
	let mut filters = BTreeMap::<String, Vec<String>>::new();

	for (id, value) in pairs {
		filters.entry(id).or_default().push(value);
	}

	filters
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
	let (id, value) = raw.split_once('=').ok_or_else(|| format!("Expected ID=VALUE, got {raw}."))?;
	let (id, value) = (id.trim(), value.trim());

	if id.is_empty() || value.is_empty() {
		return Err(format!("Expected ID=VALUE, got {raw}."));
	}

	Ok((id.to_string(), value.to_string()))
}

fn init_tracing(config: &Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.try_init()
		.map_err(|err| eyre::eyre!("Failed to initialize tracing: {err}"))?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn filter_pairs_split_on_first_equals() {
		assert_eq!(parse_filter("country_codes=GB"), Ok(("country_codes".into(), "GB".into())));
		assert_eq!(parse_filter("note=a=b"), Ok(("note".into(), "a=b".into())));
		assert!(parse_filter("country_codes").is_err());
		assert!(parse_filter("=GB").is_err());
	}

	#[test]
	fn repeated_filters_group_by_id() {
		let grouped = group_filters(vec![
			("country_codes".into(), "GB".into()),
			("study_design".into(), "cohort".into()),
			("country_codes".into(), "IE".into()),
		]);

		assert_eq!(grouped["country_codes"], vec!["GB", "IE"]);
		assert_eq!(grouped["study_design"], vec!["cohort"]);
	}

	#[test]
	fn search_arguments_parse() {
		let args = Args::try_parse_from([
			"discover",
			"-c",
			"discover.toml",
			"search",
			"sleep",
			"--filter",
			"country_codes=GB",
			"--page",
			"2",
		])
		.expect("Failed to parse arguments.");

		match args.command {
			Command::Search { query, filters, page, select } => {
				assert_eq!(query, "sleep");
				assert_eq!(filters.len(), 1);
				assert_eq!(page, 2);
				assert_eq!(select, None);
			},
			other => panic!("Expected search, got {other:?}."),
		}
	}
}
