use std::collections::BTreeMap;

use discover_domain::RawSearchResult;

use crate::{DiscoverService, Error, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
	pub results: Vec<RawSearchResult>,
	pub num_hits: u64,
}

impl DiscoverService {
	pub async fn search(
		&self,
		query: &str,
		filters: &BTreeMap<String, Vec<String>>,
		page: u32,
		page_size: u32,
	) -> Result<SearchResults> {
		if page == 0 {
			return Err(Error::InvalidRequest { message: "page must be 1 or greater.".to_string() });
		}
		if page_size == 0 || page_size > self.cfg.search.max_page_size {
			return Err(Error::InvalidRequest {
				message: format!(
					"page_size must be between 1 and {}.",
					self.cfg.search.max_page_size
				),
			});
		}

		let filters = active_filters(filters);
		let page_result = self
			.race(
				"fetch_search_results",
				self.catalog.fetch_search_results(
					&self.cfg.catalog,
					query.trim(),
					&filters,
					page,
					page_size,
				),
			)
			.await?;

		tracing::info!(
			num_hits = page_result.num_hits,
			returned = page_result.results.len(),
			page,
			"Search completed."
		);

		Ok(SearchResults {
			results: page_result.results.into_iter().map(RawSearchResult::new).collect(),
			num_hits: page_result.num_hits,
		})
	}
}

/// Drops filters with nothing selected. The backend treats an empty list as "match nothing".
pub fn active_filters(filters: &BTreeMap<String, Vec<String>>) -> BTreeMap<String, Vec<String>> {
	filters
		.iter()
		.filter(|(_, values)| !values.is_empty())
		.map(|(key, values)| (key.clone(), values.clone()))
		.collect()
}
