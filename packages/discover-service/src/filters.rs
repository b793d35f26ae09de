use discover_domain::{FilterDescriptor, aggregation};

use crate::{DiscoverService, Result};

impl DiscoverService {
	pub async fn load_filters(&self) -> Result<Vec<FilterDescriptor>> {
		let fetch = self.catalog.fetch_aggregate_filters(&self.cfg.catalog);
		let raw = self.race("fetch_aggregate_filters", fetch).await?;
		let filters = aggregation::normalize_aggregations(&raw);

		tracing::info!(fields = raw.len(), filters = filters.len(), "Filters loaded.");

		Ok(filters)
	}
}
